//! Agent entity: motion, facing and the health steal.

use std::f64::consts::{PI, TAU};
use std::time::Instant;

use rand::Rng;
use smallvec::SmallVec;
use uuid::Uuid;

use crate::config::SimConfig;
use crate::game::boost::{combined_factor, Boost};
use crate::game::trail::Trail;
use crate::util::color::{self, Rgb};
use crate::util::vec2::Vec2;

/// Unique agent identifier
pub type AgentId = Uuid;

/// A steal that brought its victim to zero health or below
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Kill {
    pub killer: AgentId,
    pub victim: AgentId,
    /// Victim's last position, where its replacement will appear
    pub position: Vec2,
}

#[derive(Debug, Clone)]
pub struct Agent {
    pub id: AgentId,
    /// Always inside the plane after `advance`
    pub position: Vec2,
    /// Direction of travel in radians, fixed for the agent's lifetime
    heading: f64,
    /// Unit vector derived from `heading`
    velocity: Vec2,
    /// Only ever grows (on kills)
    pub speed: f64,
    /// Capped on gain; an agent is dead once this reaches zero or below
    pub health: f64,
    pub boosts: SmallVec<[Boost; 4]>,
    pub kills: u32,
}

impl Agent {
    /// Create an agent with a uniformly random heading
    pub fn new<R: Rng>(position: Vec2, config: &SimConfig, rng: &mut R) -> Self {
        Self::with_heading(position, rng.gen_range(0.0..TAU), config)
    }

    pub fn with_heading(position: Vec2, heading: f64, config: &SimConfig) -> Self {
        Self {
            id: Uuid::new_v4(),
            position,
            heading,
            velocity: Vec2::from_angle(heading),
            speed: config.initial_speed,
            health: config.initial_health,
            boosts: SmallVec::new(),
            kills: 0,
        }
    }

    #[inline]
    pub fn heading(&self) -> f64 {
        self.heading
    }

    #[inline]
    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    #[inline]
    pub fn is_dead(&self) -> bool {
        self.health <= 0.0
    }

    /// Current speed multiplier from active boosts
    pub fn boost_factor(&self) -> f64 {
        combined_factor(&self.boosts)
    }

    /// Move one tick along the heading and return the trail left behind.
    ///
    /// Expired boosts are dropped first; the remaining ones scale the step.
    /// The new position wraps onto the `width` x `height` torus.
    pub fn advance(&mut self, now: Instant, width: f64, height: f64) -> Trail {
        self.boosts.retain(|b| !b.is_expired(now));

        let step = self.velocity * (self.speed * self.boost_factor());
        self.position = (self.position + step).wrap(width, height);

        debug_assert!(self.position.x >= 0.0 && self.position.x < width);
        debug_assert!(self.position.y >= 0.0 && self.position.y < height);

        Trail::new(self.position, self.speed_color(), now)
    }

    /// How directly this agent points at `target`, in `[0, PI]`.
    ///
    /// `PI` when the heading points straight at the target, `0` when it
    /// points straight away.
    pub fn facing_score_toward(&self, target: Vec2) -> f64 {
        let bearing = (target - self.position).angle();
        let d = bearing - self.heading;
        let diff = d.sin().atan2(d.cos()).abs();
        PI - diff
    }

    pub fn facing_score(&self, other: &Agent) -> f64 {
        self.facing_score_toward(other.position)
    }

    /// Take health from `victim`.
    ///
    /// No-op when the victim is already dead or is this agent. Otherwise the
    /// thief gains health (capped), the victim loses health, and the thief
    /// gets a fresh boost. Returns the kill when the victim drops to zero.
    pub fn steal(&mut self, victim: &mut Agent, now: Instant, config: &SimConfig) -> Option<Kill> {
        if victim.is_dead() || victim.id == self.id {
            return None;
        }

        self.health = (self.health + config.steal_gain).min(config.max_health);
        victim.health -= config.steal_amount;
        self.boosts
            .push(Boost::new(config.boost_factor, config.boost_duration, now));

        if victim.is_dead() {
            self.speed *= config.kill_speed_multiplier;
            self.kills += 1;
            return Some(Kill {
                killer: self.id,
                victim: victim.id,
                position: victim.position,
            });
        }

        None
    }

    pub fn health_color(&self, max_health: f64) -> Rgb {
        color::health_color(self.health, max_health)
    }

    pub fn speed_color(&self) -> Rgb {
        color::speed_color(self.speed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;
    use std::f64::consts::FRAC_PI_2;
    use std::time::Duration;

    const EPSILON: f64 = 1e-9;

    fn agent_at(x: f64, y: f64, heading: f64) -> Agent {
        Agent::with_heading(Vec2::new(x, y), heading, &SimConfig::default())
    }

    #[test]
    fn test_new_agent_defaults() {
        let config = SimConfig::default();
        let mut rng = SmallRng::seed_from_u64(7);
        let agent = Agent::new(Vec2::new(10.0, 20.0), &config, &mut rng);

        assert_eq!(agent.position, Vec2::new(10.0, 20.0));
        assert_eq!(agent.speed, 2.0);
        assert_eq!(agent.health, 100.0);
        assert!(agent.boosts.is_empty());
        assert!((0.0..TAU).contains(&agent.heading()));
        assert!((agent.velocity().length() - 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_advance_moves_by_speed() {
        let now = Instant::now();
        let mut agent = agent_at(100.0, 100.0, 0.0);

        let trail = agent.advance(now, 1000.0, 900.0);

        assert!(agent.position.approx_eq(Vec2::new(102.0, 100.0), EPSILON));
        assert_eq!(trail.position, agent.position);
        assert_eq!(trail.created_at, now);
        assert_eq!(trail.color, agent.speed_color());
    }

    #[test]
    fn test_advance_wraps_edges() {
        let now = Instant::now();
        let mut east = agent_at(999.0, 450.0, 0.0);
        let mut north = agent_at(500.0, 1.0, -FRAC_PI_2);

        east.advance(now, 1000.0, 900.0);
        north.advance(now, 1000.0, 900.0);

        assert!(east.position.approx_eq(Vec2::new(1.0, 450.0), 1e-6));
        assert!(north.position.approx_eq(Vec2::new(500.0, 899.0), 1e-6));
    }

    #[test]
    fn test_position_stays_on_plane() {
        let config = SimConfig::default();
        let mut rng = SmallRng::seed_from_u64(42);
        let now = Instant::now();

        for _ in 0..50 {
            let mut agent = Agent::new(Vec2::new(0.0, 0.0), &config, &mut rng);
            agent.speed = rng.gen_range(0.5..400.0);
            for _ in 0..200 {
                agent.advance(now, config.width, config.height);
                assert!(agent.position.x >= 0.0 && agent.position.x < config.width);
                assert!(agent.position.y >= 0.0 && agent.position.y < config.height);
            }
        }
    }

    #[test]
    fn test_boosts_scale_displacement() {
        let now = Instant::now();
        let mut agent = agent_at(0.0, 0.0, 0.0);
        agent.boosts.push(Boost::new(1.5, Duration::from_secs(10), now));
        agent.boosts.push(Boost::new(2.0, Duration::from_secs(10), now));

        agent.advance(now, 1000.0, 900.0);

        assert!((agent.position.x - 2.0 * 1.5 * 2.0).abs() < EPSILON);
    }

    #[test]
    fn test_expired_boosts_dropped_before_moving() {
        let t0 = Instant::now();
        let mut agent = agent_at(0.0, 0.0, 0.0);
        agent.boosts.push(Boost::new(3.0, Duration::from_millis(100), t0));
        agent.boosts.push(Boost::new(1.5, Duration::from_secs(10), t0));

        agent.advance(t0 + Duration::from_millis(200), 1000.0, 900.0);

        assert_eq!(agent.boosts.len(), 1);
        assert!((agent.position.x - 3.0).abs() < EPSILON);
    }

    #[test]
    fn test_facing_score_literal_headings() {
        let agent = agent_at(0.0, 0.0, 0.0);

        assert!((agent.facing_score_toward(Vec2::new(10.0, 0.0)) - PI).abs() < EPSILON);
        assert!(agent.facing_score_toward(Vec2::new(-10.0, 0.0)).abs() < EPSILON);
        assert!((agent.facing_score_toward(Vec2::new(0.0, 10.0)) - FRAC_PI_2).abs() < EPSILON);
    }

    #[test]
    fn test_facing_score_opposed_pair() {
        // Head-on: both score PI. Chasing: the chaser scores PI, the leader 0.
        let a = agent_at(0.0, 0.0, 0.0);
        let b = agent_at(10.0, 0.0, PI);
        assert!((a.facing_score(&b) + b.facing_score(&a) - 2.0 * PI).abs() < EPSILON);

        let leader = agent_at(10.0, 0.0, 0.0);
        assert!((a.facing_score(&leader) + leader.facing_score(&a) - PI).abs() < EPSILON);
    }

    #[test]
    fn test_facing_score_range() {
        let mut rng = SmallRng::seed_from_u64(3);
        for _ in 0..500 {
            let agent = agent_at(
                rng.gen_range(0.0..1000.0),
                rng.gen_range(0.0..900.0),
                rng.gen_range(-10.0..10.0),
            );
            let target = Vec2::new(rng.gen_range(0.0..1000.0), rng.gen_range(0.0..900.0));
            let score = agent.facing_score_toward(target);
            assert!((0.0..=PI).contains(&score), "score {} out of range", score);
        }
    }

    #[test]
    fn test_steal_transfers_health() {
        let config = SimConfig::default();
        let now = Instant::now();
        let mut thief = agent_at(0.0, 0.0, 0.0);
        let mut victim = agent_at(10.0, 0.0, 0.0);
        thief.health = 50.0;

        let kill = thief.steal(&mut victim, now, &config);

        assert!(kill.is_none());
        assert_eq!(thief.health, 60.0);
        assert_eq!(victim.health, 90.0);
        assert_eq!(thief.boosts.len(), 1);
        assert_eq!(thief.boosts[0].factor, 1.05);
        assert_eq!(thief.boosts[0].expires_at, now + Duration::from_secs(30));
        assert_eq!(thief.speed, 2.0);
    }

    #[test]
    fn test_steal_caps_health() {
        let config = SimConfig::default();
        let mut thief = agent_at(0.0, 0.0, 0.0);
        let mut victim = agent_at(10.0, 0.0, 0.0);
        thief.health = 95.0;

        thief.steal(&mut victim, Instant::now(), &config);
        assert_eq!(thief.health, 100.0);

        thief.steal(&mut victim, Instant::now(), &config);
        assert_eq!(thief.health, 100.0);
        assert_eq!(victim.health, 80.0);
        assert_eq!(thief.boosts.len(), 2);
    }

    #[test]
    fn test_steal_kill() {
        let config = SimConfig::default();
        let mut thief = agent_at(0.0, 0.0, 0.0);
        let mut victim = agent_at(12.0, 3.0, 0.0);
        victim.health = 10.0;

        let kill = thief.steal(&mut victim, Instant::now(), &config).unwrap();

        assert_eq!(kill.killer, thief.id);
        assert_eq!(kill.victim, victim.id);
        assert_eq!(kill.position, Vec2::new(12.0, 3.0));
        assert!(victim.is_dead());
        assert!((thief.speed - 2.0 * 1.02).abs() < EPSILON);
        assert_eq!(thief.kills, 1);
    }

    #[test]
    fn test_steal_overkill_goes_negative() {
        let config = SimConfig::default();
        let mut thief = agent_at(0.0, 0.0, 0.0);
        let mut victim = agent_at(10.0, 0.0, 0.0);
        victim.health = 4.0;

        assert!(thief.steal(&mut victim, Instant::now(), &config).is_some());
        assert_eq!(victim.health, -6.0);
    }

    #[test]
    fn test_steal_from_dead_is_noop() {
        let config = SimConfig::default();
        let mut thief = agent_at(0.0, 0.0, 0.0);
        let mut victim = agent_at(10.0, 0.0, 0.0);
        thief.health = 40.0;
        victim.health = 0.0;

        let kill = thief.steal(&mut victim, Instant::now(), &config);

        assert!(kill.is_none());
        assert_eq!(thief.health, 40.0);
        assert_eq!(victim.health, 0.0);
        assert!(thief.boosts.is_empty());
        assert_eq!(thief.speed, 2.0);
    }

    #[test]
    fn test_steal_from_self_is_noop() {
        let config = SimConfig::default();
        let mut agent = agent_at(0.0, 0.0, 0.0);
        agent.health = 40.0;
        let mut same = agent.clone();

        let kill = agent.steal(&mut same, Instant::now(), &config);

        assert!(kill.is_none());
        assert_eq!(agent.health, 40.0);
        assert_eq!(same.health, 40.0);
        assert!(agent.boosts.is_empty());
    }

    #[test]
    fn test_speed_never_decreases() {
        let config = SimConfig::default();
        let now = Instant::now();
        let mut thief = agent_at(0.0, 0.0, 0.0);
        let mut last_speed = thief.speed;

        for _ in 0..5 {
            let mut victim = agent_at(5.0, 0.0, 0.0);
            while thief.steal(&mut victim, now, &config).is_none() {
                assert!(thief.speed >= last_speed);
            }
            assert!(thief.speed > last_speed);
            last_speed = thief.speed;
            thief.advance(now, config.width, config.height);
        }

        assert!((thief.speed - 2.0 * 1.02f64.powi(5)).abs() < 1e-9);
    }
}
