//! Read-only views handed to a renderer.
//!
//! A renderer takes the simulation's read lock, captures a `WorldSnapshot`
//! and draws from that, so it never sees a half-finished tick.

use std::time::Instant;

use serde::Serialize;

use crate::game::agent::AgentId;
use crate::game::state::Simulation;
use crate::util::color::Rgb;
use crate::util::vec2::Vec2;

/// Agent marker
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AgentView {
    pub id: AgentId,
    pub position: Vec2,
    pub health: f64,
    pub speed: f64,
    /// Green when healthy, red when nearly dead
    pub color: Rgb,
}

/// Fading trail dot
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrailView {
    pub position: Vec2,
    pub color: Rgb,
    /// 1.0 when fresh, 0.0 at the end of the trail lifetime
    pub alpha: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct WorldSnapshot {
    pub tick: u64,
    pub width: f64,
    pub height: f64,
    pub agents: Vec<AgentView>,
    pub trails: Vec<TrailView>,
}

impl WorldSnapshot {
    pub fn capture(sim: &Simulation, now: Instant) -> Self {
        Self {
            tick: sim.tick_count(),
            width: sim.config().width,
            height: sim.config().height,
            agents: list_agents(sim),
            trails: list_trails(sim, now),
        }
    }
}

pub fn list_agents(sim: &Simulation) -> Vec<AgentView> {
    let max_health = sim.config().max_health;

    sim.agents()
        .iter()
        .map(|a| AgentView {
            id: a.id,
            position: a.position,
            health: a.health,
            speed: a.speed,
            color: a.health_color(max_health),
        })
        .collect()
}

pub fn list_trails(sim: &Simulation, now: Instant) -> Vec<TrailView> {
    let lifetime = sim.config().trail_lifetime;

    sim.trail_histories()
        .flat_map(|(_, history)| history.iter())
        .filter(|t| !t.is_expired(now, lifetime))
        .map(|t| TrailView {
            position: t.position,
            color: t.color,
            alpha: t.alpha(now, lifetime),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::game::agent::Agent;
    use std::time::Duration;

    fn sim_with_walker() -> (Simulation, AgentId) {
        let mut sim = Simulation::with_seed(
            SimConfig {
                initial_agents: 0,
                ..SimConfig::default()
            },
            21,
        ).unwrap();
        let config = sim.config().clone();
        let id = sim.insert_agent(Agent::with_heading(Vec2::new(10.0, 10.0), 0.0, &config));
        (sim, id)
    }

    #[test]
    fn test_list_agents() {
        let (mut sim, id) = sim_with_walker();
        sim.agent_mut(id).unwrap().health = 50.0;

        let agents = sim.list_agents();

        assert_eq!(agents.len(), 1);
        assert_eq!(agents[0].id, id);
        assert_eq!(agents[0].position, Vec2::new(10.0, 10.0));
        assert_eq!(agents[0].color, Rgb::new(128, 127, 0));
    }

    #[test]
    fn test_agent_color_uses_configured_cap() {
        let mut sim = Simulation::with_seed(
            SimConfig {
                initial_agents: 0,
                max_health: 200.0,
                ..SimConfig::default()
            },
            22,
        )
        .unwrap();
        let config = sim.config().clone();
        sim.insert_agent(Agent::with_heading(Vec2::new(10.0, 10.0), 0.0, &config));

        // default initial health of 100 is half of this cap
        assert_eq!(sim.list_agents()[0].color, Rgb::new(128, 127, 0));
    }

    #[test]
    fn test_list_trails_alpha() {
        let (mut sim, _) = sim_with_walker();
        let t0 = Instant::now();
        sim.tick(t0);
        sim.tick(t0 + Duration::from_millis(1000));

        let mut trails = sim.list_trails(t0 + Duration::from_millis(1000));
        trails.sort_by(|a, b| a.alpha.total_cmp(&b.alpha));

        assert_eq!(trails.len(), 2);
        assert!((trails[0].alpha - 0.5).abs() < 1e-6);
        assert_eq!(trails[1].alpha, 1.0);
    }

    #[test]
    fn test_list_trails_hides_stale_entries() {
        let (mut sim, _) = sim_with_walker();
        let t0 = Instant::now();
        sim.tick(t0);

        // no tick has pruned yet, but the view already excludes the old dot
        assert_eq!(sim.list_trails(t0 + Duration::from_millis(1999)).len(), 1);
        assert!(sim.list_trails(t0 + Duration::from_millis(2001)).is_empty());
    }

    #[test]
    fn test_snapshot_captures_both() {
        let (mut sim, _) = sim_with_walker();
        let t0 = Instant::now();
        sim.tick(t0);

        let snapshot = sim.snapshot(t0);

        assert_eq!(snapshot.tick, 1);
        assert_eq!(snapshot.width, 1000.0);
        assert_eq!(snapshot.agents.len(), 1);
        assert_eq!(snapshot.trails.len(), 1);
        assert_eq!(snapshot.trails[0].position, snapshot.agents[0].position);

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["agents"].as_array().unwrap().len(), 1);
    }
}
