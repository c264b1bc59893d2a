//! Simulation state and the tick state machine
//!
//! `Simulation` exclusively owns every agent, boost and trail. It has no
//! interior locking: callers that share it across tasks wrap it in a lock
//! (see `driver::SharedSimulation`), and the tick holds that lock for its
//! whole body.

use std::collections::VecDeque;
use std::time::Instant;

use hashbrown::HashMap;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::debug;

use crate::config::{ConfigError, SimConfig};
use crate::game::agent::{Agent, AgentId, Kill};
use crate::game::events::SimEvent;
use crate::game::respawn::{RespawnSchedule, RespawnToken};
use crate::game::snapshot::{self, AgentView, TrailView, WorldSnapshot};
use crate::game::systems::{interaction, movement, trails};
use crate::game::trail::Trail;
use crate::util::vec2::Vec2;

/// Trails left by one agent, oldest first
pub type TrailHistory = VecDeque<Trail>;

/// Aggregate counters for logging and metrics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SimStats {
    pub tick: u64,
    pub live_agents: usize,
    pub trail_count: usize,
    pub pending_respawns: usize,
    pub kills_total: u64,
    pub respawns_total: u64,
}

pub struct Simulation {
    pub(crate) config: SimConfig,
    /// Live agents in insertion order; pair scans follow this order
    pub(crate) agents: Vec<Agent>,
    /// One history per live agent
    pub(crate) trails: HashMap<AgentId, TrailHistory>,
    respawns: RespawnSchedule,
    rng: SmallRng,
    tick: u64,
    kills_total: u64,
    respawns_total: u64,
}

impl Simulation {
    /// Create a simulation populated with `config.initial_agents` random agents
    pub fn new(config: SimConfig) -> Result<Self, ConfigError> {
        Self::with_rng(config, SmallRng::from_entropy())
    }

    /// Same as `new` with a seeded RNG for spawn positions and headings
    pub fn with_seed(config: SimConfig, seed: u64) -> Result<Self, ConfigError> {
        Self::with_rng(config, SmallRng::seed_from_u64(seed))
    }

    fn with_rng(config: SimConfig, rng: SmallRng) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut sim = Self {
            agents: Vec::with_capacity(config.initial_agents),
            trails: HashMap::with_capacity(config.initial_agents),
            respawns: RespawnSchedule::new(),
            rng,
            tick: 0,
            kills_total: 0,
            respawns_total: 0,
            config,
        };

        for _ in 0..sim.config.initial_agents {
            let position = sim.random_position();
            let agent = Agent::new(position, &sim.config, &mut sim.rng);
            sim.insert_agent(agent);
        }

        Ok(sim)
    }

    fn random_position(&mut self) -> Vec2 {
        Vec2::new(
            self.rng.gen_range(0.0..self.config.width),
            self.rng.gen_range(0.0..self.config.height),
        )
    }

    /// Run one tick: move, interact (handling deaths as they happen), decay
    /// trails. Returns the kills produced, each with its respawn token.
    pub fn tick(&mut self, now: Instant) -> Vec<SimEvent> {
        self.tick += 1;

        movement::run(self, now);
        let events = interaction::run(self, now);
        trails::run(self, now);

        events
    }

    /// Remove the agent at `index` and schedule its replacement
    pub(crate) fn handle_death(&mut self, index: usize, kill: Kill, now: Instant) -> SimEvent {
        let dead = self.agents.remove(index);
        debug_assert_eq!(dead.id, kill.victim);
        self.trails.remove(&dead.id);

        let pending =
            self.respawns
                .schedule(dead.id, kill.position, now, self.config.respawn_delay);
        self.kills_total += 1;

        debug!(
            "Agent {} killed {} at ({:.1}, {:.1}), {}",
            kill.killer, kill.victim, kill.position.x, kill.position.y, pending.token
        );

        SimEvent::AgentKilled {
            killer: kill.killer,
            victim: kill.victim,
            position: kill.position,
            token: pending.token,
            respawn_at: pending.due_at,
        }
    }

    /// Fire a scheduled respawn: a fresh agent appears where the dead one was.
    ///
    /// Each token fires at most once; later calls return `None`.
    pub fn respawn(&mut self, token: RespawnToken) -> Option<SimEvent> {
        let pending = self.respawns.take(token)?;

        let agent = Agent::new(pending.position, &self.config, &mut self.rng);
        let agent_id = self.insert_agent(agent);
        self.respawns_total += 1;

        debug!(
            "Agent {} respawned at ({:.1}, {:.1}) replacing {}",
            agent_id, pending.position.x, pending.position.y, pending.replaces
        );

        Some(SimEvent::AgentRespawned {
            token,
            agent: agent_id,
            position: pending.position,
        })
    }

    /// Tokens whose respawn instant has passed
    pub fn due_respawns(&self, now: Instant) -> Vec<RespawnToken> {
        self.respawns.due(now)
    }

    /// Fire every due respawn; for stepping a simulation without the driver
    pub fn run_due_respawns(&mut self, now: Instant) -> Vec<SimEvent> {
        self.due_respawns(now)
            .into_iter()
            .filter_map(|token| self.respawn(token))
            .collect()
    }

    /// Add an agent to the live set with an empty trail history
    pub fn insert_agent(&mut self, agent: Agent) -> AgentId {
        let id = agent.id;
        debug_assert!(self.agent(id).is_none(), "agent {} inserted twice", id);
        self.trails.insert(id, TrailHistory::new());
        self.agents.push(agent);
        id
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.agents.iter().find(|a| a.id == id)
    }

    pub fn agent_mut(&mut self, id: AgentId) -> Option<&mut Agent> {
        self.agents.iter_mut().find(|a| a.id == id)
    }

    pub fn trails_of(&self, id: AgentId) -> Option<&TrailHistory> {
        self.trails.get(&id)
    }

    pub fn trail_histories(&self) -> impl Iterator<Item = (&AgentId, &TrailHistory)> {
        self.trails.iter()
    }

    pub fn trail_count(&self) -> usize {
        self.trails.values().map(|h| h.len()).sum()
    }

    pub fn pending_respawns(&self) -> &RespawnSchedule {
        &self.respawns
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn stats(&self) -> SimStats {
        SimStats {
            tick: self.tick,
            live_agents: self.agents.len(),
            trail_count: self.trail_count(),
            pending_respawns: self.respawns.len(),
            kills_total: self.kills_total,
            respawns_total: self.respawns_total,
        }
    }

    /// Agent markers for drawing
    pub fn list_agents(&self) -> Vec<AgentView> {
        snapshot::list_agents(self)
    }

    /// Trail dots for drawing, with alpha as of `now`
    pub fn list_trails(&self, now: Instant) -> Vec<TrailView> {
        snapshot::list_trails(self, now)
    }

    /// Agents and trails captured together
    pub fn snapshot(&self, now: Instant) -> WorldSnapshot {
        WorldSnapshot::capture(self, now)
    }
}
