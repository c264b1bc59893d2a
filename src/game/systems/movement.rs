use std::time::Instant;

use crate::game::state::Simulation;

/// Move phase: advance every live agent one step and file its trail
pub fn run(sim: &mut Simulation, now: Instant) {
    let (width, height) = (sim.config.width, sim.config.height);

    for agent in &mut sim.agents {
        let trail = agent.advance(now, width, height);
        sim.trails.entry(agent.id).or_default().push_back(trail);
    }
}
