use std::time::Instant;

use crate::game::state::Simulation;

/// Decay phase: drop trails older than the configured lifetime
pub fn run(sim: &mut Simulation, now: Instant) {
    let lifetime = sim.config.trail_lifetime;

    for history in sim.trails.values_mut() {
        history.retain(|t| !t.is_expired(now, lifetime));
    }
}
