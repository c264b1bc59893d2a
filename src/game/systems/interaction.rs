//! Interaction phase: pairwise proximity scan and the "talk" between
//! neighbours.
//!
//! The scan is O(n^2) over live agents in list order. A kill is handled
//! before the scan continues, so the dead agent is never paired again in
//! the same tick.

use std::time::Instant;

use crate::config::SimConfig;
use crate::game::agent::{Agent, Kill};
use crate::game::events::SimEvent;
use crate::game::state::Simulation;

/// Resolve one encounter.
///
/// The agent facing the other more directly steals from it. On an exact tie
/// the first agent of the pair (`a`) talks.
pub fn talk(a: &mut Agent, b: &mut Agent, now: Instant, config: &SimConfig) -> Option<Kill> {
    if a.facing_score(b) >= b.facing_score(a) {
        a.steal(b, now, config)
    } else {
        b.steal(a, now, config)
    }
}

/// Scan all unordered pairs closer than the interaction radius
pub fn run(sim: &mut Simulation, now: Instant) -> Vec<SimEvent> {
    let radius = sim.config.interaction_radius;
    let mut events = Vec::new();

    let mut i = 0;
    while i < sim.agents.len() {
        let mut first_removed = false;
        let mut j = i + 1;

        while j < sim.agents.len() {
            let kill = {
                let (a, b) = pair_mut(&mut sim.agents, i, j);
                if a.position.distance_to(b.position) < radius {
                    talk(a, b, now, &sim.config)
                } else {
                    None
                }
            };

            let Some(kill) = kill else {
                j += 1;
                continue;
            };

            let dead_index = if sim.agents[i].id == kill.victim { i } else { j };
            events.push(sim.handle_death(dead_index, kill, now));

            if dead_index == i {
                // agents[i] is now the next agent; restart its row
                first_removed = true;
                break;
            }
            // agents[j] is now the next agent; keep j
        }

        if !first_removed {
            i += 1;
        }
    }

    events
}

/// Two distinct mutable agents, `i < j`
fn pair_mut(agents: &mut [Agent], i: usize, j: usize) -> (&mut Agent, &mut Agent) {
    debug_assert!(i < j);
    let (head, tail) = agents.split_at_mut(j);
    (&mut head[i], &mut tail[0])
}
