//! Deferred one-shot respawns.
//!
//! Every death gets a unique token. Firing a token removes it from the
//! schedule, so a respawn can happen at most once no matter how many timers
//! or sweeps try to fire it.

use std::fmt;
use std::time::{Duration, Instant};

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::game::agent::AgentId;
use crate::util::vec2::Vec2;

/// Identifies one scheduled respawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RespawnToken(pub(crate) u64);

impl fmt::Display for RespawnToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "respawn#{}", self.0)
    }
}

/// A replacement agent waiting to appear
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingRespawn {
    pub token: RespawnToken,
    /// The dead agent being replaced
    pub replaces: AgentId,
    /// Where the dead agent was last seen
    pub position: Vec2,
    pub due_at: Instant,
}

impl PendingRespawn {
    #[inline]
    pub fn is_due(&self, now: Instant) -> bool {
        now >= self.due_at
    }
}

#[derive(Debug, Default)]
pub struct RespawnSchedule {
    pending: HashMap<RespawnToken, PendingRespawn>,
    next_token: u64,
}

impl RespawnSchedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule a replacement for `replaces` at `position`, `delay` after `now`
    pub fn schedule(
        &mut self,
        replaces: AgentId,
        position: Vec2,
        now: Instant,
        delay: Duration,
    ) -> PendingRespawn {
        let token = RespawnToken(self.next_token);
        self.next_token += 1;

        let pending = PendingRespawn {
            token,
            replaces,
            position,
            due_at: now + delay,
        };
        self.pending.insert(token, pending);
        pending
    }

    /// Remove and return a pending respawn; `None` once it has fired
    pub fn take(&mut self, token: RespawnToken) -> Option<PendingRespawn> {
        self.pending.remove(&token)
    }

    pub fn get(&self, token: RespawnToken) -> Option<&PendingRespawn> {
        self.pending.get(&token)
    }

    /// Tokens due at `now`, earliest first
    pub fn due(&self, now: Instant) -> Vec<RespawnToken> {
        let mut due: Vec<&PendingRespawn> =
            self.pending.values().filter(|p| p.is_due(now)).collect();
        due.sort_by_key(|p| (p.due_at, p.token));
        due.into_iter().map(|p| p.token).collect()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
