//! Timed speed multipliers

use std::time::{Duration, Instant};

/// Multiplicative speed modifier that lapses at `expires_at`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Boost {
    /// Values above 1.0 speed the owner up
    pub factor: f64,
    pub expires_at: Instant,
}

impl Boost {
    pub fn new(factor: f64, duration: Duration, now: Instant) -> Self {
        debug_assert!(factor > 0.0, "boost factor must be positive");
        Self {
            factor,
            expires_at: now + duration,
        }
    }

    /// A boost is still active at exactly its expiry instant
    #[inline]
    pub fn is_expired(&self, now: Instant) -> bool {
        now > self.expires_at
    }
}

/// Product of all boost factors; 1.0 when there are none
pub fn combined_factor(boosts: &[Boost]) -> f64 {
    boosts.iter().map(|b| b.factor).product()
}
