//! Fading position markers left behind by moving agents.
//!
//! Trails are purely cosmetic: nothing in the simulation reads them back.

use std::time::{Duration, Instant};

use crate::util::color::Rgb;
use crate::util::vec2::Vec2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trail {
    pub position: Vec2,
    pub color: Rgb,
    pub created_at: Instant,
}

impl Trail {
    pub fn new(position: Vec2, color: Rgb, now: Instant) -> Self {
        Self {
            position,
            color,
            created_at: now,
        }
    }

    #[inline]
    pub fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.created_at)
    }

    /// Expired once strictly older than `lifetime`
    #[inline]
    pub fn is_expired(&self, now: Instant, lifetime: Duration) -> bool {
        self.age(now) > lifetime
    }

    /// Opacity falling linearly from 1.0 at creation to 0.0 at `lifetime`
    pub fn alpha(&self, now: Instant, lifetime: Duration) -> f32 {
        let fraction = self.age(now).as_secs_f64() / lifetime.as_secs_f64();
        (1.0 - fraction).clamp(0.0, 1.0) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIFETIME: Duration = Duration::from_millis(2000);

    fn trail_at(now: Instant) -> Trail {
        Trail::new(Vec2::new(5.0, 5.0), Rgb::new(1, 2, 3), now)
    }

    #[test]
    fn test_expiry_window() {
        let t0 = Instant::now();
        let trail = trail_at(t0);

        assert!(!trail.is_expired(t0 + Duration::from_millis(1999), LIFETIME));
        assert!(!trail.is_expired(t0 + LIFETIME, LIFETIME));
        assert!(trail.is_expired(t0 + Duration::from_millis(2001), LIFETIME));
    }

    #[test]
    fn test_alpha_fades_linearly() {
        let t0 = Instant::now();
        let trail = trail_at(t0);

        assert_eq!(trail.alpha(t0, LIFETIME), 1.0);
        assert!((trail.alpha(t0 + Duration::from_millis(500), LIFETIME) - 0.75).abs() < 1e-6);
        assert!((trail.alpha(t0 + Duration::from_millis(1000), LIFETIME) - 0.5).abs() < 1e-6);
        assert_eq!(trail.alpha(t0 + LIFETIME, LIFETIME), 0.0);
        assert_eq!(trail.alpha(t0 + Duration::from_secs(10), LIFETIME), 0.0);
    }

    #[test]
    fn test_alpha_strictly_decreasing() {
        let t0 = Instant::now();
        let trail = trail_at(t0);

        let mut previous = trail.alpha(t0, LIFETIME);
        for ms in (100..=2000).step_by(100) {
            let alpha = trail.alpha(t0 + Duration::from_millis(ms), LIFETIME);
            assert!(alpha < previous, "alpha did not fall at {}ms", ms);
            previous = alpha;
        }
    }

    #[test]
    fn test_age_before_creation_is_zero() {
        let t0 = Instant::now();
        let trail = trail_at(t0 + Duration::from_millis(10));
        assert_eq!(trail.age(t0), Duration::ZERO);
        assert_eq!(trail.alpha(t0, LIFETIME), 1.0);
    }
}
