//! Fixed simulation constants.
//!
//! `SimConfig::default()` is built from these; tests and benches override
//! individual values through the config instead of touching the constants.

/// Toroidal plane dimensions
pub mod plane {
    pub const WIDTH: f64 = 1000.0;
    pub const HEIGHT: f64 = 900.0;
}

/// Agent birth values
pub mod agent {
    /// Number of agents spawned when a simulation starts
    pub const INITIAL_COUNT: usize = 10;
    /// Distance covered per tick before boosts
    pub const INITIAL_SPEED: f64 = 2.0;
    pub const INITIAL_HEALTH: f64 = 100.0;
    /// Health gains are clamped to this
    pub const MAX_HEALTH: f64 = 100.0;
}

/// Proximity interaction ("talk") constants
pub mod interaction {
    /// Pairs strictly closer than this interact
    pub const RADIUS: f64 = 20.0;
    /// Health removed from the victim per steal
    pub const STEAL_AMOUNT: f64 = 10.0;
    /// Health granted to the talker per steal (capped at MAX_HEALTH)
    pub const STEAL_GAIN: f64 = 10.0;
    /// Speed multiplier applied to the killer on every kill
    pub const KILL_SPEED_MULTIPLIER: f64 = 1.02;
}

/// Boost granted on every successful steal
pub mod boost {
    pub const FACTOR: f64 = 1.05;
    pub const DURATION_MS: u64 = 30_000;
}

/// Trail marker lifetime
pub mod trail {
    pub const LIFETIME_MS: u64 = 2_000;
}

/// Death and respawn timing
pub mod respawn {
    pub const DELAY_MS: u64 = 5_000;
}

/// Tick driver timing
pub mod tick {
    /// ~60 Hz target cadence
    pub const INTERVAL_MS: u64 = 16;
}

/// Presentation color ramps
pub mod color {
    /// Speed at which trails reach full red
    pub const SPEED_FOR_FULL_RED: f64 = 5.0;
    /// Hue used for a stationary agent (0.6 = blue)
    pub const SLOW_HUE: f32 = 0.6;
}
