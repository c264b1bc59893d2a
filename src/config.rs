use std::time::Duration;

use crate::game::constants::{agent, boost, interaction, plane, respawn, tick, trail};

/// Simulation parameters.
///
/// Defaults are the fixed constants of the simulation. They are exposed as
/// fields so tests and benchmarks can build smaller or faster worlds.
#[derive(Debug, Clone, PartialEq)]
pub struct SimConfig {
    /// Plane width (x wraps at this value)
    pub width: f64,
    /// Plane height (y wraps at this value)
    pub height: f64,
    /// Agents spawned at startup
    pub initial_agents: usize,
    /// Target interval between ticks
    pub tick_interval: Duration,
    /// Pairs strictly closer than this interact
    pub interaction_radius: f64,
    /// Health removed from a victim per steal
    pub steal_amount: f64,
    /// Health granted to the talker per steal
    pub steal_gain: f64,
    /// Cap applied to health gains
    pub max_health: f64,
    pub initial_health: f64,
    pub initial_speed: f64,
    /// Speed multiplier of the boost granted on each steal
    pub boost_factor: f64,
    pub boost_duration: Duration,
    /// Speed multiplier applied to a killer
    pub kill_speed_multiplier: f64,
    /// Delay between a death and the replacement agent appearing
    pub respawn_delay: Duration,
    /// Trails older than this are dropped
    pub trail_lifetime: Duration,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            width: plane::WIDTH,
            height: plane::HEIGHT,
            initial_agents: agent::INITIAL_COUNT,
            tick_interval: Duration::from_millis(tick::INTERVAL_MS),
            interaction_radius: interaction::RADIUS,
            steal_amount: interaction::STEAL_AMOUNT,
            steal_gain: interaction::STEAL_GAIN,
            max_health: agent::MAX_HEALTH,
            initial_health: agent::INITIAL_HEALTH,
            initial_speed: agent::INITIAL_SPEED,
            boost_factor: boost::FACTOR,
            boost_duration: Duration::from_millis(boost::DURATION_MS),
            kill_speed_multiplier: interaction::KILL_SPEED_MULTIPLIER,
            respawn_delay: Duration::from_millis(respawn::DELAY_MS),
            trail_lifetime: Duration::from_millis(trail::LIFETIME_MS),
        }
    }
}

impl SimConfig {
    /// Validate parameter ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.width > 0.0 && self.width.is_finite())
            || !(self.height > 0.0 && self.height.is_finite())
        {
            return Err(ConfigError::InvalidPlane {
                width: self.width,
                height: self.height,
            });
        }
        if self.tick_interval.is_zero() {
            return Err(ConfigError::ZeroDuration("tick_interval"));
        }
        if self.trail_lifetime.is_zero() {
            return Err(ConfigError::ZeroDuration("trail_lifetime"));
        }
        if !(self.interaction_radius > 0.0) {
            return Err(ConfigError::NonPositive("interaction_radius"));
        }
        if !(self.boost_factor > 0.0) {
            return Err(ConfigError::NonPositive("boost_factor"));
        }
        if !(self.initial_speed > 0.0) {
            return Err(ConfigError::NonPositive("initial_speed"));
        }
        if !(self.initial_health > 0.0) || self.initial_health > self.max_health {
            return Err(ConfigError::InvalidHealth {
                initial: self.initial_health,
                max: self.max_health,
            });
        }
        if self.kill_speed_multiplier < 1.0 {
            return Err(ConfigError::SpeedWouldDecrease(self.kill_speed_multiplier));
        }
        Ok(())
    }
}

/// Process-level settings for the headless runner
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Port for the metrics endpoint (disabled when `None`)
    pub metrics_port: Option<u16>,
    /// How often the runner logs simulation stats
    pub stats_interval: Duration,
    /// Stop automatically after this long (runs until Ctrl+C when `None`)
    pub run_for: Option<Duration>,
    /// Capacity of the event feed between the driver and its subscriber
    pub event_feed_capacity: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            metrics_port: None,
            stats_interval: Duration::from_secs(10),
            run_for: None,
            event_feed_capacity: 256,
        }
    }
}

impl RuntimeConfig {
    /// Load config from environment or use defaults
    pub fn load_or_default() -> Self {
        let mut config = Self::default();

        if let Ok(port) = std::env::var("METRICS_PORT") {
            match port.parse::<u16>() {
                Ok(parsed) if parsed > 0 => config.metrics_port = Some(parsed),
                _ => tracing::warn!("Invalid METRICS_PORT '{}', metrics endpoint disabled", port),
            }
        }

        if let Ok(secs) = std::env::var("STATS_INTERVAL_SECS") {
            match secs.parse::<u64>() {
                Ok(parsed) if parsed > 0 => config.stats_interval = Duration::from_secs(parsed),
                _ => tracing::warn!("Invalid STATS_INTERVAL_SECS '{}', using default", secs),
            }
        }

        if let Ok(secs) = std::env::var("RUN_FOR_SECS") {
            match secs.parse::<u64>() {
                Ok(parsed) if parsed > 0 => config.run_for = Some(Duration::from_secs(parsed)),
                _ => tracing::warn!("Invalid RUN_FOR_SECS '{}', running until interrupted", secs),
            }
        }

        if let Ok(capacity) = std::env::var("EVENT_FEED_CAPACITY") {
            match capacity.parse::<usize>() {
                Ok(parsed) if (1..=1_000_000).contains(&parsed) => {
                    config.event_feed_capacity = parsed
                }
                _ => tracing::warn!(
                    "EVENT_FEED_CAPACITY must be 1-1000000, got '{}', using default",
                    capacity
                ),
            }
        }

        config
    }
}

/// Configuration errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("Plane must have positive finite size, got {width}x{height}")]
    InvalidPlane { width: f64, height: f64 },
    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),
    #[error("{0} must be positive")]
    NonPositive(&'static str),
    #[error("Initial health {initial} must be in (0, {max}]")]
    InvalidHealth { initial: f64, max: f64 },
    #[error("Kill speed multiplier {0} would make agents slower")]
    SpeedWouldDecrease(f64),
}
