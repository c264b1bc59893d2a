//! Drift simulation library
//!
//! Autonomous agents wander a wrapping 2D plane, steal health from the
//! neighbours they face, leave fading trails and respawn where they died.
//!
//! # Features
//!
//! - `metrics_http` - Serve Prometheus/JSON metrics over plain HTTP (enabled by default)

pub mod config;
pub mod driver;
pub mod game;
pub mod metrics;
pub mod util;
