//! Display color derivation
//!
//! Pure functions from simulation values to RGB, so a renderer can color
//! agents and trails without the core knowing about any graphics library.

use serde::{Deserialize, Serialize};

use crate::game::constants::color;

/// 8-bit RGB color
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Convert hue/saturation/brightness (each in `[0, 1]`) to RGB.
///
/// Hue wraps, so `1.25` is the same hue as `0.25`.
pub fn hsb_to_rgb(hue: f32, saturation: f32, brightness: f32) -> Rgb {
    let channel = |v: f32| (v * 255.0 + 0.5) as u8;

    if saturation == 0.0 {
        let v = channel(brightness);
        return Rgb::new(v, v, v);
    }

    let h = (hue - hue.floor()) * 6.0;
    let f = h - h.floor();
    let p = brightness * (1.0 - saturation);
    let q = brightness * (1.0 - saturation * f);
    let t = brightness * (1.0 - saturation * (1.0 - f));

    let (r, g, b) = match h as u8 {
        0 => (brightness, t, p),
        1 => (q, brightness, p),
        2 => (p, brightness, t),
        3 => (p, q, brightness),
        4 => (t, p, brightness),
        _ => (brightness, p, q),
    };

    Rgb::new(channel(r), channel(g), channel(b))
}

/// Agent marker color: green at `max_health` fading to red as health drops
pub fn health_color(health: f64, max_health: f64) -> Rgb {
    let green = (health / max_health * 255.0).clamp(0.0, 255.0) as u8;
    Rgb::new(255 - green, green, 0)
}

/// Trail color: slow agents draw blue-ish trails, fast agents red
pub fn speed_color(speed: f64) -> Rgb {
    let s = (speed / color::SPEED_FOR_FULL_RED).min(1.0) as f32;
    hsb_to_rgb(color::SLOW_HUE * (1.0 - s), 1.0, 1.0)
}
