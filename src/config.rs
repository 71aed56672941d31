//! Injected configuration for the speed-cart core.

use bevy::prelude::*;

/// Speed-limit configuration, injected once at startup and treated as
/// constants by the simulation. No file I/O happens here; hosts that load
/// settings from disk insert this resource themselves.
#[derive(Resource, Clone, Debug)]
pub struct SpeedCartConfig {
    /// Limit a cart falls back to when it stops, in blocks per second.
    pub default_speed: f64,
    /// Smallest speed a sign may set.
    pub minimum_speed: f64,
    /// Largest speed a sign may set.
    pub maximum_speed: f64,
}

impl Default for SpeedCartConfig {
    fn default() -> Self {
        Self {
            default_speed: 8.0,
            minimum_speed: 1.0,
            maximum_speed: 128.0,
        }
    }
}
