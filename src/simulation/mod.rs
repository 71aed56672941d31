//! Simulation systems for carts, speed signs, and rail motion.
//!
//! The simulation runs on a fixed timestep (default 20 Hz) decoupled from
//! the app loop. Systems listen for `SimulationTick` events for
//! synchronized updates; cart integration is chained after the tick
//! counter so every tick sees a consistent clock.

#![allow(dead_code)]

use bevy::prelude::*;

pub mod cart_motion;
pub mod carts;
pub mod speed_signs;

use crate::config::SpeedCartConfig;

/// Simulation ticks per second. Speed limits are configured in blocks per
/// second and divided by this to get per-tick limits.
pub const TICKS_PER_SECOND: f64 = 20.0;

pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SimulationConfig>()
            .init_resource::<SimulationStats>()
            .init_resource::<SpeedCartConfig>()
            .add_event::<SimulationTick>()
            .add_event::<carts::SpeedCueEvent>()
            .add_systems(
                Update,
                (
                    simulation_tick_system,
                    carts::cart_rail_tick,
                    carts::speed_cue_feedback,
                )
                    .chain(),
            );
    }
}

/// Configuration for the simulation loop.
#[derive(Resource)]
pub struct SimulationConfig {
    /// Ticks per second for simulation updates.
    pub tick_rate: f32,
    /// Current simulation speed multiplier.
    pub speed: f32,
    /// Whether simulation is paused.
    pub paused: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_rate: TICKS_PER_SECOND as f32,
            speed: 1.0,
            paused: false,
        }
    }
}

/// Event sent each simulation tick (at tick_rate Hz).
#[derive(Event)]
pub struct SimulationTick {
    /// The tick number since simulation start.
    pub tick: u64,
    /// Delta time for this tick (1.0 / tick_rate).
    pub delta: f32,
}

/// Bookkeeping for the fixed timestep.
#[derive(Resource, Default)]
pub struct SimulationStats {
    /// Total ticks since simulation start.
    pub total_ticks: u64,
    /// Accumulated time for the fixed timestep.
    pub accumulator: f32,
}

/// Generates simulation ticks at fixed intervals.
fn simulation_tick_system(
    config: Res<SimulationConfig>,
    mut stats: ResMut<SimulationStats>,
    time: Res<Time>,
    mut tick_events: EventWriter<SimulationTick>,
) {
    if config.paused {
        return;
    }

    stats.accumulator += time.delta_secs() * config.speed;
    let tick_duration = 1.0 / config.tick_rate;

    while stats.accumulator >= tick_duration {
        stats.accumulator -= tick_duration;
        stats.total_ticks += 1;

        tick_events.send(SimulationTick {
            tick: stats.total_ticks,
            delta: tick_duration,
        });
    }
}
