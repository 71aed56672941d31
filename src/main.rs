//! SpeedCarts - rail-cart simulation with sign-controlled speed limits.
//!
//! A Bevy-based headless simulation: carts follow a voxel rail network at
//! 20 ticks/sec, reading speed signs placed beside the track to raise or
//! lower their speed limit well past the stock ceiling of ~8 blocks/sec.

use std::time::Duration;

use bevy::app::ScheduleRunnerPlugin;
use bevy::log::LogPlugin;
use bevy::prelude::*;

mod config;
mod simulation;
mod world;

fn main() {
    App::new()
        .add_plugins(
            MinimalPlugins
                .set(ScheduleRunnerPlugin::run_loop(Duration::from_secs_f64(1.0 / 60.0))),
        )
        .add_plugins(LogPlugin::default())
        // Run the demo at 3x so a full pass finishes in a few seconds
        .insert_resource(simulation::SimulationConfig {
            speed: 3.0,
            ..Default::default()
        })
        // World management
        .add_plugins(world::WorldPlugin)
        // Simulation
        .add_plugins(simulation::SimulationPlugin)
        .run();
}
