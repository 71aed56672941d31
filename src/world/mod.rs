//! Track world: the rail grid, signs, and the demo layout the binary runs.

use bevy::app::AppExit;
use bevy::math::DVec3;
use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub mod grid;
pub mod rail;
pub mod sign;

use crate::config::SpeedCartConfig;
use crate::simulation::carts::{CartPhysics, Minecart, Rider, SpeedState};
use crate::simulation::{SimulationStats, SimulationTick};
use grid::TrackWorld;
use rail::{Direction, RailShape, RailType};
use sign::SpeedSign;

pub struct WorldPlugin;

impl Plugin for WorldPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<TrackWorld>()
            .init_resource::<DemoConfig>()
            .add_systems(Startup, (build_demo_track, spawn_demo_carts).chain())
            .add_systems(Update, (report_cart_status, stop_after_demo_run));
    }
}

/// Layout and run parameters for the built-in demonstration.
#[derive(Resource)]
pub struct DemoConfig {
    /// Length of the east-west demo line, in cells.
    pub track_length: i32,
    /// Carts to spawn at startup.
    pub cart_count: usize,
    /// RNG seed for cart spawning.
    pub seed: u64,
    /// Simulation ticks to run before exiting.
    pub run_ticks: u64,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            track_length: 1600,
            cart_count: 3,
            seed: 42424,
            run_ticks: 300,
        }
    }
}

/// Lay out the demo line: a long powered run heading east, a small hill,
/// and a handful of speed signs (one valid, one too fast, one plain junk).
fn build_demo_track(mut world: ResMut<TrackWorld>, demo: Res<DemoConfig>) {
    // The ridge cells sit at y=1; nothing at ground level there.
    for x in (0..demo.track_length).filter(|x| !(11..=13).contains(x)) {
        world.set_rail(
            IVec3::new(x, 0, 0),
            RailShape::EastWest,
            RailType::Booster { powered: true },
        );
    }

    // A small hill while the carts are still slow: climb at x=10, ridge,
    // descend at x=14. The flooded climb halves the slope push.
    world.set_rail(IVec3::new(10, 0, 0), RailShape::AscendingEast, RailType::Standard);
    world.set_water(IVec3::new(10, 0, 0));
    for x in 11..=13 {
        world.set_rail(IVec3::new(x, 1, 0), RailShape::EastWest, RailType::Standard);
    }
    world.set_rail(IVec3::new(14, 0, 0), RailShape::AscendingWest, RailType::Standard);

    world.set_sign(IVec3::new(25, 0, 1), SpeedSign::new("32", None));
    world.set_sign(IVec3::new(60, 0, 1), SpeedSign::new("500", None));
    world.set_sign(IVec3::new(60, 0, -1), SpeedSign::new("east wind", None));
    world.set_sign(
        IVec3::new(200, 0, 1),
        SpeedSign::new("96", Some(Direction::West)),
    );

    info!(
        "demo track built: {} rail cells, {} signs",
        world.rail_count(),
        world.sign_count()
    );
}

/// Put a few carts on the line, with a little variation in their push-off
/// speed. The first one carries a player so speed cues fire.
fn spawn_demo_carts(
    mut commands: Commands,
    demo: Res<DemoConfig>,
    config: Res<SpeedCartConfig>,
) {
    let mut rng = StdRng::seed_from_u64(demo.seed);

    for i in 0..demo.cart_count {
        let mut cart = CartPhysics::new(DVec3::new(2.5 + i as f64 * 3.0, 0.0, 0.5));
        cart.velocity.x = 0.2 + rng.gen_range(0.0..0.2);

        let mut entity = commands.spawn((Minecart, cart, SpeedState::new(&config)));
        if i == 0 {
            entity.insert(Rider {
                velocity: DVec3::ZERO,
                player: true,
            });
        }
    }

    info!("spawned {} demo carts", demo.cart_count);
}

/// Periodic progress log so a headless run shows what the carts are doing.
fn report_cart_status(
    mut ticks: EventReader<SimulationTick>,
    carts: Query<(&CartPhysics, &SpeedState), With<Minecart>>,
) {
    for tick in ticks.read() {
        if tick.tick % 100 != 0 {
            continue;
        }
        for (cart, state) in carts.iter() {
            info!(
                "tick {}: cart at x={:.1} y={:.1}, velocity {:.2} blocks/tick, limit {} bps",
                tick.tick,
                cart.position.x,
                cart.position.y,
                cart.velocity.x,
                state.max_speed_bps
            );
        }
    }
}

/// End the demo after the configured number of ticks.
fn stop_after_demo_run(
    stats: Res<SimulationStats>,
    demo: Res<DemoConfig>,
    mut exit: EventWriter<AppExit>,
) {
    if stats.total_ticks >= demo.run_ticks {
        exit.send(AppExit::Success);
    }
}
