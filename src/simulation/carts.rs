//! Cart entities: components, the per-tick driver system, and speed-cue
//! feedback.

#![allow(dead_code)]

use bevy::math::DVec3;
use bevy::prelude::*;

use crate::config::SpeedCartConfig;
use crate::world::grid::TrackWorld;

use super::speed_signs::{self, SpeedRefresh};
use super::{cart_motion, SimulationTick, TICKS_PER_SECOND};

/// Marker component for rail carts.
#[derive(Component)]
pub struct Minecart;

/// Continuous physical state of a cart.
#[derive(Component, Debug, Clone)]
pub struct CartPhysics {
    pub position: DVec3,
    pub velocity: DVec3,
    /// Accumulated fall distance; rail movement resets it every tick.
    pub fall_distance: f64,
}

impl CartPhysics {
    pub fn new(position: DVec3) -> Self {
        Self {
            position,
            velocity: DVec3::ZERO,
            fall_distance: 0.0,
        }
    }

    /// Grid cell the cart currently occupies.
    pub fn cell(&self) -> IVec3 {
        IVec3::new(
            self.position.x.floor() as i32,
            self.position.y.floor() as i32,
            self.position.z.floor() as i32,
        )
    }
}

/// Per-cart speed-limit state. Only the speed controller in
/// `speed_signs` mutates this.
#[derive(Component, Debug, Clone)]
pub struct SpeedState {
    /// Currently active maximum speed, in blocks per second.
    pub max_speed_bps: f64,
    /// Tick of the last successful sign application.
    pub last_update_tick: u64,
    /// Cell of the sign that last set the speed.
    pub last_updated_from: Option<IVec3>,
}

impl SpeedState {
    pub fn new(config: &SpeedCartConfig) -> Self {
        Self {
            max_speed_bps: config.default_speed,
            last_update_tick: 0,
            last_updated_from: None,
        }
    }

    /// Speed limit in blocks per tick; replaces the stock fixed ceiling.
    pub fn per_tick_limit(&self) -> f64 {
        self.max_speed_bps / TICKS_PER_SECOND
    }
}

/// A rider occupying a cart.
#[derive(Component, Debug, Clone)]
pub struct Rider {
    /// The rider's own velocity, used to unstick a stalled cart.
    pub velocity: DVec3,
    /// Player riders get audible feedback on speed changes.
    pub player: bool,
}

/// Fired when a sign changes a cart's speed while a player is aboard.
/// Stands in for the positional click a full client would play.
#[derive(Event)]
pub struct SpeedCueEvent {
    pub cart: Entity,
    pub speed_bps: f64,
    pub sign_pos: IVec3,
}

/// Per-tick driver: refresh each cart's speed limit from nearby signs,
/// then integrate its motion along the rail it occupies.
pub fn cart_rail_tick(
    mut ticks: EventReader<SimulationTick>,
    mut world: ResMut<TrackWorld>,
    config: Res<SpeedCartConfig>,
    mut carts: Query<(Entity, &mut CartPhysics, &mut SpeedState, Option<&Rider>), With<Minecart>>,
    mut cues: EventWriter<SpeedCueEvent>,
) {
    for tick in ticks.read() {
        for (entity, mut cart, mut state, rider) in carts.iter_mut() {
            let Some((cell, track)) = world.rail_cell_at(cart.cell()) else {
                // Off-rail carts are the host's problem (gravity, derailing).
                continue;
            };

            let refresh = speed_signs::refresh_speed(
                &mut world,
                &config,
                &mut state,
                cart.velocity,
                cell,
                tick.tick,
            );
            if let SpeedRefresh::Applied(update) = refresh {
                if rider.is_some_and(|r| r.player) {
                    cues.send(SpeedCueEvent {
                        cart: entity,
                        speed_bps: update.speed_bps,
                        sign_pos: update.sign_pos,
                    });
                }
            }

            cart_motion::move_on_rail(&world, &config, &mut cart, &state, rider, cell, track);
        }
    }
}

/// Surfaces speed-cue events to the log.
pub fn speed_cue_feedback(mut cues: EventReader<SpeedCueEvent>) {
    for cue in cues.read() {
        debug!(
            "cart {:?} speed limit now {} blocks/sec (sign at {:?})",
            cue.cart, cue.speed_bps, cue.sign_pos
        );
    }
}
