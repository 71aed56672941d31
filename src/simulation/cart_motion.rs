//! Rail motion integration: the per-tick position/velocity update that
//! keeps carts glued to the track at speeds well above the stock ceiling.
//!
//! The update mirrors the stock cart mechanics for slopes, curves and
//! booster rails; the one deliberate divergence is the speed clamp. The
//! stock integrator re-projects horizontal velocity at a magnitude capped
//! at 2.0, which silently defeats any limit above the default. Above the
//! default limit we skip the re-projection and clamp each horizontal axis
//! to the per-tick limit instead.

use bevy::math::DVec3;
use bevy::prelude::*;

use crate::config::SpeedCartConfig;
use crate::world::grid::TrackWorld;
use crate::world::rail::{Direction, RailShape, RailType, TrackCell};

use super::carts::{CartPhysics, Rider, SpeedState};

/// Uphill push applied on ascending segments every tick.
const SLOPE_BOOST: f64 = 0.0078125;
/// Acceleration from an energized booster rail.
const BOOSTER_ACCEL: f64 = 0.06;
/// Nudge used to push a dead-stopped cart off an obstructed booster.
const DEAD_START_NUDGE: f64 = 0.02;

fn horizontal_length(v: DVec3) -> f64 {
    (v.x * v.x + v.z * v.z).sqrt()
}

fn horizontal_length_squared(v: DVec3) -> f64 {
    v.x * v.x + v.z * v.z
}

fn cell_of(position: DVec3) -> IVec3 {
    IVec3::new(
        position.x.floor() as i32,
        position.y.floor() as i32,
        position.z.floor() as i32,
    )
}

/// Advance a cart by one tick along the rail in `cell`.
pub fn move_on_rail(
    world: &TrackWorld,
    config: &SpeedCartConfig,
    cart: &mut CartPhysics,
    state: &SpeedState,
    rider: Option<&Rider>,
    cell: IVec3,
    track: TrackCell,
) {
    cart.fall_distance = 0.0;

    let start_x = cart.position.x;
    let start_z = cart.position.z;
    let snapped_before = snap_position_to_rail(world, cart.position);
    let mut target_y = cell.y as f64;

    let (on_booster, mut braking) = match track.rail_type {
        RailType::Booster { powered } => (powered, !powered),
        RailType::Standard => (false, false),
    };

    // Slope push, damped under water.
    let mut boost = SLOPE_BOOST;
    if world.is_submerged(cell) {
        boost *= 0.5;
    }
    match track.shape {
        RailShape::AscendingEast => {
            cart.velocity.x -= boost;
            target_y += 1.0;
        }
        RailShape::AscendingWest => {
            cart.velocity.x += boost;
            target_y += 1.0;
        }
        RailShape::AscendingNorth => {
            cart.velocity.z += boost;
            target_y += 1.0;
        }
        RailShape::AscendingSouth => {
            cart.velocity.z -= boost;
            target_y += 1.0;
        }
        _ => {}
    }

    // Horizontal unit direction between the connection points, oriented to
    // match the current velocity.
    let (conn_a, conn_b) = track.shape.connections();
    let mut dir_x = (conn_b.x - conn_a.x) as f64;
    let mut dir_z = (conn_b.z - conn_a.z) as f64;
    let dir_len = (dir_x * dir_x + dir_z * dir_z).sqrt();
    if cart.velocity.x * dir_x + cart.velocity.z * dir_z < 0.0 {
        dir_x = -dir_x;
        dir_z = -dir_z;
    }

    if state.max_speed_bps <= config.default_speed {
        // Stock damping/centering: re-project at a magnitude capped at 2.
        let magnitude = horizontal_length(cart.velocity).min(2.0);
        cart.velocity = DVec3::new(
            magnitude * dir_x / dir_len,
            cart.velocity.y,
            magnitude * dir_z / dir_len,
        );
    } else {
        // Boosted: independent per-axis clamp to the per-tick limit.
        let limit = state.per_tick_limit();
        cart.velocity.x = cart.velocity.x.clamp(-limit, limit);
        cart.velocity.z = cart.velocity.z.clamp(-limit, limit);
    }

    // A pedaling player can unstick a stalled cart; suppress the brake so
    // the nudge is not cancelled in the same tick.
    if let Some(rider) = rider {
        if rider.player
            && horizontal_length_squared(rider.velocity) > 1.0e-4
            && horizontal_length_squared(cart.velocity) < 0.01
        {
            cart.velocity.x += rider.velocity.x * 0.1;
            cart.velocity.z += rider.velocity.z * 0.1;
            braking = false;
        }
    }

    if braking {
        if horizontal_length(cart.velocity) < 0.03 {
            cart.velocity = DVec3::ZERO;
        } else {
            cart.velocity.x *= 0.5;
            cart.velocity.y = 0.0;
            cart.velocity.z *= 0.5;
        }
    }

    // Re-center the cart onto the path between the connection points.
    let anchor_x = cell.x as f64 + 0.5 + conn_a.x as f64 * 0.5;
    let anchor_z = cell.z as f64 + 0.5 + conn_a.z as f64 * 0.5;
    let span_x = (cell.x as f64 + 0.5 + conn_b.x as f64 * 0.5) - anchor_x;
    let span_z = (cell.z as f64 + 0.5 + conn_b.z as f64 * 0.5) - anchor_z;
    let along = if span_x == 0.0 {
        start_z - cell.z as f64
    } else if span_z == 0.0 {
        start_x - cell.x as f64
    } else {
        ((start_x - anchor_x) * span_x + (start_z - anchor_z) * span_z) * 2.0
    };
    cart.position = DVec3::new(anchor_x + span_x * along, target_y, anchor_z + span_z * along);

    // Displacement for this tick: rider damping, per-tick cap, then the
    // collision-aware move.
    let rider_factor = if rider.is_some() { 0.75 } else { 1.0 };
    let limit = state.per_tick_limit();
    let movement = DVec3::new(
        (rider_factor * cart.velocity.x).clamp(-limit, limit),
        0.0,
        (rider_factor * cart.velocity.z).clamp(-limit, limit),
    );
    let applied = move_cart(world, cart, movement);

    // Crossing a boundary that carries a vertical connection offset steps
    // the cart up or down onto the next segment.
    let moved_x = cart.position.x.floor() as i32 - cell.x;
    let moved_z = cart.position.z.floor() as i32 - cell.z;
    if conn_a.y != 0 && moved_x == conn_a.x && moved_z == conn_a.z {
        cart.position.y += conn_a.y as f64;
    } else if conn_b.y != 0 && moved_x == conn_b.x && moved_z == conn_b.z {
        cart.position.y += conn_b.y as f64;
    }

    apply_slowdown(cart, rider.is_some());

    // Vertical re-snap with smoothing so slope transitions do not pop.
    if let (Some(before), Some(after)) = (
        snapped_before,
        snap_position_to_rail(world, cart.position),
    ) {
        let lift = (before.y - after.y) * 0.05;
        let speed = horizontal_length(cart.velocity);
        if speed > 0.0 {
            let scale = (speed + lift) / speed;
            cart.velocity.x *= scale;
            cart.velocity.z *= scale;
        }
        cart.position.y = after.y;
    }

    // Keep velocity consistent with what actually happened this tick.
    let new_cell_x = cart.position.x.floor() as i32;
    let new_cell_z = cart.position.z.floor() as i32;
    if new_cell_x != cell.x || new_cell_z != cell.z {
        // Redirect along the cell delta actually traversed.
        let speed = horizontal_length(cart.velocity);
        cart.velocity = DVec3::new(
            speed * (new_cell_x - cell.x) as f64,
            cart.velocity.y,
            speed * (new_cell_z - cell.z) as f64,
        );
    } else {
        // Blocked mid-cell: bleed off the velocity the wall absorbed so
        // speed cannot build up against it.
        if movement.x != 0.0 && applied.x == 0.0 {
            cart.velocity.x = 0.0;
        }
        if movement.z != 0.0 && applied.z == 0.0 {
            cart.velocity.z = 0.0;
        }
    }

    // Booster rails push a moving cart along and kick a stalled one away
    // from whatever blocks it.
    if on_booster {
        let speed = horizontal_length(cart.velocity);
        if speed > 0.01 {
            cart.velocity.x += cart.velocity.x / speed * BOOSTER_ACCEL;
            cart.velocity.z += cart.velocity.z / speed * BOOSTER_ACCEL;
        } else {
            match track.shape {
                RailShape::EastWest => {
                    if world.will_collide_at(cell + Direction::West.offset()) {
                        cart.velocity.x = DEAD_START_NUDGE;
                    } else if world.will_collide_at(cell + Direction::East.offset()) {
                        cart.velocity.x = -DEAD_START_NUDGE;
                    }
                }
                RailShape::NorthSouth => {
                    if world.will_collide_at(cell + Direction::North.offset()) {
                        cart.velocity.z = DEAD_START_NUDGE;
                    } else if world.will_collide_at(cell + Direction::South.offset()) {
                        cart.velocity.z = -DEAD_START_NUDGE;
                    }
                }
                // Boosters on slopes or curves do not push.
                _ => {}
            }
        }
    }
}

/// Project a continuous position onto the centerline of the rail in (or
/// directly below) its cell. Ascending shapes snap to the top of the
/// slope. Returns `None` off rail.
pub fn snap_position_to_rail(world: &TrackWorld, position: DVec3) -> Option<DVec3> {
    let (cell, track) = world.rail_cell_at(cell_of(position))?;

    let mut y = cell.y as f64;
    if track.shape.is_ascending() {
        y += 1.0;
    }

    let (conn_a, conn_b) = track.shape.connections();
    let dir_x = (conn_b.x - conn_a.x) as f64;
    let dir_z = (conn_b.z - conn_a.z) as f64;
    let len = (dir_x * dir_x + dir_z * dir_z).sqrt();
    let (unit_x, unit_z) = (dir_x / len, dir_z / len);

    let center_x = cell.x as f64 + 0.5;
    let center_z = cell.z as f64 + 0.5;
    let along = (position.x - center_x) * unit_x + (position.z - center_z) * unit_z;
    Some(DVec3::new(
        center_x + unit_x * along,
        y,
        center_z + unit_z * along,
    ))
}

/// Collision-aware displacement. An axis whose destination cell is solid
/// is dropped entirely; returns what was actually applied.
pub fn move_cart(world: &TrackWorld, cart: &mut CartPhysics, movement: DVec3) -> DVec3 {
    let mut applied = movement;

    let after_x = cart.position + DVec3::new(movement.x, 0.0, 0.0);
    if world.will_collide_at(cell_of(after_x)) {
        applied.x = 0.0;
    }
    let after_z = cart.position + DVec3::new(applied.x, 0.0, movement.z);
    if world.will_collide_at(cell_of(after_z)) {
        applied.z = 0.0;
    }

    cart.position += applied;
    applied
}

/// Ambient drag: riding carts coast further than empty ones. On-rail
/// slowdown also zeroes the vertical component.
pub fn apply_slowdown(cart: &mut CartPhysics, has_rider: bool) {
    let drag = if has_rider { 0.997 } else { 0.96 };
    cart.velocity = DVec3::new(cart.velocity.x * drag, 0.0, cart.velocity.z * drag);
}
