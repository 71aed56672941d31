//! Speed-sign resolution: parsing sign text, scanning the cells around a
//! moving cart, and applying valid updates under cooldown and orientation
//! rules.

use bevy::math::DVec3;
use bevy::prelude::*;
use smallvec::SmallVec;
use thiserror::Error;

use crate::config::SpeedCartConfig;
use crate::world::grid::TrackWorld;
use crate::world::rail::Direction;
use crate::world::sign::SignColor;

use super::carts::SpeedState;
use super::TICKS_PER_SECOND;

/// Ticks a sign stays ineligible after it has just set a cart's speed, so
/// a cart lingering next to it is not re-triggered every tick.
pub const SPEED_UPDATE_COOLDOWN: u64 = 60;

/// Neighbor order checked at every step position; earlier entries win.
const SCAN_ORDER: [Direction; 6] = [
    Direction::North,
    Direction::South,
    Direction::East,
    Direction::West,
    Direction::Up,
    Direction::Down,
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("sign text is not a number")]
    NotNumeric,
}

/// Interpret a sign's first row as a speed in blocks per second. Range
/// checking is the scanner's job, not the parser's.
pub fn parse_sign_speed(text: &str) -> Result<f64, ParseError> {
    text.trim().parse::<f64>().map_err(|_| ParseError::NotNumeric)
}

/// A successful sign application.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedUpdate {
    pub speed_bps: f64,
    pub sign_pos: IVec3,
}

/// Outcome of a per-tick speed refresh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpeedRefresh {
    /// Cart was stationary; the limit went back to the default.
    Reset,
    /// A sign set a new limit.
    Applied(SpeedUpdate),
    /// No eligible sign was found; state untouched.
    Unchanged,
}

/// Cells to inspect for signs around `cart_cell`. The window widens with
/// the current limit so a cart covering several cells per tick cannot
/// skip past a sign between two scans.
pub fn positions_to_check(
    cart_cell: IVec3,
    heading: Direction,
    max_speed_bps: f64,
) -> SmallVec<[IVec3; 12]> {
    let block_range = ((max_speed_bps / TICKS_PER_SECOND).ceil() as i32).max(1);
    let mut positions = SmallVec::with_capacity(6 * block_range as usize);
    let mut cursor = cart_cell;
    for _ in 0..block_range {
        for dir in SCAN_ORDER {
            positions.push(cursor + dir.offset());
        }
        cursor += heading.offset();
    }
    positions
}

/// Refresh a cart's speed state from nearby signs.
///
/// A stationary cart resets to the default limit without scanning. The
/// first eligible sign in scan order wins and ends the scan; an
/// out-of-range sign gets its display rows rewritten as feedback and the
/// scan moves on, as does one whose text is not a number at all.
pub fn refresh_speed(
    world: &mut TrackWorld,
    config: &SpeedCartConfig,
    state: &mut SpeedState,
    velocity: DVec3,
    cart_cell: IVec3,
    now: u64,
) -> SpeedRefresh {
    if velocity == DVec3::ZERO {
        state.max_speed_bps = config.default_speed;
        return SpeedRefresh::Reset;
    }
    let Some(heading) = Direction::from_horizontal_velocity(velocity) else {
        // Purely vertical motion has no scan direction.
        return SpeedRefresh::Unchanged;
    };

    for pos in positions_to_check(cart_cell, heading, state.max_speed_bps) {
        let (facing, text) = match world.sign_at(pos) {
            Some(sign) => (sign.facing, sign.line(0).to_owned()),
            None => continue,
        };

        if state.last_updated_from == Some(pos)
            && now < state.last_update_tick + SPEED_UPDATE_COOLDOWN
        {
            continue;
        }

        // Only free-standing signs or those facing the oncoming cart count.
        if facing.is_some_and(|f| f != heading.opposite()) {
            continue;
        }

        let speed = match parse_sign_speed(&text) {
            Ok(speed) => speed,
            Err(ParseError::NotNumeric) => continue,
        };

        if speed >= config.minimum_speed && speed <= config.maximum_speed {
            state.max_speed_bps = speed;
            state.last_update_tick = now;
            state.last_updated_from = Some(pos);
            return SpeedRefresh::Applied(SpeedUpdate {
                speed_bps: speed,
                sign_pos: pos,
            });
        }

        // Out of range: light the sign up as feedback and keep looking.
        if let Some(sign) = world.sign_at_mut(pos) {
            sign.lines[1] = "Invalid speed!".to_owned();
            sign.lines[2] = format!("Min: {:?}", config.minimum_speed);
            sign.lines[3] = format!("Max: {:?}", config.maximum_speed);
            sign.glowing = true;
            sign.color = SignColor::Red;
        }
    }

    SpeedRefresh::Unchanged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::sign::SpeedSign;

    fn config() -> SpeedCartConfig {
        SpeedCartConfig::default()
    }

    fn state() -> SpeedState {
        SpeedState::new(&config())
    }

    fn north_velocity() -> DVec3 {
        DVec3::new(0.0, 0.0, -0.2)
    }

    const CART: IVec3 = IVec3::new(10, 4, 10);
    const NORTH_OF_CART: IVec3 = IVec3::new(10, 4, 9);
    const SOUTH_OF_CART: IVec3 = IVec3::new(10, 4, 11);
    const BELOW_CART: IVec3 = IVec3::new(10, 3, 10);

    #[test]
    fn parser_accepts_decimal_text() {
        assert_eq!(parse_sign_speed("64.0"), Ok(64.0));
        assert_eq!(parse_sign_speed(" 12 "), Ok(12.0));
    }

    #[test]
    fn parser_rejects_non_numeric_text() {
        assert_eq!(parse_sign_speed("fast please"), Err(ParseError::NotNumeric));
        assert_eq!(parse_sign_speed(""), Err(ParseError::NotNumeric));
    }

    #[test]
    fn block_range_scales_with_speed() {
        let lens: Vec<usize> = [19.0, 20.0, 21.0, 128.0]
            .iter()
            .map(|&bps| positions_to_check(CART, Direction::North, bps).len())
            .collect();
        assert_eq!(lens, vec![6, 6, 12, 42]);
    }

    #[test]
    fn scan_steps_advance_along_the_heading() {
        let positions = positions_to_check(CART, Direction::North, 40.0);
        assert_eq!(positions[0], NORTH_OF_CART);
        // Second step is the neighbors of the cell one to the north.
        assert_eq!(positions[6], IVec3::new(10, 4, 8));
    }

    #[test]
    fn valid_sign_updates_speed_and_per_tick_limit() {
        let mut world = TrackWorld::default();
        world.set_sign(NORTH_OF_CART, SpeedSign::new("64.0", None));
        let mut state = state();

        let refresh = refresh_speed(&mut world, &config(), &mut state, north_velocity(), CART, 100);

        assert_eq!(
            refresh,
            SpeedRefresh::Applied(SpeedUpdate {
                speed_bps: 64.0,
                sign_pos: NORTH_OF_CART
            })
        );
        assert_eq!(state.max_speed_bps, 64.0);
        assert_eq!(state.last_update_tick, 100);
        assert_eq!(state.last_updated_from, Some(NORTH_OF_CART));
        assert!((state.per_tick_limit() - 3.2).abs() < 1e-12);
    }

    #[test]
    fn out_of_range_sign_is_marked_and_speed_unchanged() {
        let mut world = TrackWorld::default();
        world.set_sign(NORTH_OF_CART, SpeedSign::new("200", None));
        let mut state = state();

        let refresh = refresh_speed(&mut world, &config(), &mut state, north_velocity(), CART, 100);

        assert_eq!(refresh, SpeedRefresh::Unchanged);
        assert_eq!(state.max_speed_bps, 8.0);
        let sign = world.sign_at(NORTH_OF_CART).unwrap();
        assert_eq!(sign.line(1), "Invalid speed!");
        assert_eq!(sign.line(2), "Min: 1.0");
        assert_eq!(sign.line(3), "Max: 128.0");
        assert!(sign.glowing);
        assert_eq!(sign.color, SignColor::Red);
    }

    #[test]
    fn non_numeric_sign_is_skipped_without_side_effects() {
        let mut world = TrackWorld::default();
        world.set_sign(NORTH_OF_CART, SpeedSign::new("abc", None));
        world.set_sign(SOUTH_OF_CART, SpeedSign::new("32", None));
        let mut state = state();

        let refresh = refresh_speed(&mut world, &config(), &mut state, north_velocity(), CART, 100);

        assert_eq!(state.max_speed_bps, 32.0);
        assert!(matches!(refresh, SpeedRefresh::Applied(_)));
        let junk = world.sign_at(NORTH_OF_CART).unwrap();
        assert!(!junk.glowing);
        assert_eq!(junk.line(1), "");
    }

    #[test]
    fn invalid_sign_does_not_stop_the_scan() {
        let mut world = TrackWorld::default();
        world.set_sign(NORTH_OF_CART, SpeedSign::new("200", None));
        world.set_sign(SOUTH_OF_CART, SpeedSign::new("32", None));
        let mut state = state();

        refresh_speed(&mut world, &config(), &mut state, north_velocity(), CART, 100);

        assert_eq!(state.max_speed_bps, 32.0);
        assert!(world.sign_at(NORTH_OF_CART).unwrap().glowing);
    }

    #[test]
    fn earlier_candidate_in_scan_order_wins() {
        let mut world = TrackWorld::default();
        // North is index 0 in the scan order, down is index 5.
        world.set_sign(BELOW_CART, SpeedSign::new("40", None));
        world.set_sign(NORTH_OF_CART, SpeedSign::new("30", None));
        let mut state = state();

        refresh_speed(&mut world, &config(), &mut state, north_velocity(), CART, 100);

        assert_eq!(state.max_speed_bps, 30.0);
    }

    #[test]
    fn cooldown_blocks_reapplication_until_expiry() {
        let mut world = TrackWorld::default();
        world.set_sign(NORTH_OF_CART, SpeedSign::new("64", None));
        let mut state = state();

        assert!(matches!(
            refresh_speed(&mut world, &config(), &mut state, north_velocity(), CART, 100),
            SpeedRefresh::Applied(_)
        ));

        // Within the cooldown the same sign is ignored and the timestamp
        // stays put.
        let refresh = refresh_speed(&mut world, &config(), &mut state, north_velocity(), CART, 130);
        assert_eq!(refresh, SpeedRefresh::Unchanged);
        assert_eq!(state.last_update_tick, 100);

        // At expiry it becomes eligible again.
        let refresh = refresh_speed(
            &mut world,
            &config(),
            &mut state,
            north_velocity(),
            CART,
            100 + SPEED_UPDATE_COOLDOWN,
        );
        assert!(matches!(refresh, SpeedRefresh::Applied(_)));
        assert_eq!(state.last_update_tick, 160);
    }

    #[test]
    fn facing_filters_out_signs_not_facing_the_cart() {
        let configs = [
            (None, true),
            (Some(Direction::South), true),  // faces the northbound cart
            (Some(Direction::North), false), // faces away
            (Some(Direction::East), false),  // sideways
        ];
        for (facing, eligible) in configs {
            let mut world = TrackWorld::default();
            world.set_sign(NORTH_OF_CART, SpeedSign::new("64", facing));
            let mut state = state();

            let refresh =
                refresh_speed(&mut world, &config(), &mut state, north_velocity(), CART, 100);

            assert_eq!(
                matches!(refresh, SpeedRefresh::Applied(_)),
                eligible,
                "facing {facing:?}"
            );
        }
    }

    #[test]
    fn zero_velocity_resets_to_default_unconditionally() {
        let mut world = TrackWorld::default();
        world.set_sign(NORTH_OF_CART, SpeedSign::new("64", None));
        let mut state = state();
        state.max_speed_bps = 96.0;

        let refresh = refresh_speed(&mut world, &config(), &mut state, DVec3::ZERO, CART, 100);

        assert_eq!(refresh, SpeedRefresh::Reset);
        assert_eq!(state.max_speed_bps, 8.0);
    }

    #[test]
    fn widened_window_reaches_signs_far_ahead() {
        let mut world = TrackWorld::default();
        // Six cells north of the cart: outside the default window of one
        // step, inside the window at 128 blocks/sec (range 7).
        world.set_sign(IVec3::new(10, 4, 5), SpeedSign::new("24", None));
        let mut state = state();

        let refresh = refresh_speed(&mut world, &config(), &mut state, north_velocity(), CART, 100);
        assert_eq!(refresh, SpeedRefresh::Unchanged);

        state.max_speed_bps = 128.0;
        let refresh = refresh_speed(&mut world, &config(), &mut state, north_velocity(), CART, 100);
        assert!(matches!(refresh, SpeedRefresh::Applied(_)));
        assert_eq!(state.max_speed_bps, 24.0);
    }
}
