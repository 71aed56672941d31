//! Voxel track world: rail cells, signs, solid blocks, and water.

use bevy::prelude::*;
use std::collections::{HashMap, HashSet};

use super::rail::{RailShape, RailType, TrackCell};
use super::sign::SpeedSign;

/// The world the carts move through, addressed by integer grid cell.
///
/// This is the query surface the simulation needs from its host: rail
/// lookup, sign lookup, and collision/water tests. Signs are the only
/// thing the simulation ever writes back (validation feedback).
#[derive(Resource, Default)]
pub struct TrackWorld {
    rails: HashMap<IVec3, TrackCell>,
    signs: HashMap<IVec3, SpeedSign>,
    solids: HashSet<IVec3>,
    water: HashSet<IVec3>,
}

impl TrackWorld {
    pub fn rail_at(&self, cell: IVec3) -> Option<TrackCell> {
        self.rails.get(&cell).copied()
    }

    /// Rail cell governing a cart whose position floors to `cell`: the cell
    /// itself, or the one below when the cart rides the top edge of a slope.
    pub fn rail_cell_at(&self, cell: IVec3) -> Option<(IVec3, TrackCell)> {
        if let Some(track) = self.rail_at(cell) {
            return Some((cell, track));
        }
        let below = cell - IVec3::Y;
        self.rail_at(below).map(|track| (below, track))
    }

    pub fn sign_at(&self, cell: IVec3) -> Option<&SpeedSign> {
        self.signs.get(&cell)
    }

    pub fn sign_at_mut(&mut self, cell: IVec3) -> Option<&mut SpeedSign> {
        self.signs.get_mut(&cell)
    }

    pub fn will_collide_at(&self, cell: IVec3) -> bool {
        self.solids.contains(&cell)
    }

    pub fn is_submerged(&self, cell: IVec3) -> bool {
        self.water.contains(&cell)
    }

    pub fn set_rail(&mut self, cell: IVec3, shape: RailShape, rail_type: RailType) {
        self.rails.insert(cell, TrackCell::new(shape, rail_type));
    }

    pub fn set_sign(&mut self, cell: IVec3, sign: SpeedSign) {
        self.signs.insert(cell, sign);
    }

    pub fn set_solid(&mut self, cell: IVec3) {
        self.solids.insert(cell);
    }

    pub fn set_water(&mut self, cell: IVec3) {
        self.water.insert(cell);
    }

    pub fn rail_count(&self) -> usize {
        self.rails.len()
    }

    pub fn sign_count(&self) -> usize {
        self.signs.len()
    }
}
