//! Rail geometry: grid directions, segment shapes, and connection offsets.

use bevy::math::DVec3;
use bevy::prelude::*;

/// Axis-aligned direction on the voxel grid (x = east, y = up, z = south).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    North,
    South,
    East,
    West,
    Up,
    Down,
}

impl Direction {
    /// Unit cell offset for this direction.
    pub fn offset(self) -> IVec3 {
        match self {
            Direction::North => IVec3::new(0, 0, -1),
            Direction::South => IVec3::new(0, 0, 1),
            Direction::East => IVec3::new(1, 0, 0),
            Direction::West => IVec3::new(-1, 0, 0),
            Direction::Up => IVec3::new(0, 1, 0),
            Direction::Down => IVec3::new(0, -1, 0),
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }

    /// Dominant horizontal travel direction for a velocity, or `None` when
    /// there is no horizontal motion at all.
    pub fn from_horizontal_velocity(velocity: DVec3) -> Option<Direction> {
        if velocity.x == 0.0 && velocity.z == 0.0 {
            return None;
        }
        Some(if velocity.x.abs() > velocity.z.abs() {
            if velocity.x > 0.0 {
                Direction::East
            } else {
                Direction::West
            }
        } else if velocity.z > 0.0 {
            Direction::South
        } else {
            Direction::North
        })
    }
}

/// Geometry of a rail cell: straights, ascending slopes, and quarter curves
/// named by the two sides they connect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RailShape {
    NorthSouth,
    EastWest,
    AscendingEast,
    AscendingWest,
    AscendingNorth,
    AscendingSouth,
    SouthEast,
    SouthWest,
    NorthWest,
    NorthEast,
}

impl RailShape {
    /// The two cell offsets where this segment connects to its neighbors.
    /// A non-zero y marks the raised end of a slope.
    pub fn connections(self) -> (IVec3, IVec3) {
        match self {
            RailShape::NorthSouth => (IVec3::new(0, 0, -1), IVec3::new(0, 0, 1)),
            RailShape::EastWest => (IVec3::new(-1, 0, 0), IVec3::new(1, 0, 0)),
            RailShape::AscendingEast => (IVec3::new(-1, 0, 0), IVec3::new(1, 1, 0)),
            RailShape::AscendingWest => (IVec3::new(-1, 1, 0), IVec3::new(1, 0, 0)),
            RailShape::AscendingNorth => (IVec3::new(0, 1, -1), IVec3::new(0, 0, 1)),
            RailShape::AscendingSouth => (IVec3::new(0, 0, -1), IVec3::new(0, 1, 1)),
            RailShape::SouthEast => (IVec3::new(0, 0, 1), IVec3::new(1, 0, 0)),
            RailShape::SouthWest => (IVec3::new(0, 0, 1), IVec3::new(-1, 0, 0)),
            RailShape::NorthWest => (IVec3::new(0, 0, -1), IVec3::new(-1, 0, 0)),
            RailShape::NorthEast => (IVec3::new(0, 0, -1), IVec3::new(1, 0, 0)),
        }
    }

    pub fn is_ascending(self) -> bool {
        matches!(
            self,
            RailShape::AscendingEast
                | RailShape::AscendingWest
                | RailShape::AscendingNorth
                | RailShape::AscendingSouth
        )
    }
}

/// Whether a rail cell is plain track or a booster rail. An unpowered
/// booster acts as a brake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RailType {
    Standard,
    Booster { powered: bool },
}

/// One rail cell of the track network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackCell {
    pub shape: RailShape,
    pub rail_type: RailType,
}

impl TrackCell {
    pub fn new(shape: RailShape, rail_type: RailType) -> Self {
        Self { shape, rail_type }
    }
}
