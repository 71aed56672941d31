//! Speed signs: world-placed text markers that set cart speed limits.

use super::rail::Direction;

/// Display color of a sign's text (only the subset the simulation uses).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignColor {
    #[default]
    Black,
    Red,
}

/// A sign standing next to the track. Row 0 carries the (potential) speed
/// value; rows 1-3 are free display text that validation feedback writes
/// into.
#[derive(Debug, Clone)]
pub struct SpeedSign {
    pub lines: [String; 4],
    /// Facing of a wall-mounted sign; `None` for a free-standing post,
    /// which is readable from every direction.
    pub facing: Option<Direction>,
    pub glowing: bool,
    pub color: SignColor,
}

impl SpeedSign {
    pub fn new(text: impl Into<String>, facing: Option<Direction>) -> Self {
        let mut lines: [String; 4] = Default::default();
        lines[0] = text.into();
        Self {
            lines,
            facing,
            glowing: false,
            color: SignColor::Black,
        }
    }

    pub fn line(&self, row: usize) -> &str {
        &self.lines[row]
    }
}
