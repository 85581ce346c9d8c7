//! Tile shapes and rotor state
//!
//! Track tiles are stateless route shapes. A rotor carries its own spin state
//! plus two derived caches (`occupied`, `connected`) that the model refreshes
//! at the start of every tick.

use serde::{Deserialize, Serialize};

use super::direction::Direction;
use crate::consts::{ROTOR_TURN_TICKS, TICK_HZ};

/// Rotation sense of a turning rotor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnSense {
    Clockwise,
    CounterClockwise,
}

impl TurnSense {
    /// Orientation change applied when a quarter turn completes (mod 4)
    fn orientation_step(self) -> u8 {
        match self {
            TurnSense::Clockwise => 1,
            TurnSense::CounterClockwise => 3,
        }
    }
}

/// Spin state of a rotor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Spin {
    Resting,
    /// Quarter turn in flight; `progress` is the completed fraction in [0, 1)
    Turning { sense: TurnSense, progress: f64 },
}

/// Rotating junction that holds up to four balls in housing-relative slots
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rotor {
    pub spin: Spin,
    /// Quarter turns clockwise from the initial placement (0..4)
    pub orientation: u8,
    /// Slot k hosts an `InsideRotor` ball (derived from the ball registry)
    pub occupied: [bool; 4],
    /// Side d has a non-empty neighbour (derived from the grid)
    pub connected: [bool; 4],
}

impl Default for Rotor {
    fn default() -> Self {
        Self::new(0)
    }
}

impl Rotor {
    /// A resting rotor at the given orientation
    pub fn new(orientation: u8) -> Self {
        Self {
            spin: Spin::Resting,
            orientation: orientation % 4,
            occupied: [false; 4],
            connected: [false; 4],
        }
    }

    pub fn is_resting(&self) -> bool {
        matches!(self.spin, Spin::Resting)
    }

    /// Completed fraction of the current quarter turn, `None` while resting
    pub fn spin_progress(&self) -> Option<f64> {
        match self.spin {
            Spin::Resting => None,
            Spin::Turning { progress, .. } => Some(progress),
        }
    }

    /// Housing slot currently facing the given side
    pub fn slot_facing(&self, side: Direction) -> usize {
        (side.index() + 4 - usize::from(self.orientation % 4)) % 4
    }

    /// Side currently faced by the given housing slot
    pub fn side_of_slot(&self, slot: usize) -> Direction {
        Direction::from_index(slot + usize::from(self.orientation))
    }

    /// Begin a quarter turn. Returns false (and changes nothing) unless resting.
    pub fn start_turn(&mut self, sense: TurnSense) -> bool {
        if !self.is_resting() {
            return false;
        }
        self.spin = Spin::Turning {
            sense,
            progress: 0.0,
        };
        true
    }

    /// Advance a turn in flight. Returns true when the turn completed this call.
    ///
    /// Overshoot past a full quarter turn is dropped, never carried over.
    pub fn advance(&mut self, elapsed_ms: f64) -> bool {
        let Spin::Turning { sense, progress } = self.spin else {
            return false;
        };

        let progress = progress + elapsed_ms / 1000.0 * TICK_HZ / ROTOR_TURN_TICKS;
        if progress >= 1.0 {
            self.spin = Spin::Resting;
            self.orientation = (self.orientation + sense.orientation_step()) % 4;
            true
        } else {
            self.spin = Spin::Turning { sense, progress };
            false
        }
    }
}

/// Tile type without any rotor state (layout files, hit-testing)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TileKind {
    #[default]
    Empty,
    Horizontal,
    Vertical,
    CornerNE,
    CornerNW,
    CornerSE,
    CornerSW,
    Crossing,
    Rotor,
}

/// One grid cell
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum Tile {
    #[default]
    Empty,
    Horizontal,
    Vertical,
    CornerNE,
    CornerNW,
    CornerSE,
    CornerSW,
    Crossing,
    Rotor(Rotor),
}

impl From<TileKind> for Tile {
    fn from(kind: TileKind) -> Self {
        match kind {
            TileKind::Empty => Tile::Empty,
            TileKind::Horizontal => Tile::Horizontal,
            TileKind::Vertical => Tile::Vertical,
            TileKind::CornerNE => Tile::CornerNE,
            TileKind::CornerNW => Tile::CornerNW,
            TileKind::CornerSE => Tile::CornerSE,
            TileKind::CornerSW => Tile::CornerSW,
            TileKind::Crossing => Tile::Crossing,
            TileKind::Rotor => Tile::Rotor(Rotor::default()),
        }
    }
}

impl Tile {
    pub fn kind(&self) -> TileKind {
        match self {
            Tile::Empty => TileKind::Empty,
            Tile::Horizontal => TileKind::Horizontal,
            Tile::Vertical => TileKind::Vertical,
            Tile::CornerNE => TileKind::CornerNE,
            Tile::CornerNW => TileKind::CornerNW,
            Tile::CornerSE => TileKind::CornerSE,
            Tile::CornerSW => TileKind::CornerSW,
            Tile::Crossing => TileKind::Crossing,
            Tile::Rotor(_) => TileKind::Rotor,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Tile::Empty)
    }

    pub fn as_rotor(&self) -> Option<&Rotor> {
        match self {
            Tile::Rotor(rotor) => Some(rotor),
            _ => None,
        }
    }

    pub fn as_rotor_mut(&mut self) -> Option<&mut Rotor> {
        match self {
            Tile::Rotor(rotor) => Some(rotor),
            _ => None,
        }
    }

    /// The two sides joined by a single-track tile
    pub fn track_ends(&self) -> Option<[Direction; 2]> {
        use Direction::*;
        match self {
            Tile::Horizontal => Some([East, West]),
            Tile::Vertical => Some([North, South]),
            Tile::CornerNE => Some([North, East]),
            Tile::CornerNW => Some([North, West]),
            Tile::CornerSE => Some([South, East]),
            Tile::CornerSW => Some([South, West]),
            _ => None,
        }
    }

    /// Side a ball leaves through after entering a track tile from `entry`.
    ///
    /// `None` for rotors, empty cells, and sides the track does not reach.
    pub fn route(&self, entry: Direction) -> Option<Direction> {
        if matches!(self, Tile::Crossing) {
            return Some(entry.opposite());
        }
        let [a, b] = self.track_ends()?;
        if entry == a {
            Some(b)
        } else if entry == b {
            Some(a)
        } else {
            None
        }
    }
}
