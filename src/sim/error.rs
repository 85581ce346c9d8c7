//! Simulation error types

pub type SimResult<T> = Result<T, SimError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SimError {
    /// Tile access outside the grid
    #[error("tile ({row}, {col}) is outside the {rows}x{cols} grid")]
    IndexOutOfRange {
        row: isize,
        col: isize,
        rows: usize,
        cols: usize,
    },

    /// A rotor-only operation was aimed at another tile type
    #[error("tile ({row}, {col}) is not a rotor")]
    NotARotor { row: usize, col: usize },

    /// Rotor slot index past the four housing slots
    #[error("rotor slot {slot} does not exist; slots are 0..4")]
    BadSlot { slot: usize },

    /// A second ball claimed a rotor slot that already holds one
    #[error("slot {slot} of the rotor at ({row}, {col}) is already taken")]
    SlotTaken { row: usize, col: usize, slot: usize },
}
