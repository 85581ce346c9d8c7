//! Deterministic simulation module
//!
//! All track and rotor logic lives here. This module must be pure and deterministic:
//! - Caller-supplied elapsed time only, no wall clock
//! - Stable iteration order (row-major tiles, registry-ordered balls)
//! - No rendering or platform dependencies

pub mod ball;
pub mod direction;
pub mod error;
pub mod grid;
pub mod model;
pub mod tile;

pub use ball::{Ball, BallColor, Motion};
pub use direction::Direction;
pub use error::{SimError, SimResult};
pub use grid::Grid;
pub use model::{Control, Model};
pub use tile::{Rotor, Spin, Tile, TileKind, TurnSense};
