//! Marbles - balls rolling along grid tracks through spinning rotors
//!
//! Core modules:
//! - `sim`: Deterministic simulation (grid, rotors, ball transport)
//! - `layout`: Level descriptions and the built-in demo level
//! - `view`: Read-only geometry for drawing a frame
//! - `input`: Pointer hit-testing into rotor controls
//! - `settings`: Board geometry and hit radii

pub mod input;
pub mod layout;
pub mod settings;
pub mod sim;
pub mod view;

pub use input::{PointerButton, resolve};
pub use layout::{Layout, LayoutError};
pub use settings::Settings;
pub use sim::{Ball, BallColor, Direction, Grid, Model, Motion, SimError, SimResult, Tile};

/// Simulation constants
pub mod consts {
    /// Nominal tick rate of the timer collaborator (Hz)
    pub const TICK_HZ: f64 = 60.0;
    /// Nominal elapsed time per tick (ms)
    pub const TICK_MS: f64 = 1000.0 / TICK_HZ;

    /// Ball speed in tiles per millisecond (one tile per second)
    pub const BALL_VELOCITY: f64 = 1e-3;
    /// Phase length of one half-tile leg
    pub const HALF_TILE: f64 = 0.5;
    /// Phase at which a ball entering a rotor is captured or bounced
    pub const ROTOR_DECISION_PHASE: f64 = 0.25;
    /// Phase an ejected ball resumes at on its exit leg
    pub const EJECT_PHASE: f64 = 0.25;

    /// Ticks (at the nominal rate) a rotor needs for one quarter turn
    pub const ROTOR_TURN_TICKS: f64 = 5.0;
}
