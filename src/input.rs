//! Pointer hit-testing
//!
//! Only rotors respond to the pointer. Each rotor has five round targets: a
//! centre circle that spins it and four circles toward N/E/S/W that eject
//! the ball facing that side. Radii are in tiles.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::sim::{Control, Direction, Model, TurnSense};
use crate::view::{BoardGeometry, side_vector};

/// Which pointer button was pressed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointerButton {
    /// Left click / touch: counter-clockwise spin
    Primary,
    /// Right click: clockwise spin
    Secondary,
}

impl PointerButton {
    fn sense(self) -> TurnSense {
        match self {
            PointerButton::Primary => TurnSense::CounterClockwise,
            PointerButton::Secondary => TurnSense::Clockwise,
        }
    }
}

/// Click target sizes on a rotor tile
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HitRegions {
    /// Radius of the centre spin target
    pub spin_radius: f64,
    /// Radius of each eject target
    pub eject_radius: f64,
    /// Distance of eject targets from the tile centre
    pub eject_offset: f64,
}

impl Default for HitRegions {
    fn default() -> Self {
        Self {
            spin_radius: 0.15,
            eject_radius: 0.1,
            eject_offset: 0.25,
        }
    }
}

impl HitRegions {
    /// Target under a point given in tiles from the tile centre
    fn hit(&self, local: DVec2, button: PointerButton) -> Option<Target> {
        if let Some(side) = Direction::ALL
            .into_iter()
            .find(|&side| local.distance(side_vector(side) * self.eject_offset) <= self.eject_radius)
        {
            return Some(Target::Eject(side));
        }
        (local.length() <= self.spin_radius).then_some(Target::Spin(button.sense()))
    }
}

enum Target {
    Spin(TurnSense),
    Eject(Direction),
}

/// Resolve a pointer press at a screen point into a rotor control
pub fn resolve(
    model: &Model,
    geometry: &BoardGeometry,
    hit: &HitRegions,
    point: DVec2,
    button: PointerButton,
) -> Option<Control> {
    let (row, col) = geometry.locate(point, model.rows(), model.cols())?;
    model.tile(row, col).ok()?.as_rotor()?;

    let local = (point - geometry.tile_center(row, col)) / geometry.tile_size;
    let control = match hit.hit(local, button)? {
        Target::Spin(sense) => Control::Turn { row, col, sense },
        Target::Eject(side) => Control::Eject { row, col, side },
    };
    log::debug!("Pointer {:?} at {} resolved to {:?}", button, point, control);
    Some(control)
}
