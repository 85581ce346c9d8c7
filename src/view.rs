//! Read-only geometry for drawing a frame
//!
//! Positions are derived from model state between ticks; nothing here
//! mutates the simulation. Screen space has y pointing down.

use std::f64::consts::FRAC_PI_2;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::sim::{Ball, Direction, Model, Motion, Rotor, Spin, TurnSense};

/// Distance from the tile centre to a rotor slot, in tiles
pub const SLOT_RADIUS: f64 = 0.25;

/// Unit vector pointing out of a tile through `side`
pub fn side_vector(side: Direction) -> DVec2 {
    match side {
        Direction::North => DVec2::new(0.0, -1.0),
        Direction::East => DVec2::new(1.0, 0.0),
        Direction::South => DVec2::new(0.0, 1.0),
        Direction::West => DVec2::new(-1.0, 0.0),
    }
}

/// Rotor rotation in quarter turns, including a turn in flight
pub fn rotor_quarter_turns(rotor: &Rotor) -> f64 {
    let base = f64::from(rotor.orientation);
    match rotor.spin {
        Spin::Resting => base,
        Spin::Turning {
            sense: TurnSense::Clockwise,
            progress,
        } => base + progress,
        Spin::Turning {
            sense: TurnSense::CounterClockwise,
            progress,
        } => base + 4.0 - progress,
    }
}

/// Rotor rotation in radians, clockwise on screen
pub fn rotor_angle(rotor: &Rotor) -> f64 {
    rotor_quarter_turns(rotor) * FRAC_PI_2
}

/// Offset of a rotor slot from the tile centre, in tiles
pub fn slot_offset(rotor: &Rotor, slot: usize) -> DVec2 {
    let angle = (slot as f64) * FRAC_PI_2 + rotor_angle(rotor);
    DVec2::new(angle.sin(), -angle.cos()) * SLOT_RADIUS
}

/// Ball position within its tile, in tiles from the tile's top-left corner.
///
/// `rotor` is the rotor on the ball's tile, needed only for balls inside one.
/// Idle balls have no position.
pub fn ball_offset(ball: &Ball, rotor: Option<&Rotor>) -> Option<DVec2> {
    let center = DVec2::splat(0.5);
    match ball.motion {
        Motion::Idle => None,
        Motion::Entering(side) => Some(center + side_vector(side) * (0.5 - ball.phase)),
        Motion::Exiting(side) => Some(center + side_vector(side) * ball.phase),
        Motion::InsideRotor { slot } => rotor.map(|r| center + slot_offset(r, slot)),
    }
}

/// Placement of the grid on screen
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardGeometry {
    /// Screen position of the grid's top-left corner
    pub origin: DVec2,
    /// Tile edge length in pixels
    pub tile_size: f64,
}

impl Default for BoardGeometry {
    fn default() -> Self {
        Self {
            origin: DVec2::new(40.0, 75.0),
            tile_size: 90.0,
        }
    }
}

impl BoardGeometry {
    /// Screen point for a position given in tiles from the grid corner
    pub fn to_screen(&self, tiles: DVec2) -> DVec2 {
        self.origin + tiles * self.tile_size
    }

    pub fn tile_center(&self, row: usize, col: usize) -> DVec2 {
        self.to_screen(DVec2::new(col as f64 + 0.5, row as f64 + 0.5))
    }

    /// Tile under a screen point, if inside a `rows` x `cols` grid
    pub fn locate(&self, point: DVec2, rows: usize, cols: usize) -> Option<(usize, usize)> {
        let cell = ((point - self.origin) / self.tile_size).floor();
        if cell.x < 0.0 || cell.y < 0.0 {
            return None;
        }
        let (row, col) = (cell.y as usize, cell.x as usize);
        (row < rows && col < cols).then_some((row, col))
    }

    /// Screen position of a ball, `None` for idle balls
    pub fn ball_position(&self, ball: &Ball, model: &Model) -> Option<DVec2> {
        let rotor = model.tile(ball.row, ball.col).ok().and_then(|t| t.as_rotor());
        let offset = ball_offset(ball, rotor)?;
        Some(self.to_screen(DVec2::new(ball.col as f64, ball.row as f64) + offset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{BallColor, Tile, TileKind};

    fn close(a: DVec2, b: DVec2) -> bool {
        (a - b).length() < 1e-9
    }

    #[test]
    fn test_entering_and_exiting_legs_meet_at_center() {
        let entering = Ball::new(0, 0, Motion::Entering(Direction::West), BallColor::Red).with_phase(0.5);
        let exiting = Ball::new(0, 0, Motion::Exiting(Direction::East), BallColor::Red);
        assert!(close(ball_offset(&entering, None).unwrap(), DVec2::splat(0.5)));
        assert!(close(ball_offset(&exiting, None).unwrap(), DVec2::splat(0.5)));
    }

    #[test]
    fn test_leg_interpolation() {
        let ball = Ball::new(0, 0, Motion::Entering(Direction::South), BallColor::Red).with_phase(0.1);
        assert!(close(ball_offset(&ball, None).unwrap(), DVec2::new(0.5, 0.9)));

        let ball = Ball::new(0, 0, Motion::Exiting(Direction::North), BallColor::Red).with_phase(0.3);
        assert!(close(ball_offset(&ball, None).unwrap(), DVec2::new(0.5, 0.2)));

        let ball = Ball::new(0, 0, Motion::Exiting(Direction::West), BallColor::Red).with_phase(0.5);
        assert!(close(ball_offset(&ball, None).unwrap(), DVec2::new(0.0, 0.5)));
    }

    #[test]
    fn test_idle_has_no_position() {
        let ball = Ball::new(0, 0, Motion::Idle, BallColor::Red);
        assert_eq!(ball_offset(&ball, None), None);
    }

    #[test]
    fn test_slot_positions_follow_rotor() {
        let mut rotor = Rotor::new(0);
        assert!(close(slot_offset(&rotor, 0), DVec2::new(0.0, -0.25)));
        assert!(close(slot_offset(&rotor, 1), DVec2::new(0.25, 0.0)));

        rotor.orientation = 1;
        assert!(close(slot_offset(&rotor, 0), DVec2::new(0.25, 0.0)));

        rotor.spin = Spin::Turning {
            sense: TurnSense::CounterClockwise,
            progress: 0.5,
        };
        assert!((rotor_quarter_turns(&rotor) - 4.5).abs() < 1e-12);
    }

    #[test]
    fn test_inside_rotor_needs_rotor() {
        let ball = Ball::new(0, 0, Motion::InsideRotor { slot: 2 }, BallColor::Red);
        assert_eq!(ball_offset(&ball, None), None);
        let at = ball_offset(&ball, Some(&Rotor::new(0))).unwrap();
        assert!(close(at, DVec2::new(0.5, 0.75)));
    }

    #[test]
    fn test_locate() {
        let geometry = BoardGeometry::default();
        assert_eq!(geometry.locate(DVec2::new(41.0, 76.0), 5, 8), Some((0, 0)));
        assert_eq!(geometry.locate(DVec2::new(40.0 + 90.0 * 7.5, 75.0 + 90.0 * 4.5), 5, 8), Some((4, 7)));
        assert_eq!(geometry.locate(DVec2::new(39.0, 80.0), 5, 8), None);
        assert_eq!(geometry.locate(DVec2::new(40.0 + 90.0 * 8.0, 80.0), 5, 8), None);
    }

    #[test]
    fn test_ball_screen_position() {
        let mut model = Model::new(1, 2);
        model.set_tile(0, 1, Tile::from(TileKind::Rotor)).unwrap();
        model
            .add_ball(Ball::new(0, 1, Motion::InsideRotor { slot: 3 }, BallColor::Blue))
            .unwrap();
        let geometry = BoardGeometry::default();
        let pos = geometry.ball_position(&model.balls()[0], &model).unwrap();
        assert!(close(pos, DVec2::new(40.0 + 90.0 * 1.25, 75.0 + 45.0)));
    }
}
