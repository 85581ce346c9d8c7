//! Balls and the track transport state machine
//!
//! A tile crossing is two half-tile legs: entering (edge to centre) and
//! exiting (centre to edge). `phase` counts progress along the current leg.

use serde::{Deserialize, Serialize};

use super::direction::Direction;
use super::error::SimResult;
use super::grid::Grid;
use super::tile::Tile;
use crate::consts::{BALL_VELOCITY, HALF_TILE, ROTOR_DECISION_PHASE};

/// Cosmetic ball colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BallColor {
    #[default]
    Red,
    Green,
    Blue,
    Yellow,
}

/// Where a ball is in its tile crossing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Motion {
    /// Not on a track; accumulates phase but never moves
    Idle,
    /// Rolling in from the given side towards the tile centre
    Entering(Direction),
    /// Rolling from the tile centre out through the given side
    Exiting(Direction),
    /// Held by the rotor on this tile in a housing-relative slot
    InsideRotor { slot: usize },
}

/// A ball entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub motion: Motion,
    pub color: BallColor,
    /// Progress along the current half-tile leg
    pub phase: f64,
    pub row: usize,
    pub col: usize,
}

impl Ball {
    pub fn new(row: usize, col: usize, motion: Motion, color: BallColor) -> Self {
        Self {
            motion,
            color,
            phase: 0.0,
            row,
            col,
        }
    }

    pub fn with_phase(mut self, phase: f64) -> Self {
        self.phase = phase;
        self
    }

    /// Rotor slot held, if inside a rotor
    pub fn slot(&self) -> Option<usize> {
        match self.motion {
            Motion::InsideRotor { slot } => Some(slot),
            _ => None,
        }
    }

    pub fn is_inside_rotor(&self) -> bool {
        self.slot().is_some()
    }

    /// Advance the ball by one tick against the grid.
    ///
    /// At most one exit crossing and one centre/rotor decision happen per
    /// call, however large `elapsed_ms` is. A capture marks the rotor slot
    /// occupied straight away. Fails only if the ball rolls off the grid.
    pub(crate) fn advance(&mut self, grid: &mut Grid, elapsed_ms: f64) -> SimResult<()> {
        if self.is_inside_rotor() {
            return Ok(());
        }

        self.phase += elapsed_ms * BALL_VELOCITY;

        // Exiting balls don't care about the tile type
        if let Motion::Exiting(side) = self.motion {
            if self.phase >= HALF_TILE {
                let (row, col) = grid.neighbor(self.row, self.col, side).ok_or_else(|| {
                    let (dr, dc) = side.delta();
                    grid.out_of_range(self.row as isize + dr, self.col as isize + dc)
                })?;
                self.phase -= HALF_TILE;
                self.row = row;
                self.col = col;
                self.motion = Motion::Entering(side.opposite());
            }
        }

        // Idle balls stop here, so their phase keeps growing and never wraps
        let Motion::Entering(entry) = self.motion else {
            return Ok(());
        };

        match grid.get_mut(self.row, self.col)? {
            Tile::Empty => {}
            Tile::Rotor(rotor) => {
                if self.phase >= ROTOR_DECISION_PHASE {
                    let slot = rotor.slot_facing(entry);
                    if rotor.is_resting() && !rotor.occupied[slot] {
                        rotor.occupied[slot] = true;
                        self.motion = Motion::InsideRotor { slot };
                        self.phase = 0.0;
                        log::debug!("Ball captured at ({}, {}) slot {}", self.row, self.col, slot);
                    } else {
                        self.motion = Motion::Exiting(entry);
                        log::debug!("Ball bounced off ({}, {}) towards {:?}", self.row, self.col, entry);
                    }
                }
            }
            tile => {
                if self.phase >= HALF_TILE {
                    self.phase -= HALF_TILE;
                    match tile.route(entry) {
                        Some(exit) => self.motion = Motion::Exiting(exit),
                        None => log::warn!(
                            "{:?} at ({}, {}) has no track from {:?}",
                            tile.kind(),
                            self.row,
                            self.col,
                            entry
                        ),
                    }
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::error::SimError;
    use crate::sim::tile::{Rotor, TurnSense};
    use Direction::*;

    fn track(tiles: &[Tile]) -> Grid {
        let mut grid = Grid::new(1, tiles.len());
        for (col, tile) in tiles.iter().enumerate() {
            grid.set(0, col, tile.clone()).unwrap();
        }
        grid
    }

    #[test]
    fn test_exit_crosses_into_neighbor() {
        let mut grid = track(&[Tile::Horizontal, Tile::Horizontal]);
        let mut ball = Ball::new(0, 0, Motion::Exiting(East), BallColor::Green).with_phase(0.4);
        ball.advance(&mut grid, 100.0).unwrap();
        assert_eq!(ball.col, 1);
        assert_eq!(ball.motion, Motion::Entering(West));
        assert!(ball.phase.abs() < 1e-9);
    }

    #[test]
    fn test_below_threshold_nothing_happens() {
        let mut grid = track(&[Tile::Horizontal, Tile::Horizontal]);
        let mut ball = Ball::new(0, 1, Motion::Entering(West), BallColor::Red);
        ball.advance(&mut grid, 300.0).unwrap();
        assert_eq!(ball.motion, Motion::Entering(West));
        assert!((ball.phase - 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_corner_turns() {
        let mut grid = track(&[Tile::CornerSW]);
        let mut ball = Ball::new(0, 0, Motion::Entering(West), BallColor::Blue).with_phase(0.45);
        ball.advance(&mut grid, 100.0).unwrap();
        assert_eq!(ball.motion, Motion::Exiting(South));
        assert!((ball.phase - 0.05).abs() < 1e-9);
    }

    #[test]
    fn test_unreachable_side_keeps_motion() {
        let mut grid = track(&[Tile::Vertical]);
        let mut ball = Ball::new(0, 0, Motion::Entering(West), BallColor::Red).with_phase(0.45);
        ball.advance(&mut grid, 100.0).unwrap();
        assert_eq!(ball.motion, Motion::Entering(West));
        assert!((ball.phase - 0.05).abs() < 1e-9);
    }

    #[test]
    fn test_empty_tile_never_routes() {
        let mut grid = track(&[Tile::Empty]);
        let mut ball = Ball::new(0, 0, Motion::Entering(West), BallColor::Red);
        ball.advance(&mut grid, 800.0).unwrap();
        assert_eq!(ball.motion, Motion::Entering(West));
        assert!((ball.phase - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_rotor_capture_at_quarter_tile() {
        let mut grid = track(&[Tile::Rotor(Rotor::new(1))]);
        let mut ball = Ball::new(0, 0, Motion::Entering(West), BallColor::Yellow);
        ball.advance(&mut grid, 200.0).unwrap();
        assert_eq!(ball.motion, Motion::Entering(West));
        ball.advance(&mut grid, 50.0).unwrap();
        // West (3) with orientation 1 lands in slot 2
        assert_eq!(ball.motion, Motion::InsideRotor { slot: 2 });
        assert_eq!(ball.phase, 0.0);
        assert!(grid.rotor(0, 0).unwrap().occupied[2]);
    }

    #[test]
    fn test_rotor_bounce_when_slot_taken() {
        let mut rotor = Rotor::new(0);
        rotor.occupied[3] = true;
        let mut grid = track(&[Tile::Horizontal, Tile::Rotor(rotor)]);
        let mut ball = Ball::new(0, 1, Motion::Entering(West), BallColor::Red);
        ball.advance(&mut grid, 250.0).unwrap();
        assert_eq!(ball.motion, Motion::Exiting(West));
        assert!((ball.phase - 0.25).abs() < 1e-9);

        ball.advance(&mut grid, 250.0).unwrap();
        assert_eq!(ball.col, 0);
        assert_eq!(ball.motion, Motion::Entering(East));
    }

    #[test]
    fn test_rotor_bounce_while_spinning() {
        let mut rotor = Rotor::new(0);
        rotor.start_turn(TurnSense::Clockwise);
        let mut grid = track(&[Tile::Rotor(rotor)]);
        let mut ball = Ball::new(0, 0, Motion::Entering(North), BallColor::Red);
        ball.advance(&mut grid, 300.0).unwrap();
        assert_eq!(ball.motion, Motion::Exiting(North));
        assert!(!grid.rotor(0, 0).unwrap().occupied[0]);
    }

    #[test]
    fn test_inside_rotor_is_inert() {
        let mut grid = track(&[Tile::Rotor(Rotor::new(0))]);
        let mut ball =
            Ball::new(0, 0, Motion::InsideRotor { slot: 1 }, BallColor::Green).with_phase(0.1);
        ball.advance(&mut grid, 1000.0).unwrap();
        assert_eq!(ball.motion, Motion::InsideRotor { slot: 1 });
        assert!((ball.phase - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_idle_accumulates_phase_only() {
        let mut grid = track(&[Tile::Horizontal]);
        let mut ball = Ball::new(0, 0, Motion::Idle, BallColor::Red);
        ball.advance(&mut grid, 700.0).unwrap();
        assert_eq!(ball.motion, Motion::Idle);
        assert!((ball.phase - 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_one_boundary_per_tick() {
        let mut grid = track(&[Tile::Horizontal, Tile::Horizontal, Tile::Horizontal]);
        let mut ball = Ball::new(0, 0, Motion::Exiting(East), BallColor::Red);
        ball.advance(&mut grid, 1500.0).unwrap();
        // Crossed one edge and passed one centre, nothing more
        assert_eq!(ball.col, 1);
        assert_eq!(ball.motion, Motion::Exiting(East));
        assert!((ball.phase - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_rolling_off_grid_fails() {
        let mut grid = track(&[Tile::Horizontal]);
        let mut ball = Ball::new(0, 0, Motion::Exiting(West), BallColor::Red).with_phase(0.5);
        let err = ball.advance(&mut grid, 0.0).unwrap_err();
        assert_eq!(
            err,
            SimError::IndexOutOfRange {
                row: 0,
                col: -1,
                rows: 1,
                cols: 1
            }
        );
    }
}
