//! Simulation model and fixed tick
//!
//! The model owns the grid and the ball registry. Collaborators read it
//! between ticks and mutate it only through `progress` and the rotor controls.

use serde::{Deserialize, Serialize};

use super::ball::{Ball, Motion};
use super::direction::Direction;
use super::error::{SimError, SimResult};
use super::grid::Grid;
use super::tile::{Tile, TurnSense};
use crate::consts::EJECT_PHASE;

/// A resolved player control aimed at one rotor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Control {
    Turn {
        row: usize,
        col: usize,
        sense: TurnSense,
    },
    Eject {
        row: usize,
        col: usize,
        side: Direction,
    },
}

/// Complete simulation state (deterministic, serializable)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Model {
    grid: Grid,
    balls: Vec<Ball>,
}

impl Model {
    /// Create an empty model of the given size
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            grid: Grid::new(rows, cols),
            balls: Vec::new(),
        }
    }

    pub fn rows(&self) -> usize {
        self.grid.rows()
    }

    pub fn cols(&self) -> usize {
        self.grid.cols()
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn balls(&self) -> &[Ball] {
        &self.balls
    }

    pub fn tile(&self, row: usize, col: usize) -> SimResult<&Tile> {
        self.grid.get(row, col)
    }

    /// Place a tile (setup only)
    pub fn set_tile(&mut self, row: usize, col: usize, tile: Tile) -> SimResult<()> {
        self.grid.set(row, col, tile)
    }

    /// Reset every tile to empty; balls are kept
    pub fn clear(&mut self) {
        self.grid.clear();
    }

    /// Append a ball to the registry (setup only).
    ///
    /// A ball placed inside a rotor must name a real slot on a rotor tile,
    /// and that slot must not already hold a ball.
    pub fn add_ball(&mut self, ball: Ball) -> SimResult<()> {
        let tile = self.grid.get(ball.row, ball.col)?;
        if let Some(slot) = ball.slot() {
            if slot >= 4 {
                return Err(SimError::BadSlot { slot });
            }
            if tile.as_rotor().is_none() {
                return Err(SimError::NotARotor {
                    row: ball.row,
                    col: ball.col,
                });
            }
            let taken = self
                .balls
                .iter()
                .any(|b| b.row == ball.row && b.col == ball.col && b.slot() == Some(slot));
            if taken {
                return Err(SimError::SlotTaken {
                    row: ball.row,
                    col: ball.col,
                    slot,
                });
            }
        }
        self.balls.push(ball);
        Ok(())
    }

    /// Recompute rotor `occupied` and `connected` from the registry and grid
    pub fn refresh_rotors(&mut self) {
        for (_, _, rotor) in self.grid.rotors_mut() {
            rotor.occupied = [false; 4];
        }
        for ball in &self.balls {
            let Some(slot) = ball.slot() else {
                continue;
            };
            match self.grid.get_mut(ball.row, ball.col) {
                Ok(Tile::Rotor(rotor)) if slot < 4 => rotor.occupied[slot] = true,
                _ => log::warn!(
                    "Ball claims rotor slot {} at ({}, {}) but there is no such slot",
                    slot,
                    ball.row,
                    ball.col
                ),
            }
        }
        self.grid.recompute_connectivity();
    }

    /// Advance the simulation by `elapsed_ms`.
    ///
    /// Order per tick: refresh rotor caches, advance rotor spins, then move
    /// every ball in registry order. The tick is applied atomically: if a
    /// ball rolls off the grid the error is returned and nothing changes.
    pub fn progress(&mut self, elapsed_ms: f64) -> SimResult<()> {
        let mut next = self.clone();
        next.step(elapsed_ms)?;
        *self = next;
        Ok(())
    }

    fn step(&mut self, elapsed_ms: f64) -> SimResult<()> {
        self.refresh_rotors();

        for (row, col, rotor) in self.grid.rotors_mut() {
            if rotor.advance(elapsed_ms) {
                log::debug!("Rotor ({}, {}) now at orientation {}", row, col, rotor.orientation);
            }
        }

        for ball in &mut self.balls {
            ball.advance(&mut self.grid, elapsed_ms)?;
        }
        Ok(())
    }

    /// Start a clockwise quarter turn. Returns whether the rotor started turning.
    pub fn turn_clockwise(&mut self, row: usize, col: usize) -> SimResult<bool> {
        self.turn(row, col, TurnSense::Clockwise)
    }

    /// Start a counter-clockwise quarter turn. Returns whether the rotor started turning.
    pub fn turn_counter_clockwise(&mut self, row: usize, col: usize) -> SimResult<bool> {
        self.turn(row, col, TurnSense::CounterClockwise)
    }

    fn turn(&mut self, row: usize, col: usize, sense: TurnSense) -> SimResult<bool> {
        let started = self
            .grid
            .get_mut(row, col)?
            .as_rotor_mut()
            .is_some_and(|rotor| rotor.start_turn(sense));
        if started {
            log::debug!("Rotor ({}, {}) turning {:?}", row, col, sense);
        }
        Ok(started)
    }

    /// Release the ball facing `side` out of a resting rotor.
    ///
    /// Returns whether a ball was released. Non-rotor tiles, turning rotors,
    /// unconnected sides and empty slots are silently ignored.
    pub fn eject(&mut self, row: usize, col: usize, side: Direction) -> SimResult<bool> {
        let Some(rotor) = self.grid.get_mut(row, col)?.as_rotor_mut() else {
            return Ok(false);
        };
        if !rotor.is_resting() || !rotor.connected[side.index()] {
            return Ok(false);
        }

        let slot = rotor.slot_facing(side);
        let Some(ball) = self
            .balls
            .iter_mut()
            .find(|b| b.row == row && b.col == col && b.slot() == Some(slot))
        else {
            return Ok(false);
        };

        ball.motion = Motion::Exiting(side);
        ball.phase = EJECT_PHASE;
        rotor.occupied[slot] = false;
        log::debug!("Ejected ball from ({}, {}) towards {:?}", row, col, side);
        Ok(true)
    }

    pub fn eject_north(&mut self, row: usize, col: usize) -> SimResult<bool> {
        self.eject(row, col, Direction::North)
    }

    pub fn eject_east(&mut self, row: usize, col: usize) -> SimResult<bool> {
        self.eject(row, col, Direction::East)
    }

    pub fn eject_south(&mut self, row: usize, col: usize) -> SimResult<bool> {
        self.eject(row, col, Direction::South)
    }

    pub fn eject_west(&mut self, row: usize, col: usize) -> SimResult<bool> {
        self.eject(row, col, Direction::West)
    }

    /// Apply a resolved control
    pub fn apply(&mut self, control: Control) -> SimResult<bool> {
        match control {
            Control::Turn { row, col, sense } => self.turn(row, col, sense),
            Control::Eject { row, col, side } => self.eject(row, col, side),
        }
    }
}
