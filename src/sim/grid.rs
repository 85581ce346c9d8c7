//! Fixed-size tile grid with bounds-checked access

use serde::{Deserialize, Serialize};

use super::direction::Direction;
use super::error::{SimError, SimResult};
use super::tile::{Rotor, Tile};

/// Row-major tile storage (`index = col + row * cols`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    rows: usize,
    cols: usize,
    tiles: Vec<Tile>,
}

impl Grid {
    /// Create a grid with every cell empty
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            tiles: vec![Tile::Empty; rows * cols],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Reset every cell to empty
    pub fn clear(&mut self) {
        self.tiles.fill(Tile::Empty);
    }

    fn index(&self, row: usize, col: usize) -> SimResult<usize> {
        if row < self.rows && col < self.cols {
            Ok(col + row * self.cols)
        } else {
            Err(self.out_of_range(row as isize, col as isize))
        }
    }

    pub(crate) fn out_of_range(&self, row: isize, col: isize) -> SimError {
        SimError::IndexOutOfRange {
            row,
            col,
            rows: self.rows,
            cols: self.cols,
        }
    }

    pub fn get(&self, row: usize, col: usize) -> SimResult<&Tile> {
        let i = self.index(row, col)?;
        Ok(&self.tiles[i])
    }

    pub fn get_mut(&mut self, row: usize, col: usize) -> SimResult<&mut Tile> {
        let i = self.index(row, col)?;
        Ok(&mut self.tiles[i])
    }

    pub fn set(&mut self, row: usize, col: usize, tile: Tile) -> SimResult<()> {
        *self.get_mut(row, col)? = tile;
        Ok(())
    }

    /// Rotor at the given cell
    pub fn rotor(&self, row: usize, col: usize) -> SimResult<&Rotor> {
        self.get(row, col)?
            .as_rotor()
            .ok_or(SimError::NotARotor { row, col })
    }

    /// Adjacent cell in a direction, `None` past the grid edge
    pub fn neighbor(&self, row: usize, col: usize, dir: Direction) -> Option<(usize, usize)> {
        let (dr, dc) = dir.delta();
        let r = row.checked_add_signed(dr)?;
        let c = col.checked_add_signed(dc)?;
        (r < self.rows && c < self.cols).then_some((r, c))
    }

    /// Whether the neighbour in `dir` exists and holds a non-empty tile
    pub fn is_connected(&self, row: usize, col: usize, dir: Direction) -> bool {
        self.neighbor(row, col, dir)
            .and_then(|(r, c)| self.get(r, c).ok())
            .is_some_and(|tile| !tile.is_empty())
    }

    /// All cells in row-major order with their coordinates
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &Tile)> {
        let cols = self.cols;
        self.tiles
            .iter()
            .enumerate()
            .map(move |(i, tile)| (i / cols, i % cols, tile))
    }

    /// Mutable access to every rotor with its coordinates
    pub(crate) fn rotors_mut(&mut self) -> impl Iterator<Item = (usize, usize, &mut Rotor)> {
        let cols = self.cols;
        self.tiles
            .iter_mut()
            .enumerate()
            .filter_map(move |(i, tile)| tile.as_rotor_mut().map(|rotor| (i / cols, i % cols, rotor)))
    }

    /// Refresh `connected` on every rotor from the current grid contents
    pub fn recompute_connectivity(&mut self) {
        let mut links = Vec::new();
        for (row, col, tile) in self.iter() {
            if tile.as_rotor().is_some() {
                let connected = Direction::ALL.map(|dir| self.is_connected(row, col, dir));
                links.push((row, col, connected));
            }
        }
        for (row, col, connected) in links {
            if let Ok(Tile::Rotor(rotor)) = self.get_mut(row, col) {
                rotor.connected = connected;
            }
        }
    }
}
