//! Level layouts
//!
//! A layout is static setup data: grid size, tile placements and starting
//! balls. It is read from JSON or taken from the built-in demo level, and
//! validated while the model is built.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sim::{Ball, BallColor, Direction, Model, Motion, Rotor, SimError, Tile, TileKind};

#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("invalid layout JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Sim(#[from] SimError),

    #[error("ball {index} starts at ({row}, {col}), outside the grid")]
    BallOutOfBounds { index: usize, row: usize, col: usize },

    #[error("ball {index} starts inside a rotor at ({row}, {col}) but that tile is not a rotor")]
    NotARotor { index: usize, row: usize, col: usize },

    #[error("ball {index} claims rotor slot {slot} at ({row}, {col}) which is already taken")]
    SlotTaken {
        index: usize,
        row: usize,
        col: usize,
        slot: usize,
    },

    #[error("ball {index} uses rotor slot {slot}; slots are 0..4")]
    BadSlot { index: usize, slot: usize },

    #[error("rotor at ({row}, {col}) has orientation {orientation}; orientations are 0..4")]
    BadOrientation { row: usize, col: usize, orientation: u8 },
}

/// One tile placement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TilePlacement {
    pub row: usize,
    pub col: usize,
    pub kind: TileKind,
    /// Starting orientation for rotors (ignored for other tiles)
    #[serde(default)]
    pub orientation: u8,
}

/// One starting ball
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BallPlacement {
    pub row: usize,
    pub col: usize,
    pub motion: Motion,
    #[serde(default)]
    pub color: BallColor,
    #[serde(default)]
    pub phase: f64,
}

/// Static level description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub rows: usize,
    pub cols: usize,
    #[serde(default)]
    pub tiles: Vec<TilePlacement>,
    #[serde(default)]
    pub balls: Vec<BallPlacement>,
}

impl Layout {
    /// Empty layout of the given size
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            tiles: Vec::new(),
            balls: Vec::new(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, LayoutError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, LayoutError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn tile(mut self, row: usize, col: usize, kind: TileKind) -> Self {
        self.tiles.push(TilePlacement {
            row,
            col,
            kind,
            orientation: 0,
        });
        self
    }

    pub fn ball(mut self, row: usize, col: usize, motion: Motion, color: BallColor) -> Self {
        self.balls.push(BallPlacement {
            row,
            col,
            motion,
            color,
            phase: 0.0,
        });
        self
    }

    /// Build a model ready for its first tick.
    ///
    /// Later placements of the same cell overwrite earlier ones. Rotor
    /// caches are refreshed so controls work before the first tick.
    pub fn build(&self) -> Result<Model, LayoutError> {
        let mut model = Model::new(self.rows, self.cols);

        for placement in &self.tiles {
            let tile = match placement.kind {
                TileKind::Rotor => {
                    if placement.orientation >= 4 {
                        return Err(LayoutError::BadOrientation {
                            row: placement.row,
                            col: placement.col,
                            orientation: placement.orientation,
                        });
                    }
                    Tile::Rotor(Rotor::new(placement.orientation))
                }
                kind => Tile::from(kind),
            };
            model.set_tile(placement.row, placement.col, tile)?;
        }

        for (index, placement) in self.balls.iter().enumerate() {
            let (row, col) = (placement.row, placement.col);
            let ball = Ball::new(row, col, placement.motion, placement.color)
                .with_phase(placement.phase);
            model.add_ball(ball).map_err(|err| match err {
                SimError::IndexOutOfRange { .. } => LayoutError::BallOutOfBounds { index, row, col },
                SimError::BadSlot { slot } => LayoutError::BadSlot { index, slot },
                SimError::NotARotor { .. } => LayoutError::NotARotor { index, row, col },
                SimError::SlotTaken { slot, .. } => LayoutError::SlotTaken {
                    index,
                    row,
                    col,
                    slot,
                },
            })?;
        }

        model.refresh_rotors();
        log::info!(
            "Built {}x{} layout with {} tiles and {} balls",
            self.rows,
            self.cols,
            self.tiles.len(),
            self.balls.len()
        );
        Ok(model)
    }

    /// The 5x8 demonstration level: two corner loops, a tall loop, a
    /// figure-eight through a crossing, and a column of three rotors.
    pub fn demo() -> Self {
        use BallColor::*;
        use Direction::*;
        use TileKind::{Crossing, CornerNE, CornerNW, CornerSE, CornerSW, Horizontal, Vertical};

        Layout::new(5, 8)
            // Small loop, top left
            .tile(0, 0, CornerSE)
            .tile(1, 0, CornerNE)
            .tile(0, 1, Horizontal)
            .tile(1, 1, Horizontal)
            .tile(0, 2, CornerSW)
            .tile(1, 2, CornerNW)
            .ball(0, 0, Motion::Exiting(East), Green)
            .ball(0, 2, Motion::Exiting(South), Red)
            .ball(1, 2, Motion::Exiting(West), Yellow)
            .ball(1, 0, Motion::Exiting(North), Blue)
            // Tall loop, bottom left
            .tile(2, 0, CornerSE)
            .tile(2, 1, CornerSW)
            .tile(3, 0, Vertical)
            .tile(3, 1, Vertical)
            .tile(4, 0, CornerNE)
            .tile(4, 1, CornerNW)
            .ball(2, 0, Motion::Exiting(South), Green)
            .ball(2, 1, Motion::Exiting(West), Red)
            .ball(4, 1, Motion::Exiting(North), Yellow)
            .ball(4, 0, Motion::Exiting(East), Blue)
            // Figure-eight through a crossing
            .tile(2, 5, Crossing)
            .tile(1, 5, CornerSE)
            .tile(1, 6, CornerSW)
            .tile(2, 6, CornerNW)
            .tile(2, 4, CornerSE)
            .tile(3, 4, CornerNE)
            .tile(3, 5, CornerNW)
            .ball(2, 5, Motion::Exiting(South), Red)
            // Rotor column
            .tile(1, 3, TileKind::Rotor)
            .tile(2, 3, TileKind::Rotor)
            .tile(3, 3, TileKind::Rotor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_builds() {
        let model = Layout::demo().build().unwrap();
        assert_eq!((model.rows(), model.cols()), (5, 8));
        assert_eq!(model.balls().len(), 9);
        assert_eq!(model.tile(2, 5).unwrap().kind(), TileKind::Crossing);
        let rotors = model
            .grid()
            .iter()
            .filter(|(_, _, tile)| tile.as_rotor().is_some())
            .count();
        assert_eq!(rotors, 3);
    }

    #[test]
    fn test_demo_rotor_connectivity() {
        let model = Layout::demo().build().unwrap();
        // Middle rotor: rotors above and below, figure-eight corner to the east
        let rotor = model.grid().rotor(2, 3).unwrap();
        assert_eq!(rotor.connected, [true, true, true, false]);
        let top = model.grid().rotor(1, 3).unwrap();
        assert_eq!(top.connected, [false, false, true, true]);
    }

    #[test]
    fn test_demo_runs_for_a_minute() {
        let mut model = Layout::demo().build().unwrap();
        for _ in 0..3600 {
            model.progress(crate::consts::TICK_MS).unwrap();
        }
        assert_eq!(model.balls().len(), 9);
    }

    #[test]
    fn test_json_round_trip() {
        let layout = Layout::demo();
        let json = layout.to_json().unwrap();
        assert_eq!(Layout::from_json(&json).unwrap(), layout);
    }

    #[test]
    fn test_json_defaults() {
        let json = r#"{
            "rows": 1,
            "cols": 2,
            "tiles": [
                { "row": 0, "col": 0, "kind": "Horizontal" },
                { "row": 0, "col": 1, "kind": "Rotor", "orientation": 3 }
            ],
            "balls": [
                { "row": 0, "col": 0, "motion": { "Exiting": "East" } }
            ]
        }"#;
        let model = Layout::from_json(json).unwrap().build().unwrap();
        assert_eq!(model.grid().rotor(0, 1).unwrap().orientation, 3);
        let ball = &model.balls()[0];
        assert_eq!(ball.color, BallColor::Red);
        assert_eq!(ball.phase, 0.0);
    }

    #[test]
    fn test_rejects_bad_json() {
        assert!(matches!(
            Layout::from_json("{ \"rows\": 1 }"),
            Err(LayoutError::Json(_))
        ));
    }

    #[test]
    fn test_rejects_tile_outside_grid() {
        let layout = Layout::new(1, 1).tile(0, 1, TileKind::Vertical);
        assert!(matches!(
            layout.build(),
            Err(LayoutError::Sim(SimError::IndexOutOfRange { .. }))
        ));
    }

    #[test]
    fn test_rejects_ball_outside_grid() {
        let layout = Layout::new(1, 1).ball(3, 0, Motion::Idle, BallColor::Blue);
        assert!(matches!(
            layout.build(),
            Err(LayoutError::BallOutOfBounds { index: 0, row: 3, col: 0 })
        ));
    }

    #[test]
    fn test_rejects_inside_rotor_on_track() {
        let layout = Layout::new(1, 1)
            .tile(0, 0, TileKind::Vertical)
            .ball(0, 0, Motion::InsideRotor { slot: 0 }, BallColor::Red);
        assert!(matches!(layout.build(), Err(LayoutError::NotARotor { .. })));
    }

    #[test]
    fn test_rejects_shared_slot() {
        let layout = Layout::new(1, 1)
            .tile(0, 0, TileKind::Rotor)
            .ball(0, 0, Motion::InsideRotor { slot: 1 }, BallColor::Red)
            .ball(0, 0, Motion::InsideRotor { slot: 1 }, BallColor::Blue);
        assert!(matches!(
            layout.build(),
            Err(LayoutError::SlotTaken { index: 1, slot: 1, .. })
        ));
    }

    #[test]
    fn test_rejects_bad_slot_and_orientation() {
        let layout = Layout::new(1, 1)
            .tile(0, 0, TileKind::Rotor)
            .ball(0, 0, Motion::InsideRotor { slot: 4 }, BallColor::Red);
        assert!(matches!(layout.build(), Err(LayoutError::BadSlot { slot: 4, .. })));

        let mut layout = Layout::new(1, 1).tile(0, 0, TileKind::Rotor);
        layout.tiles[0].orientation = 7;
        assert!(matches!(
            layout.build(),
            Err(LayoutError::BadOrientation { orientation: 7, .. })
        ));
    }

    #[test]
    fn test_prefilled_rotor_marks_occupancy() {
        let model = Layout::new(1, 1)
            .tile(0, 0, TileKind::Rotor)
            .ball(0, 0, Motion::InsideRotor { slot: 2 }, BallColor::Green)
            .build()
            .unwrap();
        assert_eq!(
            model.grid().rotor(0, 0).unwrap().occupied,
            [false, false, true, false]
        );
    }
}
