//! Game state snapshot as serialized by the server.
//!
//! Board and piece fields use the server's capitalised keys (`Cells`, `Shape`,
//! `X`, ...); the top-level state uses camelCase. An empty string is an empty
//! board cell, any other string is the color of a locked block.

use serde::{Deserialize, Serialize};

use crate::{BOARD_HEIGHT, BOARD_WIDTH, BUFFER_ROWS, SPAWN_X, SPAWN_Y};

/// Structural problems that make a snapshot unusable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StateError {
    #[error("currentPlayer {index} out of range for {len} players")]
    CurrentPlayerOutOfRange { index: usize, len: usize },
    #[error("board row {row} has {len} cells, expected {width}")]
    RaggedBoard { row: usize, len: usize, width: usize },
    #[error("piece shape is empty or not rectangular")]
    MalformedShape,
    #[error("piece anchor ({x}, {y}) is too far outside the board")]
    PieceOutOfRange { x: i32, y: i32 },
}

/// The playfield, buffer rows included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    #[serde(rename = "Width")]
    pub width: usize,
    /// Visible height; `cells` holds `height + BUFFER_ROWS` rows.
    #[serde(rename = "Height", default)]
    pub height: usize,
    #[serde(rename = "Cells")]
    pub cells: Vec<Vec<String>>,
}

impl Board {
    /// Create an empty board with `height` visible rows plus the buffer.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![vec![String::new(); width]; height + BUFFER_ROWS],
        }
    }

    /// Total rows including the hidden buffer.
    pub fn rows(&self) -> usize {
        self.cells.len()
    }

    /// Color at (x, y), `None` if out of bounds.
    pub fn get(&self, x: i32, y: i32) -> Option<&str> {
        if x < 0 || y < 0 {
            return None;
        }
        self.cells
            .get(y as usize)
            .and_then(|row| row.get(x as usize))
            .map(String::as_str)
    }

    /// Check if position is within bounds and filled
    pub fn is_occupied(&self, x: i32, y: i32) -> bool {
        matches!(self.get(x, y), Some(c) if !c.is_empty())
    }

    /// Set cell color at (x, y). Returns false if out of bounds.
    pub fn set(&mut self, x: i32, y: i32, color: impl Into<String>) -> bool {
        if x < 0 || y < 0 {
            return false;
        }
        match self
            .cells
            .get_mut(y as usize)
            .and_then(|row| row.get_mut(x as usize))
        {
            Some(cell) => {
                *cell = color.into();
                true
            }
            None => false,
        }
    }

    /// Rows that are drawn, skipping the buffer.
    pub fn visible_rows(&self) -> impl Iterator<Item = &[String]> {
        self.cells.iter().skip(BUFFER_ROWS).map(Vec::as_slice)
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new(BOARD_WIDTH, BOARD_HEIGHT)
    }
}

/// The falling piece: occupancy matrix, anchor and color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Piece {
    #[serde(rename = "Shape")]
    pub shape: Vec<Vec<bool>>,
    #[serde(rename = "X")]
    pub x: i32,
    #[serde(rename = "Y")]
    pub y: i32,
    #[serde(rename = "Color")]
    pub color: String,
}

impl Piece {
    pub fn new(shape: Vec<Vec<bool>>, x: i32, y: i32, color: impl Into<String>) -> Self {
        Self {
            shape,
            x,
            y,
            color: color.into(),
        }
    }

    /// Offsets `(col, row)` of occupied cells relative to the anchor.
    pub fn occupied(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.shape.iter().enumerate().flat_map(|(row, cells)| {
            cells
                .iter()
                .enumerate()
                .filter(|(_, filled)| **filled)
                .map(move |(col, _)| (col as i32, row as i32))
        })
    }
}

/// The seven server-side piece templates.
///
/// Spawn orientation matches the server's table, which is not SRS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    I,
    O,
    T,
    L,
    J,
    S,
    Z,
}

impl PieceKind {
    pub const ALL: [PieceKind; 7] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::T,
        PieceKind::L,
        PieceKind::J,
        PieceKind::S,
        PieceKind::Z,
    ];

    /// Spawn-orientation shape matrix.
    pub fn shape(&self) -> Vec<Vec<bool>> {
        let rows: &[&[u8]] = match self {
            PieceKind::I => &[&[1, 1, 1, 1]],
            PieceKind::O => &[&[1, 1], &[1, 1]],
            PieceKind::T => &[&[1, 1, 1], &[0, 1, 0]],
            PieceKind::L => &[&[1, 0], &[1, 0], &[1, 1]],
            PieceKind::J => &[&[0, 1], &[0, 1], &[1, 1]],
            PieceKind::S => &[&[0, 1, 1], &[1, 1, 0]],
            PieceKind::Z => &[&[1, 1, 0], &[0, 1, 1]],
        };
        rows.iter()
            .map(|r| r.iter().map(|&v| v == 1).collect())
            .collect()
    }

    /// A piece of this kind at the spawn position.
    pub fn spawn(&self, color: impl Into<String>) -> Piece {
        Piece::new(self.shape(), SPAWN_X, SPAWN_Y, color)
    }
}

/// Snapshot of a match at one instant.
///
/// Authoritative snapshots carry `sequence_number`; local predictions keep
/// whatever the baseline had.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub board: Board,
    #[serde(default)]
    pub current_piece: Option<Piece>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_piece: Option<Piece>,
    #[serde(default)]
    pub score: u64,
    #[serde(default)]
    pub level: u32,
    #[serde(default)]
    pub pieces_placed: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence_number: Option<u64>,
    #[serde(default)]
    pub current_player: usize,
    pub players: Vec<String>,
    #[serde(default)]
    pub game_over: bool,
}

impl GameState {
    /// Fresh match state on an empty standard board.
    pub fn new(players: Vec<String>) -> Self {
        Self {
            board: Board::default(),
            current_piece: None,
            next_piece: None,
            score: 0,
            level: 1,
            pieces_placed: 0,
            sequence_number: None,
            current_player: 0,
            players,
            game_over: false,
        }
    }

    pub fn with_piece(mut self, piece: Piece) -> Self {
        self.current_piece = Some(piece);
        self
    }

    /// Check the structural invariants a displayable state must satisfy.
    pub fn validate(&self) -> Result<(), StateError> {
        if self.current_player >= self.players.len() {
            return Err(StateError::CurrentPlayerOutOfRange {
                index: self.current_player,
                len: self.players.len(),
            });
        }
        for (row, cells) in self.board.cells.iter().enumerate() {
            if cells.len() != self.board.width {
                return Err(StateError::RaggedBoard {
                    row,
                    len: cells.len(),
                    width: self.board.width,
                });
            }
        }
        for piece in self.current_piece.iter().chain(self.next_piece.iter()) {
            self.check_piece(piece)?;
        }
        Ok(())
    }

    /// Shapes must be non-empty rectangles. The anchor may sit at most one
    /// board extent away from the grid in either axis.
    fn check_piece(&self, piece: &Piece) -> Result<(), StateError> {
        let cols = piece.shape.first().map_or(0, Vec::len);
        if cols == 0 || piece.shape.iter().any(|row| row.len() != cols) {
            return Err(StateError::MalformedShape);
        }

        let span = i64::try_from(self.board.width.max(self.board.rows())).unwrap_or(i64::MAX);
        let (x, y) = (i64::from(piece.x), i64::from(piece.y));
        if x < -span || x > 2 * span || y < -span || y > 2 * span {
            return Err(StateError::PieceOutOfRange {
                x: piece.x,
                y: piece.y,
            });
        }
        Ok(())
    }

    /// Identifier of the player whose turn it is.
    pub fn active_player(&self) -> Option<&str> {
        self.players.get(self.current_player).map(String::as_str)
    }

    /// Turn-ownership check.
    pub fn is_turn_of(&self, player_id: &str) -> bool {
        self.active_player() == Some(player_id)
    }
}
