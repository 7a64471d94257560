//! Shared types module - wire data model, commands and constants
//!
//! This crate defines the data exchanged between the duel client and the
//! authoritative game server, plus the timing constants the client core is
//! tuned with. Everything here is plain data; no I/O and no game rules.
//!
//! # Board Dimensions
//!
//! The server allocates `BOARD_HEIGHT + BUFFER_ROWS` rows:
//!
//! - **Width**: 10 columns (indexed 0-9)
//! - **Visible height**: 20 rows
//! - **Buffer rows**: 4 hidden rows above the playfield (row indices 0-3)
//! - **Spawn position**: (3, 0), i.e. inside the buffer
//!
//! # Client Timing Constants
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `COMMAND_COOLDOWN_MS` | 100 | Minimum gap between two accepted commands of one kind |
//! | `PENDING_IDLE_MS` | 3000 | Idle time after which unacknowledged predictions are discarded |
//! | `RECONNECT_DELAY_MS` | 3000 | Fixed wait between reconnect attempts |
//! | `MAX_PENDING_MOVES` | 10 | Prediction ledger capacity |
//!
//! # Examples
//!
//! ```
//! use duel_tetris_types::{Command, CommandKind, BOARD_WIDTH};
//!
//! let kind = CommandKind::from_str("left").unwrap();
//! assert_eq!(kind, CommandKind::MoveLeft);
//! assert_eq!(kind.as_str(), "left");
//!
//! let cmd = Command::new(kind, 7);
//! assert_eq!(cmd.sequence_number, 7);
//!
//! assert_eq!(BOARD_WIDTH, 10);
//! ```

use serde::{Deserialize, Serialize};

pub mod state;

pub use state::{Board, GameState, Piece, PieceKind, StateError};

/// Board width in cells (10 columns)
pub const BOARD_WIDTH: usize = 10;

/// Visible board height in cells (20 rows)
pub const BOARD_HEIGHT: usize = 20;

/// Hidden rows above the visible playfield
pub const BUFFER_ROWS: usize = 4;

/// Column new pieces spawn at
pub const SPAWN_X: i32 = 3;

/// Row new pieces spawn at (counted including buffer rows)
pub const SPAWN_Y: i32 = 0;

/// Per-command-kind debounce window
pub const COMMAND_COOLDOWN_MS: u64 = 100;

/// Unacknowledged predictions older than this (with no new input) are dropped
pub const PENDING_IDLE_MS: u64 = 3000;

/// Fixed delay between reconnect attempts
pub const RECONNECT_DELAY_MS: u64 = 3000;

/// Maximum number of in-flight predicted moves
pub const MAX_PENDING_MOVES: usize = 10;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_tuning_defaults() {
        assert_eq!(COMMAND_COOLDOWN_MS, 100);
        assert_eq!(PENDING_IDLE_MS, 3000);
        assert_eq!(RECONNECT_DELAY_MS, 3000);
        assert_eq!(MAX_PENDING_MOVES, 10);
        assert_eq!(BUFFER_ROWS, 4);
    }

    #[test]
    fn command_serializes_to_server_shape() {
        let cmd = Command::new(CommandKind::Rotate, 42);
        let json = serde_json::to_string(&cmd).unwrap();
        assert_eq!(json, r#"{"command":"rotate","sequenceNumber":42}"#);
    }

    #[test]
    fn command_kind_wire_names() {
        for kind in CommandKind::ALL {
            assert_eq!(CommandKind::from_str(kind.as_str()), Some(kind));
        }
        assert_eq!(CommandKind::from_str("DOWN"), Some(CommandKind::SoftDrop));
        assert_eq!(CommandKind::from_str("hardDrop"), None);
    }
}

/// Movement commands a player can issue
///
/// The server understands exactly four commands. Hard drop, hold and pause
/// do not exist in the duel ruleset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommandKind {
    /// Move piece one cell left
    #[serde(rename = "left")]
    MoveLeft,
    /// Move piece one cell right
    #[serde(rename = "right")]
    MoveRight,
    /// Move piece one cell down
    #[serde(rename = "down")]
    SoftDrop,
    /// Rotate piece 90° clockwise about its bounding box
    #[serde(rename = "rotate")]
    Rotate,
}

impl CommandKind {
    /// Every command kind, in a stable order.
    pub const ALL: [CommandKind; 4] = [
        CommandKind::MoveLeft,
        CommandKind::MoveRight,
        CommandKind::SoftDrop,
        CommandKind::Rotate,
    ];

    /// Parse command kind from its wire name (case-insensitive)
    ///
    /// # Examples
    ///
    /// ```
    /// use duel_tetris_types::CommandKind;
    ///
    /// assert_eq!(CommandKind::from_str("right"), Some(CommandKind::MoveRight));
    /// assert_eq!(CommandKind::from_str("Rotate"), Some(CommandKind::Rotate));
    /// assert_eq!(CommandKind::from_str("hold"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "left" => Some(CommandKind::MoveLeft),
            "right" => Some(CommandKind::MoveRight),
            "down" => Some(CommandKind::SoftDrop),
            "rotate" => Some(CommandKind::Rotate),
            _ => None,
        }
    }

    /// Wire name sent in the `command` field
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandKind::MoveLeft => "left",
            CommandKind::MoveRight => "right",
            CommandKind::SoftDrop => "down",
            CommandKind::Rotate => "rotate",
        }
    }

    /// Dense index, used for per-kind bookkeeping tables.
    pub fn index(&self) -> usize {
        match self {
            CommandKind::MoveLeft => 0,
            CommandKind::MoveRight => 1,
            CommandKind::SoftDrop => 2,
            CommandKind::Rotate => 3,
        }
    }
}

/// A command accepted by the client and sent to the server.
///
/// `sequence_number` is assigned by the client at acceptance time. The server
/// echoes the last processed number back in every snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Command {
    pub command: CommandKind,
    pub sequence_number: u64,
}

impl Command {
    pub fn new(command: CommandKind, sequence_number: u64) -> Self {
        Self {
            command,
            sequence_number,
        }
    }
}
