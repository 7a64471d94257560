//! Network adapter - talks to the authoritative game server
//!
//! This crate connects the client core to a running duel server. It owns all
//! I/O: HTTP calls to bootstrap a room and a long-lived WebSocket that carries
//! commands out and state snapshots in.
//!
//! # Protocol Overview
//!
//! 1. **Create**: `GET /create-room` returns a room id as plain text
//! 2. **Join**: `GET /join-room?roomID=<id>` returns `{"message", "playerID"}`
//! 3. **Play**: open `ws://<host>/ws?roomID=<id>&playerID=<id>`
//! 4. **Command**: client sends `{"command":"left","sequenceNumber":N}`
//! 5. **Snapshot**: server pushes the full game state after every change
//!
//! # Environment Variables
//!
//! - `DUEL_TETRIS_SERVER`: `host[:port]` of the server (default: "localhost:8080")
//! - `DUEL_TETRIS_RECONNECT_MS`: delay between reconnect attempts (default: 3000)
//! - `DUEL_TETRIS_COOLDOWN_MS`: per-command debounce (default: 100)
//! - `DUEL_TETRIS_IDLE_MS`: pending-prediction expiry (default: 3000)
//! - `DUEL_TETRIS_LOG_PATH`: file to write logs to
//!
//! # Implementation
//!
//! - [`Supervisor`] owns a tokio runtime and exposes a synchronous API to the
//!   game loop
//! - [`connection`] runs the WebSocket in a task with fixed-delay reconnect
//! - [`lobby`] uses a hyper client for the two bootstrap calls
//! - [`protocol`] holds the JSON codec

pub mod config;
pub mod connection;
pub mod error;
pub mod lobby;
pub mod protocol;
pub mod supervisor;

pub use duel_tetris_core as core;
pub use duel_tetris_types as types;

pub use config::ClientConfig;
pub use connection::{run_connection, ConnectionState};
pub use error::{ClientError, LobbyError, ProtocolError};
pub use protocol::{decode_snapshot, encode_command, JoinResponse};
pub use supervisor::Supervisor;
