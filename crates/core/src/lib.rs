//! Client core - prediction and reconciliation, no I/O
//!
//! Everything the client decides about the game lives here. The server is the
//! authority; this crate only guesses ahead of it and folds its answers back
//! in. Nothing here touches the network or the terminal, so every path is
//! exercised by plain unit tests with injected `Instant`s.
//!
//! # Module Structure
//!
//! - [`sim`]: movement rules mirrored from the server (bounds, collision, rotation)
//! - [`gate`]: per-keystroke admission: connection, turn, cooldown, legality
//! - [`ledger`]: bounded list of commands sent but not yet acknowledged
//! - [`reconcile`]: merge a server snapshot with the pending commands
//! - [`session`]: one player's prediction state, tying the above together
//!
//! # Flow
//!
//! | Event | Entry point | Effect |
//! |-------|-------------|--------|
//! | Key press | [`Session::submit`] | gate, predict, record, return command to send |
//! | Snapshot | [`Session::on_snapshot`] | validate, drop acknowledged, replay the rest |
//! | Timer | [`Session::expire_if_idle`] | drop stale predictions after 3s without input |
//!
//! # Example
//!
//! ```
//! use std::time::Instant;
//! use duel_tetris_core::{Session, SessionConfig};
//! use duel_tetris_types::{CommandKind, GameState, PieceKind};
//!
//! let mut session = Session::new("alice", SessionConfig::default());
//! let mut snapshot = GameState::new(vec!["alice".into(), "bob".into()])
//!     .with_piece(PieceKind::T.spawn("#F538FF"));
//! snapshot.sequence_number = Some(0);
//! session.on_snapshot(snapshot).unwrap();
//!
//! let cmd = session.submit(CommandKind::MoveRight, Instant::now(), true).unwrap();
//! assert_eq!(cmd.sequence_number, 1);
//! assert_eq!(session.state().unwrap().current_piece.as_ref().unwrap().x, 4);
//! ```

pub use duel_tetris_types as types;

pub mod gate;
pub mod ledger;
pub mod reconcile;
pub mod session;
pub mod sim;

pub use gate::{CommandGate, Rejection};
pub use ledger::{PendingMove, PredictionLedger};
pub use reconcile::reconcile;
pub use session::{Session, SessionConfig};
pub use sim::{apply_move, rotate, validate_move};
