//! Terminal input module.
//!
//! Maps `crossterm` key events onto the four server commands. There is no
//! auto-repeat handling here: terminal key repeat plus the per-command
//! cooldown in the core gives the same feel without extra state.

pub mod map;

pub use duel_tetris_types as types;

pub use map::{handle_key_event, should_quit};
