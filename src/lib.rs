//! Duel Tetris (workspace facade crate).
//!
//! Re-exports the workspace crates under one name so the binary, the
//! integration tests and the benchmarks can use `duel_tetris::{core, adapter,
//! term, input, types}`. The implementation lives under `crates/`.

pub use duel_tetris_adapter as adapter;
pub use duel_tetris_core as core;
pub use duel_tetris_input as input;
pub use duel_tetris_term as term;
pub use duel_tetris_types as types;
