//! Terminal "game renderer" module.
//!
//! A small, game-oriented rendering layer: the view draws a server snapshot
//! into a framebuffer of styled cells, and the renderer flushes only what
//! changed to the terminal. No widget toolkit is involved.
//!
//! Board cells are drawn 2 columns wide to compensate for terminal glyph
//! aspect ratio. The hidden buffer rows above the playfield are never drawn.

pub mod fb;
pub mod game_view;
pub mod renderer;

pub use duel_tetris_types as types;

pub use fb::{Cell, CellStyle, FrameBuffer, Rgb};
pub use game_view::{GameView, StatusView, Viewport};
pub use renderer::{encode_diff_into, encode_full_into, TerminalRenderer};
