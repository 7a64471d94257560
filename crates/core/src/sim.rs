//! Local simulator - the client's mirror of the server's movement rules.
//!
//! Everything here is pure. Prediction and reconciliation both go through
//! [`apply_move`], so the two paths cannot disagree about what a command does.
//! Any divergence from the server's rules shows up as rubber-banding.

use crate::types::{Board, CommandKind, GameState, Piece};

/// Check whether `piece` fits on `board` with its anchor at (`new_x`, `new_y`).
///
/// Occupied shape cells must land inside the horizontal bounds and above the
/// bottom of the grid. Cells in rows above the grid (negative y) skip the
/// overlap check but not the bounds check.
pub fn validate_move(board: &Board, piece: &Piece, new_x: i32, new_y: i32) -> bool {
    let width = board.width as i32;
    let rows = board.rows() as i32;

    piece.occupied().all(|(col, row)| {
        let (Some(x), Some(y)) = (new_x.checked_add(col), new_y.checked_add(row)) else {
            return false;
        };
        if x < 0 || x >= width || y >= rows {
            return false;
        }
        y < 0 || !board.is_occupied(x, y)
    })
}

/// Rotate the shape 90° clockwise about its bounding box.
///
/// For R rows and C columns, `rotated[c][R-1-r] = shape[r][c]`. Short rows are
/// padded to the widest one. Position and color are kept; the caller
/// re-validates the new footprint.
pub fn rotate(piece: &Piece) -> Piece {
    let rows = piece.shape.len();
    let cols = piece.shape.iter().map(Vec::len).max().unwrap_or(0);

    let mut rotated = vec![vec![false; rows]; cols];
    for (r, line) in piece.shape.iter().enumerate() {
        for (c, &filled) in line.iter().enumerate() {
            rotated[c][rows - 1 - r] = filled;
        }
    }

    Piece {
        shape: rotated,
        ..piece.clone()
    }
}

/// The piece `kind` would produce on `state`, if the result is legal.
///
/// Returns `None` when there is no active piece, the game is over, or the
/// candidate collides or leaves the coordinate range.
pub fn candidate(state: &GameState, kind: CommandKind) -> Option<Piece> {
    if state.game_over {
        return None;
    }
    let piece = state.current_piece.as_ref()?;

    let moved = match kind {
        CommandKind::MoveLeft => Piece {
            x: piece.x.checked_sub(1)?,
            ..piece.clone()
        },
        CommandKind::MoveRight => Piece {
            x: piece.x.checked_add(1)?,
            ..piece.clone()
        },
        CommandKind::SoftDrop => Piece {
            y: piece.y.checked_add(1)?,
            ..piece.clone()
        },
        CommandKind::Rotate => rotate(piece),
    };

    validate_move(&state.board, &moved, moved.x, moved.y).then_some(moved)
}

/// Apply `kind` to `state`, producing a new state.
///
/// An illegal move yields an unchanged copy.
pub fn apply_move(state: &GameState, kind: CommandKind) -> GameState {
    match candidate(state, kind) {
        Some(piece) => GameState {
            current_piece: Some(piece),
            ..state.clone()
        },
        None => state.clone(),
    }
}
