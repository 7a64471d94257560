//! GameView: maps a server `GameState` into a terminal framebuffer.
//!
//! This module is pure (no I/O). It can be unit-tested.

use crate::fb::{CellStyle, FrameBuffer, Rgb};
use crate::types::{GameState, Piece, BOARD_HEIGHT, BOARD_WIDTH, BUFFER_ROWS};

/// Terminal viewport dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

/// Client-side facts shown next to the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusView<'a> {
    pub room_id: &'a str,
    pub connection: &'a str,
    pub pending: usize,
}

const PLAYFIELD_BG: Rgb = Rgb::new(30, 30, 40);
const PANEL_BG: Rgb = Rgb::new(0, 0, 0);

/// Screen placement of the board frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Layout {
    start_x: u16,
    start_y: u16,
    frame_w: u16,
    frame_h: u16,
}

/// A lightweight terminal renderer for the duel board.
pub struct GameView {
    /// Board cell width in terminal columns.
    cell_w: u16,
    /// Board cell height in terminal rows.
    cell_h: u16,
}

impl Default for GameView {
    fn default() -> Self {
        // 2x1 helps compensate for typical terminal glyph aspect ratio.
        Self {
            cell_w: 2,
            cell_h: 1,
        }
    }
}

impl GameView {
    pub fn new(cell_w: u16, cell_h: u16) -> Self {
        Self {
            cell_w: cell_w.max(1),
            cell_h: cell_h.max(1),
        }
    }

    /// Render into an existing framebuffer, resizing it to `viewport`.
    ///
    /// `state` is `None` until the first snapshot arrives.
    pub fn render_into(
        &self,
        state: Option<&GameState>,
        status: &StatusView<'_>,
        local_player: &str,
        viewport: Viewport,
        fb: &mut FrameBuffer,
    ) {
        fb.resize(viewport.width, viewport.height);
        fb.clear(CellStyle::default().cell(' '));

        let (cols, rows) = state.map_or((BOARD_WIDTH, BOARD_HEIGHT), |s| {
            (s.board.width, s.board.rows().saturating_sub(BUFFER_ROWS))
        });
        let layout = self.layout(cols as u16, rows as u16, viewport);

        fb.fill_rect(
            layout.start_x + 1,
            layout.start_y + 1,
            layout.frame_w - 2,
            layout.frame_h - 2,
            ' ',
            CellStyle::new(Rgb::new(80, 80, 90), PLAYFIELD_BG),
        );
        draw_border(fb, layout, CellStyle::new(Rgb::new(200, 200, 200), PANEL_BG));

        let Some(state) = state else {
            self.draw_overlay_text(fb, layout, "WAITING FOR SERVER");
            self.draw_side_panel(fb, None, status, local_player, viewport, layout);
            return;
        };

        for (y, row) in state.board.visible_rows().enumerate() {
            for (x, color) in row.iter().enumerate() {
                if color.is_empty() {
                    self.fill_cell(fb, layout, x as u16, y as u16, '·', empty_style());
                } else {
                    self.fill_cell(fb, layout, x as u16, y as u16, '█', block_style(color));
                }
            }
        }

        if let Some(piece) = state.current_piece.as_ref() {
            self.draw_piece(fb, layout, piece, cols, rows);
        }

        self.draw_side_panel(fb, Some(state), status, local_player, viewport, layout);

        if state.game_over {
            self.draw_overlay_text(fb, layout, "GAME OVER");
        }
    }

    /// Convenience helper that allocates a new framebuffer.
    pub fn render(
        &self,
        state: Option<&GameState>,
        status: &StatusView<'_>,
        local_player: &str,
        viewport: Viewport,
    ) -> FrameBuffer {
        let mut fb = FrameBuffer::new(viewport.width, viewport.height);
        self.render_into(state, status, local_player, viewport, &mut fb);
        fb
    }

    fn layout(&self, cols: u16, rows: u16, viewport: Viewport) -> Layout {
        let frame_w = cols.saturating_mul(self.cell_w).saturating_add(2);
        let frame_h = rows.saturating_mul(self.cell_h).saturating_add(2);
        Layout {
            start_x: viewport.width.saturating_sub(frame_w) / 2,
            start_y: viewport.height.saturating_sub(frame_h) / 2,
            frame_w,
            frame_h,
        }
    }

    fn draw_piece(&self, fb: &mut FrameBuffer, layout: Layout, piece: &Piece, cols: usize, rows: usize) {
        let style = block_style(&piece.color).bold();
        for (col, row) in piece.occupied() {
            let x = piece.x.checked_add(col);
            // Board rows count the hidden buffer; screen rows do not.
            let y = piece
                .y
                .checked_add(row)
                .and_then(|y| y.checked_sub(BUFFER_ROWS as i32));
            let (Some(x), Some(y)) = (x, y) else {
                continue;
            };
            if x >= 0 && (x as usize) < cols && y >= 0 && (y as usize) < rows {
                self.fill_cell(fb, layout, x as u16, y as u16, '█', style);
            }
        }
    }

    fn fill_cell(&self, fb: &mut FrameBuffer, layout: Layout, x: u16, y: u16, ch: char, style: CellStyle) {
        let px = (layout.start_x + 1).saturating_add(x.saturating_mul(self.cell_w));
        let py = (layout.start_y + 1).saturating_add(y.saturating_mul(self.cell_h));
        fb.fill_rect(px, py, self.cell_w, self.cell_h, ch, style);
    }

    fn draw_side_panel(
        &self,
        fb: &mut FrameBuffer,
        state: Option<&GameState>,
        status: &StatusView<'_>,
        local_player: &str,
        viewport: Viewport,
        layout: Layout,
    ) {
        let panel_x = layout.start_x.saturating_add(layout.frame_w).saturating_add(2);
        if panel_x >= viewport.width || viewport.width - panel_x < 12 {
            return;
        }

        let label = CellStyle::default().bold();
        let value = CellStyle::new(Rgb::new(200, 200, 200), PANEL_BG);
        let mut y = layout.start_y;

        fb.put_str(panel_x, y, "ROOM", label);
        fb.put_str(panel_x, y + 1, status.room_id, value);
        y += 3;

        if let Some(state) = state {
            fb.put_str(panel_x, y, "SCORE", label);
            fb.put_u64(panel_x, y + 1, state.score, value);
            y += 3;

            fb.put_str(panel_x, y, "LEVEL", label);
            fb.put_u64(panel_x, y + 1, u64::from(state.level), value);
            y += 3;

            fb.put_str(panel_x, y, "PIECES", label);
            fb.put_u64(panel_x, y + 1, u64::from(state.pieces_placed), value);
            y += 3;

            fb.put_str(panel_x, y, "NEXT", label);
            y += 1;
            if let Some(next) = state.next_piece.as_ref() {
                let style = block_style(&next.color).bold();
                for (r, line) in next.shape.iter().enumerate() {
                    for (c, &filled) in line.iter().enumerate() {
                        if filled {
                            let x = panel_x + c as u16 * 2;
                            fb.put_str(x, y + r as u16, "██", style);
                        }
                    }
                }
                y += next.shape.len() as u16;
            } else {
                fb.put_str(panel_x, y, "-", value);
                y += 1;
            }
            y += 1;

            fb.put_str(panel_x, y, "TURN", label);
            match state.active_player() {
                Some(p) if p == local_player => {
                    fb.put_str(panel_x, y + 1, "YOUR MOVE", value.bold());
                }
                Some(p) => {
                    fb.put_str(panel_x, y + 1, p, value.dim());
                }
                None => {
                    fb.put_str(panel_x, y + 1, "-", value);
                }
            }
            y += 3;
        }

        fb.put_str(panel_x, y, "LINK", label);
        fb.put_str(panel_x, y + 1, status.connection, value);
        y += 3;

        fb.put_str(panel_x, y, "PENDING", label);
        fb.put_u64(panel_x, y + 1, status.pending as u64, value);
    }

    fn draw_overlay_text(&self, fb: &mut FrameBuffer, layout: Layout, text: &str) {
        let mid_y = layout.start_y.saturating_add(layout.frame_h / 2);
        let text_w = text.chars().count() as u16;
        let x = layout
            .start_x
            .saturating_add(layout.frame_w.saturating_sub(text_w) / 2);
        let style = CellStyle::new(Rgb::new(255, 255, 255), PANEL_BG).bold();
        fb.put_str(x, mid_y, text, style);
    }
}

fn draw_border(fb: &mut FrameBuffer, layout: Layout, style: CellStyle) {
    let Layout {
        start_x: x,
        start_y: y,
        frame_w: w,
        frame_h: h,
    } = layout;
    if w < 2 || h < 2 {
        return;
    }

    fb.put_char(x, y, '┌', style);
    fb.put_char(x + w - 1, y, '┐', style);
    fb.put_char(x, y + h - 1, '└', style);
    fb.put_char(x + w - 1, y + h - 1, '┘', style);
    for dx in 1..w - 1 {
        fb.put_char(x + dx, y, '─', style);
        fb.put_char(x + dx, y + h - 1, '─', style);
    }
    for dy in 1..h - 1 {
        fb.put_char(x, y + dy, '│', style);
        fb.put_char(x + w - 1, y + dy, '│', style);
    }
}

fn empty_style() -> CellStyle {
    CellStyle::new(Rgb::new(90, 90, 100), PLAYFIELD_BG).dim()
}

fn block_style(color: &str) -> CellStyle {
    CellStyle::new(Rgb::from_hex_or_grey(color), PLAYFIELD_BG)
}
