//! Screen model
//!
//! An addressable grid of cells plus cursor and scroll-region state, fed
//! by [`TerminalEvent`]s. Applying an event never fails: out-of-range
//! parameters are clamped and unknown sequences are ignored, matching
//! real terminal leniency.

use unicode_width::UnicodeWidthChar;

use super::cell::{Cell, Color};
use super::cursor::{Cursor, SavedCursor};
use crate::scanner::TerminalEvent;

/// Default grid width
pub const DEFAULT_COLS: usize = 100;
/// Default grid height
pub const DEFAULT_ROWS: usize = 30;

/// The terminal screen: grid, cursor, and scroll region
#[derive(Debug, Clone)]
pub struct Screen {
    cols: usize,
    rows: usize,
    /// Row-major grid; every row holds exactly `cols` cells
    grid: Vec<Vec<Cell>>,
    cursor: Cursor,
    saved_cursor: SavedCursor,
    /// Scroll region top (0-indexed, inclusive)
    scroll_top: usize,
    /// Scroll region bottom (0-indexed, inclusive)
    scroll_bottom: usize,
    /// Latched bell flag, cleared by `take_bell`
    bell: bool,
}

impl Default for Screen {
    fn default() -> Self {
        Self::new(DEFAULT_COLS, DEFAULT_ROWS)
    }
}

impl Screen {
    /// Create a new screen with the given dimensions (minimum 1x1)
    pub fn new(cols: usize, rows: usize) -> Self {
        let cols = cols.max(1);
        let rows = rows.max(1);
        Self {
            cols,
            rows,
            grid: vec![vec![Cell::default(); cols]; rows],
            cursor: Cursor::new(),
            saved_cursor: SavedCursor::default(),
            scroll_top: 0,
            scroll_bottom: rows - 1,
            bell: false,
        }
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    pub fn scroll_top(&self) -> usize {
        self.scroll_top
    }

    pub fn scroll_bottom(&self) -> usize {
        self.scroll_bottom
    }

    /// Cell at (row, col), if in bounds
    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.grid.get(row).and_then(|r| r.get(col))
    }

    /// Full row of cells, if in bounds
    pub fn row(&self, row: usize) -> Option<&[Cell]> {
        self.grid.get(row).map(|r| r.as_slice())
    }

    /// Row rendered as plain text with trailing blanks trimmed
    pub fn row_text(&self, row: usize) -> String {
        let mut text = String::new();
        if let Some(cells) = self.grid.get(row) {
            for cell in cells {
                if cell.is_wide_continuation() {
                    continue;
                }
                text.push(cell.ch);
            }
        }
        while text.ends_with(' ') {
            text.pop();
        }
        text
    }

    /// Take and clear the latched bell flag
    pub fn take_bell(&mut self) -> bool {
        std::mem::take(&mut self.bell)
    }

    /// Apply one terminal event to the grid/cursor/region state
    pub fn apply(&mut self, event: TerminalEvent) {
        match event {
            TerminalEvent::Print(c) => self.print_char(c),
            TerminalEvent::Control(byte) => self.execute_control(byte),
            TerminalEvent::Csi { params, final_byte } => self.execute_csi(&params, final_byte),
            TerminalEvent::Esc(final_byte) => self.execute_esc(final_byte),
            TerminalEvent::Osc(payload) => {
                // Title setting and friends are out of scope; the payload
                // was parsed so it cannot leak into the grid
                tracing::trace!(payload_len = payload.len(), "OSC ignored");
            }
        }
    }

    /// Write a character with the pen style and advance the cursor,
    /// wrapping unconditionally at the right margin
    fn print_char(&mut self, c: char) {
        let width = UnicodeWidthChar::width(c).unwrap_or(0);
        if width == 0 {
            // Zero-width (combining) characters have no cell of their own
            return;
        }

        // A wide glyph cannot start in the last column: blank it and wrap
        if width == 2 && self.cursor.col == self.cols - 1 {
            self.grid[self.cursor.row][self.cursor.col].clear();
            self.cursor.col = 0;
            self.advance_row();
        }

        let (row, col) = (self.cursor.row, self.cursor.col);
        let cell = &mut self.grid[row][col];
        cell.ch = c;
        cell.width = width as u8;
        cell.fg = self.cursor.fg;
        cell.bg = self.cursor.bg;
        cell.style = self.cursor.style;

        if width == 2 && col + 1 < self.cols {
            let cont = &mut self.grid[row][col + 1];
            cont.ch = ' ';
            cont.width = 0;
            cont.fg = self.cursor.fg;
            cont.bg = self.cursor.bg;
            cont.style = self.cursor.style;
        }

        self.cursor.col += width;
        if self.cursor.col >= self.cols {
            self.cursor.col = 0;
            self.advance_row();
        }
    }

    /// Move the cursor down one row, scrolling the region when at its
    /// bottom; rows outside the region never move
    fn advance_row(&mut self) {
        if self.cursor.row == self.scroll_bottom {
            self.scroll_region_up(1);
        } else if self.cursor.row < self.rows - 1 {
            self.cursor.row += 1;
        }
    }

    fn execute_control(&mut self, byte: u8) {
        match byte {
            // BEL
            0x07 => {
                self.bell = true;
            }
            // BS
            0x08 => {
                self.cursor.move_left(1);
            }
            // HT: next multiple of 8, capped at the last column
            0x09 => {
                let next = (self.cursor.col / 8 + 1) * 8;
                self.cursor.col = next.min(self.cols - 1);
            }
            // LF, VT, FF: newline mode, the column returns to 0
            0x0A | 0x0B | 0x0C => {
                self.advance_row();
                self.cursor.carriage_return();
            }
            // CR
            0x0D => {
                self.cursor.carriage_return();
            }
            _ => {
                tracing::trace!(byte, "control ignored");
            }
        }
    }

    fn execute_csi(&mut self, params: &[u16], final_byte: u8) {
        let n = TerminalEvent::csi_param(params, 0, 1) as usize;

        match final_byte {
            // CUU - Cursor Up
            b'A' => self.cursor.move_up(n),
            // CUD - Cursor Down
            b'B' => self.cursor.move_down(n, self.rows),
            // CUF - Cursor Forward
            b'C' => self.cursor.move_right(n, self.cols),
            // CUB - Cursor Backward
            b'D' => self.cursor.move_left(n),
            // CHA - Cursor Character Absolute
            b'G' => {
                let col = (TerminalEvent::csi_param(params, 0, 1) as usize).saturating_sub(1);
                self.cursor.col = col.min(self.cols - 1);
            }
            // CUP / HVP - absolute position, 1-indexed
            b'H' | b'f' => {
                let row = (TerminalEvent::csi_param(params, 0, 1) as usize).saturating_sub(1);
                let col = (TerminalEvent::csi_param(params, 1, 1) as usize).saturating_sub(1);
                self.cursor.move_to(row, col, self.rows, self.cols);
            }
            // ED - Erase in Display
            b'J' => self.erase_in_display(params.first().copied().unwrap_or(0)),
            // EL - Erase in Line
            b'K' => self.erase_in_line(params.first().copied().unwrap_or(0)),
            // SGR - Select Graphic Rendition
            b'm' => self.apply_sgr(params),
            // DECSTBM - Set Top and Bottom Margins
            b'r' => {
                let top = (TerminalEvent::csi_param(params, 0, 1) as usize).saturating_sub(1);
                let bottom =
                    (TerminalEvent::csi_param(params, 1, self.rows as u16) as usize)
                        .saturating_sub(1);
                self.set_scroll_region(top, bottom);
            }
            _ => {
                tracing::debug!(final_byte, ?params, "unhandled CSI");
            }
        }
    }

    fn execute_esc(&mut self, final_byte: u8) {
        match final_byte {
            // DECSC - save cursor and pen
            b'7' => {
                self.saved_cursor = self.cursor.save();
            }
            // DECRC - restore cursor and pen
            b'8' => {
                let saved = self.saved_cursor;
                self.cursor.restore(&saved, self.rows, self.cols);
            }
            // IND - index
            b'D' => self.advance_row(),
            // NEL - next line
            b'E' => {
                self.advance_row();
                self.cursor.col = 0;
            }
            // RI - reverse index
            b'M' => self.reverse_index(),
            // RIS - full reset
            b'c' => self.reset(),
            _ => {
                tracing::debug!(final_byte, "unhandled ESC");
            }
        }
    }

    /// Move the cursor up one row, scrolling the region down when at its top
    fn reverse_index(&mut self) {
        if self.cursor.row == self.scroll_top {
            self.scroll_region_down(1);
        } else if self.cursor.row > 0 {
            self.cursor.row -= 1;
        }
    }

    /// Shift the scroll region up by n rows; blank rows appear at the
    /// region bottom, rows outside the region are untouched
    pub fn scroll_region_up(&mut self, n: usize) {
        if n == 0 {
            return;
        }
        let (top, bottom) = (self.scroll_top, self.scroll_bottom);
        for i in top..=bottom {
            if i + n <= bottom {
                self.grid[i] = std::mem::replace(
                    &mut self.grid[i + n],
                    vec![Cell::default(); self.cols],
                );
            } else {
                self.grid[i] = vec![Cell::default(); self.cols];
            }
        }
    }

    /// Shift the scroll region down by n rows; blank rows appear at the top
    pub fn scroll_region_down(&mut self, n: usize) {
        if n == 0 {
            return;
        }
        let (top, bottom) = (self.scroll_top, self.scroll_bottom);
        for i in (top..=bottom).rev() {
            if i >= top + n {
                self.grid[i] = std::mem::replace(
                    &mut self.grid[i - n],
                    vec![Cell::default(); self.cols],
                );
            } else {
                self.grid[i] = vec![Cell::default(); self.cols];
            }
        }
    }

    /// Set the scroll region (0-indexed, inclusive), clamped to the grid.
    /// An inverted region resets to the full screen; the cursor homes.
    pub fn set_scroll_region(&mut self, top: usize, bottom: usize) {
        let top = top.min(self.rows - 1);
        let bottom = bottom.min(self.rows - 1);

        if top < bottom {
            self.scroll_top = top;
            self.scroll_bottom = bottom;
        } else {
            self.scroll_top = 0;
            self.scroll_bottom = self.rows - 1;
        }

        self.cursor.move_to(0, 0, self.rows, self.cols);
    }

    /// Erase in display: 0 = cursor to end, 1 = start to cursor (inclusive),
    /// 2 = whole screen. Erased cells become fully default; the cursor does
    /// not move.
    pub fn erase_in_display(&mut self, mode: u16) {
        let (row, col) = (self.cursor.row, self.cursor.col);
        match mode {
            0 => {
                for cell in &mut self.grid[row][col..] {
                    cell.clear();
                }
                for r in &mut self.grid[row + 1..] {
                    for cell in r.iter_mut() {
                        cell.clear();
                    }
                }
            }
            1 => {
                for r in &mut self.grid[..row] {
                    for cell in r.iter_mut() {
                        cell.clear();
                    }
                }
                for cell in &mut self.grid[row][..=col] {
                    cell.clear();
                }
            }
            2 => {
                for r in &mut self.grid {
                    for cell in r.iter_mut() {
                        cell.clear();
                    }
                }
            }
            _ => {}
        }
    }

    /// Erase in line with the same 0/1/2 semantics as `erase_in_display`
    pub fn erase_in_line(&mut self, mode: u16) {
        let (row, col) = (self.cursor.row, self.cursor.col);
        match mode {
            0 => {
                for cell in &mut self.grid[row][col..] {
                    cell.clear();
                }
            }
            1 => {
                for cell in &mut self.grid[row][..=col] {
                    cell.clear();
                }
            }
            2 => {
                for cell in &mut self.grid[row] {
                    cell.clear();
                }
            }
            _ => {}
        }
    }

    /// Apply SGR parameters to the pen, left to right
    fn apply_sgr(&mut self, params: &[u16]) {
        if params.is_empty() {
            self.cursor.reset_pen();
            return;
        }

        for &param in params {
            match param {
                0 => self.cursor.reset_pen(),
                1 => self.cursor.style.bold = true,
                4 => self.cursor.style.underline = true,
                7 => self.cursor.style.reverse = true,
                22 => self.cursor.style.bold = false,
                24 => self.cursor.style.underline = false,
                27 => self.cursor.style.reverse = false,
                30..=37 => self.cursor.fg = Color::Indexed((param - 30) as u8),
                39 => self.cursor.fg = Color::Default,
                40..=47 => self.cursor.bg = Color::Indexed((param - 40) as u8),
                49 => self.cursor.bg = Color::Default,
                90..=97 => self.cursor.fg = Color::Indexed((param - 90 + 8) as u8),
                100..=107 => self.cursor.bg = Color::Indexed((param - 100 + 8) as u8),
                _ => {
                    tracing::trace!(param, "SGR ignored");
                }
            }
        }
    }

    /// Reset the screen to its initial state (RIS)
    pub fn reset(&mut self) {
        for row in &mut self.grid {
            for cell in row.iter_mut() {
                cell.clear();
            }
        }
        self.cursor = Cursor::new();
        self.saved_cursor = SavedCursor::default();
        self.scroll_top = 0;
        self.scroll_bottom = self.rows - 1;
        self.bell = false;
    }

    /// Resize the grid, clamping the cursor and resetting the scroll region
    pub fn resize(&mut self, cols: usize, rows: usize) {
        let cols = cols.max(1);
        let rows = rows.max(1);
        if cols == self.cols && rows == self.rows {
            return;
        }

        for row in &mut self.grid {
            row.resize(cols, Cell::default());
        }
        self.grid.resize(rows, vec![Cell::default(); cols]);

        self.cols = cols;
        self.rows = rows;
        self.scroll_top = 0;
        self.scroll_bottom = rows - 1;
        self.cursor.row = self.cursor.row.min(rows - 1);
        self.cursor.col = self.cursor.col.min(cols - 1);
    }
}
