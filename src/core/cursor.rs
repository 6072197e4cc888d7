//! Cursor state
//!
//! Tracks the write position and the pen: the pending SGR state stamped
//! onto every printed cell. Also holds the saved-cursor slot for
//! ESC 7 / ESC 8.

use serde::{Deserialize, Serialize};

use super::cell::{Color, Style};

/// Cursor position plus the pending SGR pen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Cursor {
    /// Row position (0-indexed)
    pub row: usize,
    /// Column position (0-indexed)
    pub col: usize,
    /// Pending foreground color for the next printed cell
    pub fg: Color,
    /// Pending background color for the next printed cell
    pub bg: Color,
    /// Pending style attributes for the next printed cell
    pub style: Style,
}

/// Saved cursor state for ESC 7 / ESC 8
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SavedCursor {
    pub row: usize,
    pub col: usize,
    pub fg: Color,
    pub bg: Color,
    pub style: Style,
}

impl Cursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move to absolute position, clamping to bounds
    pub fn move_to(&mut self, row: usize, col: usize, rows: usize, cols: usize) {
        self.row = row.min(rows.saturating_sub(1));
        self.col = col.min(cols.saturating_sub(1));
    }

    /// Move up by n rows, stopping at row 0
    pub fn move_up(&mut self, n: usize) {
        self.row = self.row.saturating_sub(n);
    }

    /// Move down by n rows, stopping at the last row
    pub fn move_down(&mut self, n: usize, rows: usize) {
        self.row = (self.row + n).min(rows.saturating_sub(1));
    }

    /// Move left by n columns, stopping at column 0
    pub fn move_left(&mut self, n: usize) {
        self.col = self.col.saturating_sub(n);
    }

    /// Move right by n columns, stopping at the right margin
    pub fn move_right(&mut self, n: usize, cols: usize) {
        self.col = (self.col + n).min(cols.saturating_sub(1));
    }

    /// Carriage return
    pub fn carriage_return(&mut self) {
        self.col = 0;
    }

    /// Capture position and pen
    pub fn save(&self) -> SavedCursor {
        SavedCursor {
            row: self.row,
            col: self.col,
            fg: self.fg,
            bg: self.bg,
            style: self.style,
        }
    }

    /// Restore position and pen, clamping position to current bounds
    pub fn restore(&mut self, saved: &SavedCursor, rows: usize, cols: usize) {
        self.row = saved.row.min(rows.saturating_sub(1));
        self.col = saved.col.min(cols.saturating_sub(1));
        self.fg = saved.fg;
        self.bg = saved.bg;
        self.style = saved.style;
    }

    /// Reset the pen to the default style (SGR 0)
    pub fn reset_pen(&mut self) {
        self.fg = Color::Default;
        self.bg = Color::Default;
        self.style = Style::default();
    }
}
