//! Immutable render frames
//!
//! A frame is a self-contained, serializable picture of the screen at one
//! instant: each row compressed into runs of identically-styled text, plus
//! the cursor. Given the same byte stream, capture must produce identical
//! frames.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::cell::{Color, Style};
use super::screen::Screen;

/// A run of consecutive cells sharing one style
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    /// Concatenated glyphs of the run; wide-glyph continuations are folded
    /// into their leading cell
    pub text: String,
    pub fg: Color,
    pub bg: Color,
    pub style: Style,
}

/// Cursor position carried by a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameCursor {
    pub row: usize,
    pub col: usize,
}

/// One immutable snapshot of the screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    pub cols: usize,
    pub rows: usize,
    /// One span list per row, in order; blank tails are included so every
    /// row covers the full width
    pub lines: Vec<Vec<Span>>,
    pub cursor: FrameCursor,
}

impl Frame {
    /// Capture the screen into a frame, run-length encoding each row
    pub fn capture(screen: &Screen) -> Self {
        let mut lines = Vec::with_capacity(screen.rows());

        for row in 0..screen.rows() {
            let cells = match screen.row(row) {
                Some(cells) => cells,
                None => continue,
            };

            let mut spans: Vec<Span> = Vec::new();
            for cell in cells {
                if cell.is_wide_continuation() {
                    continue;
                }
                match spans.last_mut() {
                    Some(span)
                        if span.fg == cell.fg
                            && span.bg == cell.bg
                            && span.style == cell.style =>
                    {
                        span.text.push(cell.ch);
                    }
                    _ => {
                        spans.push(Span {
                            text: cell.ch.to_string(),
                            fg: cell.fg,
                            bg: cell.bg,
                            style: cell.style,
                        });
                    }
                }
            }
            lines.push(spans);
        }

        Frame {
            cols: screen.cols(),
            rows: screen.rows(),
            lines,
            cursor: FrameCursor {
                row: screen.cursor().row,
                col: screen.cursor().col,
            },
        }
    }

    /// Capture directly into an `Arc` for cross-thread publishing
    pub fn capture_shared(screen: &Screen) -> Arc<Self> {
        Arc::new(Self::capture(screen))
    }

    /// Plain-text rendering with trailing blanks trimmed per row
    pub fn to_text(&self) -> String {
        let mut result = String::new();

        for line in &self.lines {
            let start = result.len();
            for span in line {
                result.push_str(&span.text);
            }
            while result.len() > start && result.ends_with(' ') {
                result.pop();
            }
            result.push('\n');
        }

        while result.ends_with("\n\n") {
            result.pop();
        }
        result
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emulator::Emulator;

    fn frame_for(bytes: &[u8], cols: usize, rows: usize) -> Frame {
        let mut emulator = Emulator::new(cols, rows);
        emulator.feed(bytes);
        emulator.frame()
    }

    #[test]
    fn test_plain_row_is_one_span() {
        let frame = frame_for(b"hello", 10, 2);
        assert_eq!(frame.lines[0].len(), 1);
        assert_eq!(frame.lines[0][0].text, "hello     ");
        assert_eq!(frame.lines[0][0].fg, Color::Default);
    }

    #[test]
    fn test_style_change_splits_spans() {
        let frame = frame_for(b"ab\x1b[31mcd\x1b[0mef", 10, 1);
        let line = &frame.lines[0];

        assert_eq!(line.len(), 3);
        assert_eq!(line[0].text, "ab");
        assert_eq!(line[1].text, "cd");
        assert_eq!(line[1].fg, Color::RED);
        assert_eq!(line[2].text, "ef    ");
        assert_eq!(line[2].fg, Color::Default);
    }

    #[test]
    fn test_wide_glyph_folds_continuation() {
        let frame = frame_for("中x".as_bytes(), 6, 1);
        let line = &frame.lines[0];

        assert_eq!(line.len(), 1);
        // 6 columns but only 5 glyphs: the continuation cell is folded
        assert_eq!(line[0].text, "中x   ");
    }

    #[test]
    fn test_cursor_carried() {
        let frame = frame_for(b"\x1b[2;5H", 10, 4);
        assert_eq!(frame.cursor, FrameCursor { row: 1, col: 4 });
    }

    #[test]
    fn test_capture_is_deterministic() {
        let bytes = b"one\r\n\x1b[7mtwo\x1b[27m\r\nthree";
        let a = frame_for(bytes, 20, 5);
        let b = frame_for(bytes, 20, 5);
        assert_eq!(a, b);
    }

    #[test]
    fn test_json_roundtrip() {
        let frame = frame_for(b"\x1b[1;32mok\x1b[0m done", 20, 2);
        let json = frame.to_json().unwrap();
        let restored = Frame::from_json(&json).unwrap();
        assert_eq!(frame, restored);
    }

    #[test]
    fn test_to_text() {
        let frame = frame_for(b"AB\r\nC", 10, 3);
        let text = frame.to_text();
        assert_eq!(text, "AB\nC\n");
    }
}
