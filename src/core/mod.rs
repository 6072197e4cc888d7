//! Core terminal state: cells, cursor, screen grid, and render frames

pub mod cell;
pub mod cursor;
pub mod frame;
pub mod screen;

pub use cell::{Cell, Color, Style};
pub use cursor::{Cursor, SavedCursor};
pub use frame::{Frame, FrameCursor, Span};
pub use screen::{Screen, DEFAULT_COLS, DEFAULT_ROWS};
