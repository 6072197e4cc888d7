//! VT/ANSI escape-sequence scanning
//!
//! Turns the raw PTY byte stream into [`TerminalEvent`]s, tolerating
//! chunk boundaries anywhere inside a sequence.

mod event;
mod state;

pub use event::TerminalEvent;
pub use state::Scanner;
