//! Emulator facade
//!
//! Bundles the scanner and the screen behind a feed-then-capture API.
//! Byte chunks go in, events are applied in order, and a frame can be
//! captured at any point. Feeding the same bytes in any chunking yields
//! the same frames.

use crate::core::{Frame, Screen};
use crate::scanner::Scanner;

/// Scanner plus screen: the whole headless terminal
#[derive(Debug, Default)]
pub struct Emulator {
    scanner: Scanner,
    screen: Screen,
}

impl Emulator {
    pub fn new(cols: usize, rows: usize) -> Self {
        Self {
            scanner: Scanner::new(),
            screen: Screen::new(cols, rows),
        }
    }

    /// Scan a chunk of PTY output and apply every resulting event
    pub fn feed(&mut self, bytes: &[u8]) {
        for event in self.scanner.feed(bytes) {
            self.screen.apply(event);
        }
    }

    /// Capture the current screen as an immutable frame
    pub fn frame(&self) -> Frame {
        Frame::capture(&self.screen)
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn screen_mut(&mut self) -> &mut Screen {
        &mut self.screen
    }

    /// Resize the screen; the scanner state is unaffected
    pub fn resize(&mut self, cols: usize, rows: usize) {
        self.screen.resize(cols, rows);
    }

    /// Take and clear the screen's latched bell flag
    pub fn take_bell(&mut self) -> bool {
        self.screen.take_bell()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feed_and_frame() {
        let mut emulator = Emulator::new(20, 4);
        emulator.feed(b"hello \x1b[32mworld\x1b[0m");

        let frame = emulator.frame();
        assert_eq!(frame.to_text(), "hello world\n");
        assert_eq!(frame.cursor.col, 11);
    }

    #[test]
    fn test_chunking_does_not_change_result() {
        let bytes = b"a\x1b[1;33mb\xe4\xb8\xadc\x1b[0m\r\nd";

        let mut whole = Emulator::new(10, 3);
        whole.feed(bytes);

        let mut split = Emulator::new(10, 3);
        for chunk in bytes.chunks(1) {
            split.feed(chunk);
        }

        assert_eq!(whole.frame(), split.frame());
    }

    #[test]
    fn test_resize_keeps_scanner_state() {
        let mut emulator = Emulator::new(10, 3);
        // Leave a CSI half-fed across the resize
        emulator.feed(b"\x1b[3");
        emulator.resize(20, 5);
        emulator.feed(b"1mx");

        let frame = emulator.frame();
        assert_eq!(frame.cols, 20);
        assert_eq!(
            emulator.screen().cell(0, 0).map(|c| c.fg),
            Some(crate::core::Color::RED)
        );
    }

    #[test]
    fn test_bell_passthrough() {
        let mut emulator = Emulator::new(10, 3);
        emulator.feed(b"\x07");
        assert!(emulator.take_bell());
        assert!(!emulator.take_bell());
    }
}
