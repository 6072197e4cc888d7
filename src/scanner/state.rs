//! Escape-sequence scanner
//!
//! Byte-oriented state machine that classifies PTY output into printable
//! characters, control characters, and escape/CSI/OSC sequences. The
//! scanner owns the partial-sequence accumulator, so a chunk boundary may
//! fall anywhere inside a sequence (or inside a UTF-8 glyph) without
//! corrupting state: feeding a stream in any chunking produces the same
//! events.
//!
//! States follow the DEC ANSI parser model (vt100.net/emu/dec_ansi_parser),
//! reduced to the sequence families this emulator interprets. Malformed
//! or unsupported sequences are swallowed, never surfaced as text.

use super::event::TerminalEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Ground,
    Escape,
    EscapeIntermediate,
    CsiEntry,
    CsiParam,
    CsiIgnore,
    OscString,
    OscEsc,
}

/// The escape-sequence scanner
#[derive(Debug)]
pub struct Scanner {
    state: State,
    /// Parameters collected for the current CSI sequence
    params: Vec<u16>,
    /// Current parameter being built
    current_param: u16,
    /// Whether the current parameter has seen a digit
    param_has_digit: bool,
    /// OSC string payload
    osc_payload: Vec<u8>,
    /// UTF-8 decoder state
    utf8_buffer: Vec<u8>,
    utf8_remaining: u8,
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new()
    }
}

impl Scanner {
    /// Create a new scanner in the ground state
    pub fn new() -> Self {
        Self {
            state: State::Ground,
            params: Vec::with_capacity(16),
            current_param: 0,
            param_has_digit: false,
            osc_payload: Vec::with_capacity(256),
            utf8_buffer: Vec::with_capacity(4),
            utf8_remaining: 0,
        }
    }

    /// Reset the scanner to the ground state, dropping any partial sequence
    pub fn reset(&mut self) {
        self.state = State::Ground;
        self.clear_params();
        self.osc_payload.clear();
        self.utf8_buffer.clear();
        self.utf8_remaining = 0;
    }

    fn clear_params(&mut self) {
        self.params.clear();
        self.current_param = 0;
        self.param_has_digit = false;
    }

    /// Process a chunk of bytes, returning the decoded events
    pub fn feed(&mut self, data: &[u8]) -> Vec<TerminalEvent> {
        let mut events = Vec::new();

        for &byte in data {
            if let Some(event) = self.process_byte(byte) {
                events.push(event);
            }
        }

        events
    }

    fn process_byte(&mut self, byte: u8) -> Option<TerminalEvent> {
        if self.state == State::Ground && self.utf8_remaining > 0 {
            return self.process_utf8_continuation(byte);
        }

        if byte < 0x20 {
            return self.process_c0(byte);
        }

        // DEL is ignored everywhere
        if byte == 0x7F {
            return None;
        }

        match self.state {
            State::Ground => self.process_ground(byte),
            State::Escape => self.process_escape(byte),
            State::EscapeIntermediate => self.process_escape_intermediate(byte),
            State::CsiEntry => self.process_csi_entry(byte),
            State::CsiParam => self.process_csi_param(byte),
            State::CsiIgnore => self.process_csi_ignore(byte),
            State::OscString => self.process_osc_string(byte),
            State::OscEsc => self.process_osc_esc(byte),
        }
    }

    /// C0 control characters (0x00-0x1F)
    fn process_c0(&mut self, byte: u8) -> Option<TerminalEvent> {
        match byte {
            // CAN, SUB - cancel any in-flight sequence
            0x18 | 0x1A => {
                self.state = State::Ground;
                None
            }
            // ESC - start a new sequence (or terminate an OSC string)
            0x1B => {
                if self.state == State::OscString {
                    self.state = State::OscEsc;
                } else {
                    self.state = State::Escape;
                    self.clear_params();
                }
                None
            }
            _ => match self.state {
                // BEL terminates an OSC string (xterm extension); other
                // controls inside the string are dropped
                State::OscString | State::OscEsc => {
                    if byte == 0x07 {
                        self.terminate_osc()
                    } else {
                        None
                    }
                }
                // Controls embedded in a CSI sequence execute immediately
                _ => Some(TerminalEvent::Control(byte)),
            },
        }
    }

    /// Normal text processing
    fn process_ground(&mut self, byte: u8) -> Option<TerminalEvent> {
        if byte >= 0x80 {
            return self.start_utf8(byte);
        }
        Some(TerminalEvent::Print(byte as char))
    }

    fn start_utf8(&mut self, byte: u8) -> Option<TerminalEvent> {
        self.utf8_buffer.clear();
        self.utf8_buffer.push(byte);

        self.utf8_remaining = match byte {
            0xC0..=0xDF => 1,
            0xE0..=0xEF => 2,
            0xF0..=0xF7 => 3,
            _ => {
                // Stray continuation or invalid start byte
                self.utf8_buffer.clear();
                return Some(TerminalEvent::Print('\u{FFFD}'));
            }
        };

        None
    }

    fn process_utf8_continuation(&mut self, byte: u8) -> Option<TerminalEvent> {
        if (0x80..=0xBF).contains(&byte) {
            self.utf8_buffer.push(byte);
            self.utf8_remaining -= 1;

            if self.utf8_remaining == 0 {
                let s = String::from_utf8_lossy(&self.utf8_buffer);
                let c = s.chars().next().unwrap_or('\u{FFFD}');
                self.utf8_buffer.clear();
                return Some(TerminalEvent::Print(c));
            }
            None
        } else {
            // Invalid continuation: the truncated glyph becomes a
            // replacement character and the interrupting byte is dropped
            self.utf8_buffer.clear();
            self.utf8_remaining = 0;
            Some(TerminalEvent::Print('\u{FFFD}'))
        }
    }

    /// After ESC, waiting for the next byte
    fn process_escape(&mut self, byte: u8) -> Option<TerminalEvent> {
        match byte {
            // CSI (ESC [)
            b'[' => {
                self.state = State::CsiEntry;
                self.clear_params();
                None
            }
            // OSC (ESC ])
            b']' => {
                self.state = State::OscString;
                self.osc_payload.clear();
                None
            }
            // Intermediate bytes (charset designation etc.) - collect and
            // swallow the whole sequence
            0x20..=0x2F => {
                self.state = State::EscapeIntermediate;
                None
            }
            // Final byte - dispatch a plain escape
            0x30..=0x7E => {
                self.state = State::Ground;
                Some(TerminalEvent::Esc(byte))
            }
            _ => {
                self.state = State::Ground;
                None
            }
        }
    }

    /// ESC with intermediates (e.g. ESC ( B): unsupported, swallowed
    fn process_escape_intermediate(&mut self, byte: u8) -> Option<TerminalEvent> {
        match byte {
            0x20..=0x2F => None,
            _ => {
                self.state = State::Ground;
                None
            }
        }
    }

    /// Right after ESC [, before any parameter byte
    fn process_csi_entry(&mut self, byte: u8) -> Option<TerminalEvent> {
        match byte {
            0x30..=0x39 => {
                self.current_param = (byte - b'0') as u16;
                self.param_has_digit = true;
                self.state = State::CsiParam;
                None
            }
            b';' => {
                self.params.push(0);
                self.state = State::CsiParam;
                None
            }
            0x40..=0x7E => {
                self.state = State::Ground;
                self.dispatch_csi(byte)
            }
            // Private markers, subparameters, intermediates: sequences we
            // do not interpret; consume through the final byte
            _ => {
                self.state = State::CsiIgnore;
                None
            }
        }
    }

    /// Collecting CSI parameters
    fn process_csi_param(&mut self, byte: u8) -> Option<TerminalEvent> {
        match byte {
            0x30..=0x39 => {
                self.current_param = self
                    .current_param
                    .saturating_mul(10)
                    .saturating_add((byte - b'0') as u16);
                self.param_has_digit = true;
                None
            }
            b';' => {
                self.params.push(self.current_param);
                self.current_param = 0;
                self.param_has_digit = false;
                None
            }
            0x40..=0x7E => {
                if self.param_has_digit || !self.params.is_empty() {
                    self.params.push(self.current_param);
                }
                self.state = State::Ground;
                self.dispatch_csi(byte)
            }
            _ => {
                self.state = State::CsiIgnore;
                None
            }
        }
    }

    /// Consuming an unsupported CSI sequence through its final byte
    fn process_csi_ignore(&mut self, byte: u8) -> Option<TerminalEvent> {
        if (0x40..=0x7E).contains(&byte) {
            self.state = State::Ground;
        }
        None
    }

    fn dispatch_csi(&mut self, final_byte: u8) -> Option<TerminalEvent> {
        Some(TerminalEvent::Csi {
            params: std::mem::take(&mut self.params),
            final_byte,
        })
    }

    /// Collecting an OSC payload until BEL or ST
    fn process_osc_string(&mut self, byte: u8) -> Option<TerminalEvent> {
        // C0 terminators are handled in process_c0
        self.osc_payload.push(byte);
        None
    }

    /// ESC seen inside an OSC string: backslash completes ST, anything
    /// else aborts the string and restarts escape processing
    fn process_osc_esc(&mut self, byte: u8) -> Option<TerminalEvent> {
        if byte == b'\\' {
            self.terminate_osc()
        } else {
            self.osc_payload.clear();
            self.state = State::Escape;
            self.clear_params();
            self.process_escape(byte)
        }
    }

    fn terminate_osc(&mut self) -> Option<TerminalEvent> {
        self.state = State::Ground;
        let payload = String::from_utf8_lossy(&self.osc_payload).into_owned();
        self.osc_payload.clear();
        Some(TerminalEvent::Osc(payload))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text() {
        let mut scanner = Scanner::new();
        let events = scanner.feed(b"Hello");

        assert_eq!(events.len(), 5);
        assert_eq!(events[0], TerminalEvent::Print('H'));
        assert_eq!(events[4], TerminalEvent::Print('o'));
    }

    #[test]
    fn test_c0_controls() {
        let mut scanner = Scanner::new();
        let events = scanner.feed(b"A\r\nB");

        assert_eq!(
            events,
            vec![
                TerminalEvent::Print('A'),
                TerminalEvent::Control(b'\r'),
                TerminalEvent::Control(b'\n'),
                TerminalEvent::Print('B'),
            ]
        );
    }

    #[test]
    fn test_csi_cursor_up() {
        let mut scanner = Scanner::new();
        let events = scanner.feed(b"\x1b[5A");

        assert_eq!(
            events,
            vec![TerminalEvent::Csi {
                params: vec![5],
                final_byte: b'A',
            }]
        );
    }

    #[test]
    fn test_csi_multiple_params() {
        let mut scanner = Scanner::new();
        let events = scanner.feed(b"\x1b[10;20H");

        assert_eq!(
            events,
            vec![TerminalEvent::Csi {
                params: vec![10, 20],
                final_byte: b'H',
            }]
        );
    }

    #[test]
    fn test_csi_empty_params() {
        let mut scanner = Scanner::new();
        let events = scanner.feed(b"\x1b[H");

        assert_eq!(
            events,
            vec![TerminalEvent::Csi {
                params: vec![],
                final_byte: b'H',
            }]
        );
    }

    #[test]
    fn test_csi_leading_empty_param() {
        let mut scanner = Scanner::new();
        let events = scanner.feed(b"\x1b[;5H");

        assert_eq!(
            events,
            vec![TerminalEvent::Csi {
                params: vec![0, 5],
                final_byte: b'H',
            }]
        );
    }

    #[test]
    fn test_sgr_sequence() {
        let mut scanner = Scanner::new();
        let events = scanner.feed(b"\x1b[1;31m");

        assert_eq!(
            events,
            vec![TerminalEvent::Csi {
                params: vec![1, 31],
                final_byte: b'm',
            }]
        );
    }

    #[test]
    fn test_chunk_boundary_in_csi() {
        let mut scanner = Scanner::new();

        let events1 = scanner.feed(b"\x1b[");
        let events2 = scanner.feed(b"5");
        let events3 = scanner.feed(b"A");

        assert!(events1.is_empty());
        assert!(events2.is_empty());
        assert_eq!(
            events3,
            vec![TerminalEvent::Csi {
                params: vec![5],
                final_byte: b'A',
            }]
        );
    }

    #[test]
    fn test_chunk_boundary_in_utf8() {
        let mut scanner = Scanner::new();

        // UTF-8 for '世' is E4 B8 96
        let events1 = scanner.feed(&[0xE4]);
        let events2 = scanner.feed(&[0xB8]);
        let events3 = scanner.feed(&[0x96]);

        assert!(events1.is_empty());
        assert!(events2.is_empty());
        assert_eq!(events3, vec![TerminalEvent::Print('世')]);
    }

    #[test]
    fn test_osc_bel_terminated() {
        let mut scanner = Scanner::new();
        let events = scanner.feed(b"\x1b]0;My Title\x07");

        assert_eq!(events, vec![TerminalEvent::Osc("0;My Title".to_string())]);
    }

    #[test]
    fn test_osc_st_terminated() {
        let mut scanner = Scanner::new();
        let events = scanner.feed(b"\x1b]0;title\x1b\\");

        assert_eq!(events, vec![TerminalEvent::Osc("0;title".to_string())]);
    }

    #[test]
    fn test_osc_split_across_chunks() {
        let mut scanner = Scanner::new();
        assert!(scanner.feed(b"\x1b]0;ab").is_empty());
        assert!(scanner.feed(b"cd").is_empty());
        let events = scanner.feed(b"\x07");
        assert_eq!(events, vec![TerminalEvent::Osc("0;abcd".to_string())]);
    }

    #[test]
    fn test_osc_aborted_by_new_escape() {
        let mut scanner = Scanner::new();
        // ESC inside the OSC string followed by '[' abandons the string
        // and starts a CSI sequence
        let events = scanner.feed(b"\x1b]0;junk\x1b[2J");

        assert_eq!(
            events,
            vec![TerminalEvent::Csi {
                params: vec![2],
                final_byte: b'J',
            }]
        );
    }

    #[test]
    fn test_plain_escape() {
        let mut scanner = Scanner::new();
        let events = scanner.feed(b"\x1b7\x1b8");

        assert_eq!(
            events,
            vec![TerminalEvent::Esc(b'7'), TerminalEvent::Esc(b'8')]
        );
    }

    #[test]
    fn test_charset_designation_swallowed() {
        let mut scanner = Scanner::new();
        let events = scanner.feed(b"\x1b(Bok");

        // ESC ( B is consumed whole; only "ok" prints
        assert_eq!(
            events,
            vec![TerminalEvent::Print('o'), TerminalEvent::Print('k')]
        );
    }

    #[test]
    fn test_private_csi_swallowed() {
        let mut scanner = Scanner::new();
        let events = scanner.feed(b"\x1b[?25hX");

        assert_eq!(events, vec![TerminalEvent::Print('X')]);
    }

    #[test]
    fn test_cancel_sequence() {
        let mut scanner = Scanner::new();
        // CAN aborts the CSI; the trailing 'A' prints
        let events = scanner.feed(b"\x1b[5\x18A");

        assert_eq!(events, vec![TerminalEvent::Print('A')]);
    }

    #[test]
    fn test_control_inside_csi_executes() {
        let mut scanner = Scanner::new();
        let events = scanner.feed(b"\x1b[1\x0815D");

        assert_eq!(
            events,
            vec![
                TerminalEvent::Control(0x08),
                TerminalEvent::Csi {
                    params: vec![115],
                    final_byte: b'D',
                }
            ]
        );
    }

    #[test]
    fn test_never_stuck_after_garbage() {
        let mut scanner = Scanner::new();
        scanner.feed(b"\x1b[12;?;zzz");
        // Whatever happened above, the scanner recovers on the final byte
        let events = scanner.feed(b"ok");
        assert_eq!(
            events,
            vec![TerminalEvent::Print('o'), TerminalEvent::Print('k')]
        );
    }

    #[test]
    fn test_param_saturation() {
        let mut scanner = Scanner::new();
        let events = scanner.feed(b"\x1b[99999999999999A");

        assert_eq!(
            events,
            vec![TerminalEvent::Csi {
                params: vec![u16::MAX],
                final_byte: b'A',
            }]
        );
    }
}
