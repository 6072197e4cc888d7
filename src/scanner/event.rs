//! Terminal events produced by the scanner
//!
//! Each event is the semantic form of a run of decoded bytes. Events are
//! created per `feed` call and consumed immediately by the screen model.

use serde::{Deserialize, Serialize};

/// Events produced by the escape-sequence scanner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerminalEvent {
    /// Print a decoded character at the current cursor position
    Print(char),

    /// Execute a C0 control character (0x00-0x1F except ESC)
    /// Common controls:
    /// - 0x07 BEL: Bell
    /// - 0x08 BS: Backspace
    /// - 0x09 HT: Horizontal Tab
    /// - 0x0A LF: Line Feed
    /// - 0x0D CR: Carriage Return
    Control(u8),

    /// CSI (Control Sequence Introducer) dispatch
    /// Format: ESC \[ \[params\] final
    Csi {
        /// Numeric parameters separated by semicolons; absent params are 0
        params: Vec<u16>,
        /// Final byte (0x40-0x7E) determines the command
        final_byte: u8,
    },

    /// OSC (Operating System Command) payload, terminated by BEL or ST
    Osc(String),

    /// Non-CSI escape sequence: ESC followed by a final byte
    Esc(u8),
}

impl TerminalEvent {
    /// First parameter of a CSI event, or `default` when absent or zero
    pub fn csi_param(params: &[u16], index: usize, default: u16) -> u16 {
        match params.get(index) {
            Some(0) | None => default,
            Some(&p) => p,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csi_param_defaults() {
        assert_eq!(TerminalEvent::csi_param(&[], 0, 1), 1);
        assert_eq!(TerminalEvent::csi_param(&[0], 0, 1), 1);
        assert_eq!(TerminalEvent::csi_param(&[5], 0, 1), 5);
        assert_eq!(TerminalEvent::csi_param(&[5, 7], 1, 1), 7);
    }

    #[test]
    fn test_event_equality() {
        let a = TerminalEvent::Csi {
            params: vec![1, 31],
            final_byte: b'm',
        };
        let b = TerminalEvent::Csi {
            params: vec![1, 31],
            final_byte: b'm',
        };
        assert_eq!(a, b);
    }
}
