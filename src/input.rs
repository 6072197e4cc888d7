//! Keyboard input mapping
//!
//! Translates key presses into the byte sequences a VT-style shell
//! expects, and watches the typed line for local commands that the
//! application handles itself instead of the shell.

use std::borrow::Cow;

/// A key press, already resolved from whatever windowing event produced it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// A printable character (including space)
    Char(char),
    Enter,
    Tab,
    Backspace,
    Escape,
    Up,
    Down,
    Right,
    Left,
    Home,
    End,
    Delete,
    PageUp,
    PageDown,
    /// Ctrl plus a letter, e.g. `Ctrl('c')`
    Ctrl(char),
}

impl Key {
    /// Encode the key as the bytes to write to the PTY
    ///
    /// Keys with no terminal encoding (e.g. Ctrl with a non-letter)
    /// produce an empty slice.
    pub fn encode(&self) -> Cow<'static, [u8]> {
        match self {
            Key::Char(c) => {
                let mut buf = [0u8; 4];
                let encoded = c.encode_utf8(&mut buf);
                Cow::Owned(encoded.as_bytes().to_vec())
            }
            Key::Enter => Cow::Borrowed(b"\r"),
            Key::Tab => Cow::Borrowed(b"\t"),
            // Terminals send DEL for the backspace key
            Key::Backspace => Cow::Borrowed(b"\x7f"),
            Key::Escape => Cow::Borrowed(b"\x1b"),
            Key::Up => Cow::Borrowed(b"\x1b[A"),
            Key::Down => Cow::Borrowed(b"\x1b[B"),
            Key::Right => Cow::Borrowed(b"\x1b[C"),
            Key::Left => Cow::Borrowed(b"\x1b[D"),
            Key::Home => Cow::Borrowed(b"\x1b[H"),
            Key::End => Cow::Borrowed(b"\x1b[F"),
            Key::Delete => Cow::Borrowed(b"\x1b[3~"),
            Key::PageUp => Cow::Borrowed(b"\x1b[5~"),
            Key::PageDown => Cow::Borrowed(b"\x1b[6~"),
            Key::Ctrl(c) => {
                let c = c.to_ascii_lowercase();
                if c.is_ascii_lowercase() {
                    Cow::Owned(vec![c as u8 & 0x1f])
                } else {
                    Cow::Borrowed(b"")
                }
            }
        }
    }
}

/// Local commands the application handles without the shell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalCommand {
    /// `hsettings`: open the settings surface
    OpenSettings,
    /// `hinfo`: show the built-in help
    ShowHelp,
}

/// An intercepted local command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Intercept {
    pub command: LocalCommand,
    /// Number of DEL bytes to send in place of the Enter, erasing the
    /// typed trigger from the shell's line editor
    pub erase: usize,
}

/// Watches typed keys for local command triggers
///
/// Tracks the current input line purely from key presses; PTY output is
/// never inspected. Any key that moves the cursor or edits non-trivially
/// resets tracking, so only a cleanly typed trigger matches.
#[derive(Debug, Default)]
pub struct CommandInterceptor {
    line: String,
    /// Set when the line was edited in a way we cannot model
    opaque: bool,
}

impl CommandInterceptor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Observe a key before it is forwarded to the PTY
    ///
    /// Returns the intercepted command on Enter when the typed line is a
    /// trigger; the caller then sends `erase` DEL bytes instead of the
    /// Enter.
    pub fn observe(&mut self, key: &Key) -> Option<Intercept> {
        match key {
            Key::Char(c) => {
                self.line.push(*c);
                None
            }
            Key::Backspace => {
                if self.line.pop().is_none() {
                    self.opaque = true;
                }
                None
            }
            Key::Enter => {
                let result = if self.opaque {
                    None
                } else {
                    match self.line.trim() {
                        "hsettings" => Some(Intercept {
                            command: LocalCommand::OpenSettings,
                            erase: self.line.chars().count(),
                        }),
                        "hinfo" => Some(Intercept {
                            command: LocalCommand::ShowHelp,
                            erase: self.line.chars().count(),
                        }),
                        _ => None,
                    }
                };
                self.line.clear();
                self.opaque = false;
                result
            }
            // Ctrl-C and Ctrl-U abandon the current line
            Key::Ctrl('c') | Key::Ctrl('u') => {
                self.line.clear();
                self.opaque = false;
                None
            }
            // Anything else may have moved the cursor or recalled history
            _ => {
                self.opaque = true;
                None
            }
        }
    }
}
