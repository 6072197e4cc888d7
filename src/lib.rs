//! Herminal: a VT-style terminal emulation core
//!
//! The pipeline is byte stream in, frames out: a chunk-tolerant escape
//! sequence [`scanner`], a mutable [`core::Screen`] grid, and immutable
//! [`core::Frame`] snapshots for rendering. Around that core sit the
//! [`pty`] channel, the [`session`] reader thread, the keyboard
//! [`input`] mapper, and the JSON settings store in [`config`].

pub mod config;
pub mod core;
pub mod emulator;
pub mod input;
#[cfg(unix)]
pub mod pty;
pub mod scanner;
#[cfg(unix)]
pub mod session;

pub use config::{Settings, Theme};
pub use core::{Frame, Screen};
pub use emulator::Emulator;
pub use input::{CommandInterceptor, Key, LocalCommand};
pub use scanner::{Scanner, TerminalEvent};
#[cfg(unix)]
pub use session::{Session, StatusEvent};
