//! Pseudoterminal plumbing
//!
//! Opens a PTY pair, spawns the shell on the slave side, and exposes the
//! master for non-blocking reads and writes.

#[cfg(unix)]
mod unix;

#[cfg(unix)]
pub use unix::Pty;

/// Error type for PTY operations
#[derive(Debug, thiserror::Error)]
pub enum PtyError {
    #[error("failed to open PTY master: {0}")]
    OpenMaster(#[source] nix::Error),

    #[error("failed to prepare PTY slave: {0}")]
    PrepareSlave(#[source] nix::Error),

    #[error("failed to fork: {0}")]
    Fork(#[source] nix::Error),

    #[error("failed to set up child session: {0}")]
    ChildSetup(#[source] nix::Error),

    #[error("failed to execute {command}: {source}")]
    Exec {
        command: String,
        #[source]
        source: nix::Error,
    },

    #[error("command contains a NUL byte")]
    BadCommand,

    #[error("failed to set window size: {0}")]
    SetWinsize(#[source] nix::Error),

    #[error("failed to read from PTY: {0}")]
    Read(#[source] nix::Error),

    #[error("failed to write to PTY: {0}")]
    Write(#[source] nix::Error),

    #[error("failed to poll PTY: {0}")]
    Poll(#[source] nix::Error),

    #[error("failed to wait for child: {0}")]
    Wait(#[source] nix::Error),

    /// The slave side closed: the shell exited and the kernel reports
    /// EIO on the master
    #[error("PTY closed by the child")]
    Eof,

    /// A write raced with the shell exiting
    #[error("PTY write after the child exited")]
    BrokenPipe,
}

/// Result type for PTY operations
pub type PtyResult<T> = Result<T, PtyError>;

/// Window size reported to the kernel and the child via TIOCSWINSZ
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSize {
    pub rows: u16,
    pub cols: u16,
    pub pixel_width: u16,
    pub pixel_height: u16,
}

impl WindowSize {
    pub fn new(cols: u16, rows: u16) -> Self {
        Self {
            rows,
            cols,
            pixel_width: 0,
            pixel_height: 0,
        }
    }
}

impl Default for WindowSize {
    fn default() -> Self {
        Self::new(
            crate::core::DEFAULT_COLS as u16,
            crate::core::DEFAULT_ROWS as u16,
        )
    }
}
