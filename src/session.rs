//! Terminal session: PTY plus reader thread plus frame mailbox
//!
//! The reader thread exclusively owns the emulator (scanner + screen).
//! It polls the PTY, feeds each chunk, and publishes one immutable
//! [`Frame`] per chunk into a single-slot mailbox. Consumers only ever
//! see `Arc<Frame>`s; mutable terminal state never crosses the thread
//! boundary.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, Sender, TryRecvError};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::JoinHandle;

use crate::core::Frame;
use crate::emulator::Emulator;
use crate::pty::{Pty, PtyError, PtyResult, WindowSize};

/// Read buffer size for each PTY drain
const READ_BUF_SIZE: usize = 8192;

/// Poll timeout for the reader loop; bounds command-channel latency
const POLL_TIMEOUT_MS: i32 = 30;

/// Out-of-band events reported by the reader thread
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusEvent {
    /// The shell is spawned and the reader loop is running
    Ready,
    /// BEL was received since the last published frame
    Bell,
    /// The PTY reached EOF; the reader thread has terminated
    ShellExited,
    /// An unrecoverable I/O error ended the reader loop
    IoError(String),
}

/// Commands delivered to the reader thread between polls
enum Command {
    Resize { cols: usize, rows: usize },
    Shutdown,
}

/// Single-slot latest-frame mailbox
///
/// Only the newest frame matters for rendering; intermediate frames are
/// overwritten, never queued.
pub struct FrameMailbox {
    slot: Mutex<MailboxSlot>,
    cond: Condvar,
}

struct MailboxSlot {
    frame: Option<Arc<Frame>>,
    /// Monotonic publish counter, used by `wait_next` to detect news
    seq: u64,
    closed: bool,
}

impl FrameMailbox {
    fn new() -> Self {
        Self {
            slot: Mutex::new(MailboxSlot {
                frame: None,
                seq: 0,
                closed: false,
            }),
            cond: Condvar::new(),
        }
    }

    fn publish(&self, frame: Arc<Frame>) {
        let mut slot = match self.slot.lock() {
            Ok(slot) => slot,
            Err(poisoned) => poisoned.into_inner(),
        };
        slot.frame = Some(frame);
        slot.seq += 1;
        self.cond.notify_all();
    }

    fn close(&self) {
        let mut slot = match self.slot.lock() {
            Ok(slot) => slot,
            Err(poisoned) => poisoned.into_inner(),
        };
        slot.closed = true;
        self.cond.notify_all();
    }

    /// Most recently published frame and its sequence number
    pub fn latest(&self) -> Option<(Arc<Frame>, u64)> {
        let slot = match self.slot.lock() {
            Ok(slot) => slot,
            Err(poisoned) => poisoned.into_inner(),
        };
        slot.frame.as_ref().map(|f| (Arc::clone(f), slot.seq))
    }

    /// Block until a frame newer than `seen_seq` is published.
    /// Returns `None` once the mailbox closes with no newer frame.
    pub fn wait_next(&self, seen_seq: u64) -> Option<(Arc<Frame>, u64)> {
        let mut slot = match self.slot.lock() {
            Ok(slot) => slot,
            Err(poisoned) => poisoned.into_inner(),
        };
        loop {
            if slot.seq > seen_seq {
                if let Some(frame) = slot.frame.as_ref() {
                    return Some((Arc::clone(frame), slot.seq));
                }
            }
            if slot.closed {
                return None;
            }
            slot = match self.cond.wait(slot) {
                Ok(slot) => slot,
                Err(poisoned) => poisoned.into_inner(),
            };
        }
    }
}

/// A running shell session
pub struct Session {
    pty: Arc<Pty>,
    frames: Arc<FrameMailbox>,
    status_rx: Receiver<StatusEvent>,
    status_tx: Sender<StatusEvent>,
    command_tx: Sender<Command>,
    write_broken: AtomicBool,
    reader: Option<JoinHandle<()>>,
}

impl Session {
    /// Spawn the user's shell and start the reader thread
    pub fn spawn_shell(cols: usize, rows: usize) -> PtyResult<Self> {
        let pty = Pty::spawn_shell(WindowSize::new(cols as u16, rows as u16))?;
        Ok(Self::start(pty, cols, rows))
    }

    /// Spawn an explicit command and start the reader thread
    pub fn spawn(command: &str, args: &[&str], cols: usize, rows: usize) -> PtyResult<Self> {
        let pty = Pty::spawn(command, args, WindowSize::new(cols as u16, rows as u16))?;
        Ok(Self::start(pty, cols, rows))
    }

    fn start(pty: Pty, cols: usize, rows: usize) -> Self {
        let pty = Arc::new(pty);
        let frames = Arc::new(FrameMailbox::new());
        let (status_tx, status_rx) = std::sync::mpsc::channel();
        let (command_tx, command_rx) = std::sync::mpsc::channel();

        let reader = {
            let pty = Arc::clone(&pty);
            let frames = Arc::clone(&frames);
            let status_tx = status_tx.clone();
            std::thread::Builder::new()
                .name("pty-reader".to_string())
                .spawn(move || reader_loop(pty, frames, status_tx, command_rx, cols, rows))
                .ok()
        };

        Session {
            pty,
            frames,
            status_rx,
            status_tx,
            command_tx,
            write_broken: AtomicBool::new(false),
            reader,
        }
    }

    /// Forward user input bytes to the shell
    ///
    /// After the first broken pipe the error is reported once on the
    /// status channel and later writes are silently dropped.
    pub fn write(&self, bytes: &[u8]) -> PtyResult<()> {
        if self.write_broken.load(Ordering::Relaxed) {
            return Ok(());
        }
        match self.pty.write_all(bytes) {
            Ok(()) => Ok(()),
            Err(PtyError::BrokenPipe) => {
                self.write_broken.store(true, Ordering::Relaxed);
                let _ = self
                    .status_tx
                    .send(StatusEvent::IoError("write side closed".to_string()));
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// The latest-frame mailbox shared with the reader thread
    pub fn frames(&self) -> &Arc<FrameMailbox> {
        &self.frames
    }

    /// Non-blocking status poll
    pub fn poll_status(&self) -> Option<StatusEvent> {
        match self.status_rx.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// Blocking status receive; `None` once the reader thread is gone
    pub fn recv_status(&self) -> Option<StatusEvent> {
        self.status_rx.recv().ok()
    }

    /// Resize both the kernel-side window and the emulator grid
    pub fn resize(&self, cols: usize, rows: usize) -> PtyResult<()> {
        self.pty
            .resize(WindowSize::new(cols as u16, rows as u16))?;
        let _ = self.command_tx.send(Command::Resize { cols, rows });
        Ok(())
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        let _ = self.command_tx.send(Command::Shutdown);
        // Hang up the child so a blocked poll sees EOF promptly
        let _ = self.pty.signal(nix::sys::signal::Signal::SIGHUP);
        if let Some(reader) = self.reader.take() {
            let _ = reader.join();
        }
    }
}

fn reader_loop(
    pty: Arc<Pty>,
    frames: Arc<FrameMailbox>,
    status_tx: Sender<StatusEvent>,
    command_rx: Receiver<Command>,
    cols: usize,
    rows: usize,
) {
    let mut emulator = Emulator::new(cols, rows);
    let mut buf = [0u8; READ_BUF_SIZE];

    let _ = status_tx.send(StatusEvent::Ready);

    'outer: loop {
        loop {
            match command_rx.try_recv() {
                Ok(Command::Resize { cols, rows }) => emulator.resize(cols, rows),
                Ok(Command::Shutdown) => break 'outer,
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => break 'outer,
            }
        }

        match pty.poll_read(POLL_TIMEOUT_MS) {
            Ok(false) => continue,
            Ok(true) => match pty.read(&mut buf) {
                Ok(0) => continue,
                Ok(n) => {
                    emulator.feed(&buf[..n]);
                    if emulator.take_bell() {
                        let _ = status_tx.send(StatusEvent::Bell);
                    }
                    frames.publish(Frame::capture_shared(emulator.screen()));
                }
                Err(PtyError::Eof) => {
                    tracing::debug!("PTY reached EOF, reader exiting");
                    let _ = status_tx.send(StatusEvent::ShellExited);
                    break;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "PTY read failed");
                    let _ = status_tx.send(StatusEvent::IoError(e.to_string()));
                    break;
                }
            },
            Err(PtyError::Eof) => {
                let _ = status_tx.send(StatusEvent::ShellExited);
                break;
            }
            Err(e) => {
                let _ = status_tx.send(StatusEvent::IoError(e.to_string()));
                break;
            }
        }
    }

    frames.close();
}
