//! Unix PTY implementation built on the POSIX openpt/fork/exec sequence

use std::ffi::CString;
use std::os::fd::BorrowedFd;
use std::os::unix::io::{AsRawFd, RawFd};

use nix::fcntl::{fcntl, open, FcntlArg, OFlag};
use nix::libc::{self, STDERR_FILENO, STDIN_FILENO, STDOUT_FILENO};
use nix::poll::{poll, PollFd, PollFlags};
use nix::pty::{grantpt, posix_openpt, ptsname, unlockpt, PtyMaster};
use nix::sys::stat::Mode;
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::{close, dup2, execvp, fork, read, setsid, write, ForkResult, Pid};

use super::{PtyError, PtyResult, WindowSize};

/// A pseudoterminal master with a shell running on the slave side
pub struct Pty {
    master: PtyMaster,
    child_pid: Pid,
    child_alive: bool,
}

impl Pty {
    /// Open a PTY pair and exec `command` with `args` on the slave side
    pub fn spawn(command: &str, args: &[&str], size: WindowSize) -> PtyResult<Self> {
        let master = posix_openpt(OFlag::O_RDWR | OFlag::O_NOCTTY).map_err(PtyError::OpenMaster)?;
        grantpt(&master).map_err(PtyError::PrepareSlave)?;
        unlockpt(&master).map_err(PtyError::PrepareSlave)?;

        // SAFETY: ptsname is not thread-safe; it is called here before the
        // master fd is shared with any other thread
        let slave_name = unsafe { ptsname(&master) }.map_err(PtyError::PrepareSlave)?;

        set_window_size(master.as_raw_fd(), size)?;

        let command_cstr = CString::new(command).map_err(|_| PtyError::BadCommand)?;
        let mut argv: Vec<CString> = Vec::with_capacity(args.len() + 1);
        argv.push(command_cstr.clone());
        for arg in args {
            argv.push(CString::new(*arg).map_err(|_| PtyError::BadCommand)?);
        }

        // SAFETY: the child only calls async-signal-safe operations before exec
        match unsafe { fork() }.map_err(PtyError::Fork)? {
            ForkResult::Child => {
                drop(master);

                setsid().map_err(PtyError::ChildSetup)?;

                // Opening the slave in the new session makes it the
                // controlling terminal
                let slave_fd = open(slave_name.as_str(), OFlag::O_RDWR, Mode::empty())
                    .map_err(PtyError::ChildSetup)?;

                // SAFETY: TIOCSCTTY on the freshly opened slave fd
                unsafe {
                    if libc::ioctl(slave_fd, libc::TIOCSCTTY as _, 0) < 0 {
                        // Some systems already attached it via open()
                        tracing::debug!("TIOCSCTTY failed");
                    }
                }

                dup2(slave_fd, STDIN_FILENO).map_err(PtyError::ChildSetup)?;
                dup2(slave_fd, STDOUT_FILENO).map_err(PtyError::ChildSetup)?;
                dup2(slave_fd, STDERR_FILENO).map_err(PtyError::ChildSetup)?;
                if slave_fd > STDERR_FILENO {
                    let _ = close(slave_fd);
                }

                std::env::set_var("TERM", "xterm-256color");

                let err = execvp(&command_cstr, &argv)
                    .map_err(|e| PtyError::Exec {
                        command: command.to_string(),
                        source: e,
                    })
                    .unwrap_err();

                // execvp only returns on failure; nothing to clean up in
                // the child, so exit rather than unwind into the caller
                tracing::error!(error = %err, "exec failed in PTY child");
                std::process::exit(127);
            }
            ForkResult::Parent { child } => {
                let flags =
                    fcntl(master.as_raw_fd(), FcntlArg::F_GETFL).map_err(PtyError::OpenMaster)?;
                let flags = OFlag::from_bits_truncate(flags);
                fcntl(
                    master.as_raw_fd(),
                    FcntlArg::F_SETFL(flags | OFlag::O_NONBLOCK),
                )
                .map_err(PtyError::OpenMaster)?;

                tracing::debug!(command, pid = child.as_raw(), "spawned PTY child");

                Ok(Pty {
                    master,
                    child_pid: child,
                    child_alive: true,
                })
            }
        }
    }

    /// Spawn the user's login shell ($SHELL, falling back to /bin/sh)
    pub fn spawn_shell(size: WindowSize) -> PtyResult<Self> {
        let shell = std::env::var("SHELL").unwrap_or_else(|_| "/bin/sh".to_string());
        Self::spawn(&shell, &[], size)
    }

    pub fn master_fd(&self) -> RawFd {
        self.master.as_raw_fd()
    }

    pub fn child_pid(&self) -> Pid {
        self.child_pid
    }

    /// Check whether the child is still running, without blocking
    pub fn is_alive(&mut self) -> bool {
        if !self.child_alive {
            return false;
        }
        match waitpid(self.child_pid, Some(WaitPidFlag::WNOHANG)) {
            Ok(WaitStatus::StillAlive) => true,
            _ => {
                self.child_alive = false;
                false
            }
        }
    }

    /// Block until the child exits and return its exit code
    pub fn wait(&mut self) -> PtyResult<i32> {
        if !self.child_alive {
            return Ok(0);
        }
        match waitpid(self.child_pid, None).map_err(PtyError::Wait)? {
            WaitStatus::Exited(_, code) => {
                self.child_alive = false;
                Ok(code)
            }
            WaitStatus::Signaled(_, signal, _) => {
                self.child_alive = false;
                Ok(128 + signal as i32)
            }
            _ => Ok(0),
        }
    }

    /// Non-blocking read from the master
    ///
    /// Returns 0 when no data is available. EIO means the slave side
    /// closed and is surfaced as [`PtyError::Eof`].
    pub fn read(&self, buf: &mut [u8]) -> PtyResult<usize> {
        match read(self.master.as_raw_fd(), buf) {
            Ok(0) => Err(PtyError::Eof),
            Ok(n) => Ok(n),
            Err(nix::errno::Errno::EAGAIN) => Ok(0),
            Err(nix::errno::Errno::EIO) => Err(PtyError::Eof),
            Err(e) => Err(PtyError::Read(e)),
        }
    }

    /// Write a chunk to the master, returning the count accepted
    pub fn write(&self, data: &[u8]) -> PtyResult<usize> {
        match write(self.master.as_raw_fd(), data) {
            Ok(n) => Ok(n),
            Err(nix::errno::Errno::EPIPE) | Err(nix::errno::Errno::EIO) => {
                Err(PtyError::BrokenPipe)
            }
            Err(e) => Err(PtyError::Write(e)),
        }
    }

    /// Write the whole buffer, retrying short writes
    pub fn write_all(&self, mut data: &[u8]) -> PtyResult<()> {
        while !data.is_empty() {
            let n = self.write(data)?;
            data = &data[n..];
        }
        Ok(())
    }

    /// Wait up to `timeout_ms` for the master to become readable
    pub fn poll_read(&self, timeout_ms: i32) -> PtyResult<bool> {
        // SAFETY: the master fd outlives this call
        let borrowed_fd = unsafe { BorrowedFd::borrow_raw(self.master.as_raw_fd()) };
        let mut fds = [PollFd::new(&borrowed_fd, PollFlags::POLLIN)];
        let n = poll(&mut fds, timeout_ms).map_err(PtyError::Poll)?;
        Ok(n > 0
            && fds[0]
                .revents()
                .is_some_and(|r| r.intersects(PollFlags::POLLIN | PollFlags::POLLHUP)))
    }

    /// Propagate a new window size to the kernel and the child
    pub fn resize(&self, size: WindowSize) -> PtyResult<()> {
        set_window_size(self.master.as_raw_fd(), size)
    }

    /// Send a signal to the child process group leader
    pub fn signal(&self, signal: nix::sys::signal::Signal) -> PtyResult<()> {
        nix::sys::signal::kill(self.child_pid, signal).map_err(PtyError::Wait)
    }
}

impl Drop for Pty {
    fn drop(&mut self) {
        if self.child_alive {
            let _ = nix::sys::signal::kill(self.child_pid, nix::sys::signal::Signal::SIGHUP);
            let _ = waitpid(self.child_pid, Some(WaitPidFlag::WNOHANG));
        }
    }
}

fn set_window_size(fd: RawFd, size: WindowSize) -> PtyResult<()> {
    let winsize = libc::winsize {
        ws_row: size.rows,
        ws_col: size.cols,
        ws_xpixel: size.pixel_width,
        ws_ypixel: size.pixel_height,
    };

    // SAFETY: TIOCSWINSZ with a valid winsize struct
    let result = unsafe { libc::ioctl(fd, libc::TIOCSWINSZ, &winsize) };
    if result < 0 {
        Err(PtyError::SetWinsize(nix::errno::Errno::last()))
    } else {
        Ok(())
    }
}
