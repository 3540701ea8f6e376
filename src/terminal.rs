//! Host terminal handling for the driver: raw mode for unbuffered key presses.
use crossterm::terminal;
use log::warn;
use std::io;
use std::io::{IsTerminal, Write};

/// Keeps the terminal in raw mode while alive, restores it when dropped.
pub struct RawLock {
    active: bool,
}

impl RawLock {
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }
}

impl Drop for RawLock {
    fn drop(&mut self) {
        if !self.active {
            return;
        }
        // terminal stays in raw mode but no means to repair
        if let Err(e) = terminal::disable_raw_mode() {
            eprintln!("Error resetting terminal {e}");
        }
    }
}

/// Set terminal to raw in best-effort mode when stdin is a terminal, only log on failure.
#[must_use]
pub fn set_terminal_raw() -> RawLock {
    if !io::stdin().is_terminal() {
        return RawLock { active: false };
    }
    match terminal::enable_raw_mode() {
        Ok(()) => RawLock { active: true },
        Err(e) => {
            warn!("Could not set terminal to raw mode: {e}");
            RawLock { active: false }
        }
    }
}

/// Output for a terminal in raw mode, which no longer moves to the line start on `\n`.
pub struct RawModeWriter<W> {
    inner: W,
    translate_newlines: bool,
}

impl<W: Write> RawModeWriter<W> {
    pub const fn new(inner: W, translate_newlines: bool) -> Self {
        Self {
            inner,
            translate_newlines,
        }
    }
}

impl<W: Write> Write for RawModeWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if !self.translate_newlines {
            return self.inner.write(buf);
        }
        for part in buf.split_inclusive(|&b| b == b'\n') {
            if let Some(line) = part.strip_suffix(b"\n") {
                self.inner.write_all(line)?;
                self.inner.write_all(b"\r\n")?;
            } else {
                self.inner.write_all(part)?;
            }
        }
        Ok(buf.len())
    }
    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
