use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::collections::VecDeque;
use std::io;
use std::io::{IsTerminal, Read};
use std::time::Duration;

/// Providing Keyboard Input independent of an implementation.
pub trait KeyboardInputProvider {
    /// Checks if input is available, does not consume it and does not wait for it.
    fn check_input_available(&mut self) -> io::Result<bool>;
    /// Provides the next input character, blocks until one is available.
    ///
    /// An error of kind [`io::ErrorKind::Interrupted`] signals the user asked to stop.
    fn read_input_character(&mut self) -> io::Result<u8>;
    /// Looks for a pending stop request without consuming other input.
    ///
    /// Called periodically while a program runs, also when it never touches the keyboard.
    fn check_interrupt(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Picks the input provider matching the host's stdin.
#[must_use]
pub fn host_keyboard() -> Box<dyn KeyboardInputProvider> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        return Box::new(TerminalInputProvider::new());
    }
    #[cfg(unix)]
    {
        use std::os::fd::AsFd;
        // unbuffered handle, `Stdin` would hide buffered bytes from the readiness poll
        match stdin.as_fd().try_clone_to_owned() {
            Ok(fd) => return Box::new(FdInputProvider::new(std::fs::File::from(fd))),
            Err(e) => log::warn!("Could not duplicate stdin, status checks may block: {e}"),
        }
    }
    Box::new(ReaderInputProvider::new(stdin))
}

/// Keyboard of an interactive terminal in raw mode, read through crossterm events.
pub struct TerminalInputProvider {
    pending: VecDeque<u8>,
}

impl Default for TerminalInputProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalInputProvider {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pending: VecDeque::new(),
        }
    }

    /// Maps a key press to the byte an LC-3 program sees, `None` for keys without one.
    fn key_to_byte(key: KeyEvent) -> io::Result<Option<u8>> {
        if key.kind != KeyEventKind::Press {
            return Ok(None);
        }
        let byte = match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return Err(io::Error::new(
                    io::ErrorKind::Interrupted,
                    "CTRL-C pressed",
                ));
            }
            KeyCode::Char(c) => {
                let Ok(b) = u8::try_from(c) else {
                    return Ok(None);
                };
                if key.modifiers.contains(KeyModifiers::CONTROL) {
                    b & 0x1F
                } else {
                    b
                }
            }
            KeyCode::Enter => b'\n',
            KeyCode::Backspace => 0x08,
            KeyCode::Tab => b'\t',
            KeyCode::Esc => 0x1B,
            _ => return Ok(None),
        };
        Ok(Some(byte))
    }

    fn handle_event(&mut self, event: Event) -> io::Result<()> {
        if let Event::Key(key) = event
            && let Some(b) = Self::key_to_byte(key)?
        {
            self.pending.push_back(b);
        }
        Ok(())
    }

    /// Moves all events already queued by the terminal into `pending`.
    fn drain_events(&mut self) -> io::Result<()> {
        while event::poll(Duration::ZERO)? {
            self.handle_event(event::read()?)?;
        }
        Ok(())
    }
}

impl KeyboardInputProvider for TerminalInputProvider {
    fn check_input_available(&mut self) -> io::Result<bool> {
        if self.pending.is_empty() {
            self.drain_events()?;
        }
        Ok(!self.pending.is_empty())
    }
    fn read_input_character(&mut self) -> io::Result<u8> {
        loop {
            if let Some(b) = self.pending.pop_front() {
                return Ok(b);
            }
            self.handle_event(event::read()?)?;
        }
    }
    fn check_interrupt(&mut self) -> io::Result<()> {
        self.drain_events()
    }
}

/// Input from a byte stream that is always ready, e.g. an in-memory buffer.
///
/// A status check on a stream that has no byte buffered yet reads one byte ahead.
/// For streams that can stall, like pipes, use [`FdInputProvider`].
pub struct ReaderInputProvider<R> {
    reader: R,
    available_char: Option<u8>,
    at_end: bool,
}

impl<R: Read> ReaderInputProvider<R> {
    pub const fn new(reader: R) -> Self {
        Self {
            reader,
            available_char: None,
            at_end: false,
        }
    }

    const fn is_settled(&self) -> bool {
        self.available_char.is_some() || self.at_end
    }

    fn fill(&mut self) -> io::Result<()> {
        if !self.is_settled() {
            let mut b = [0; 1];
            match self.reader.read(&mut b) {
                Ok(0) => self.at_end = true,
                Ok(_) => self.available_char = Some(b[0]),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }
}

impl<R: Read> KeyboardInputProvider for ReaderInputProvider<R> {
    fn check_input_available(&mut self) -> io::Result<bool> {
        self.fill()?;
        Ok(self.available_char.is_some())
    }
    fn read_input_character(&mut self) -> io::Result<u8> {
        while !self.is_settled() {
            self.fill()?;
        }
        self.available_char.take().ok_or_else(|| {
            io::Error::new(io::ErrorKind::UnexpectedEof, "No more keyboard input")
        })
    }
}

/// Input from a file descriptor, e.g. piped stdin.
///
/// Status checks poll the descriptor without waiting and only read ahead once a byte
/// (or the end of the stream) is ready. Reads must not be buffered in user space.
#[cfg(unix)]
pub struct FdInputProvider<R> {
    inner: ReaderInputProvider<R>,
}

#[cfg(unix)]
impl<R: Read + std::os::fd::AsFd> FdInputProvider<R> {
    pub const fn new(reader: R) -> Self {
        Self {
            inner: ReaderInputProvider::new(reader),
        }
    }

    fn is_readable(&self) -> io::Result<bool> {
        use std::os::fd::AsRawFd;
        let mut fd = libc::pollfd {
            fd: self.inner.reader.as_fd().as_raw_fd(),
            events: libc::POLLIN,
            revents: 0,
        };
        // SAFETY: `fd` is one valid pollfd for the duration of the call, timeout 0 returns at once
        let ready = unsafe { libc::poll(&raw mut fd, 1, 0) };
        if ready < 0 {
            let e = io::Error::last_os_error();
            if e.kind() == io::ErrorKind::Interrupted {
                return Ok(false);
            }
            return Err(e);
        }
        // POLLHUP and POLLERR count too, the following read reports the end or the error
        Ok(ready > 0)
    }
}

#[cfg(unix)]
impl<R: Read + std::os::fd::AsFd> KeyboardInputProvider for FdInputProvider<R> {
    fn check_input_available(&mut self) -> io::Result<bool> {
        if !self.inner.is_settled() && !self.is_readable()? {
            return Ok(false);
        }
        self.inner.check_input_available()
    }
    fn read_input_character(&mut self) -> io::Result<u8> {
        self.inner.read_input_character()
    }
}
