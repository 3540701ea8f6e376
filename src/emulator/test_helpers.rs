use crate::emulator::Emulator;
use crate::hardware::keyboard::KeyboardInputProvider;
use crate::hardware::memory::{Memory, PROGRAM_SECTION_START};
use crate::hardware::registers::Registers;
use std::collections::VecDeque;
use std::io;
use std::io::Write;

/// Scripted keyboard, running out of input is a read error.
pub struct FakeKeyboardInputProvider {
    input: VecDeque<u8>,
}
impl FakeKeyboardInputProvider {
    pub fn new(input: &str) -> Self {
        Self {
            input: input.bytes().collect(),
        }
    }
}
impl KeyboardInputProvider for FakeKeyboardInputProvider {
    fn check_input_available(&mut self) -> io::Result<bool> {
        Ok(!self.input.is_empty())
    }
    fn read_input_character(&mut self) -> io::Result<u8> {
        self.input.pop_front().ok_or_else(|| {
            io::Error::new(io::ErrorKind::UnexpectedEof, "No more keyboard input")
        })
    }
}

pub struct StringWriter {
    vec: Vec<u8>,
}
impl Write for StringWriter {
    fn write(&mut self, data: &[u8]) -> Result<usize, io::Error> {
        self.vec.write(data)
    }
    fn flush(&mut self) -> Result<(), io::Error> {
        Ok(())
    }
}
impl StringWriter {
    pub fn new() -> Self {
        let vec = Vec::<u8>::with_capacity(120);
        Self { vec }
    }
    pub fn get_string(&self) -> String {
        String::from_utf8(self.vec.clone()).unwrap()
    }
}

/// Output whose every write fails.
pub struct FailingWriter;
impl Write for FailingWriter {
    fn write(&mut self, _data: &[u8]) -> Result<usize, io::Error> {
        Err(io::Error::from(io::ErrorKind::BrokenPipe))
    }
    fn flush(&mut self) -> Result<(), io::Error> {
        Err(io::Error::from(io::ErrorKind::BrokenPipe))
    }
}

/// Emulator with a program loaded at `0x3000`, scripted input and captured output.
pub struct FakeEmulator {
    pub inner: Emulator,
    pub stdout: StringWriter,
}
impl FakeEmulator {
    pub fn new(program_no_header: &[u16]) -> Self {
        let mut inner = Emulator::with_keyboard(Box::new(FakeKeyboardInputProvider::new("")));
        inner.memory.load(PROGRAM_SECTION_START, program_no_header);
        Self {
            inner,
            stdout: StringWriter::new(),
        }
    }
    pub fn add_stdin_input(&mut self, input: &str) -> &mut Self {
        self.inner
            .memory
            .set_keyboard(Box::new(FakeKeyboardInputProvider::new(input)));
        self
    }
    pub fn get_parts(&mut self) -> (&mut Registers, &mut Memory, &mut StringWriter) {
        (
            &mut self.inner.registers,
            &mut self.inner.memory,
            &mut self.stdout,
        )
    }
}
