use crate::hardware::keyboard::KeyboardInputProvider;
use log::debug;
use std::fmt::{Debug, Formatter};
use std::io;
use std::ops::Index;

pub const PROGRAM_SECTION_START: u16 = 0x3000;
pub const MEMORY_SIZE: usize = 1 << 16;

/// The 64K words of LC-3 memory, including the memory mapped keyboard registers.
///
/// Addresses are `u16`, so every address is valid and address arithmetic wraps.
pub struct Memory {
    /// Index equals memory address
    data: Vec<u16>,
    keyboard: Box<dyn KeyboardInputProvider>,
}

impl Debug for Memory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let used = self.data.iter().filter(|&&w| w != 0).count();
        write!(f, "Memory: {MEMORY_SIZE} words, {used} non-zero")
    }
}

/// Memory regions mapped to IO functionality.
#[repr(u16)]
#[derive(enumn::N, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryMappedIOLocations {
    /// Keyboard Status Register
    Kbsr = 0xFE00,
    /// Keyboard Data Register
    Kbdr = 0xFE02,
}

/// Plain view of the stored words, device registers show what was last stored there.
impl Index<u16> for Memory {
    type Output = u16;
    fn index(&self, index: u16) -> &Self::Output {
        &self.data[usize::from(index)]
    }
}

impl Memory {
    pub const KEYBOARD_STATUS_REGISTER_SET: u16 = 1 << 15;
    pub const KEYBOARD_STATUS_REGISTER_UNSET: u16 = 0;

    #[must_use]
    pub fn new(keyboard: Box<dyn KeyboardInputProvider>) -> Self {
        Self {
            data: vec![0x0u16; MEMORY_SIZE],
            keyboard,
        }
    }

    /// Reads a word, device registers are served from the keyboard.
    ///
    /// # Errors
    /// - the keyboard failed while polling its status or reading a character
    pub fn read(&mut self, address: u16) -> io::Result<u16> {
        match MemoryMappedIOLocations::n(address) {
            None => Ok(self.data[usize::from(address)]),
            Some(MemoryMappedIOLocations::Kbsr) => {
                Ok(if self.keyboard.check_input_available()? {
                    Self::KEYBOARD_STATUS_REGISTER_SET
                } else {
                    Self::KEYBOARD_STATUS_REGISTER_UNSET
                })
            }
            Some(MemoryMappedIOLocations::Kbdr) => {
                Ok(u16::from(self.keyboard.read_input_character()?))
            }
        }
    }

    /// Stores a word. The keyboard status register is owned by the device, writes to it are ignored.
    pub fn write(&mut self, address: u16, value: u16) {
        if MemoryMappedIOLocations::n(address) == Some(MemoryMappedIOLocations::Kbsr) {
            debug!("Ignoring write of {value:#06X} to keyboard status register");
            return;
        }
        self.data[usize::from(address)] = value;
    }

    /// Copies `words` to memory starting at `origin`, stopping at the end of memory.
    /// Returns the number of words stored.
    pub fn load(&mut self, origin: u16, words: &[u16]) -> usize {
        let start = usize::from(origin);
        let count = words.len().min(MEMORY_SIZE - start);
        self.data[start..start + count].copy_from_slice(&words[..count]);
        count
    }

    pub fn keyboard(&mut self) -> &mut dyn KeyboardInputProvider {
        self.keyboard.as_mut()
    }
    pub fn set_keyboard(&mut self, keyboard: Box<dyn KeyboardInputProvider>) {
        self.keyboard = keyboard;
    }
}
