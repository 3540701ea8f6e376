//! # LC-3 Virtual Machine.
//!
//! `lc3-vm` runs program images for the LC-3 system.
//! Usage starts with loading a program via [`emulator::Emulator::load_image`]
//! and running it with [`emulator::Emulator::run`].
//!
//!  # Example
//! ```
//! use lc3_vm::emulator::{Emulator, ExitReason};
//! use lc3_vm::hardware::keyboard::ReaderInputProvider;
//!
//! // .ORIG x3000, LEA R0 HELLO, PUTS, HALT, HELLO .STRINGZ "Hi"
//! let image: &[u8] = &[
//!     0x30, 0x00, 0xE0, 0x02, 0xF0, 0x22, 0xF0, 0x25, 0x00, 0x48, 0x00, 0x69, 0x00, 0x00,
//! ];
//! let mut emu = Emulator::with_keyboard(Box::new(ReaderInputProvider::new(&b""[..])));
//! emu.load_image_from_reader(image).unwrap();
//! let mut output = Vec::new();
//! let reason = emu.run_with_output(&mut output);
//! assert!(matches!(reason, ExitReason::Halted));
//! assert_eq!(output, b"Hi");
//! ```
//! # Errors
//! - Program image missing or shorter than its origin word
//! - Keyboard input or program output failing while the program runs

pub mod emulator;
pub mod errors;
pub mod hardware;
pub mod numbers;
pub mod terminal;
