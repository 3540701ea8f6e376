//! Machine state of the LC-3: memory with its memory mapped keyboard, and the register file.
pub mod keyboard;
pub mod memory;
pub mod registers;
