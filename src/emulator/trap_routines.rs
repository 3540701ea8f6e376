//! Trap routines executed by the host on behalf of the TRAP instruction.
use crate::errors::ExecutionError;
use crate::hardware::memory::{MEMORY_SIZE, Memory};
use crate::hardware::registers::{Registers, from_binary};
use log::{debug, info};
use std::io::Write;
use std::ops::ControlFlow;

/// Trap routines known to the LC-3, selected by the low 8 bits of TRAP.
#[repr(u8)]
#[derive(enumn::N, Debug, Copy, Clone, PartialEq, Eq)]
pub enum TrapRoutine {
    GetC = 0x20,
    Out = 0x21,
    PutS = 0x22,
    In = 0x23,
    PutSp = 0x24,
    Halt = 0x25,
}

/// Decoded trap vector, vectors without a routine stay `Unrecognized`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TrapVector {
    Known(TrapRoutine),
    Unrecognized(u8),
}

impl From<u8> for TrapVector {
    fn from(vector: u8) -> Self {
        TrapRoutine::n(vector).map_or(Self::Unrecognized(vector), Self::Known)
    }
}

/// Runs the routine for `vector`. `Break` signals HALT, unrecognized vectors do nothing.
///
/// # Errors
/// - reading the keyboard or writing to `stdout` failed
pub fn dispatch_trap(
    vector: TrapVector,
    regs: &mut Registers,
    mem: &mut Memory,
    stdout: &mut impl Write,
) -> Result<ControlFlow<()>, ExecutionError> {
    match vector {
        TrapVector::Known(TrapRoutine::GetC) => get_c(regs, mem),
        TrapVector::Known(TrapRoutine::Out) => out(regs, stdout),
        TrapVector::Known(TrapRoutine::PutS) => put_s(regs, mem, stdout),
        TrapVector::Known(TrapRoutine::In) => in_trap(regs, mem, stdout),
        TrapVector::Known(TrapRoutine::PutSp) => put_sp(regs, mem, stdout),
        TrapVector::Known(TrapRoutine::Halt) => halt(stdout),
        TrapVector::Unrecognized(v) => {
            debug!("Ignoring unknown trap vector {v:#04X}");
            Ok(ControlFlow::Continue(()))
        }
    }
}

fn read_character(regs: &mut Registers, mem: &mut Memory) -> Result<u8, ExecutionError> {
    let c = mem.keyboard().read_input_character()?;
    regs.set(0, from_binary(u16::from(c)));
    Ok(c)
}

/// GETC: Read a single character from the keyboard. The character is not echoed onto the console.
///
/// Its ASCII code is copied into R0. The high eight bits of R0 are cleared.
pub fn get_c(regs: &mut Registers, mem: &mut Memory) -> Result<ControlFlow<()>, ExecutionError> {
    read_character(regs, mem)?;
    Ok(ControlFlow::Continue(()))
}

/// IN: Print a prompt on the screen and read a single character echoed back from the keyboard.
///
/// Otherwise, like 0x20 GETC.
pub fn in_trap(
    regs: &mut Registers,
    mem: &mut Memory,
    stdout: &mut impl Write,
) -> Result<ControlFlow<()>, ExecutionError> {
    write_out(b"Input: ", stdout)?;
    let c = read_character(regs, mem)?;
    write_out(&[c], stdout)
}

/// OUT: Write a character in R0[7:0] to the console display.
pub fn out(regs: &Registers, stdout: &mut impl Write) -> Result<ControlFlow<()>, ExecutionError> {
    write_out(&[low_byte(regs.get(0).as_binary())], stdout)
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "Truncation is what is expected here"
)]
const fn low_byte(input: u16) -> u8 {
    input as u8
}

fn put_one_char_per_u16(input: u16, append_to: &mut Vec<u8>) -> bool {
    append_to.push(low_byte(input));
    true
}

/// Returns `false` when a zero byte terminates the string.
fn put_two_chars_per_u16(input: u16, append_to: &mut Vec<u8>) -> bool {
    let low = low_byte(input);
    if low == 0 {
        return false;
    }
    append_to.push(low);
    let high = low_byte(input >> 8);
    if high == 0 {
        return false;
    }
    append_to.push(high);
    true
}

fn put(
    regs: &Registers,
    mem: &mut Memory,
    stdout: &mut impl Write,
    handle_char: fn(u16, &mut Vec<u8>) -> bool,
) -> Result<ControlFlow<()>, ExecutionError> {
    let mut address = regs.get(0).as_binary();
    let mut s = Vec::with_capacity(120);
    for _ in 0..MEMORY_SIZE {
        let word = mem.read(address)?;
        if word == 0 || !handle_char(word, &mut s) {
            break;
        }
        address = address.wrapping_add(1);
    }
    write_out(&s, stdout)
}

/// PUTS: print null-delimited char* from register 0's address
pub fn put_s(
    regs: &Registers,
    mem: &mut Memory,
    stdout: &mut impl Write,
) -> Result<ControlFlow<()>, ExecutionError> {
    put(regs, mem, stdout, put_one_char_per_u16)
}

/// PUTSP: Packed version of PUTS
///
/// The ASCII code contained in bits [7:0] of a memory location is written to the console first.
/// The second character of the last memory location can be 0x00.
/// Writing terminates with a 0x0000 word.
pub fn put_sp(
    regs: &Registers,
    mem: &mut Memory,
    stdout: &mut impl Write,
) -> Result<ControlFlow<()>, ExecutionError> {
    put(regs, mem, stdout, put_two_chars_per_u16)
}

/// HALT: Flush program output and end the program.
pub fn halt(stdout: &mut impl Write) -> Result<ControlFlow<()>, ExecutionError> {
    stdout.flush()?;
    info!("Program halted");
    Ok(ControlFlow::Break(()))
}

fn write_out(data: &[u8], stdout: &mut impl Write) -> Result<ControlFlow<()>, ExecutionError> {
    stdout.write_all(data)?;
    stdout.flush()?;
    Ok(ControlFlow::Continue(()))
}
