//! The fetch-decode-execute loop and the public facing [`Emulator`].
pub mod instruction;
pub mod loader;
pub mod opcodes;
#[cfg(test)]
pub(crate) mod test_helpers;
pub mod trap_routines;

use crate::emulator::instruction::{Instruction, Opcode};
use crate::emulator::loader::ProgramImage;
use crate::emulator::trap_routines::TrapVector;
use crate::errors::{ExecutionError, ImageError};
use crate::hardware::keyboard::{self, KeyboardInputProvider};
use crate::hardware::memory::{Memory, PROGRAM_SECTION_START};
use crate::hardware::registers::{ConditionFlag, Registers};
use log::{debug, trace};
use std::fmt::{Debug, Formatter};
use std::io;
use std::io::Write;
use std::ops::ControlFlow;
use std::path::Path;

/// What to do with RTI, the reserved opcode and unknown trap vectors.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum IllegalOpcodePolicy {
    /// Treat them as no-ops and continue with the next instruction.
    #[default]
    Ignore,
    /// Stop with [`ExitReason::IllegalInstruction`].
    Halt,
}

/// Why a run ended.
#[derive(displaydoc::Display, Debug)]
pub enum ExitReason {
    /// Program halted
    Halted,
    /// Could not load program image: {0}
    ImageLoadFailed(ImageError),
    /// Error during reading input or writing program output: {0}
    HostIoFailed(io::Error),
    /// Execution interrupted by user
    Interrupted,
    /// Illegal instruction {instruction:#06X} at address {address:#06X}
    IllegalInstruction { instruction: u16, address: u16 },
}

impl ExitReason {
    /// Process exit code for the reason, `2` is left for usage errors.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Halted => 0,
            Self::ImageLoadFailed(_) => 1,
            Self::HostIoFailed(_) => 3,
            Self::IllegalInstruction { .. } => 4,
            Self::Interrupted => 130,
        }
    }
}

impl From<ExecutionError> for ExitReason {
    fn from(error: ExecutionError) -> Self {
        match error {
            ExecutionError::HostIo(e) => Self::HostIoFailed(e),
            ExecutionError::Interrupted => Self::Interrupted,
            ExecutionError::IllegalInstruction {
                instruction,
                address,
            } => Self::IllegalInstruction {
                instruction,
                address,
            },
        }
    }
}

/// Creates an emulator reading the host keyboard with the program image at `path` loaded.
///
/// # Errors
/// - see [`Emulator::load_image`]
pub fn from_program(path: impl AsRef<Path>) -> Result<Emulator, ImageError> {
    let mut emu = Emulator::new();
    emu.load_image(path)?;
    Ok(emu)
}

/// The public facing emulator used to run LC-3 programs.
pub struct Emulator {
    memory: Memory,
    registers: Registers,
    illegal_opcode_policy: IllegalOpcodePolicy,
}

impl Debug for Emulator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}, {:?}", self.registers, self.memory)
    }
}

impl Default for Emulator {
    fn default() -> Self {
        Self::new()
    }
}

impl Emulator {
    pub const INTERRUPT_CHECK_INTERVAL: u32 = 1 << 12;

    /// Emulator reading from the host's keyboard, see [`keyboard::host_keyboard`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_keyboard(keyboard::host_keyboard())
    }

    #[must_use]
    pub fn with_keyboard(keyboard: Box<dyn KeyboardInputProvider>) -> Self {
        Self {
            memory: Memory::new(keyboard),
            registers: Registers::new(),
            illegal_opcode_policy: IllegalOpcodePolicy::default(),
        }
    }

    #[must_use]
    pub const fn with_illegal_opcode_policy(mut self, policy: IllegalOpcodePolicy) -> Self {
        self.illegal_opcode_policy = policy;
        self
    }

    /// Loads the program image file at `path` into memory, see [`ProgramImage`].
    ///
    /// # Errors
    /// - the file cannot be opened or read
    /// - the file is shorter than the origin word
    pub fn load_image(&mut self, path: impl AsRef<Path>) -> Result<(), ImageError> {
        ProgramImage::from_file(path)?.load_into(&mut self.memory);
        Ok(())
    }

    /// Loads a program image from a byte stream and returns its origin.
    ///
    /// # Errors
    /// - reading the stream failed
    /// - the stream ended before the origin word
    pub fn load_image_from_reader(&mut self, reader: impl io::Read) -> Result<u16, ImageError> {
        let image = ProgramImage::from_reader(reader)?;
        image.load_into(&mut self.memory);
        Ok(image.origin)
    }

    /// Sets PC to `origin_override` or `0x3000` and the condition flag to zero.
    /// General purpose registers and memory are kept.
    pub fn reset(&mut self, origin_override: Option<u16>) {
        self.registers
            .set_pc(origin_override.unwrap_or(PROGRAM_SECTION_START));
        self.registers
            .set_conditional_register(ConditionFlag::Zero);
    }

    #[must_use]
    pub const fn registers(&self) -> &Registers {
        &self.registers
    }
    pub const fn registers_mut(&mut self) -> &mut Registers {
        &mut self.registers
    }
    #[must_use]
    pub const fn memory(&self) -> &Memory {
        &self.memory
    }
    pub const fn memory_mut(&mut self) -> &mut Memory {
        &mut self.memory
    }

    /// Runs the program writing to stdout until it halts or fails.
    pub fn run(&mut self) -> ExitReason {
        self.run_with_output(&mut io::stdout())
    }

    /// Runs the program until it halts or fails.
    ///
    /// Every [`Self::INTERRUPT_CHECK_INTERVAL`] instructions the keyboard is asked for a
    /// stop request, so programs that never read input can still be interrupted.
    pub fn run_with_output(&mut self, stdout: &mut impl Write) -> ExitReason {
        let mut executed: u32 = 0;
        loop {
            executed = executed.wrapping_add(1);
            let res = if executed % Self::INTERRUPT_CHECK_INTERVAL == 0 {
                self.memory
                    .keyboard()
                    .check_interrupt()
                    .map_err(ExecutionError::from)
                    .and_then(|()| self.step(stdout))
            } else {
                self.step(stdout)
            };
            match res {
                Ok(ControlFlow::Continue(())) => {}
                Ok(ControlFlow::Break(())) => return ExitReason::Halted,
                Err(e) => {
                    debug!("Execution stopped: {e}");
                    // the output may be the broken part, nothing left to report to
                    let _ = stdout.flush();
                    return ExitReason::from(e);
                }
            }
        }
    }

    /// Executes the instruction at PC. PC is incremented before execution,
    /// so offsets are relative to the following instruction.
    ///
    /// # Errors
    /// - reading the keyboard or writing to `stdout` failed or was interrupted
    /// - an illegal instruction with [`IllegalOpcodePolicy::Halt`]
    pub fn step(&mut self, stdout: &mut impl Write) -> Result<ControlFlow<()>, ExecutionError> {
        let address = self.registers.pc().as_binary();
        let i = Instruction::from(self.memory.read(address)?);
        self.registers.set_pc(address.wrapping_add(1));
        trace!("{address:#06X}: {i:?}");
        let policy = self.illegal_opcode_policy;
        let (r, m) = (&mut self.registers, &mut self.memory);
        match i.opcode() {
            Some(Opcode::Br) => opcodes::br(i, r),
            Some(Opcode::Add) => opcodes::add(i, r),
            Some(Opcode::Ld) => opcodes::ld(i, r, m)?,
            Some(Opcode::St) => opcodes::st(i, r, m),
            Some(Opcode::Jsr) => opcodes::jsr(i, r),
            Some(Opcode::And) => opcodes::and(i, r),
            Some(Opcode::Ldr) => opcodes::ldr(i, r, m)?,
            Some(Opcode::Str) => opcodes::str(i, r, m),
            Some(Opcode::Not) => opcodes::not(i, r),
            Some(Opcode::Ldi) => opcodes::ldi(i, r, m)?,
            Some(Opcode::Sti) => opcodes::sti(i, r, m)?,
            Some(Opcode::Jmp) => opcodes::jmp_or_ret(i, r),
            Some(Opcode::Lea) => opcodes::lea(i, r),
            Some(Opcode::Trap) => {
                let vector = TrapVector::from(i.trap_vector());
                if let TrapVector::Unrecognized(_) = vector {
                    check_illegal(policy, i, address)?;
                    debug!("Ignoring unknown trap {i:?} at {address:#06X}");
                    return Ok(ControlFlow::Continue(()));
                }
                r.set(7, r.pc());
                return trap_routines::dispatch_trap(vector, r, m, stdout);
            }
            Some(Opcode::Rti | Opcode::Reserved) | None => {
                check_illegal(policy, i, address)?;
                debug!("Ignoring illegal instruction {i:?} at {address:#06X}");
            }
        }
        Ok(ControlFlow::Continue(()))
    }
}

fn check_illegal(
    policy: IllegalOpcodePolicy,
    i: Instruction,
    address: u16,
) -> Result<(), ExecutionError> {
    match policy {
        IllegalOpcodePolicy::Ignore => Ok(()),
        IllegalOpcodePolicy::Halt => Err(ExecutionError::IllegalInstruction {
            instruction: i.bits(),
            address,
        }),
    }
}
