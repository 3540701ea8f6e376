use crate::hardware::memory::PROGRAM_SECTION_START;
use crate::numbers;
use std::fmt::{Debug, Formatter};

/// Value of a 16 bit register, can be viewed as raw bits or as two's complement number.
#[derive(Copy, Clone, PartialEq, Eq, Default)]
pub struct Register(u16);

impl Register {
    #[must_use]
    pub const fn from_binary(value: u16) -> Self {
        Self(value)
    }
    #[must_use]
    pub const fn from_decimal(value: i16) -> Self {
        Self(value.cast_unsigned())
    }
    #[must_use]
    pub const fn as_binary(self) -> u16 {
        self.0
    }
    #[must_use]
    pub const fn as_decimal(self) -> i16 {
        numbers::twos_complement_to_decimal(self.0)
    }
}

impl Debug for Register {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#06X} ({})", self.0, self.as_decimal())
    }
}

#[must_use]
pub const fn from_binary(value: u16) -> Register {
    Register::from_binary(value)
}
#[must_use]
pub const fn from_decimal(value: i16) -> Register {
    Register::from_decimal(value)
}

/// The LC-3 register file: R0 to R7, program counter and condition flag.
pub struct Registers {
    general_purpose: [Register; 8],
    pc: Register,
    cond: ConditionFlag,
}

impl Default for Registers {
    fn default() -> Self {
        Self::new()
    }
}

impl Registers {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            general_purpose: [Register(0); 8],
            pc: Register(PROGRAM_SECTION_START),
            cond: ConditionFlag::Zero,
        }
    }

    /// # Panics
    /// - `r` is not a general purpose register index `0..=7`
    #[must_use]
    pub fn get(&self, r: u8) -> Register {
        assert!(r <= 7, "Invalid general purpose register get: {r}");
        self.general_purpose[usize::from(r)]
    }
    /// # Panics
    /// - `r` is not a general purpose register index `0..=7`
    pub fn set(&mut self, r: u8, value: Register) {
        assert!(r <= 7, "Invalid general purpose register set: {r}");
        self.general_purpose[usize::from(r)] = value;
    }
    #[must_use]
    pub const fn pc(&self) -> Register {
        self.pc
    }
    pub const fn set_pc(&mut self, value: u16) {
        self.pc = Register(value);
    }

    #[must_use]
    pub const fn get_conditional_register(&self) -> ConditionFlag {
        self.cond
    }
    pub const fn set_conditional_register(&mut self, cond: ConditionFlag) {
        self.cond = cond;
    }
    /// Recomputes the condition flag from the value just written to register `r`.
    pub fn update_conditional_register(&mut self, r: u8) {
        self.cond = ConditionFlag::from(self.get(r).as_binary());
    }
}

impl Debug for Registers {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registers")
            .field("r", &self.general_purpose)
            .field("pc", &self.pc)
            .field("cond", &self.cond)
            .finish()
    }
}

/// Exactly one flag is set at a time, the values match the `nzp` bits of the BR instruction.
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionFlag {
    Pos = 1 << 0, // Positive
    Zero = 1 << 1,
    Neg = 1 << 2, // Negative
}

impl ConditionFlag {
    #[must_use]
    pub const fn bits(self) -> u16 {
        self as u16
    }
}

impl From<u16> for ConditionFlag {
    fn from(value: u16) -> Self {
        if value == 0 {
            Self::Zero
        } else if value >> 15 == 1 {
            // leftmost bit is 1 for negative numbers
            Self::Neg
        } else {
            Self::Pos
        }
    }
}
