use crate::numbers;
use std::fmt::{Debug, Formatter};

/// The 16 operation codes selected by bits `[15:12]` of an instruction.
#[repr(u8)]
#[derive(enumn::N, Debug, Copy, Clone, PartialEq, Eq)]
pub enum Opcode {
    Br = 0b0000,
    Add = 0b0001,
    Ld = 0b0010,
    St = 0b0011,
    Jsr = 0b0100,
    And = 0b0101,
    Ldr = 0b0110,
    Str = 0b0111,
    /// Return from interrupt, not supported without privilege modes
    Rti = 0b1000,
    Not = 0b1001,
    Ldi = 0b1010,
    Sti = 0b1011,
    Jmp = 0b1100,
    /// Reserved, no defined behaviour
    Reserved = 0b1101,
    Lea = 0b1110,
    Trap = 0b1111,
}

/// Wrapper for LC-3 u16 instruction.
/// format is: `OOOO_DDD_P_PPPP_PPPP`
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct Instruction(u16);

impl Instruction {
    /// Gives the value of only the specified bit range.
    ///
    /// # Parameters
    /// - `from`: starting index
    /// - `to`: end index (inclusive), mut be greater or equal to `from`
    ///
    /// # Panics
    /// - asserts that to is greater or equal from and both are valid indexes
    #[must_use]
    pub fn get_bit_range(self, from: u8, to: u8) -> u16 {
        debug_assert!(
            to >= from,
            "wrong direction of from: {from:?} and to: {to:?}"
        );
        debug_assert!(
            (00..u16::BITS).contains(&u32::from(to)),
            "index: {to:?} to u16 is greater than maximum value {:?}",
            u16::BITS - 1
        );
        (self.0 >> from) & ((0b1 << (to - from + 1)) - 1)
    }
    /// Gives the value of a bit range of at most 8 bits as u8.
    /// See [`Instruction::get_bit_range()`]
    #[must_use]
    pub fn get_bit_range_u8(self, from: u8, to: u8) -> u8 {
        debug_assert!(to - from < 8, "bit range {from}..={to} does not fit into u8");
        #[expect(
            clippy::cast_possible_truncation,
            reason = "range is at most 8 bits wide"
        )]
        {
            self.get_bit_range(from, to) as u8
        }
    }
    #[must_use]
    pub fn get_bit(self, index: u8) -> bool {
        self.get_bit_range(index, index) & 1 != 0
    }
    #[must_use]
    pub const fn bits(self) -> u16 {
        self.0
    }
    #[must_use]
    pub fn op_code(self) -> u8 {
        self.get_bit_range_u8(12, 15)
    }
    /// Decodes the opcode, all 4 bit values are variants of [`Opcode`].
    #[must_use]
    pub fn opcode(self) -> Option<Opcode> {
        Opcode::n(self.op_code())
    }
    /// Destination register, also the source register of the store operations.
    #[must_use]
    pub fn dr_number(self) -> u8 {
        self.get_bit_range_u8(9, 11)
    }
    /// First source register, also `BaseR` of JMP, JSRR, LDR and STR.
    #[must_use]
    pub fn sr1_number(self) -> u8 {
        self.get_bit_range_u8(6, 8)
    }
    #[must_use]
    pub fn sr2_number(self) -> u8 {
        self.get_bit_range_u8(0, 2)
    }
    #[must_use]
    pub fn is_immediate(self) -> bool {
        self.get_bit(5)
    }
    /// Sign extended `imm5`.
    #[must_use]
    pub fn get_immediate(self) -> u16 {
        numbers::sign_extend(self.get_bit_range(0, 4), 5)
    }
    /// Sign extended offset of the lowest `len` bits, to be added to PC or a base register
    /// with wrapping arithmetic.
    #[must_use]
    pub fn pc_offset(self, len: u8) -> u16 {
        numbers::sign_extend(self.get_bit_range(0, len - 1), len)
    }
    /// The `nzp` bits of BR.
    #[must_use]
    pub fn condition_bits(self) -> u16 {
        self.get_bit_range(9, 11)
    }
    #[must_use]
    pub fn trap_vector(self) -> u8 {
        self.get_bit_range_u8(0, 7)
    }
}

impl Debug for Instruction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:#06X} Op: {:04b}, DR: {:03b}, PC_Off: {:09b}",
            self.0,
            self.op_code(),
            self.dr_number(),
            self.get_bit_range(0, 8)
        )
    }
}

impl From<u16> for Instruction {
    fn from(bits: u16) -> Self {
        Self(bits)
    }
}

#[expect(clippy::unusual_byte_groupings)]
#[cfg(test)]
mod tests {
    use super::*;
    use googletest::prelude::*;

    #[gtest]
    pub fn test_instr_get_bit_range_valid() {
        let sut = Instruction::from(0b1010_101_001010101);
        expect_that!(sut.op_code(), eq(0b1010));
        expect_that!(sut.opcode(), some(eq(Opcode::Ldi)));
        expect_that!(sut.dr_number(), eq(0b101));
        expect_that!(sut.pc_offset(9), eq(0b0_0101_0101));

        // Add: DR: 3, SR1: 2, Immediate: false, SR2: 1
        let sut = Instruction::from(0b0001_011_010_0_00_001);
        expect_that!(sut.opcode(), some(eq(Opcode::Add)));
        expect_that!(sut.dr_number(), eq(3));
        expect_that!(sut.sr1_number(), eq(2));
        expect_that!(sut.is_immediate(), eq(false));
        expect_that!(sut.sr2_number(), eq(1));

        // Add: DR: 7, SR1: 0, Immediate: true, imm5: 14
        let sut = Instruction::from(0b0001_111_000_1_01110);
        expect_that!(sut.dr_number(), eq(7));
        expect_that!(sut.sr1_number(), eq(0));
        expect_that!(sut.is_immediate(), eq(true));
        expect_that!(sut.get_immediate(), eq(14));

        // Add: imm5: -1
        let sut = Instruction::from(0b0001_001_010_1_11111);
        expect_that!(sut.get_immediate(), eq(0xFFFF));
    }
    #[gtest]
    pub fn test_instr_negative_offsets() {
        // LD - PC_OFFSET9: -0x44
        expect_that!(
            Instruction::from(0b0010_100_1_1011_1100).pc_offset(9),
            eq((-0x44i16).cast_unsigned())
        );
        // JSR - PC_OFFSET11: -1
        expect_that!(
            Instruction::from(0b0100_1_11111111111).pc_offset(11),
            eq(0xFFFF)
        );
        // LDR - OFFSET6: -32
        expect_that!(
            Instruction::from(0b0110_010_110_100000).pc_offset(6),
            eq((-32i16).cast_unsigned())
        );
    }
    #[gtest]
    pub fn test_instr_trap_fields() {
        let sut = Instruction::from(0xF025);
        expect_that!(sut.opcode(), some(eq(Opcode::Trap)));
        expect_that!(sut.trap_vector(), eq(0x25));
    }
    #[gtest]
    pub fn test_every_op_code_decodes() {
        for op in 0u16..16 {
            expect_that!(Instruction::from(op << 12).opcode(), some(anything()));
        }
    }
    #[gtest]
    #[should_panic(expected = "wrong direction of from: 2 and to: 1")]
    pub fn test_instr_get_bit_range_wrong_order() {
        let sut = Instruction::from(0b1010_101_101010101);
        let _ = sut.get_bit_range(2, 1);
    }
    #[gtest]
    #[should_panic(expected = "index: 16 to u16 is greater than maximum value 15")]
    pub fn test_instr_get_bit_range_index_too_large() {
        let sut = Instruction::from(0b1010_101_101010101);
        let _ = sut.get_bit_range(2, 16);
    }
}
