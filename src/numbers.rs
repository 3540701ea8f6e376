//! Two's complement helpers for the 16 bit LC-3 word.

/// Implements sign extension as described at [Sign extension](https://en.wikipedia.org/wiki/Sign_extension).
///
/// `bits` holds a two's complement value in its lowest `valid_bits` bits, the result
/// is the same value widened to 16 bits.
///
/// # Panics
/// - debug builds assert that `valid_bits` is in `1..16`
#[must_use]
pub const fn sign_extend(bits: u16, valid_bits: u8) -> u16 {
    debug_assert!(valid_bits > 0 && valid_bits < 16, "invalid bit count");
    let bits = bits & ((1 << valid_bits) - 1);
    let most_significant_bit = (bits >> (valid_bits - 1)) & 1;
    if most_significant_bit == 1 {
        // negative: 1-extend
        bits | (0xFFFF << valid_bits)
    } else {
        // positive, already 0-extended
        bits
    }
}

/// Interprets the 16 bits as a two's complement number.
#[must_use]
pub const fn twos_complement_to_decimal(bin_rep: u16) -> i16 {
    bin_rep.cast_signed()
}
