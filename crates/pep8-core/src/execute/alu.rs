//! 16-bit two's-complement arithmetic and the flags each operation defines.

use super::flags::FlagsUpdate;

/// Result word together with the flags the operation defines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AluResult {
    /// Truncated 16-bit result.
    pub value: u16,
    /// Flags defined by the operation.
    pub flags: FlagsUpdate,
}

const fn is_negative(value: u16) -> bool {
    value & 0x8000 != 0
}

/// Adds two words, deriving all four flags.
#[must_use]
pub const fn add16(lhs: u16, rhs: u16) -> AluResult {
    let sum = lhs as u32 + rhs as u32;
    #[allow(clippy::cast_possible_truncation)]
    let value = sum as u16;
    let overflow = is_negative(lhs) == is_negative(rhs) && is_negative(value) != is_negative(lhs);
    AluResult {
        value,
        flags: FlagsUpdate::Nzvc {
            negative: is_negative(value),
            zero: value == 0,
            overflow,
            carry: sum & 0x1_0000 != 0,
        },
    }
}

/// Subtracts by adding the two's-complement negation of `rhs`.
#[must_use]
pub const fn sub16(lhs: u16, rhs: u16) -> AluResult {
    add16(lhs, rhs.wrapping_neg())
}

/// Arithmetic shift left; defines `C` (old bit 15) and `V` (sign changed).
#[must_use]
pub const fn shift_left(value: u16) -> AluResult {
    let result = value << 1;
    AluResult {
        value: result,
        flags: FlagsUpdate::CarryOverflow {
            carry: is_negative(value),
            overflow: is_negative(value) != is_negative(result),
        },
    }
}

/// Arithmetic shift right; defines `C` (old bit 0) and replicates the sign.
#[must_use]
pub const fn shift_right_arithmetic(value: u16) -> AluResult {
    AluResult {
        value: (value >> 1) | (value & 0x8000),
        flags: FlagsUpdate::Carry {
            carry: value & 1 != 0,
        },
    }
}

/// Rotates left through carry.
#[must_use]
pub const fn rotate_left(value: u16, carry_in: bool) -> AluResult {
    AluResult {
        value: (value << 1) | carry_in as u16,
        flags: FlagsUpdate::Carry {
            carry: is_negative(value),
        },
    }
}

/// Rotates right through carry.
#[must_use]
pub const fn rotate_right(value: u16, carry_in: bool) -> AluResult {
    AluResult {
        value: (value >> 1) | ((carry_in as u16) << 15),
        flags: FlagsUpdate::Carry {
            carry: value & 1 != 0,
        },
    }
}

/// Bitwise complement; defines `N` and `Z`.
#[must_use]
pub const fn complement(value: u16) -> AluResult {
    let value = !value;
    AluResult {
        value,
        flags: FlagsUpdate::nz_of(value),
    }
}

/// Two's-complement negation; `V` is set when negating `0x8000`.
#[must_use]
pub const fn negate(value: u16) -> AluResult {
    let value = value.wrapping_neg();
    AluResult {
        value,
        flags: FlagsUpdate::Nzv {
            negative: is_negative(value),
            zero: value == 0,
            overflow: value == 0x8000,
        },
    }
}

/// Bitwise AND; defines `N` and `Z`.
#[must_use]
pub const fn logic_and(lhs: u16, rhs: u16) -> AluResult {
    let value = lhs & rhs;
    AluResult {
        value,
        flags: FlagsUpdate::nz_of(value),
    }
}

/// Bitwise OR; defines `N` and `Z`.
#[must_use]
pub const fn logic_or(lhs: u16, rhs: u16) -> AluResult {
    let value = lhs | rhs;
    AluResult {
        value,
        flags: FlagsUpdate::nz_of(value),
    }
}
