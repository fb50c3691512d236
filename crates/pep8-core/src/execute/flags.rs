//! FLAGS update behaviors for different instruction classes.

use crate::state::{FLAGS_C, FLAGS_N, FLAGS_V, FLAGS_Z};

/// Describes which FLAGS an instruction defines; all others are preserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlagsUpdate {
    /// No change to FLAGS.
    #[default]
    None,
    /// Update `N` and `Z`.
    Nz {
        /// Negative flag.
        negative: bool,
        /// Zero flag.
        zero: bool,
    },
    /// Update `N`, `Z` and `V`.
    Nzv {
        /// Negative flag.
        negative: bool,
        /// Zero flag.
        zero: bool,
        /// Overflow flag.
        overflow: bool,
    },
    /// Update all four flags.
    Nzvc {
        /// Negative flag.
        negative: bool,
        /// Zero flag.
        zero: bool,
        /// Overflow flag.
        overflow: bool,
        /// Carry flag.
        carry: bool,
    },
    /// Update `C` only.
    Carry {
        /// Carry flag.
        carry: bool,
    },
    /// Update `C` and `V`.
    CarryOverflow {
        /// Carry flag.
        carry: bool,
        /// Overflow flag.
        overflow: bool,
    },
}

const fn assign(flags: u8, bit: u8, enabled: bool) -> u8 {
    if enabled {
        flags | bit
    } else {
        flags & !bit
    }
}

impl FlagsUpdate {
    /// `N`/`Z` derived from a 16-bit result.
    #[must_use]
    pub const fn nz_of(value: u16) -> Self {
        Self::Nz {
            negative: value & 0x8000 != 0,
            zero: value == 0,
        }
    }

    /// Applies this update to a packed `NZVC` value.
    #[must_use]
    pub const fn apply(self, flags: u8) -> u8 {
        match self {
            Self::None => flags,
            Self::Nz { negative, zero } => assign(assign(flags, FLAGS_N, negative), FLAGS_Z, zero),
            Self::Nzv {
                negative,
                zero,
                overflow,
            } => assign(
                assign(assign(flags, FLAGS_N, negative), FLAGS_Z, zero),
                FLAGS_V,
                overflow,
            ),
            Self::Nzvc {
                negative,
                zero,
                overflow,
                carry,
            } => assign(
                assign(
                    assign(assign(flags, FLAGS_N, negative), FLAGS_Z, zero),
                    FLAGS_V,
                    overflow,
                ),
                FLAGS_C,
                carry,
            ),
            Self::Carry { carry } => assign(flags, FLAGS_C, carry),
            Self::CarryOverflow { carry, overflow } => {
                assign(assign(flags, FLAGS_C, carry), FLAGS_V, overflow)
            }
        }
    }
}
