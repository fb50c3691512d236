/// `FLAGS` bit for unsigned carry.
pub const FLAGS_C: u8 = 1 << 0;
/// `FLAGS` bit for signed overflow.
pub const FLAGS_V: u8 = 1 << 1;
/// `FLAGS` bit for zero result.
pub const FLAGS_Z: u8 = 1 << 2;
/// `FLAGS` bit for negative result.
pub const FLAGS_N: u8 = 1 << 3;
/// Mask of architecturally active `FLAGS` bits (`N/Z/V/C`).
pub const FLAGS_ACTIVE_MASK: u8 = FLAGS_N | FLAGS_Z | FLAGS_V | FLAGS_C;
/// Stack pointer value after power-on and image load.
pub const POWER_ON_SP: u16 = 0xFFFF;

/// Register selected by an instruction's register field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum Register {
    /// Accumulator.
    A,
    /// Index register.
    X,
}

impl Register {
    /// Decodes a 1-bit register field (`0 = A`, `1 = X`).
    #[must_use]
    pub const fn from_bit(bit: u8) -> Self {
        if bit & 1 == 0 {
            Self::A
        } else {
            Self::X
        }
    }

    /// Returns the letter used in rendered mnemonics.
    #[must_use]
    pub const fn letter(self) -> char {
        match self {
            Self::A => 'A',
            Self::X => 'X',
        }
    }
}

/// Full architectural register state.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct ArchitecturalState {
    a: u16,
    x: u16,
    pc: u16,
    sp: u16,
    ir: u8,
    flags: u8,
}

impl Default for ArchitecturalState {
    fn default() -> Self {
        Self {
            a: 0,
            x: 0,
            pc: 0,
            sp: POWER_ON_SP,
            ir: 0,
            flags: 0,
        }
    }
}

impl ArchitecturalState {
    /// Reads the accumulator or index register.
    #[must_use]
    pub const fn reg(&self, reg: Register) -> u16 {
        match reg {
            Register::A => self.a,
            Register::X => self.x,
        }
    }

    /// Writes the accumulator or index register.
    pub const fn set_reg(&mut self, reg: Register, value: u16) {
        match reg {
            Register::A => self.a = value,
            Register::X => self.x = value,
        }
    }

    /// Reads the `A` register.
    #[must_use]
    pub const fn a(&self) -> u16 {
        self.a
    }

    /// Reads the `X` register.
    #[must_use]
    pub const fn x(&self) -> u16 {
        self.x
    }

    /// Reads the `PC` register.
    #[must_use]
    pub const fn pc(&self) -> u16 {
        self.pc
    }

    /// Writes the `PC` register.
    pub const fn set_pc(&mut self, value: u16) {
        self.pc = value;
    }

    /// Reads the `SP` register.
    #[must_use]
    pub const fn sp(&self) -> u16 {
        self.sp
    }

    /// Writes the `SP` register.
    pub const fn set_sp(&mut self, value: u16) {
        self.sp = value;
    }

    /// Reads the instruction register (current opcode byte).
    #[must_use]
    pub const fn ir(&self) -> u8 {
        self.ir
    }

    /// Writes the instruction register.
    pub const fn set_ir(&mut self, opcode: u8) {
        self.ir = opcode;
    }

    /// Reads the packed `NZVC` flags (`C = bit 0` .. `N = bit 3`).
    #[must_use]
    pub const fn flags(&self) -> u8 {
        self.flags
    }

    /// Writes the packed flags; bits outside `NZVC` are dropped.
    pub const fn set_flags(&mut self, value: u8) {
        self.flags = value & FLAGS_ACTIVE_MASK;
    }

    /// Returns `true` when a specific flag bit is set.
    #[must_use]
    pub const fn flag_is_set(&self, flag: u8) -> bool {
        (self.flags & flag) != 0
    }

    /// Sets or clears a specific flag bit.
    pub const fn set_flag(&mut self, flag: u8, enabled: bool) {
        if enabled {
            self.flags |= flag & FLAGS_ACTIVE_MASK;
        } else {
            self.flags &= !(flag & FLAGS_ACTIVE_MASK);
        }
    }

    /// Negative flag.
    #[must_use]
    pub const fn n(&self) -> bool {
        self.flag_is_set(FLAGS_N)
    }

    /// Zero flag.
    #[must_use]
    pub const fn z(&self) -> bool {
        self.flag_is_set(FLAGS_Z)
    }

    /// Overflow flag.
    #[must_use]
    pub const fn v(&self) -> bool {
        self.flag_is_set(FLAGS_V)
    }

    /// Carry flag.
    #[must_use]
    pub const fn c(&self) -> bool {
        self.flag_is_set(FLAGS_C)
    }
}

#[cfg(test)]
mod tests {
    use super::{
        ArchitecturalState, Register, FLAGS_ACTIVE_MASK, FLAGS_C, FLAGS_N, FLAGS_V, FLAGS_Z,
        POWER_ON_SP,
    };

    #[test]
    fn power_on_defaults_match_architecture() {
        let state = ArchitecturalState::default();
        assert_eq!(state.a(), 0);
        assert_eq!(state.x(), 0);
        assert_eq!(state.pc(), 0);
        assert_eq!(state.sp(), POWER_ON_SP);
        assert_eq!(state.ir(), 0);
        assert_eq!(state.flags(), 0);
    }

    #[test]
    fn register_field_selects_accumulator_or_index() {
        assert_eq!(Register::from_bit(0), Register::A);
        assert_eq!(Register::from_bit(1), Register::X);

        let mut state = ArchitecturalState::default();
        state.set_reg(Register::A, 0x1234);
        state.set_reg(Register::X, 0xBEEF);
        assert_eq!(state.reg(Register::A), 0x1234);
        assert_eq!(state.reg(Register::X), 0xBEEF);
        assert_eq!(state.a(), 0x1234);
        assert_eq!(state.x(), 0xBEEF);
    }

    #[test]
    fn flags_only_store_active_architectural_bits() {
        let mut state = ArchitecturalState::default();
        state.set_flags(u8::MAX);

        assert_eq!(state.flags(), FLAGS_ACTIVE_MASK);
    }

    #[test]
    fn flag_layout_matches_movflga_packing() {
        let mut state = ArchitecturalState::default();
        state.set_flag(FLAGS_N, true);
        state.set_flag(FLAGS_C, true);
        assert_eq!(state.flags(), 0b1001);
        assert!(state.n() && state.c());
        assert!(!state.z() && !state.v());
    }

    #[test]
    fn flags_individual_bits_can_be_set_and_cleared() {
        let mut state = ArchitecturalState::default();

        for flag in [FLAGS_N, FLAGS_Z, FLAGS_V, FLAGS_C] {
            state.set_flag(flag, true);
            assert!(state.flag_is_set(flag));
        }

        for flag in [FLAGS_N, FLAGS_Z, FLAGS_V, FLAGS_C] {
            state.set_flag(flag, false);
            assert!(!state.flag_is_set(flag));
        }

        assert_eq!(state.flags(), 0);
    }
}
