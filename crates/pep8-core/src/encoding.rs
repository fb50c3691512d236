/// Base operation identified by an opcode byte, independent of register and
/// addressing-mode fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[allow(missing_docs)]
pub enum BaseOp {
    Stop,
    Rettr,
    Movspa,
    Movflga,
    Br,
    Brle,
    Brlt,
    Breq,
    Brne,
    Brge,
    Brgt,
    Brv,
    Brc,
    Call,
    Not,
    Neg,
    Asl,
    Asr,
    Rol,
    Ror,
    /// `NOP0`..`NOP3`, no operand specifier.
    NopUnary,
    /// Extended `NOP` with an operand specifier.
    Nop,
    Deci,
    Deco,
    Stro,
    Chari,
    Charo,
    /// `RET0`..`RET7`; the low three opcode bits count local bytes.
    Ret,
    Addsp,
    Subsp,
    Add,
    Sub,
    And,
    Or,
    Cp,
    Ld,
    Ldbyte,
    St,
    Stbyte,
}

/// How an instruction's addressing-mode field is laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModeField {
    /// No addressing-mode field.
    None,
    /// Bit 0 selects immediate or indexed (branches and `CALL`).
    Branch,
    /// Bits 2..0 select one of the eight addressing modes.
    Full,
}

/// Where the register field lives in the opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegisterField {
    /// No register field.
    None,
    /// Bit 0 (unary register instructions).
    Bit0,
    /// Bit 3 (binary register instructions).
    Bit3,
}

/// Operand resolution strategy chosen by the base operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperandStrategy {
    /// Instruction consumes a resolved value.
    Value,
    /// Instruction consumes a resolved memory address.
    Address,
}

impl BaseOp {
    /// Assembler mnemonic used in trace rendering.
    #[must_use]
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::Stop => "STOP",
            Self::Rettr => "RETTR",
            Self::Movspa => "MOVSPA",
            Self::Movflga => "MOVFLGA",
            Self::Br => "BR",
            Self::Brle => "BRLE",
            Self::Brlt => "BRLT",
            Self::Breq => "BREQ",
            Self::Brne => "BRNE",
            Self::Brge => "BRGE",
            Self::Brgt => "BRGT",
            Self::Brv => "BRV",
            Self::Brc => "BRC",
            Self::Call => "CALL",
            Self::Not => "NOT",
            Self::Neg => "NEG",
            Self::Asl => "ASL",
            Self::Asr => "ASR",
            Self::Rol => "ROL",
            Self::Ror => "ROR",
            Self::NopUnary | Self::Nop => "NOP",
            Self::Deci => "DECI",
            Self::Deco => "DECO",
            Self::Stro => "STRO",
            Self::Chari => "CHARI",
            Self::Charo => "CHARO",
            Self::Ret => "RET",
            Self::Addsp => "ADDSP",
            Self::Subsp => "SUBSP",
            Self::Add => "ADD",
            Self::Sub => "SUB",
            Self::And => "AND",
            Self::Or => "OR",
            Self::Cp => "CP",
            Self::Ld => "LD",
            Self::Ldbyte => "LDBYTE",
            Self::St => "ST",
            Self::Stbyte => "STBYTE",
        }
    }

    /// Layout of the addressing-mode field for this family.
    #[must_use]
    pub const fn mode_field(self) -> ModeField {
        match self {
            Self::Br
            | Self::Brle
            | Self::Brlt
            | Self::Breq
            | Self::Brne
            | Self::Brge
            | Self::Brgt
            | Self::Brv
            | Self::Brc
            | Self::Call => ModeField::Branch,
            Self::Stop
            | Self::Rettr
            | Self::Movspa
            | Self::Movflga
            | Self::Not
            | Self::Neg
            | Self::Asl
            | Self::Asr
            | Self::Rol
            | Self::Ror
            | Self::NopUnary
            | Self::Ret => ModeField::None,
            Self::Nop
            | Self::Deci
            | Self::Deco
            | Self::Stro
            | Self::Chari
            | Self::Charo
            | Self::Addsp
            | Self::Subsp
            | Self::Add
            | Self::Sub
            | Self::And
            | Self::Or
            | Self::Cp
            | Self::Ld
            | Self::Ldbyte
            | Self::St
            | Self::Stbyte => ModeField::Full,
        }
    }

    /// Location of the register field for this family.
    #[must_use]
    pub const fn register_field(self) -> RegisterField {
        match self {
            Self::Not | Self::Neg | Self::Asl | Self::Asr | Self::Rol | Self::Ror => {
                RegisterField::Bit0
            }
            Self::Add
            | Self::Sub
            | Self::And
            | Self::Or
            | Self::Cp
            | Self::Ld
            | Self::Ldbyte
            | Self::St
            | Self::Stbyte => RegisterField::Bit3,
            _ => RegisterField::None,
        }
    }

    /// Returns `true` when a 16-bit operand specifier follows the opcode.
    #[must_use]
    pub const fn requires_spec(self) -> bool {
        !matches!(self.mode_field(), ModeField::None)
    }

    /// Operand resolution strategy for this family.
    #[must_use]
    pub const fn operand_strategy(self) -> OperandStrategy {
        match self {
            Self::St | Self::Stbyte | Self::Deci | Self::Chari | Self::Stro => {
                OperandStrategy::Address
            }
            _ => OperandStrategy::Value,
        }
    }
}

/// Single source-of-truth opcode table as inclusive `(first, last, op)` ranges.
///
/// The ranges are contiguous and cover every byte value.
pub const OPCODE_ENCODING_TABLE: &[(u8, u8, BaseOp)] = &[
    (0x00, 0x00, BaseOp::Stop),
    (0x01, 0x01, BaseOp::Rettr),
    (0x02, 0x02, BaseOp::Movspa),
    (0x03, 0x03, BaseOp::Movflga),
    (0x04, 0x05, BaseOp::Br),
    (0x06, 0x07, BaseOp::Brle),
    (0x08, 0x09, BaseOp::Brlt),
    (0x0A, 0x0B, BaseOp::Breq),
    (0x0C, 0x0D, BaseOp::Brne),
    (0x0E, 0x0F, BaseOp::Brge),
    (0x10, 0x11, BaseOp::Brgt),
    (0x12, 0x13, BaseOp::Brv),
    (0x14, 0x15, BaseOp::Brc),
    (0x16, 0x17, BaseOp::Call),
    (0x18, 0x19, BaseOp::Not),
    (0x1A, 0x1B, BaseOp::Neg),
    (0x1C, 0x1D, BaseOp::Asl),
    (0x1E, 0x1F, BaseOp::Asr),
    (0x20, 0x21, BaseOp::Rol),
    (0x22, 0x23, BaseOp::Ror),
    (0x24, 0x27, BaseOp::NopUnary),
    (0x28, 0x2F, BaseOp::Nop),
    (0x30, 0x37, BaseOp::Deci),
    (0x38, 0x3F, BaseOp::Deco),
    (0x40, 0x47, BaseOp::Stro),
    (0x48, 0x4F, BaseOp::Chari),
    (0x50, 0x57, BaseOp::Charo),
    (0x58, 0x5F, BaseOp::Ret),
    (0x60, 0x67, BaseOp::Addsp),
    (0x68, 0x6F, BaseOp::Subsp),
    (0x70, 0x7F, BaseOp::Add),
    (0x80, 0x8F, BaseOp::Sub),
    (0x90, 0x9F, BaseOp::And),
    (0xA0, 0xAF, BaseOp::Or),
    (0xB0, 0xBF, BaseOp::Cp),
    (0xC0, 0xCF, BaseOp::Ld),
    (0xD0, 0xDF, BaseOp::Ldbyte),
    (0xE0, 0xEF, BaseOp::St),
    (0xF0, 0xFF, BaseOp::Stbyte),
];

/// Returns the base operation for an opcode byte.
///
/// `None` means the table has no entry, which the exhaustive coverage tests
/// rule out.
#[must_use]
pub fn classify_opcode(opcode: u8) -> Option<BaseOp> {
    OPCODE_ENCODING_TABLE
        .iter()
        .find_map(|(first, last, op)| (*first..=*last).contains(&opcode).then_some(*op))
}

#[cfg(test)]
mod tests {
    use super::{classify_opcode, BaseOp, OperandStrategy, OPCODE_ENCODING_TABLE};

    #[test]
    fn table_ranges_are_contiguous_and_cover_every_byte() {
        let mut expected_first = 0u16;
        for (first, last, _) in OPCODE_ENCODING_TABLE {
            assert_eq!(u16::from(*first), expected_first);
            assert!(first <= last);
            expected_first = u16::from(*last) + 1;
        }
        assert_eq!(expected_first, 0x100);
    }

    #[test]
    fn every_opcode_classifies() {
        for opcode in 0u8..=u8::MAX {
            assert!(classify_opcode(opcode).is_some(), "{opcode:#04x}");
        }
    }

    #[test]
    fn lookup_matches_known_assigned_encodings() {
        assert_eq!(classify_opcode(0x00), Some(BaseOp::Stop));
        assert_eq!(classify_opcode(0x05), Some(BaseOp::Br));
        assert_eq!(classify_opcode(0x17), Some(BaseOp::Call));
        assert_eq!(classify_opcode(0x27), Some(BaseOp::NopUnary));
        assert_eq!(classify_opcode(0x28), Some(BaseOp::Nop));
        assert_eq!(classify_opcode(0x5F), Some(BaseOp::Ret));
        assert_eq!(classify_opcode(0xC0), Some(BaseOp::Ld));
        assert_eq!(classify_opcode(0xFF), Some(BaseOp::Stbyte));
    }

    #[test]
    fn specifier_free_families_match_instruction_set() {
        let spec_free: Vec<BaseOp> = OPCODE_ENCODING_TABLE
            .iter()
            .map(|(_, _, op)| *op)
            .filter(|op| !op.requires_spec())
            .collect();
        assert_eq!(
            spec_free,
            vec![
                BaseOp::Stop,
                BaseOp::Rettr,
                BaseOp::Movspa,
                BaseOp::Movflga,
                BaseOp::Not,
                BaseOp::Neg,
                BaseOp::Asl,
                BaseOp::Asr,
                BaseOp::Rol,
                BaseOp::Ror,
                BaseOp::NopUnary,
                BaseOp::Ret,
            ]
        );
    }

    #[test]
    fn address_strategy_is_limited_to_memory_targets() {
        for (_, _, op) in OPCODE_ENCODING_TABLE {
            let expected = matches!(
                op,
                BaseOp::St | BaseOp::Stbyte | BaseOp::Deci | BaseOp::Chari | BaseOp::Stro
            );
            assert_eq!(
                op.operand_strategy() == OperandStrategy::Address,
                expected,
                "{op:?}"
            );
        }
    }
}
