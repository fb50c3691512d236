//! Opcode decoder for the PEP/8 instruction set.
//!
//! Decoding is a pure partition of the opcode byte into base operation,
//! register field and addressing-mode field, followed by the per-family
//! addressing-mode legality checks.

use crate::encoding::{classify_opcode, BaseOp, ModeField, OperandStrategy, RegisterField};
use crate::fault::{FaultCode, FaultReason};
use crate::state::Register;

/// Addressing modes in 3-bit field order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum AddressingMode {
    /// `i`: the specifier is the operand.
    Immediate,
    /// `d`: the specifier is the address.
    Direct,
    /// `n`: the specifier points at the address.
    Indirect,
    /// `s`: stack-relative.
    StackRelative,
    /// `sf`: stack-relative deferred.
    StackRelativeDeferred,
    /// `x`: indexed.
    Indexed,
    /// `sx`: stack-indexed.
    StackIndexed,
    /// `sxf`: stack-indexed deferred.
    StackIndexedDeferred,
}

impl AddressingMode {
    /// Converts the low three bits of a value into an addressing mode.
    #[must_use]
    pub const fn from_u3(value: u8) -> Self {
        match value & 0x7 {
            0 => Self::Immediate,
            1 => Self::Direct,
            2 => Self::Indirect,
            3 => Self::StackRelative,
            4 => Self::StackRelativeDeferred,
            5 => Self::Indexed,
            6 => Self::StackIndexed,
            _ => Self::StackIndexedDeferred,
        }
    }

    /// Assembler suffix for this mode.
    #[must_use]
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::Immediate => "i",
            Self::Direct => "d",
            Self::Indirect => "n",
            Self::StackRelative => "s",
            Self::StackRelativeDeferred => "sf",
            Self::Indexed => "x",
            Self::StackIndexed => "sx",
            Self::StackIndexedDeferred => "sxf",
        }
    }
}

/// Decoded instruction with all opcode fields extracted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct DecodedInstruction {
    /// Raw opcode byte.
    pub opcode: u8,
    /// Base operation family.
    pub base_op: BaseOp,
    /// Register selected by the register field, if the family has one.
    pub register: Option<Register>,
    /// Addressing mode, if the family has a mode field.
    pub addressing_mode: Option<AddressingMode>,
}

impl DecodedInstruction {
    /// Returns `true` when a 16-bit operand specifier follows the opcode.
    #[must_use]
    pub const fn requires_spec(self) -> bool {
        self.base_op.requires_spec()
    }

    /// Returns `true` when the opcode carries a register field.
    #[must_use]
    pub const fn has_register_field(self) -> bool {
        self.register.is_some()
    }

    /// Returns `true` when the opcode carries an addressing-mode field.
    #[must_use]
    pub const fn has_address_field(self) -> bool {
        self.addressing_mode.is_some()
    }

    /// Operand resolution strategy for this instruction.
    #[must_use]
    pub const fn operand_strategy(self) -> OperandStrategy {
        self.base_op.operand_strategy()
    }

    /// Renders the instruction mnemonic, e.g. `LDA,i`, `ASLX`, `BRLE,x`, `STOP`.
    ///
    /// The unconditional `BR` is rendered without its mode suffix.
    #[must_use]
    pub fn mnemonic(self) -> String {
        let mut text = String::from(self.base_op.mnemonic());
        if let Some(register) = self.register {
            text.push(register.letter());
        }
        if let Some(mode) = self.addressing_mode.filter(|_| self.base_op != BaseOp::Br) {
            text.push(',');
            text.push_str(mode.suffix());
        }
        text
    }
}

/// Result of decoding an opcode byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedOrFault {
    /// Successfully decoded instruction.
    Instruction(DecodedInstruction),
    /// Decoding failed with a fault.
    Fault(FaultReason),
}

impl DecodedOrFault {
    /// Returns the decoded instruction if present.
    #[must_use]
    pub const fn instruction(self) -> Option<DecodedInstruction> {
        match self {
            Self::Instruction(i) => Some(i),
            Self::Fault(_) => None,
        }
    }

    /// Returns the fault reason if decoding failed.
    #[must_use]
    pub const fn fault(self) -> Option<FaultReason> {
        match self {
            Self::Instruction(_) => None,
            Self::Fault(f) => Some(f),
        }
    }
}

impl From<DecodedOrFault> for Result<DecodedInstruction, FaultCode> {
    fn from(value: DecodedOrFault) -> Self {
        match value {
            DecodedOrFault::Instruction(i) => Ok(i),
            DecodedOrFault::Fault(r) => Err(r.code()),
        }
    }
}

/// Opcode decoder for the PEP/8 instruction set.
pub struct Decoder;

const fn mode_is_legal(base_op: BaseOp, mode: AddressingMode) -> bool {
    match base_op {
        BaseOp::Nop => matches!(mode, AddressingMode::Immediate),
        BaseOp::Stro => matches!(
            mode,
            AddressingMode::Direct
                | AddressingMode::Indirect
                | AddressingMode::StackRelativeDeferred
        ),
        BaseOp::Deci | BaseOp::Chari | BaseOp::St | BaseOp::Stbyte => {
            !matches!(mode, AddressingMode::Immediate)
        }
        _ => true,
    }
}

impl Decoder {
    /// Decodes one opcode byte.
    ///
    /// Faults with `IllegalAddressingMode` when the mode field names a mode
    /// the family rejects, and with the internal `UnknownOpcode` on a table
    /// miss.
    #[must_use]
    pub fn decode(opcode: u8) -> DecodedOrFault {
        let Some(base_op) = classify_opcode(opcode) else {
            return DecodedOrFault::Fault(FaultReason::new(FaultCode::UnknownOpcode, opcode));
        };

        let register = match base_op.register_field() {
            RegisterField::None => None,
            RegisterField::Bit0 => Some(Register::from_bit(opcode)),
            RegisterField::Bit3 => Some(Register::from_bit(opcode >> 3)),
        };

        let addressing_mode = match base_op.mode_field() {
            ModeField::None => None,
            ModeField::Branch => Some(if opcode & 1 == 0 {
                AddressingMode::Immediate
            } else {
                AddressingMode::Indexed
            }),
            ModeField::Full => Some(AddressingMode::from_u3(opcode)),
        };

        if let Some(mode) = addressing_mode {
            if !mode_is_legal(base_op, mode) {
                return DecodedOrFault::Fault(FaultReason::new(
                    FaultCode::IllegalAddressingMode,
                    opcode,
                ));
            }
        }

        DecodedOrFault::Instruction(DecodedInstruction {
            opcode,
            base_op,
            register,
            addressing_mode,
        })
    }
}
