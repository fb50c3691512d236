use thiserror::Error;

/// Fault classes used for diagnostics and host policy decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum FaultClass {
    /// Decoder rejected an opcode/addressing-mode combination.
    Decode,
    /// Input stream was malformed, exhausted, or unreadable.
    Input,
    /// Output stream rejected a write.
    Output,
    /// Invariant the decoder guarantees was violated.
    Internal,
}

/// Stable fault taxonomy for conditions that stop the fetch-execute cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u8)]
pub enum FaultCode {
    /// Addressing mode is not permitted for the instruction family.
    #[error("illegal addressing mode for instruction")]
    IllegalAddressingMode = 0x01,
    /// Opcode byte has no entry in the decode table.
    #[error("opcode has no decode table entry")]
    UnknownOpcode = 0x02,
    /// `DECI` input did not start with a digit or a minus sign.
    #[error("invalid decimal input")]
    InvalidDecimalInput = 0x03,
    /// Input stream ended while an instruction needed another byte.
    #[error("input stream exhausted")]
    InputExhausted = 0x04,
    /// Host input stream reported a read failure.
    #[error("input stream read failed")]
    InputFailed = 0x05,
    /// Host output stream reported a write failure.
    #[error("output stream write failed")]
    OutputFailed = 0x06,
    /// Resolved operand kind did not match the instruction family.
    #[error("internal decode invariant violated")]
    InternalInvariant = 0x07,
}

impl FaultCode {
    /// Converts a fault code to its stable byte value.
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Converts a stable byte value back into a fault code.
    #[must_use]
    pub const fn from_u8(code: u8) -> Option<Self> {
        match code {
            0x01 => Some(Self::IllegalAddressingMode),
            0x02 => Some(Self::UnknownOpcode),
            0x03 => Some(Self::InvalidDecimalInput),
            0x04 => Some(Self::InputExhausted),
            0x05 => Some(Self::InputFailed),
            0x06 => Some(Self::OutputFailed),
            0x07 => Some(Self::InternalInvariant),
            _ => None,
        }
    }

    /// Returns the diagnostics fault class for this fault code.
    #[must_use]
    pub const fn class(self) -> FaultClass {
        match self {
            Self::IllegalAddressingMode => FaultClass::Decode,
            Self::InvalidDecimalInput | Self::InputExhausted | Self::InputFailed => {
                FaultClass::Input
            }
            Self::OutputFailed => FaultClass::Output,
            Self::UnknownOpcode | Self::InternalInvariant => FaultClass::Internal,
        }
    }

    /// Faults that a correct decoder makes unreachable.
    #[must_use]
    pub const fn is_internal(self) -> bool {
        matches!(self.class(), FaultClass::Internal)
    }
}

/// Fault reason carried out of the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FaultReason {
    code: FaultCode,
    opcode: u8,
}

impl FaultReason {
    /// Creates a fault reason for the opcode that triggered it.
    #[must_use]
    pub const fn new(code: FaultCode, opcode: u8) -> Self {
        Self { code, opcode }
    }

    /// Returns the canonical fault code.
    #[must_use]
    pub const fn code(self) -> FaultCode {
        self.code
    }

    /// Returns the opcode byte that was being decoded.
    #[must_use]
    pub const fn opcode(self) -> u8 {
        self.opcode
    }
}

/// Fatal machine condition surfaced to the host together with its location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[error("{code} (opcode {opcode:#04x} at pc {pc:#06x})")]
pub struct MachineFault {
    /// Canonical fault code.
    #[source]
    pub code: FaultCode,
    /// Address of the faulting instruction.
    pub pc: u16,
    /// Opcode byte of the faulting instruction.
    pub opcode: u8,
}
