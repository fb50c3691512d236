//! Instruction decode and execution core for the PEP/8 teaching computer.
//!
//! The machine has a 16-bit accumulator and index register, a 64 KiB
//! byte-addressable memory, and one-byte opcodes optionally followed by a
//! big-endian operand specifier. [`Emulator`] drives the fetch-decode-execute
//! cycle over borrowed console streams; the lower-level [`step_one`] works
//! directly on a [`CoreState`].

/// Flat 64 KiB memory model.
pub mod memory;
pub use memory::{
    new_address_space, read_u16_be, read_u8, write_u16_be, write_u8, ADDRESS_SPACE_BYTES,
    WORD_ACCESS_BYTES,
};

/// Public host-facing API contract and integration types.
pub mod api;
pub use api::{
    CoreConfig, CoreState, DecodeScratch, HaltReason, ImageError, NullTraceSink, Operand,
    StepOutcome, TraceEvent, TraceRecord, TraceSink, WriterTraceSink,
};

/// Architectural CPU state model primitives.
pub mod state;
pub use state::{
    ArchitecturalState, Register, RunState, FLAGS_ACTIVE_MASK, FLAGS_C, FLAGS_N, FLAGS_V, FLAGS_Z,
    POWER_ON_SP,
};

/// Opcode classification table.
pub mod encoding;
pub use encoding::{
    classify_opcode, BaseOp, ModeField, OperandStrategy, RegisterField, OPCODE_ENCODING_TABLE,
};

/// Opcode decoder with per-family addressing-mode legality.
pub mod decoder;
pub use decoder::{AddressingMode, DecodedInstruction, DecodedOrFault, Decoder};

/// Fault taxonomy for conditions that stop the machine.
pub mod fault;
pub use fault::{FaultClass, FaultCode, FaultReason, MachineFault};

/// Console streams used by the character and decimal instructions.
pub mod console;
pub use console::{
    format_decimal, read_decimal, BufferConsole, ConsoleError, ConsoleIo, DecimalInput,
    StreamConsole,
};

/// Instruction execution pipeline.
pub mod execute;
pub use execute::{
    add16, commit_execution, execute_instruction, resolve_operand, shift_left, step_one, sub16,
    AluResult, ExecuteOutcome, ExecuteState, FlagsUpdate, MemoryWrite,
};

/// Owned emulator instance.
pub mod machine;
pub use machine::Emulator;

#[cfg(test)]
use proptest as _;
#[cfg(test)]
use rstest as _;
