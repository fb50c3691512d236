//! Public host-facing API contracts for embedding the emulator core.

use std::fmt;
use std::io::Write;

use thiserror::Error;

use crate::decoder::AddressingMode;
use crate::memory::{new_address_space, ADDRESS_SPACE_BYTES};
use crate::{ArchitecturalState, FaultCode, RunState};

/// Top-level immutable configuration for a core instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct CoreConfig {
    /// `CHARI` yields a zero byte and `DECI` the value 0 at end of input
    /// instead of faulting.
    pub continue_on_input_exhaustion: bool,
    /// Enables per-instruction trace dispatch.
    pub tracing_enabled: bool,
}

/// Resolved operand: either the value an instruction consumes or the address
/// it targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum Operand {
    /// Value-strategy result.
    Value(u16),
    /// Address-strategy result.
    Address(u16),
}

impl Operand {
    /// Returns the resolved value.
    ///
    /// # Errors
    ///
    /// Returns [`FaultCode::InternalInvariant`] for an address operand.
    pub const fn value(self) -> Result<u16, FaultCode> {
        match self {
            Self::Value(value) => Ok(value),
            Self::Address(_) => Err(FaultCode::InternalInvariant),
        }
    }

    /// Returns the resolved address.
    ///
    /// # Errors
    ///
    /// Returns [`FaultCode::InternalInvariant`] for a value operand.
    pub const fn address(self) -> Result<u16, FaultCode> {
        match self {
            Self::Address(address) => Ok(address),
            Self::Value(_) => Err(FaultCode::InternalInvariant),
        }
    }
}

/// Per-instruction decode scratch, overwritten on every fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct DecodeScratch {
    /// Opcode byte of the current instruction.
    pub opcode: u8,
    /// Operand specifier, `0` when the instruction has none.
    pub spec: u16,
    /// Addressing mode, when the instruction has a mode field.
    pub addressing_mode: Option<AddressingMode>,
    /// Resolved operand, when the instruction takes a specifier.
    pub operand: Option<Operand>,
}

/// Error returned when a program image cannot be placed in memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum ImageError {
    /// Image does not fit in the 64 KiB address space.
    #[error("program image of {len} bytes exceeds the {ADDRESS_SPACE_BYTES}-byte address space")]
    ImageTooLarge {
        /// Length of the rejected image.
        len: usize,
    },
}

/// Complete host-visible core state used by stepping APIs.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct CoreState {
    /// Architectural register file.
    pub arch: ArchitecturalState,
    /// Flat 64 KiB memory image. Stepping faults with
    /// [`FaultCode::InternalInvariant`] when its length is anything else.
    pub memory: Box<[u8]>,
    /// Current execution state.
    pub run_state: RunState,
    /// Decode scratch of the most recent instruction.
    pub scratch: DecodeScratch,
}

impl Default for CoreState {
    fn default() -> Self {
        Self {
            arch: ArchitecturalState::default(),
            memory: new_address_space(),
            run_state: RunState::Running,
            scratch: DecodeScratch::default(),
        }
    }
}

impl CoreState {
    /// Creates a power-on core state with memory preloaded from `image`.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::ImageTooLarge`] when `image` exceeds 64 KiB.
    pub fn with_image(image: &[u8]) -> Result<Self, ImageError> {
        let mut state = Self::default();
        state.load_image(image)?;
        Ok(state)
    }

    /// Copies `image` to address 0, zeroes the rest of memory, and restores
    /// power-on register defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::ImageTooLarge`] when `image` exceeds 64 KiB; the
    /// state is left untouched in that case.
    pub fn load_image(&mut self, image: &[u8]) -> Result<(), ImageError> {
        if image.len() > ADDRESS_SPACE_BYTES {
            return Err(ImageError::ImageTooLarge { len: image.len() });
        }
        if self.memory.len() == ADDRESS_SPACE_BYTES {
            self.memory.fill(0);
        } else {
            self.memory = new_address_space();
        }
        self.memory[..image.len()].copy_from_slice(image);
        self.reset_canonical();
        log::debug!("loaded {} byte program image", image.len());
        Ok(())
    }

    /// Restores power-on register defaults and resumes execution at `PC=0`.
    ///
    /// Memory is preserved.
    pub fn reset_canonical(&mut self) {
        self.arch = ArchitecturalState::default();
        self.run_state = RunState::Running;
        self.scratch = DecodeScratch::default();
    }
}

/// Why a machine stopped without a fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum HaltReason {
    /// `STOP` retired.
    Stop,
    /// `RETTR` retired; trap return is not supported.
    UnsupportedInstruction,
}

/// Output status from one instruction retirement attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepOutcome {
    /// Instruction retired and the machine keeps running.
    Retired,
    /// Machine is halted.
    Halted(HaltReason),
    /// Fault was raised during decode or execute, or is latched.
    Fault {
        /// Canonical fault code.
        cause: FaultCode,
    },
}

/// Post-execution state summary of one retired instruction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TraceRecord {
    /// Program counter after execution.
    pub pc: u16,
    /// Stack pointer after execution.
    pub sp: u16,
    /// Accumulator after execution.
    pub a: u16,
    /// Index register after execution.
    pub x: u16,
    /// Operand specifier, `0` when none.
    pub spec: u16,
    /// Negative flag.
    pub n: bool,
    /// Zero flag.
    pub z: bool,
    /// Overflow flag.
    pub v: bool,
    /// Carry flag.
    pub c: bool,
    /// Raw opcode byte.
    pub opcode: u8,
    /// Rendered mnemonic, e.g. `LDA,i`.
    pub mnemonic: String,
}

impl fmt::Display for TraceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PC = {:04x}; SP = {:04x}; A {:04x}; X = {:04x}; Spec = {:04x}; \
             N = {}, Z = {}, V = {}, C = {}; opcode = {:02x}; {} ",
            self.pc,
            self.sp,
            self.a,
            self.x,
            self.spec,
            u8::from(self.n),
            u8::from(self.z),
            u8::from(self.v),
            u8::from(self.c),
            self.opcode,
            self.mnemonic,
        )
    }
}

/// Trace events emitted at step boundaries when enabled.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TraceEvent {
    /// Post-commit event for a retired instruction.
    InstructionRetired(TraceRecord),
}

/// Sink trait for trace hooks.
pub trait TraceSink {
    /// Records an event in execution order.
    fn on_event(&mut self, event: TraceEvent);
}

impl<T: TraceSink + ?Sized> TraceSink for &mut T {
    fn on_event(&mut self, event: TraceEvent) {
        (**self).on_event(event);
    }
}

impl TraceSink for Vec<TraceEvent> {
    fn on_event(&mut self, event: TraceEvent) {
        self.push(event);
    }
}

/// Sink that discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullTraceSink;

impl TraceSink for NullTraceSink {
    fn on_event(&mut self, _event: TraceEvent) {}
}

/// Sink that writes one trace line per retired instruction.
///
/// The first write error is kept and further events are dropped.
#[derive(Debug)]
pub struct WriterTraceSink<W: Write> {
    writer: W,
    error: Option<std::io::Error>,
}

impl<W: Write> WriterTraceSink<W> {
    /// Wraps a writer.
    pub const fn new(writer: W) -> Self {
        Self {
            writer,
            error: None,
        }
    }

    /// Flushes and returns the writer.
    ///
    /// # Errors
    ///
    /// Returns the first write error observed, or the flush error.
    pub fn finish(mut self) -> std::io::Result<W> {
        if let Some(err) = self.error.take() {
            return Err(err);
        }
        self.writer.flush()?;
        Ok(self.writer)
    }
}

impl<W: Write> TraceSink for WriterTraceSink<W> {
    fn on_event(&mut self, event: TraceEvent) {
        if self.error.is_some() {
            return;
        }
        let TraceEvent::InstructionRetired(record) = event;
        if let Err(err) = writeln!(self.writer, "{record}") {
            self.error = Some(err);
        }
    }
}
