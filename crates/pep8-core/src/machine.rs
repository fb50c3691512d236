//! Owned emulator instance binding a core state to its console and trace sink.

use std::io::{Read, Write};

use crate::api::{HaltReason, ImageError, NullTraceSink, StepOutcome, TraceSink};
use crate::console::{ConsoleIo, StreamConsole};
use crate::execute::step_one;
use crate::fault::MachineFault;
use crate::{CoreConfig, CoreState};

/// A PEP/8 machine with borrowed host streams.
///
/// The emulator exclusively owns its [`CoreState`]; streams are borrowed for
/// the emulator's lifetime and never closed.
pub struct Emulator<'io> {
    state: CoreState,
    config: CoreConfig,
    console: Box<dyn ConsoleIo + 'io>,
    trace: Box<dyn TraceSink + 'io>,
    last_fault: Option<MachineFault>,
}

impl<'io> Emulator<'io> {
    /// Creates a power-on machine reading `input` and writing `output`.
    #[must_use]
    pub fn new(config: CoreConfig, input: &'io mut dyn Read, output: &'io mut dyn Write) -> Self {
        Self::with_console(config, StreamConsole::new(input, output))
    }

    /// Creates a power-on machine over any console implementation.
    #[must_use]
    pub fn with_console(config: CoreConfig, console: impl ConsoleIo + 'io) -> Self {
        Self {
            state: CoreState::default(),
            config,
            console: Box::new(console),
            trace: Box::new(NullTraceSink),
            last_fault: None,
        }
    }

    /// Replaces the trace sink; events are only produced when
    /// [`CoreConfig::tracing_enabled`] is set.
    #[must_use]
    pub fn with_trace_sink(mut self, sink: impl TraceSink + 'io) -> Self {
        self.trace = Box::new(sink);
        self
    }

    /// Loads a program image at address 0 and resets registers.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::ImageTooLarge`] when the image exceeds 64 KiB.
    pub fn load(&mut self, image: &[u8]) -> Result<(), ImageError> {
        self.state.load_image(image)?;
        self.last_fault = None;
        Ok(())
    }

    /// Executes one instruction.
    pub fn step(&mut self) -> StepOutcome {
        let pc = self.state.arch.pc();
        let was_running = !self.state.run_state.is_halted();
        let outcome = step_one(
            &mut self.state,
            self.console.as_mut(),
            &self.config,
            self.trace.as_mut(),
        );
        if let (StepOutcome::Fault { cause }, true) = (outcome, was_running) {
            self.last_fault = Some(MachineFault {
                code: cause,
                pc,
                opcode: self.state.scratch.opcode,
            });
        }
        outcome
    }

    /// Runs until the machine halts.
    ///
    /// # Errors
    ///
    /// Returns the [`MachineFault`] that stopped the machine, with the
    /// address and opcode of the faulting instruction.
    pub fn run(&mut self) -> Result<HaltReason, MachineFault> {
        loop {
            match self.step() {
                StepOutcome::Retired => {}
                StepOutcome::Halted(reason) => return Ok(reason),
                StepOutcome::Fault { cause } => {
                    return Err(self.last_fault.unwrap_or_else(|| MachineFault {
                        code: cause,
                        pc: self.state.arch.pc(),
                        opcode: self.state.arch.ir(),
                    }))
                }
            }
        }
    }

    /// Current machine state.
    #[must_use]
    pub const fn state(&self) -> &CoreState {
        &self.state
    }

    /// Mutable machine state for hosts that poke registers or memory.
    pub const fn state_mut(&mut self) -> &mut CoreState {
        &mut self.state
    }

    /// Configuration supplied at construction.
    #[must_use]
    pub const fn config(&self) -> &CoreConfig {
        &self.config
    }
}
