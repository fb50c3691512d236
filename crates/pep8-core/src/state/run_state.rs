use crate::FaultCode;

/// Execution-state machine for host-observable control flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum RunState {
    /// Ready to execute the next instruction.
    #[default]
    Running,
    /// `STOP` retired.
    Stopped,
    /// `RETTR` retired; the machine halts instead of returning from a trap.
    UnsupportedInstruction,
    /// Fault is latched and no further progress is possible without reload.
    FaultLatched(FaultCode),
}

impl RunState {
    /// Returns `true` once no further instruction may execute.
    #[must_use]
    pub const fn is_halted(self) -> bool {
        !matches!(self, Self::Running)
    }

    /// Returns the currently latched fault, if this state is fault-latched.
    #[must_use]
    pub const fn latched_fault(self) -> Option<FaultCode> {
        match self {
            Self::FaultLatched(cause) => Some(cause),
            Self::Running | Self::Stopped | Self::UnsupportedInstruction => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::RunState;
    use crate::FaultCode;

    #[test]
    fn run_state_default_is_running() {
        assert_eq!(RunState::default(), RunState::Running);
        assert!(!RunState::default().is_halted());
    }

    #[test]
    fn every_other_state_is_halted() {
        assert!(RunState::Stopped.is_halted());
        assert!(RunState::UnsupportedInstruction.is_halted());
        assert!(RunState::FaultLatched(FaultCode::InputExhausted).is_halted());
    }

    #[test]
    fn latched_fault_accessor_reports_only_fault_latched_variant() {
        assert_eq!(RunState::Running.latched_fault(), None);
        assert_eq!(RunState::Stopped.latched_fault(), None);
        assert_eq!(RunState::UnsupportedInstruction.latched_fault(), None);
        assert_eq!(
            RunState::FaultLatched(FaultCode::IllegalAddressingMode).latched_fault(),
            Some(FaultCode::IllegalAddressingMode)
        );
    }
}
