//! Architectural CPU state model primitives.

/// Architectural register file types and storage model.
pub mod registers;
/// Run-state machine for the fetch-execute cycle.
pub mod run_state;

pub use registers::{
    ArchitecturalState, Register, FLAGS_ACTIVE_MASK, FLAGS_C, FLAGS_N, FLAGS_V, FLAGS_Z,
    POWER_ON_SP,
};
pub use run_state::RunState;
