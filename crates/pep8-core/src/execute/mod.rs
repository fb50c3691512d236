//! Fetch-decode-execute cycle for the PEP/8 instruction set.
//!
//! One step runs in a fixed order:
//! 1. Fetch the opcode at `PC` into `IR`
//! 2. Decode it and latch a fault on an illegal addressing mode
//! 3. Read the operand specifier and resolve the operand, then advance `PC`
//! 4. Compute the effect into an [`ExecuteState`], performing console I/O
//! 5. Commit memory, register, flag, `SP` and `PC` updates
//! 6. Emit a trace record when tracing is enabled
//!
//! Faults raised while computing the effect leave registers and memory as
//! they were before the effect.

mod alu;
mod flags;
mod operand;

pub use alu::{
    add16, complement, logic_and, logic_or, negate, rotate_left, rotate_right, shift_left,
    shift_right_arithmetic, sub16, AluResult,
};
pub use flags::FlagsUpdate;
pub use operand::resolve_operand;

use crate::api::{DecodeScratch, HaltReason, TraceEvent, TraceRecord};
use crate::console::{format_decimal, read_decimal, ConsoleIo};
use crate::decoder::{DecodedInstruction, Decoder};
use crate::encoding::BaseOp;
use crate::fault::FaultCode;
use crate::memory::{read_u16_be, read_u8, write_u16_be, write_u8, ADDRESS_SPACE_BYTES};
use crate::state::{ArchitecturalState, Register};
use crate::{CoreConfig, CoreState, RunState, StepOutcome, TraceSink};

/// Outcome of computing a single instruction's effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecuteOutcome {
    /// Instruction retired; execution continues.
    Retired,
    /// Instruction retired and halts the machine.
    Halted(HaltReason),
    /// Fault was raised; nothing may be committed.
    Fault {
        /// Fault code.
        cause: FaultCode,
    },
}

/// Pending memory store produced by an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryWrite {
    /// Single byte store.
    Byte {
        /// Target address.
        addr: u16,
        /// Stored byte.
        value: u8,
    },
    /// Big-endian word store.
    Word {
        /// Target address of the high byte.
        addr: u16,
        /// Stored word.
        value: u16,
    },
}

/// Side effects accumulated while computing an instruction, applied by
/// [`commit_execution`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExecuteState {
    /// Destination register for a result.
    pub dest_reg: Option<Register>,
    /// Value to write to the destination register.
    pub dest_value: Option<u16>,
    /// Memory store to apply.
    pub memory_write: Option<MemoryWrite>,
    /// FLAGS update to apply.
    pub flags_update: FlagsUpdate,
    /// New `SP` value.
    pub next_sp: Option<u16>,
    /// New `PC` value, overriding the sequential advance.
    pub next_pc: Option<u16>,
    /// Halt requested by `STOP` or `RETTR`.
    pub halt: Option<HaltReason>,
}

impl ExecuteState {
    const fn write_register(&mut self, reg: Register, value: u16) {
        self.dest_reg = Some(reg);
        self.dest_value = Some(value);
    }
}

fn operand_value(state: &CoreState) -> Result<u16, FaultCode> {
    state
        .scratch
        .operand
        .ok_or(FaultCode::InternalInvariant)?
        .value()
}

fn operand_address(state: &CoreState) -> Result<u16, FaultCode> {
    state
        .scratch
        .operand
        .ok_or(FaultCode::InternalInvariant)?
        .address()
}

fn selected_register(instr: &DecodedInstruction) -> Result<Register, FaultCode> {
    instr.register.ok_or(FaultCode::InternalInvariant)
}

const fn high_byte(value: u16) -> u8 {
    value.to_be_bytes()[0]
}

/// Computes the effect of a decoded instruction against the current state.
///
/// Console I/O happens here; every other side effect is returned in the
/// [`ExecuteState`] and must be applied with [`commit_execution`] only when
/// the outcome is not a fault.
pub fn execute_instruction(
    instr: &DecodedInstruction,
    state: &CoreState,
    console: &mut dyn ConsoleIo,
    config: &CoreConfig,
) -> (ExecuteOutcome, ExecuteState) {
    let mut exec = ExecuteState::default();

    let result = match instr.base_op {
        BaseOp::Stop => {
            exec.halt = Some(HaltReason::Stop);
            Ok(())
        }
        BaseOp::Rettr => {
            exec.halt = Some(HaltReason::UnsupportedInstruction);
            Ok(())
        }
        BaseOp::Movspa => {
            exec.write_register(Register::A, state.arch.sp());
            Ok(())
        }
        BaseOp::Movflga => {
            exec.write_register(Register::A, u16::from(state.arch.flags()));
            Ok(())
        }
        BaseOp::Br
        | BaseOp::Brle
        | BaseOp::Brlt
        | BaseOp::Breq
        | BaseOp::Brne
        | BaseOp::Brge
        | BaseOp::Brgt
        | BaseOp::Brv
        | BaseOp::Brc => execute_branch(instr, state, &mut exec),
        BaseOp::Call => execute_call(state, &mut exec),
        BaseOp::Not | BaseOp::Neg | BaseOp::Asl | BaseOp::Asr | BaseOp::Rol | BaseOp::Ror => {
            execute_unary(instr, state, &mut exec)
        }
        BaseOp::NopUnary | BaseOp::Nop => Ok(()),
        BaseOp::Deci => execute_deci(state, console, config, &mut exec),
        BaseOp::Deco => operand_value(state).and_then(|value| {
            console
                .write_bytes(format_decimal(value).as_bytes())
                .map_err(|e| e.fault_code())
        }),
        BaseOp::Stro => execute_stro(state, console),
        BaseOp::Chari => execute_chari(state, console, config, &mut exec),
        BaseOp::Charo => operand_value(state).and_then(|value| {
            console
                .write_bytes(&[high_byte(value)])
                .map_err(|e| e.fault_code())
        }),
        BaseOp::Ret => {
            execute_ret(instr, state, &mut exec);
            Ok(())
        }
        BaseOp::Addsp | BaseOp::Subsp => execute_stack_adjust(instr, state, &mut exec),
        BaseOp::Add | BaseOp::Sub | BaseOp::And | BaseOp::Or | BaseOp::Cp => {
            execute_binary(instr, state, &mut exec)
        }
        BaseOp::Ld | BaseOp::Ldbyte => execute_load(instr, state, &mut exec),
        BaseOp::St | BaseOp::Stbyte => execute_store(instr, state, &mut exec),
    };

    match result {
        Err(cause) => (ExecuteOutcome::Fault { cause }, ExecuteState::default()),
        Ok(()) => match exec.halt {
            Some(reason) => (ExecuteOutcome::Halted(reason), exec),
            None => (ExecuteOutcome::Retired, exec),
        },
    }
}

/// Applies the side effects accumulated by [`execute_instruction`].
pub fn commit_execution(state: &mut CoreState, exec: &ExecuteState) {
    match exec.memory_write {
        Some(MemoryWrite::Byte { addr, value }) => write_u8(&mut state.memory, addr, value),
        Some(MemoryWrite::Word { addr, value }) => write_u16_be(&mut state.memory, addr, value),
        None => {}
    }

    if let (Some(reg), Some(value)) = (exec.dest_reg, exec.dest_value) {
        state.arch.set_reg(reg, value);
    }

    state
        .arch
        .set_flags(exec.flags_update.apply(state.arch.flags()));

    if let Some(sp) = exec.next_sp {
        state.arch.set_sp(sp);
    }

    if let Some(pc) = exec.next_pc {
        state.arch.set_pc(pc);
    }
}

const fn branch_taken(base_op: BaseOp, arch: &ArchitecturalState) -> bool {
    match base_op {
        BaseOp::Brle => arch.z() || arch.n(),
        BaseOp::Brlt => arch.n(),
        BaseOp::Breq => arch.z(),
        BaseOp::Brne => !arch.z(),
        BaseOp::Brge => !arch.n(),
        BaseOp::Brgt => !arch.n() && !arch.z(),
        BaseOp::Brv => arch.v(),
        BaseOp::Brc => arch.c(),
        _ => true,
    }
}

fn execute_branch(
    instr: &DecodedInstruction,
    state: &CoreState,
    exec: &mut ExecuteState,
) -> Result<(), FaultCode> {
    let target = operand_value(state)?;
    if branch_taken(instr.base_op, &state.arch) {
        exec.next_pc = Some(target);
    }
    Ok(())
}

fn execute_call(state: &CoreState, exec: &mut ExecuteState) -> Result<(), FaultCode> {
    let target = operand_value(state)?;
    let sp = state.arch.sp().wrapping_sub(2);
    exec.memory_write = Some(MemoryWrite::Word {
        addr: sp,
        value: state.arch.pc(),
    });
    exec.next_sp = Some(sp);
    exec.next_pc = Some(target);
    Ok(())
}

fn execute_ret(instr: &DecodedInstruction, state: &CoreState, exec: &mut ExecuteState) {
    let locals = u16::from(instr.opcode & 0x7);
    let sp = state.arch.sp().wrapping_sub(locals);
    exec.next_pc = Some(read_u16_be(&state.memory, sp));
    exec.next_sp = Some(sp.wrapping_sub(2));
}

fn execute_unary(
    instr: &DecodedInstruction,
    state: &CoreState,
    exec: &mut ExecuteState,
) -> Result<(), FaultCode> {
    let reg = selected_register(instr)?;
    let value = state.arch.reg(reg);
    let carry = state.arch.c();
    let result = match instr.base_op {
        BaseOp::Not => complement(value),
        BaseOp::Neg => negate(value),
        BaseOp::Asl => shift_left(value),
        BaseOp::Asr => shift_right_arithmetic(value),
        BaseOp::Rol => rotate_left(value, carry),
        BaseOp::Ror => rotate_right(value, carry),
        _ => return Err(FaultCode::InternalInvariant),
    };
    exec.write_register(reg, result.value);
    exec.flags_update = result.flags;
    Ok(())
}

fn execute_binary(
    instr: &DecodedInstruction,
    state: &CoreState,
    exec: &mut ExecuteState,
) -> Result<(), FaultCode> {
    let reg = selected_register(instr)?;
    let lhs = state.arch.reg(reg);
    let rhs = operand_value(state)?;
    let result = match instr.base_op {
        BaseOp::Add => add16(lhs, rhs),
        BaseOp::Sub | BaseOp::Cp => sub16(lhs, rhs),
        BaseOp::And => logic_and(lhs, rhs),
        BaseOp::Or => logic_or(lhs, rhs),
        _ => return Err(FaultCode::InternalInvariant),
    };
    if instr.base_op != BaseOp::Cp {
        exec.write_register(reg, result.value);
    }
    exec.flags_update = result.flags;
    Ok(())
}

fn execute_stack_adjust(
    instr: &DecodedInstruction,
    state: &CoreState,
    exec: &mut ExecuteState,
) -> Result<(), FaultCode> {
    let rhs = operand_value(state)?;
    let sp = state.arch.sp();
    let result = if instr.base_op == BaseOp::Addsp {
        add16(sp, rhs)
    } else {
        sub16(sp, rhs)
    };
    exec.next_sp = Some(result.value);
    exec.flags_update = result.flags;
    Ok(())
}

fn execute_load(
    instr: &DecodedInstruction,
    state: &CoreState,
    exec: &mut ExecuteState,
) -> Result<(), FaultCode> {
    let reg = selected_register(instr)?;
    let value = operand_value(state)?;
    let value = if instr.base_op == BaseOp::Ldbyte {
        value >> 8
    } else {
        value
    };
    exec.write_register(reg, value);
    Ok(())
}

fn execute_store(
    instr: &DecodedInstruction,
    state: &CoreState,
    exec: &mut ExecuteState,
) -> Result<(), FaultCode> {
    let reg = selected_register(instr)?;
    let addr = operand_address(state)?;
    let value = state.arch.reg(reg);
    exec.memory_write = Some(if instr.base_op == BaseOp::Stbyte {
        MemoryWrite::Byte {
            addr,
            value: high_byte(value),
        }
    } else {
        MemoryWrite::Word { addr, value }
    });
    Ok(())
}

fn execute_deci(
    state: &CoreState,
    console: &mut dyn ConsoleIo,
    config: &CoreConfig,
    exec: &mut ExecuteState,
) -> Result<(), FaultCode> {
    let addr = operand_address(state)?;
    let input = read_decimal(console, config.continue_on_input_exhaustion)?;
    exec.memory_write = Some(MemoryWrite::Word {
        addr,
        value: input.value,
    });
    exec.flags_update = FlagsUpdate::Nzv {
        negative: input.negative,
        zero: input.zero,
        overflow: input.overflow,
    };
    Ok(())
}

fn execute_chari(
    state: &CoreState,
    console: &mut dyn ConsoleIo,
    config: &CoreConfig,
    exec: &mut ExecuteState,
) -> Result<(), FaultCode> {
    let addr = operand_address(state)?;
    let value = match console.read_byte().map_err(|e| e.fault_code())? {
        Some(byte) => byte,
        None if config.continue_on_input_exhaustion => 0,
        None => return Err(FaultCode::InputExhausted),
    };
    exec.memory_write = Some(MemoryWrite::Byte { addr, value });
    Ok(())
}

fn execute_stro(state: &CoreState, console: &mut dyn ConsoleIo) -> Result<(), FaultCode> {
    let start = operand_address(state)?;
    let text: Vec<u8> = (0..=u16::MAX)
        .map(|offset| read_u8(&state.memory, start.wrapping_add(offset)))
        .take_while(|byte| *byte != 0)
        .collect();
    console.write_bytes(&text).map_err(|e| e.fault_code())
}

fn latch_fault(state: &mut CoreState, pc: u16, cause: FaultCode) -> StepOutcome {
    log::warn!(
        "fault latched: {cause} (opcode {:#04x} at pc {pc:#06x})",
        state.scratch.opcode
    );
    state.run_state = RunState::FaultLatched(cause);
    StepOutcome::Fault { cause }
}

fn trace_record(state: &CoreState, instr: &DecodedInstruction) -> TraceRecord {
    let arch = &state.arch;
    TraceRecord {
        pc: arch.pc(),
        sp: arch.sp(),
        a: arch.a(),
        x: arch.x(),
        spec: state.scratch.spec,
        n: arch.n(),
        z: arch.z(),
        v: arch.v(),
        c: arch.c(),
        opcode: arch.ir(),
        mnemonic: instr.mnemonic(),
    }
}

/// Executes one instruction against `state`.
///
/// A halted state returns its terminal outcome without executing anything.
pub fn step_one(
    state: &mut CoreState,
    console: &mut dyn ConsoleIo,
    config: &CoreConfig,
    trace: &mut dyn TraceSink,
) -> StepOutcome {
    match state.run_state {
        RunState::Running => {}
        RunState::Stopped => return StepOutcome::Halted(HaltReason::Stop),
        RunState::UnsupportedInstruction => {
            return StepOutcome::Halted(HaltReason::UnsupportedInstruction)
        }
        RunState::FaultLatched(cause) => return StepOutcome::Fault { cause },
    }

    let pc = state.arch.pc();
    if state.memory.len() != ADDRESS_SPACE_BYTES {
        log::error!(
            "memory is {} bytes, expected {ADDRESS_SPACE_BYTES}",
            state.memory.len()
        );
        return latch_fault(state, pc, FaultCode::InternalInvariant);
    }
    let opcode = read_u8(&state.memory, pc);
    state.arch.set_ir(opcode);
    state.scratch = DecodeScratch {
        opcode,
        ..DecodeScratch::default()
    };

    let decoded: Result<DecodedInstruction, FaultCode> = Decoder::decode(opcode).into();
    let instruction = match decoded {
        Ok(instruction) => instruction,
        Err(cause) => return latch_fault(state, pc, cause),
    };
    state.scratch.addressing_mode = instruction.addressing_mode;

    if instruction.requires_spec() {
        let spec = read_u16_be(&state.memory, pc.wrapping_add(1));
        state.scratch.spec = spec;
        let Some(mode) = instruction.addressing_mode else {
            return latch_fault(state, pc, FaultCode::InternalInvariant);
        };
        match resolve_operand(
            mode,
            spec,
            state.arch.sp(),
            state.arch.x(),
            instruction.operand_strategy(),
            &state.memory,
        ) {
            Ok(operand) => state.scratch.operand = Some(operand),
            Err(cause) => return latch_fault(state, pc, cause),
        }
        state.arch.set_pc(pc.wrapping_add(3));
    } else {
        state.arch.set_pc(pc.wrapping_add(1));
    }

    let (outcome, exec) = execute_instruction(&instruction, state, console, config);
    let step = match outcome {
        ExecuteOutcome::Fault { cause } => return latch_fault(state, pc, cause),
        ExecuteOutcome::Retired => StepOutcome::Retired,
        ExecuteOutcome::Halted(reason) => {
            log::info!(
                "machine halted by {} at pc {pc:#06x}",
                instruction.mnemonic()
            );
            state.run_state = match reason {
                HaltReason::Stop => RunState::Stopped,
                HaltReason::UnsupportedInstruction => RunState::UnsupportedInstruction,
            };
            StepOutcome::Halted(reason)
        }
    };
    commit_execution(state, &exec);

    if config.tracing_enabled {
        trace.on_event(TraceEvent::InstructionRetired(trace_record(
            state,
            &instruction,
        )));
    }

    step
}
