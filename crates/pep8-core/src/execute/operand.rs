//! Addressing-mode resolution into operand values or addresses.

use crate::api::Operand;
use crate::decoder::AddressingMode;
use crate::encoding::OperandStrategy;
use crate::fault::FaultCode;
use crate::memory::read_u16_be;

/// Resolves an operand specifier under an addressing mode.
///
/// The value strategy yields the word an instruction consumes; the address
/// strategy yields the location it writes or reads through.
///
/// # Errors
///
/// Returns [`FaultCode::InternalInvariant`] for the address strategy combined
/// with immediate mode, which the decoder rejects before resolution.
pub fn resolve_operand(
    mode: AddressingMode,
    spec: u16,
    sp: u16,
    x: u16,
    strategy: OperandStrategy,
    memory: &[u8],
) -> Result<Operand, FaultCode> {
    if matches!(mode, AddressingMode::Immediate) {
        return match strategy {
            OperandStrategy::Value => Ok(Operand::Value(spec)),
            OperandStrategy::Address => Err(FaultCode::InternalInvariant),
        };
    }

    let address = effective_address(mode, spec, sp, x, memory);
    Ok(match strategy {
        OperandStrategy::Value => Operand::Value(read_u16_be(memory, address)),
        OperandStrategy::Address => Operand::Address(address),
    })
}

fn effective_address(mode: AddressingMode, spec: u16, sp: u16, x: u16, memory: &[u8]) -> u16 {
    match mode {
        AddressingMode::Immediate | AddressingMode::Direct => spec,
        AddressingMode::Indexed => spec.wrapping_add(x),
        AddressingMode::Indirect => read_u16_be(memory, spec),
        AddressingMode::StackRelative => spec.wrapping_add(sp),
        AddressingMode::StackIndexed => spec.wrapping_add(sp).wrapping_add(x),
        AddressingMode::StackRelativeDeferred => read_u16_be(memory, sp.wrapping_add(spec)),
        AddressingMode::StackIndexedDeferred => {
            read_u16_be(memory, sp.wrapping_add(spec)).wrapping_add(x)
        }
    }
}
