//! Property coverage for the arithmetic unit, decoder and execution cycle.

use log as _;
use pep8_core::{
    add16, classify_opcode, read_u16_be, shift_left, step_one, sub16, BufferConsole, CoreConfig,
    CoreState, Decoder, DecodedOrFault, FaultCode, FlagsUpdate, NullTraceSink, RunState,
    StepOutcome,
};
use proptest::prelude::*;
use rstest as _;
#[cfg(feature = "serde")]
use serde as _;
use thiserror as _;

#[test]
fn add_overflow_and_carry_examples() {
    let overflow = add16(0x7FFF, 0x0001);
    assert_eq!(overflow.value, 0x8000);
    assert_eq!(
        overflow.flags,
        FlagsUpdate::Nzvc {
            negative: true,
            zero: false,
            overflow: true,
            carry: false,
        }
    );

    let carry = add16(0xFFFF, 0x0001);
    assert_eq!(carry.value, 0x0000);
    assert_eq!(
        carry.flags,
        FlagsUpdate::Nzvc {
            negative: false,
            zero: true,
            overflow: false,
            carry: true,
        }
    );
}

#[test]
fn shift_left_sign_change_example() {
    let shifted = shift_left(0x4000);
    assert_eq!(shifted.value, 0x8000);
    assert_eq!(
        shifted.flags,
        FlagsUpdate::CarryOverflow {
            carry: false,
            overflow: true,
        }
    );
}

#[test]
fn every_opcode_decodes_without_internal_faults() {
    for opcode in 0u8..=u8::MAX {
        assert!(classify_opcode(opcode).is_some());
        if let DecodedOrFault::Fault(reason) = Decoder::decode(opcode) {
            assert!(!reason.code().is_internal(), "{opcode:#04x}");
        }
    }
}

proptest! {
    #[test]
    fn property_add_sub_are_inverse(lhs in any::<u16>(), rhs in any::<u16>()) {
        prop_assert_eq!(sub16(add16(lhs, rhs).value, rhs).value, lhs);
    }

    #[test]
    fn property_add_flags_match_wide_arithmetic(lhs in any::<u16>(), rhs in any::<u16>()) {
        let result = add16(lhs, rhs);
        let wide = u32::from(lhs) + u32::from(rhs);
        let signed = i32::from(i16::from_be_bytes(lhs.to_be_bytes()))
            + i32::from(i16::from_be_bytes(rhs.to_be_bytes()));
        prop_assert_eq!(
            result.flags,
            FlagsUpdate::Nzvc {
                negative: result.value & 0x8000 != 0,
                zero: result.value == 0,
                overflow: !(-32_768..=32_767).contains(&signed),
                carry: wide > 0xFFFF,
            }
        );
    }

    #[test]
    fn property_decode_faults_are_only_illegal_modes(opcode in any::<u8>()) {
        match Decoder::decode(opcode) {
            DecodedOrFault::Instruction(instruction) => {
                prop_assert_eq!(instruction.opcode, opcode);
                prop_assert_eq!(instruction.has_address_field(), instruction.requires_spec());
            }
            DecodedOrFault::Fault(reason) => {
                prop_assert_eq!(reason.code(), FaultCode::IllegalAddressingMode);
            }
        }
    }

    #[test]
    fn property_single_step_never_panics_and_is_consistent(
        image in prop::collection::vec(any::<u8>(), 0..64),
        input in prop::collection::vec(any::<u8>(), 0..8),
        sp in any::<u16>(),
        x in any::<u16>(),
    ) {
        let mut state = CoreState::with_image(&image).expect("image fits");
        state.arch.set_sp(sp);
        state.arch.set_reg(pep8_core::Register::X, x);
        let mut console = BufferConsole::with_input(&input);

        let outcome = step_one(&mut state, &mut console, &CoreConfig::default(), &mut NullTraceSink);

        match outcome {
            StepOutcome::Retired => prop_assert_eq!(state.run_state, RunState::Running),
            StepOutcome::Halted(_) => prop_assert!(state.run_state.is_halted()),
            StepOutcome::Fault { cause } => {
                prop_assert!(!cause.is_internal());
                prop_assert_eq!(state.run_state, RunState::FaultLatched(cause));
            }
        }
        prop_assert_eq!(state.arch.ir(), image.first().copied().unwrap_or(0));
    }

    #[test]
    fn property_store_then_load_round_trips_through_memory(
        value in any::<u16>(),
        addr in 0x0100u16..0xFF00,
    ) {
        let [hi, lo] = value.to_be_bytes();
        let [ahi, alo] = addr.to_be_bytes();
        // LDA value,i ; STA addr,d ; LDX addr,d ; STOP
        let program = [0xC0, hi, lo, 0xE1, ahi, alo, 0xC9, ahi, alo, 0x00];
        let mut state = CoreState::with_image(&program).expect("image fits");
        let mut console = BufferConsole::default();

        while !state.run_state.is_halted() {
            step_one(&mut state, &mut console, &CoreConfig::default(), &mut NullTraceSink);
        }

        prop_assert_eq!(state.run_state, RunState::Stopped);
        prop_assert_eq!(read_u16_be(&state.memory, addr), value);
        prop_assert_eq!(state.arch.x(), value);
    }
}
