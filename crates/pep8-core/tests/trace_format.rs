//! Exact rendering of the per-instruction trace stream.

use log as _;
use pep8_core::{BufferConsole, CoreConfig, Emulator, FaultCode, HaltReason, WriterTraceSink};
use proptest as _;
use rstest as _;
#[cfg(feature = "serde")]
use serde as _;
use thiserror as _;

fn traced_run(program: &[u8], input: &[u8]) -> (Vec<String>, Result<HaltReason, FaultCode>) {
    let config = CoreConfig {
        tracing_enabled: true,
        ..CoreConfig::default()
    };
    let mut sink = WriterTraceSink::new(Vec::new());
    let result = {
        let mut emulator =
            Emulator::with_console(config, BufferConsole::with_input(input)).with_trace_sink(&mut sink);
        emulator.load(program).expect("program fits");
        emulator.run().map_err(|fault| fault.code)
    };
    let bytes = sink.finish().expect("vec writes cannot fail");
    let text = String::from_utf8(bytes).expect("trace is ascii");
    (text.lines().map(str::to_owned).collect(), result)
}

#[test]
fn load_store_stop_trace_lines() {
    // LDA 5,i ; STA 0x0010,d ; STOP
    let (lines, result) = traced_run(&[0xC0, 0x00, 0x05, 0xE1, 0x00, 0x10, 0x00], b"");

    assert_eq!(result, Ok(HaltReason::Stop));
    assert_eq!(
        lines,
        [
            "PC = 0003; SP = ffff; A 0005; X = 0000; Spec = 0005; \
             N = 0, Z = 0, V = 0, C = 0; opcode = c0; LDA,i ",
            "PC = 0006; SP = ffff; A 0005; X = 0000; Spec = 0010; \
             N = 0, Z = 0, V = 0, C = 0; opcode = e1; STA,d ",
            "PC = 0007; SP = ffff; A 0005; X = 0000; Spec = 0000; \
             N = 0, Z = 0, V = 0, C = 0; opcode = 00; STOP ",
        ]
    );
}

#[test]
fn flags_and_register_suffixes_are_rendered() {
    // LDX 0xFFFF,i ; ADDX 1,i ; NOTA ; STOP
    let program = [0xC8, 0xFF, 0xFF, 0x78, 0x00, 0x01, 0x18, 0x00];
    let (lines, result) = traced_run(&program, b"");

    assert_eq!(result, Ok(HaltReason::Stop));
    assert_eq!(lines.len(), 4);
    assert_eq!(
        lines[1],
        "PC = 0006; SP = ffff; A 0000; X = 0000; Spec = 0001; \
         N = 0, Z = 1, V = 0, C = 1; opcode = 78; ADDX,i "
    );
    assert_eq!(
        lines[2],
        "PC = 0007; SP = ffff; A ffff; X = 0000; Spec = 0000; \
         N = 1, Z = 0, V = 0, C = 1; opcode = 18; NOTA "
    );
}

#[test]
fn faulting_instruction_produces_no_trace_line() {
    // NOP1 ; CHARI 0x0100,d with no input
    let (lines, result) = traced_run(&[0x25, 0x49, 0x01, 0x00], b"");

    assert_eq!(result, Err(FaultCode::InputExhausted));
    assert_eq!(
        lines,
        ["PC = 0001; SP = ffff; A 0000; X = 0000; Spec = 0000; \
          N = 0, Z = 0, V = 0, C = 0; opcode = 25; NOP "]
    );
}

#[test]
fn trap_return_is_traced_before_halting() {
    let (lines, result) = traced_run(&[0x01], b"");

    assert_eq!(result, Ok(HaltReason::UnsupportedInstruction));
    assert_eq!(lines.len(), 1);
    assert!(lines[0].ends_with("opcode = 01; RETTR "));
}

#[test]
fn unconditional_branch_has_no_mode_suffix() {
    // BR 0x0003,i ; BRLE 0x0006,i ; STOP
    let (lines, result) = traced_run(&[0x04, 0x00, 0x03, 0x06, 0x00, 0x06, 0x00], b"");

    assert_eq!(result, Ok(HaltReason::Stop));
    assert_eq!(
        lines[0],
        "PC = 0003; SP = ffff; A 0000; X = 0000; Spec = 0003; \
         N = 0, Z = 0, V = 0, C = 0; opcode = 04; BR "
    );
    assert_eq!(
        lines[1],
        "PC = 0006; SP = ffff; A 0000; X = 0000; Spec = 0006; \
         N = 0, Z = 0, V = 0, C = 0; opcode = 06; BRLE,i "
    );
}

#[test]
fn tracing_disabled_writes_nothing() {
    let mut sink = WriterTraceSink::new(Vec::new());
    {
        let mut emulator = Emulator::with_console(CoreConfig::default(), BufferConsole::default())
            .with_trace_sink(&mut sink);
        emulator.load(&[0x00]).expect("program fits");
        assert_eq!(emulator.run(), Ok(HaltReason::Stop));
    }
    assert!(sink.finish().expect("no error").is_empty());
}
