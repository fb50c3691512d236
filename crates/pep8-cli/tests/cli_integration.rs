//! Integration tests for the pep8 CLI.

use env_logger as _;
use log as _;
use pep8_cli as _;
use pep8_core as _;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use thiserror as _;

fn binary_path() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop();
    path.pop();
    path.join("pep8")
}

fn create_temp_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

fn run_with_args(args: &[&str]) -> Output {
    Command::new(binary_path())
        .args(args)
        .stdin(Stdio::null())
        .output()
        .expect("failed to run pep8")
}

// CHARO 'H',i ; CHARO 'i',i ; STOP
const HELLO: &str = "50 48 00 50 69 00\n00 zz\n";

// loop: CHARI 0x0100,d ; CHARO 0x0100,d ; BR loop,i
const ECHO: &str = "49 01 00 51 01 00 04 00 00 zz";

// DECI 0x0100,d ; DECO 0x0100,d ; STOP
const DECIMAL_ECHO: &str = "31 01 00 39 01 00 00 zz";

#[test]
fn runs_program_to_stdout() {
    let temp_dir = tempfile::tempdir().unwrap();
    let program = create_temp_file(temp_dir.path(), "hello.pepo", HELLO);

    let output = run_with_args(&[program.to_str().unwrap()]);

    assert!(output.status.success());
    assert_eq!(output.stdout, b"Hi");
}

#[test]
fn reads_input_and_writes_output_files() {
    let temp_dir = tempfile::tempdir().unwrap();
    let program = create_temp_file(temp_dir.path(), "deci.pepo", DECIMAL_ECHO);
    let input = create_temp_file(temp_dir.path(), "in.txt", "-123\n");
    let out_path = temp_dir.path().join("out.txt");

    let output = run_with_args(&[
        "-i",
        input.to_str().unwrap(),
        "-o",
        out_path.to_str().unwrap(),
        program.to_str().unwrap(),
    ]);

    assert!(output.status.success());
    assert!(output.stdout.is_empty());
    assert_eq!(fs::read_to_string(&out_path).unwrap(), "-123");
}

#[test]
fn input_exhaustion_is_a_fault_by_default() {
    let temp_dir = tempfile::tempdir().unwrap();
    let program = create_temp_file(temp_dir.path(), "echo.pepo", ECHO);
    let input = create_temp_file(temp_dir.path(), "in.txt", "ab");

    let output = run_with_args(&["-i", input.to_str().unwrap(), program.to_str().unwrap()]);

    assert!(!output.status.success());
    assert_eq!(output.stdout, b"ab");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("input stream exhausted"), "{stderr}");
    assert!(stderr.contains("pc 0x0000"), "{stderr}");
}

#[test]
fn eof_flag_reads_zero_bytes() {
    let temp_dir = tempfile::tempdir().unwrap();
    // CHARI 0x0100,d ; CHARO 0x0100,d ; STOP
    let program = create_temp_file(temp_dir.path(), "eof.pepo", "49 01 00 51 01 00 00 zz");

    let output = run_with_args(&["--eof", program.to_str().unwrap()]);

    assert!(output.status.success());
    assert_eq!(output.stdout, [0u8]);
}

#[test]
fn trace_prints_one_line_per_instruction() {
    let temp_dir = tempfile::tempdir().unwrap();
    // LDA 5,i ; STA 0x0010,d ; STOP
    let program = create_temp_file(temp_dir.path(), "trace.pepo", "C0 00 05 E1 00 10 00 zz");

    let output = run_with_args(&["-t", program.to_str().unwrap()]);

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(
        lines[0],
        "PC = 0003; SP = ffff; A 0005; X = 0000; Spec = 0005; \
         N = 0, Z = 0, V = 0, C = 0; opcode = c0; LDA,i "
    );
    assert!(lines[2].ends_with("opcode = 00; STOP "));
}

#[test]
fn unsupported_trap_return_exits_cleanly() {
    let temp_dir = tempfile::tempdir().unwrap();
    let program = create_temp_file(temp_dir.path(), "rettr.pepo", "01 zz");

    let output = run_with_args(&[program.to_str().unwrap()]);

    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Unsupported instruction: RETTR"), "{stderr}");
}

#[test]
fn illegal_addressing_mode_reports_fault() {
    let temp_dir = tempfile::tempdir().unwrap();
    // STA 0x0010,i
    let program = create_temp_file(temp_dir.path(), "bad.pepo", "E0 00 10 zz");

    let output = run_with_args(&[program.to_str().unwrap()]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("illegal addressing mode"), "{stderr}");
}

#[test]
fn malformed_object_code_reports_line() {
    let temp_dir = tempfile::tempdir().unwrap();
    let program = create_temp_file(temp_dir.path(), "bad.pepo", "00 01\n02 XY zz\n");

    let output = run_with_args(&[program.to_str().unwrap()]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("line 2"), "{stderr}");
    assert!(stderr.contains("XY"), "{stderr}");
}

#[test]
fn binary_trailer_after_terminator_is_ignored() {
    let temp_dir = tempfile::tempdir().unwrap();
    let program = temp_dir.path().join("trailer.pepo");
    let mut content = HELLO.as_bytes().to_vec();
    content.extend_from_slice(b"\xFF\xFE built by \xE9ditor\n");
    fs::write(&program, content).unwrap();

    let output = run_with_args(&[program.to_str().unwrap()]);

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(output.stdout, b"Hi");
}

#[test]
fn missing_object_file_reports_error() {
    let temp_dir = tempfile::tempdir().unwrap();
    let missing = temp_dir.path().join("missing.pepo");

    let output = run_with_args(&[missing.to_str().unwrap()]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("load error"), "{stderr}");
}

#[test]
fn help_prints_usage() {
    let output = run_with_args(&["--help"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Usage: pep8"));
}

#[test]
fn no_arguments_is_an_error() {
    let output = run_with_args(&[]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("missing object file"));
}
