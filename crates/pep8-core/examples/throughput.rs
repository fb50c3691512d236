//! Instruction throughput harness for pep8-core.
//!
//! Runs small PEP/8 programs to completion in a loop on several threads and
//! reports retired instructions per second.
//!
//! ## Usage
//!
//! ```sh
//! cargo run --release -p pep8-core --example throughput
//! ```

#![allow(clippy::pedantic)]

use log as _;
use pep8_core::{
    step_one, BufferConsole, CoreConfig, CoreState, NullTraceSink, StepOutcome,
};
use proptest as _;
use rstest as _;
#[cfg(feature = "serde")]
use serde as _;
use thiserror as _;

use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

const NUM_THREADS: usize = 4;
const RUN_DURATION: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy)]
struct BenchmarkResult {
    name: &'static str,
    instructions_per_second: f64,
    programs_per_second: f64,
}

/// LDA 1000,i ; loop: SUBA 1,i ; BRNE loop,i ; STOP
const COUNTDOWN: &[u8] = &[
    0xC0, 0x03, 0xE8, 0x80, 0x00, 0x01, 0x0C, 0x00, 0x03, 0x00,
];

/// LDX 0,i ; loop: LDA 0x1000,x ; ADDA 7,i ; STA 0x1000,x ; ADDX 2,i ;
/// CPX 0x0200,i ; BRLT loop,i ; STOP
const MEMORY_SWEEP: &[u8] = &[
    0xC8, 0x00, 0x00, 0xC5, 0x10, 0x00, 0x70, 0x00, 0x07, 0xE5, 0x10, 0x00, 0x78, 0x00,
    0x02, 0xB8, 0x02, 0x00, 0x08, 0x00, 0x03, 0x00,
];

/// LDA 0x0100,i ; loop: CALL sub,i ; SUBA 1,i ; BRNE loop,i ; STOP ;
/// sub: ASLA ; ASRA ; RET0
const CALL_RETURN: &[u8] = &[
    0xC0, 0x01, 0x00, 0x16, 0x00, 0x0D, 0x80, 0x00, 0x01, 0x0C, 0x00, 0x03, 0x00, 0x1C,
    0x1E, 0x58,
];

fn run_to_halt(state: &mut CoreState, console: &mut BufferConsole, config: &CoreConfig) -> u64 {
    let mut retired = 0u64;
    loop {
        retired += 1;
        match step_one(state, console, config, &mut NullTraceSink) {
            StepOutcome::Retired => {}
            StepOutcome::Halted(_) => return retired,
            StepOutcome::Fault { cause } => panic!("benchmark program faulted: {cause}"),
        }
    }
}

fn benchmark(name: &'static str, program: &'static [u8]) -> BenchmarkResult {
    let (tx, rx) = mpsc::channel();

    let handles: Vec<_> = (0..NUM_THREADS)
        .map(|_| {
            let tx = tx.clone();
            thread::spawn(move || {
                let config = CoreConfig::default();
                let mut state = CoreState::default();
                let mut console = BufferConsole::default();

                let mut total_instructions = 0u64;
                let mut total_programs = 0u64;
                let start = Instant::now();

                while start.elapsed() < RUN_DURATION {
                    if state.load_image(program).is_err() {
                        return;
                    }
                    total_instructions += run_to_halt(&mut state, &mut console, &config);
                    total_programs += 1;
                }

                tx.send((total_instructions, total_programs)).ok();
            })
        })
        .collect();

    for h in handles {
        h.join().ok();
    }

    drop(tx);

    let mut total_instructions = 0u64;
    let mut total_programs = 0u64;
    for (inst, runs) in rx {
        total_instructions += inst;
        total_programs += runs;
    }

    let elapsed_secs = RUN_DURATION.as_secs_f64();
    BenchmarkResult {
        name,
        instructions_per_second: total_instructions as f64 / elapsed_secs,
        programs_per_second: total_programs as f64 / elapsed_secs,
    }
}

fn format_number(n: f64) -> String {
    if n >= 1_000_000.0 {
        format!("{:.2}M", n / 1_000_000.0)
    } else if n >= 1_000.0 {
        format!("{:.2}K", n / 1_000.0)
    } else {
        format!("{:.2}", n)
    }
}

fn print_results(results: &[BenchmarkResult]) {
    println!("\npep8-core throughput ({NUM_THREADS} threads, {RUN_DURATION:?} per benchmark)");
    println!("{:14} {:>15} {:>15}", "Benchmark", "Instr/sec", "Programs/sec");
    for result in results {
        println!(
            "{:14} {:>15} {:>15}",
            result.name,
            format_number(result.instructions_per_second),
            format_number(result.programs_per_second),
        );
    }
}

fn main() {
    let results = [
        benchmark("countdown", COUNTDOWN),
        benchmark("memory_sweep", MEMORY_SWEEP),
        benchmark("call_return", CALL_RETURN),
    ];
    print_results(&results);
}
