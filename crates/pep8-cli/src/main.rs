//! CLI entry point for the `pep8` object-code runner.

use std::env;
use std::ffi::OsString;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::PathBuf;

use pep8_cli::load_object_file;
use pep8_core::{CoreConfig, Emulator, HaltReason, WriterTraceSink};
#[cfg(test)]
use tempfile as _;
use thiserror as _;

const USAGE_TEXT: &str = "\
Usage: pep8 [options] <object-file>

Runs a PEP/8 object-code file (hex byte pairs terminated by zz).

Options:
  -i, --input <file>   Read console input from <file> instead of stdin
  -o, --output <file>  Write console output to <file> instead of stdout
  -e, --eof            Return 0 bytes at end of input instead of faulting
  -t, --trace          Print the machine state after each instruction
  -h, --help           Show this help message

Examples:
  pep8 program.pepo
  pep8 -i input.txt -o output.txt program.pepo
  pep8 --trace program.pepo
";

#[derive(Debug, Default, PartialEq, Eq)]
struct RunArgs {
    object: PathBuf,
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    eof_zero: bool,
    trace: bool,
}

impl RunArgs {
    const fn config(&self) -> CoreConfig {
        CoreConfig {
            continue_on_input_exhaustion: self.eof_zero,
            tracing_enabled: self.trace,
        }
    }
}

#[derive(Debug)]
enum ParseResult {
    Run(RunArgs),
    Help,
}

#[allow(clippy::while_let_on_iterator)]
fn parse_args(mut args: impl Iterator<Item = OsString>) -> Result<ParseResult, String> {
    let mut object: Option<PathBuf> = None;
    let mut input: Option<PathBuf> = None;
    let mut output: Option<PathBuf> = None;
    let mut eof_zero = false;
    let mut trace = false;

    while let Some(arg) = args.next() {
        if arg == "--help" || arg == "-h" {
            return Ok(ParseResult::Help);
        }

        if arg == "--eof" || arg == "-e" {
            eof_zero = true;
            continue;
        }

        if arg == "--trace" || arg == "-t" {
            trace = true;
            continue;
        }

        if arg == "-i" || arg == "--input" {
            let value = args
                .next()
                .ok_or_else(|| "missing value for -i".to_string())?;
            input = Some(PathBuf::from(value));
            continue;
        }

        if arg == "-o" || arg == "--output" {
            let value = args
                .next()
                .ok_or_else(|| "missing value for -o".to_string())?;
            output = Some(PathBuf::from(value));
            continue;
        }

        if arg.to_string_lossy().starts_with('-') {
            return Err(format!("unknown option: {}", arg.to_string_lossy()));
        }

        if object.is_some() {
            return Err("multiple object files provided".to_string());
        }
        object = Some(PathBuf::from(arg));
    }

    let object = object.ok_or_else(|| "missing object file".to_string())?;
    Ok(ParseResult::Run(RunArgs {
        object,
        input,
        output,
        eof_zero,
        trace,
    }))
}

fn open_input(args: &RunArgs) -> Result<Box<dyn Read>, i32> {
    match &args.input {
        Some(path) => match File::open(path) {
            Ok(file) => Ok(Box::new(BufReader::new(file))),
            Err(e) => {
                eprintln!("error: input file error: {}: {e}", path.display());
                Err(1)
            }
        },
        None => Ok(Box::new(io::stdin())),
    }
}

fn open_output(args: &RunArgs) -> Result<Box<dyn Write>, i32> {
    match &args.output {
        Some(path) => match File::create(path) {
            Ok(file) => Ok(Box::new(BufWriter::new(file))),
            Err(e) => {
                eprintln!("error: output file error: {}: {e}", path.display());
                Err(1)
            }
        },
        None => Ok(Box::new(io::stdout())),
    }
}

fn run(args: &RunArgs) -> Result<(), i32> {
    let image = match load_object_file(&args.object) {
        Ok(image) => image,
        Err(e) => {
            eprintln!("error: load error: {e}");
            return Err(1);
        }
    };

    let mut input = open_input(args)?;
    let mut output = open_output(args)?;
    let mut trace = WriterTraceSink::new(io::stdout());

    let result = {
        let mut emulator =
            Emulator::new(args.config(), &mut input, &mut output).with_trace_sink(&mut trace);
        if let Err(e) = emulator.load(&image) {
            eprintln!("error: load error: {e}");
            return Err(1);
        }
        emulator.run()
    };

    let flushed = output.flush();
    let traced = trace.finish();

    match result {
        Ok(HaltReason::Stop) => {}
        Ok(HaltReason::UnsupportedInstruction) => {
            eprintln!("Unsupported instruction: RETTR");
            log::warn!("RETTR is not supported; machine halted");
        }
        Err(fault) => {
            eprintln!("error: machine fault: {fault}");
            return Err(1);
        }
    }

    if let Err(e) = flushed {
        eprintln!("error: failed to write output: {e}");
        return Err(1);
    }
    if let Err(e) = traced {
        eprintln!("error: failed to write trace: {e}");
        return Err(1);
    }
    Ok(())
}

fn main() {
    env_logger::init();

    let exit_code = match parse_args(env::args_os().skip(1)) {
        Ok(ParseResult::Help) => {
            println!("{USAGE_TEXT}");
            0
        }
        Ok(ParseResult::Run(args)) => match run(&args) {
            Ok(()) => 0,
            Err(code) => code,
        },
        Err(error) => {
            eprintln!("error: {error}");
            eprintln!("{USAGE_TEXT}");
            1
        }
    };

    std::process::exit(exit_code);
}
