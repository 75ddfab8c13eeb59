//! Carbn: bytecode runner for the Carbn VM.

mod args;
mod error;

use args::{ArgError, ExecutionMode};
use std::path::Path;
use std::process::ExitCode;

fn main() -> ExitCode {
    let parsed = match args::parse_args(std::env::args().skip(1)) {
        Ok(parsed) => parsed,
        Err(err) => return usage_error(&err),
    };

    match parsed.mode {
        ExecutionMode::PrintVersion => {
            println!("{}", args::version_string());
            ExitCode::from(error::EXIT_SUCCESS)
        }
        ExecutionMode::PrintHelp => {
            print!("{}", args::usage_text());
            ExitCode::from(error::EXIT_SUCCESS)
        }
        ExecutionMode::Script(path) => run_script(&path),
    }
}

fn run_script(path: &Path) -> ExitCode {
    let code = match std::fs::read(path) {
        Ok(code) => code,
        Err(err) => return error::report_io_error(&err, path),
    };

    match carbn_vm::run(&code) {
        Ok(()) => ExitCode::from(error::EXIT_SUCCESS),
        Err(err) => error::report_vm_error(&err, path),
    }
}

fn usage_error(err: &ArgError) -> ExitCode {
    eprintln!("carbn: {}", err);
    eprint!("{}", args::usage_text());
    ExitCode::from(error::EXIT_USAGE_ERROR)
}
