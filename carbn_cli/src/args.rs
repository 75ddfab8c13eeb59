//! Command-line argument parser.
//!
//! Hand-rolled for zero-overhead startup. The surface is deliberately
//! small: one positional bytecode path, plus version/help flags.

use std::fmt;
use std::path::PathBuf;

/// What the runner should do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionMode {
    /// Run a bytecode file: `carbn program.crbn`
    Script(PathBuf),
    /// Print version and exit: `carbn -V` or `carbn --version`
    PrintVersion,
    /// Print help and exit: `carbn -h` or `carbn --help`
    PrintHelp,
}

/// Parsed command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CarbnArgs {
    pub mode: ExecutionMode,
}

/// Argument parsing failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgError {
    /// No bytecode path was given.
    MissingScript,
    /// An option that is not recognized.
    UnknownFlag(String),
    /// More than one positional argument.
    ExtraArgument(String),
}

impl fmt::Display for ArgError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgError::MissingScript => f.write_str("missing bytecode file argument"),
            ArgError::UnknownFlag(flag) => write!(f, "unknown option: {}", flag),
            ArgError::ExtraArgument(arg) => write!(f, "unexpected argument: {}", arg),
        }
    }
}

impl std::error::Error for ArgError {}

/// Parse arguments (excluding argv[0]).
pub fn parse_args<I, S>(args: I) -> Result<CarbnArgs, ArgError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut script: Option<PathBuf> = None;

    for arg in args {
        let arg = arg.into();
        if arg == "-V" || arg == "--version" {
            return Ok(CarbnArgs {
                mode: ExecutionMode::PrintVersion,
            });
        }
        if arg == "-h" || arg == "--help" {
            return Ok(CarbnArgs {
                mode: ExecutionMode::PrintHelp,
            });
        }
        if arg.starts_with('-') && arg.len() > 1 {
            return Err(ArgError::UnknownFlag(arg));
        }
        if script.is_some() {
            return Err(ArgError::ExtraArgument(arg));
        }
        script = Some(PathBuf::from(arg));
    }

    match script {
        Some(path) => Ok(CarbnArgs {
            mode: ExecutionMode::Script(path),
        }),
        None => Err(ArgError::MissingScript),
    }
}

/// Version line for `--version`.
#[must_use]
pub fn version_string() -> String {
    format!("carbn {}", carbn_core::VERSION)
}

/// Usage text for `--help` and argument errors.
#[must_use]
pub fn usage_text() -> String {
    "usage: carbn <file.crbn>\n\
     \n\
     Run a compiled Carbn bytecode file.\n\
     \n\
     options:\n\
     \x20 -h, --help     show this help and exit\n\
     \x20 -V, --version  show the version and exit\n"
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_script_path() {
        let args = parse_args(["program.crbn"]).unwrap();
        assert_eq!(
            args.mode,
            ExecutionMode::Script(PathBuf::from("program.crbn")),
        );
    }

    #[test]
    fn test_parse_missing_script() {
        let args: [&str; 0] = [];
        assert_eq!(parse_args(args), Err(ArgError::MissingScript));
    }

    #[test]
    fn test_parse_version_flags() {
        assert_eq!(parse_args(["-V"]).unwrap().mode, ExecutionMode::PrintVersion);
        assert_eq!(
            parse_args(["--version"]).unwrap().mode,
            ExecutionMode::PrintVersion,
        );
    }

    #[test]
    fn test_parse_help_flags() {
        assert_eq!(parse_args(["-h"]).unwrap().mode, ExecutionMode::PrintHelp);
        assert_eq!(parse_args(["--help"]).unwrap().mode, ExecutionMode::PrintHelp);
    }

    #[test]
    fn test_parse_unknown_flag() {
        assert_eq!(
            parse_args(["--fast"]),
            Err(ArgError::UnknownFlag("--fast".into())),
        );
    }

    #[test]
    fn test_parse_extra_argument() {
        assert_eq!(
            parse_args(["a.crbn", "b.crbn"]),
            Err(ArgError::ExtraArgument("b.crbn".into())),
        );
    }

    #[test]
    fn test_dash_alone_is_a_path() {
        // A bare "-" is treated as a (strange) file name, not a flag.
        let args = parse_args(["-"]).unwrap();
        assert_eq!(args.mode, ExecutionMode::Script(PathBuf::from("-")));
    }

    #[test]
    fn test_usage_mentions_flags() {
        let text = usage_text();
        assert!(text.contains("usage: carbn"));
        assert!(text.contains("--version"));
    }
}
