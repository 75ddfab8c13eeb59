//! Error formatting and exit-code mapping for the runner.

use carbn_core::VmError;
use std::path::Path;
use std::process::ExitCode;

// =============================================================================
// Exit Codes
// =============================================================================

/// Successful execution.
pub const EXIT_SUCCESS: u8 = 0;
/// Runtime error or unreadable input file.
pub const EXIT_ERROR: u8 = 1;
/// Command-line usage error (bad flags, missing args).
pub const EXIT_USAGE_ERROR: u8 = 2;

// =============================================================================
// Formatting
// =============================================================================

/// Format a runtime error against the file it came from.
#[must_use]
pub fn format_vm_error(error: &VmError, path: &Path) -> String {
    format!("carbn: {}: runtime error: {}\n", path.display(), error)
}

/// Format a file-read failure.
#[must_use]
pub fn format_io_error(error: &std::io::Error, path: &Path) -> String {
    format!("carbn: {}: {}\n", path.display(), error)
}

/// Print a runtime error to stderr and return the process exit code.
pub fn report_vm_error(error: &VmError, path: &Path) -> ExitCode {
    eprint!("{}", format_vm_error(error, path));
    ExitCode::from(EXIT_ERROR)
}

/// Print a file-read failure to stderr and return the process exit code.
pub fn report_io_error(error: &std::io::Error, path: &Path) -> ExitCode {
    eprint!("{}", format_io_error(error, path));
    ExitCode::from(EXIT_ERROR)
}
