//! VM error kinds and the shared result alias.
//!
//! Every error is fatal to the currently-running program: it unwinds the
//! dispatch loop and surfaces to the caller of `execute`. Nothing is
//! caught inside the VM; the machine stays safe to tear down or reuse
//! after any of these.

use std::fmt;

/// Result alias used throughout the VM.
pub type VmResult<T> = Result<T, VmError>;

/// A fatal execution error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VmError {
    /// Pop, peek, or swap below the required operand count.
    StackUnderflow,
    /// Opcode byte unassigned, or reserved but unimplemented.
    InvalidOpcode(u8),
    /// DIV or MOD with a zero divisor in any numeric domain.
    DivisionByZero,
    /// Array index outside `0..len`. Reserved for indexed access.
    IndexOutOfBounds { index: i64, len: usize },
    /// Type mismatch in arithmetic, a coercion, or a length query.
    InvalidCast(String),
    /// Jump or call target outside the code range.
    InvalidJump { target: u64, limit: usize },
    /// An immediate operand extends past the end of the code.
    TruncatedCode { offset: usize, wanted: usize },
    /// Allocation refused by the host allocator.
    OutOfMemory,
}

impl VmError {
    /// Build an [`VmError::InvalidCast`] for a binary operator applied to
    /// an unsupported pair of operand types.
    pub fn unsupported_operand(op: &str, lhs: &'static str, rhs: &'static str) -> Self {
        VmError::InvalidCast(format!(
            "unsupported operand types for {}: {} and {}",
            op, lhs, rhs,
        ))
    }

    /// Build an [`VmError::InvalidCast`] for a failed type coercion.
    pub fn cast(from: &'static str, to: &'static str) -> Self {
        VmError::InvalidCast(format!("cannot cast {} to {}", from, to))
    }

    /// Build an [`VmError::InvalidCast`] with a free-form message.
    pub fn invalid_cast(message: impl Into<String>) -> Self {
        VmError::InvalidCast(message.into())
    }
}

impl fmt::Display for VmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VmError::StackUnderflow => f.write_str("stack underflow"),
            VmError::InvalidOpcode(byte) => write!(f, "invalid opcode 0x{:02x}", byte),
            VmError::DivisionByZero => f.write_str("division by zero"),
            VmError::IndexOutOfBounds { index, len } => {
                write!(f, "index {} out of bounds for length {}", index, len)
            }
            VmError::InvalidCast(message) => write!(f, "invalid cast: {}", message),
            VmError::InvalidJump { target, limit } => {
                write!(f, "jump target {} outside code of length {}", target, limit)
            }
            VmError::TruncatedCode { offset, wanted } => {
                write!(
                    f,
                    "truncated code: needed {} byte(s) at offset {}",
                    wanted, offset,
                )
            }
            VmError::OutOfMemory => f.write_str("out of memory"),
        }
    }
}

impl std::error::Error for VmError {}
