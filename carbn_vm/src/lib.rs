//! Stack-based virtual machine for Carbn bytecode.
//!
//! This crate executes pre-compiled `.crbn` chunks: a flat byte sequence
//! of one-byte opcodes and big-endian immediates, with no header and
//! execution starting at offset 0. The machine is a strict stack
//! machine with:
//!
//! - **Operand stack**: tagged values with owned heap storage
//! - **Call stack**: frames carrying return address, a base-pointer
//!   snapshot, and per-frame locals (inline up to 8, then spilled)
//! - **Global scope**: module-level bindings in an FxHashMap
//! - **Promotion engine**: `integer < big_integer < float` with
//!   automatic 64→128-bit widening on overflow
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │                 VirtualMachine                   │
//! ├──────────────────────────────────────────────────┤
//! │  ┌──────────────┐   ┌──────────────────────────┐ │
//! │  │ OperandStack │   │ Frames                   │ │
//! │  │ (Vec<Value>) │   │ ret addr · base · locals │ │
//! │  └──────────────┘   └──────────────────────────┘ │
//! │                                                  │
//! │  ┌──────────────┐   ┌──────────────────────────┐ │
//! │  │ GlobalScope  │   │ OutputSink / BufRead     │ │
//! │  │ (FxHashMap)  │   │ (raw fd · stdio · test)  │ │
//! │  └──────────────┘   └──────────────────────────┘ │
//! └──────────────────────────────────────────────────┘
//!          ▲ Cursor walks the code slice; LOOP bodies
//!            re-enter execute() on a sub-slice.
//! ```
//!
//! # Example
//!
//! ```
//! use carbn_vm::VirtualMachine;
//!
//! // LOAD_INT 2, LOAD_INT 3, ADD leaves 5 on the stack.
//! let mut code = vec![3u8];
//! code.extend_from_slice(&2u64.to_be_bytes());
//! code.push(3);
//! code.extend_from_slice(&3u64.to_be_bytes());
//! code.push(9);
//!
//! let mut vm = VirtualMachine::new();
//! vm.execute(&code).unwrap();
//! assert_eq!(vm.stack().as_slice(), &[carbn_vm::Value::Int(5)]);
//! ```

// Core modules
pub mod cursor;
pub mod dispatch;
pub mod frame;
pub mod globals;
pub mod io;
pub mod opcode;
pub mod stack;
pub mod vm;

// Opcode handlers (organized by category)
mod ops;

// Re-exports
pub use carbn_core::{Value, VmError, VmResult};
pub use cursor::Cursor;
pub use dispatch::ControlFlow;
pub use frame::{Frame, Locals, INLINE_LOCALS};
pub use globals::GlobalScope;
pub use io::{CaptureHandle, CaptureSink, OutputSink, StdoutSink};
pub use opcode::{Opcode, Operand};
pub use stack::OperandStack;
pub use vm::VirtualMachine;

#[cfg(unix)]
pub use io::RawFdSink;

/// Convenience function: run a chunk on a fresh machine wired to the
/// process's standard streams.
pub fn run(code: &[u8]) -> VmResult<()> {
    let mut vm = VirtualMachine::new();
    vm.execute(code)
}
