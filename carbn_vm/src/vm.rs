//! The virtual machine: state, the dispatch loop, and scope resolution.

use crate::cursor::Cursor;
use crate::dispatch::{self, ControlFlow};
use crate::frame::Frame;
use crate::globals::GlobalScope;
use crate::io::{self, OutputSink};
use crate::opcode::Opcode;
use crate::stack::OperandStack;
use carbn_core::{Value, VmError, VmResult};
use std::io::{BufRead, BufReader};

/// A single-threaded bytecode interpreter.
///
/// The machine owns its operand stack, call stack, and global scope
/// exclusively; nothing is shared across threads. `execute` runs one
/// code slice to completion and may be called repeatedly — globals
/// persist across runs, while the operand and call stacks are expected
/// to balance out within each well-formed program.
pub struct VirtualMachine {
    pub(crate) stack: OperandStack,
    pub(crate) globals: GlobalScope,
    pub(crate) frames: Vec<Frame>,
    /// Index of the innermost active structured loop.
    pub(crate) loop_index: i64,
    pub(crate) output: Box<dyn OutputSink>,
    pub(crate) input: Box<dyn BufRead>,
}

impl Default for VirtualMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl VirtualMachine {
    /// Create a machine wired to the process's standard streams.
    #[must_use]
    pub fn new() -> Self {
        Self::with_io(io::default_sink(), Box::new(BufReader::new(std::io::stdin())))
    }

    /// Create a machine with explicit output and input endpoints.
    #[must_use]
    pub fn with_io(output: Box<dyn OutputSink>, input: Box<dyn BufRead>) -> Self {
        Self {
            stack: OperandStack::new(),
            globals: GlobalScope::new(),
            frames: Vec::new(),
            loop_index: 0,
            output,
            input,
        }
    }

    /// Run a code slice from offset 0 until the end of the code, a RET
    /// with no active frame, or the end of a structured-loop body.
    ///
    /// The first error unwinds the dispatch loop and surfaces here;
    /// nothing is caught inside the machine. After an error the machine
    /// still owns all of its live values and can be dropped, inspected,
    /// or [`reset`](Self::reset) and reused.
    pub fn execute(&mut self, code: &[u8]) -> VmResult<()> {
        let mut cursor = Cursor::new(code);
        while !cursor.is_eof() {
            let byte = cursor.read_u8()?;
            let op = Opcode::from_byte(byte).ok_or(VmError::InvalidOpcode(byte))?;
            match dispatch::dispatch(self, &mut cursor, op)? {
                ControlFlow::Continue => {}
                ControlFlow::Halt => break,
            }
        }
        Ok(())
    }

    /// Resolve a name: the top frame's locals first, then the globals.
    /// Nested calls do not see their caller's locals.
    #[must_use]
    pub(crate) fn lookup(&self, name: &str) -> Option<&Value> {
        if let Some(frame) = self.frames.last() {
            if let Some(value) = frame.locals.get(name) {
                return Some(value);
            }
        }
        self.globals.get(name)
    }

    /// Bind a name in the innermost scope: the top frame's locals while
    /// a call is active, else the globals.
    pub(crate) fn store_name(&mut self, name: String, value: Value) {
        match self.frames.last_mut() {
            Some(frame) => frame.locals.insert(name.into(), value),
            None => self.globals.insert(name.into(), value),
        }
    }

    /// The operand stack, bottom to top.
    #[must_use]
    pub fn stack(&self) -> &OperandStack {
        &self.stack
    }

    /// The global scope.
    #[must_use]
    pub fn globals(&self) -> &GlobalScope {
        &self.globals
    }

    /// Number of active call frames.
    #[must_use]
    pub fn call_depth(&self) -> usize {
        self.frames.len()
    }

    /// Drop every live value: operand stack, call frames with their
    /// locals, and the global scope.
    pub fn reset(&mut self) {
        self.stack.clear();
        self.frames.clear();
        self.globals.clear();
        self.loop_index = 0;
    }
}

impl std::fmt::Debug for VirtualMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VirtualMachine")
            .field("stack_depth", &self.stack.len())
            .field("call_depth", &self.frames.len())
            .field("globals", &self.globals.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::CaptureSink;

    fn capture_vm() -> (VirtualMachine, crate::io::CaptureHandle) {
        let (sink, handle) = CaptureSink::new();
        (VirtualMachine::with_io(Box::new(sink), Box::new(&b""[..])), handle)
    }

    #[test]
    fn test_execute_empty_program() {
        let (mut vm, _) = capture_vm();
        vm.execute(&[]).unwrap();
        assert!(vm.stack().is_empty());
    }

    #[test]
    fn test_unknown_opcode() {
        let (mut vm, _) = capture_vm();
        assert_eq!(vm.execute(&[0]), Err(VmError::InvalidOpcode(0)));
        assert_eq!(vm.execute(&[200]), Err(VmError::InvalidOpcode(200)));
    }

    #[test]
    fn test_reserved_opcodes_error() {
        let (mut vm, _) = capture_vm();
        assert_eq!(vm.execute(&[32]), Err(VmError::InvalidOpcode(32)));
        assert_eq!(vm.execute(&[33]), Err(VmError::InvalidOpcode(33)));
    }

    #[test]
    fn test_lookup_prefers_frame_locals() {
        let (mut vm, _) = capture_vm();
        vm.globals.insert("x".into(), Value::Int(1));
        vm.frames.push(Frame::new(0, 0));
        vm.frames
            .last_mut()
            .unwrap()
            .locals
            .insert("x".into(), Value::Int(2));
        assert_eq!(vm.lookup("x"), Some(&Value::Int(2)));
        vm.frames.pop();
        assert_eq!(vm.lookup("x"), Some(&Value::Int(1)));
    }

    #[test]
    fn test_lookup_falls_through_to_globals() {
        let (mut vm, _) = capture_vm();
        vm.globals.insert("g".into(), Value::Bool(true));
        vm.frames.push(Frame::new(0, 0));
        assert_eq!(vm.lookup("g"), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_store_targets_innermost_scope() {
        let (mut vm, _) = capture_vm();
        vm.store_name("a".into(), Value::Int(1));
        assert_eq!(vm.globals.get("a"), Some(&Value::Int(1)));

        vm.frames.push(Frame::new(0, 0));
        vm.store_name("a".into(), Value::Int(2));
        assert_eq!(vm.frames.last().unwrap().locals.get("a"), Some(&Value::Int(2)));
        // The global binding is untouched.
        assert_eq!(vm.globals.get("a"), Some(&Value::Int(1)));
    }

    #[test]
    fn test_reset_drops_everything() {
        let (mut vm, _) = capture_vm();
        vm.stack.push(Value::Str("left over".into())).unwrap();
        vm.globals.insert("x".into(), Value::Int(1));
        vm.frames.push(Frame::new(0, 0));
        vm.reset();
        assert!(vm.stack().is_empty());
        assert_eq!(vm.call_depth(), 0);
        assert!(vm.globals().is_empty());
    }

    #[test]
    fn test_error_leaves_machine_reusable() {
        let (mut vm, handle) = capture_vm();
        // LOAD_INT 1, then a jump far out of range.
        let mut code = vec![3u8];
        code.extend_from_slice(&1u64.to_be_bytes());
        code.push(23);
        code.extend_from_slice(&9999u64.to_be_bytes());
        assert!(matches!(
            vm.execute(&code),
            Err(VmError::InvalidJump { target: 9999, .. }),
        ));
        // The leftover operand is still owned by the machine.
        assert_eq!(vm.stack().len(), 1);

        vm.reset();
        // PRINT of LOAD_INT 5 works after the failed run.
        let mut code = vec![3u8];
        code.extend_from_slice(&5u64.to_be_bytes());
        code.push(1);
        vm.execute(&code).unwrap();
        assert_eq!(handle.text(), "5\n");
    }
}
