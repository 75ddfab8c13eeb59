//! PRINT and STDIN handlers.

use crate::io;
use crate::vm::VirtualMachine;
use carbn_core::{Value, VmResult};

/// Print: pops a value, renders it, and writes the bytes plus a single
/// newline to the output sink. String payloads are emitted verbatim,
/// without any re-encoding.
pub(crate) fn print(vm: &mut VirtualMachine) -> VmResult<()> {
    let value = vm.stack.pop()?;
    let rendered = value.render();
    vm.output.write(&rendered);
    vm.output.write(b"\n");
    Ok(())
}

/// Stdin: reads one line (delimiter excluded) and pushes it as an owned
/// string.
pub(crate) fn stdin(vm: &mut VirtualMachine) -> VmResult<()> {
    let line = io::read_line(vm.input.as_mut());
    vm.stack.push(Value::Str(line))
}
