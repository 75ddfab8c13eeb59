//! Sequence construction and length handlers.

use crate::cursor::Cursor;
use crate::ops::casts;
use crate::vm::VirtualMachine;
use carbn_core::{Value, VmError, VmResult};

/// ArrayNew: pops the element count (coerced to an integer), pushes an
/// array of that many nulls.
pub(crate) fn array_new(vm: &mut VirtualMachine) -> VmResult<()> {
    let size_value = vm.stack.pop()?;
    let size = casts::to_index(size_value)?;
    let mut items = Vec::new();
    items
        .try_reserve_exact(size)
        .map_err(|_| VmError::OutOfMemory)?;
    items.resize(size, Value::Null);
    vm.stack.push(Value::Array(items))
}

/// BuildList: pops `count` values and pushes them as an array in source
/// order (the top of the stack becomes the last element).
pub(crate) fn build_list(vm: &mut VirtualMachine, cursor: &mut Cursor<'_>) -> VmResult<()> {
    let count = cursor.read_u64()?;
    let items = collect_sequence(vm, count)?;
    vm.stack.push(Value::Array(items))
}

/// BuildTuple: identical to BuildList; tuples and lists share the array
/// representation.
pub(crate) fn build_tuple(vm: &mut VirtualMachine, cursor: &mut Cursor<'_>) -> VmResult<()> {
    build_list(vm, cursor)
}

/// BuildDict: pops `count` key/value pairs and discards them, pushing an
/// empty array. The opcode is a wire-compatible placeholder until a map
/// value type exists.
pub(crate) fn build_dict(vm: &mut VirtualMachine, cursor: &mut Cursor<'_>) -> VmResult<()> {
    let count = cursor.read_u64()?;
    for _ in 0..count {
        vm.stack.pop()?;
        vm.stack.pop()?;
    }
    vm.stack.push(Value::Array(Vec::new()))
}

/// ArrayLen: pops a sequence; pushes the element count for arrays or the
/// byte length for strings.
pub(crate) fn array_len(vm: &mut VirtualMachine) -> VmResult<()> {
    let value = vm.stack.pop()?;
    let len = match &value {
        Value::Array(items) => items.len(),
        Value::Str(s) => s.len(),
        other => {
            return Err(VmError::invalid_cast(format!(
                "cannot take length of {}",
                other.type_name(),
            )));
        }
    };
    vm.stack.push(Value::Int(len as i64))
}

fn collect_sequence(vm: &mut VirtualMachine, count: u64) -> VmResult<Vec<Value>> {
    let mut items = Vec::new();
    for _ in 0..count {
        items.push(vm.stack.pop()?);
    }
    items.reverse();
    Ok(items)
}
