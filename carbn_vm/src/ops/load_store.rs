//! Data-load and variable-store handlers.

use crate::cursor::Cursor;
use crate::vm::VirtualMachine;
use carbn_core::{Value, VmResult};

/// LoadInt: reads an 8-byte immediate, reinterpreted as signed.
pub(crate) fn load_int(vm: &mut VirtualMachine, cursor: &mut Cursor<'_>) -> VmResult<()> {
    let v = cursor.read_i64()?;
    vm.stack.push(Value::Int(v))
}

/// LoadFloat: reads an 8-byte IEEE-754 immediate.
pub(crate) fn load_float(vm: &mut VirtualMachine, cursor: &mut Cursor<'_>) -> VmResult<()> {
    let v = cursor.read_f64()?;
    vm.stack.push(Value::Float(v))
}

/// LoadBool: reads an 8-byte immediate; nonzero is true.
pub(crate) fn load_bool(vm: &mut VirtualMachine, cursor: &mut Cursor<'_>) -> VmResult<()> {
    let v = cursor.read_u64()?;
    vm.stack.push(Value::Bool(v != 0))
}

/// LoadConst: reads a length-prefixed string immediate.
pub(crate) fn load_const(vm: &mut VirtualMachine, cursor: &mut Cursor<'_>) -> VmResult<()> {
    let s = cursor.read_str()?;
    vm.stack.push(Value::Str(s))
}

/// LoadNull: pushes null.
pub(crate) fn load_null(vm: &mut VirtualMachine) -> VmResult<()> {
    vm.stack.push(Value::Null)
}

/// LoadVar: pushes a deep copy of the named binding, or integer 0 when
/// the name is unbound. Lookup consults the top frame's locals first,
/// then the globals.
pub(crate) fn load_var(vm: &mut VirtualMachine, cursor: &mut Cursor<'_>) -> VmResult<()> {
    let name = cursor.read_name()?;
    let value = vm.lookup(&name).cloned().unwrap_or(Value::Int(0));
    vm.stack.push(value)
}

/// Store: pops a value and binds it. Writes go to the top frame's
/// locals while a call is active, else to the globals; a prior binding
/// is dropped on rebind.
pub(crate) fn store(vm: &mut VirtualMachine, cursor: &mut Cursor<'_>) -> VmResult<()> {
    let name = cursor.read_name()?;
    let value = vm.stack.pop()?;
    vm.store_name(name, value);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vm::VirtualMachine;

    #[test]
    fn test_load_var_missing_pushes_zero() {
        let mut vm = VirtualMachine::new();
        let code = [7u8, b'm', b'i', b's', b's', b'i', b'n', b'g'];
        let mut cursor = Cursor::new(&code);
        load_var(&mut vm, &mut cursor).unwrap();
        assert_eq!(vm.stack.pop().unwrap(), Value::Int(0));
    }

    #[test]
    fn test_store_then_load_global() {
        let mut vm = VirtualMachine::new();
        vm.stack.push(Value::Str("payload".into())).unwrap();
        let code = [1u8, b'x'];
        let mut cursor = Cursor::new(&code);
        store(&mut vm, &mut cursor).unwrap();
        assert_eq!(vm.globals().get("x"), Some(&Value::Str("payload".into())));

        let mut cursor = Cursor::new(&code);
        load_var(&mut vm, &mut cursor).unwrap();
        assert_eq!(vm.stack.pop().unwrap(), Value::Str("payload".into()));
        // The variable still owns its own copy.
        assert_eq!(vm.globals().get("x"), Some(&Value::Str("payload".into())));
    }

    #[test]
    fn test_load_var_deep_copies_arrays() {
        let mut vm = VirtualMachine::new();
        vm.globals
            .insert("arr".into(), Value::Array(vec![Value::Int(1), Value::Int(2)]));
        let code = [3u8, b'a', b'r', b'r'];
        let mut cursor = Cursor::new(&code);
        load_var(&mut vm, &mut cursor).unwrap();
        let mut cursor = Cursor::new(&code);
        load_var(&mut vm, &mut cursor).unwrap();

        // Two loads produce two independent copies equal to the binding.
        let second = vm.stack.pop().unwrap();
        let first = vm.stack.pop().unwrap();
        assert_eq!(first, second);
        assert_eq!(
            vm.globals().get("arr"),
            Some(&Value::Array(vec![Value::Int(1), Value::Int(2)])),
        );
    }
}
