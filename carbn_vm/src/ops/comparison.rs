//! Comparison opcode handlers.
//!
//! Equality is defined across the full type matrix: mixed integer widths
//! compare in 128-bit, integers against floats compare after widening to
//! float, strings compare by bytes, arrays element-wise, and null equals
//! only null. Mismatched non-numeric types are unequal, never an error.
//! Ordered comparisons are defined on numeric pairs only; any other
//! combination yields `false`.

use crate::vm::VirtualMachine;
use carbn_core::{Value, VmResult};
use std::cmp::Ordering;

/// Eq: pops `b`, `a`; pushes `a == b`.
pub(crate) fn eq(vm: &mut VirtualMachine) -> VmResult<()> {
    let b = vm.stack.pop()?;
    let a = vm.stack.pop()?;
    vm.stack.push(Value::Bool(value_eq(&a, &b)))
}

/// Ne: pops `b`, `a`; pushes `a != b`.
pub(crate) fn ne(vm: &mut VirtualMachine) -> VmResult<()> {
    let b = vm.stack.pop()?;
    let a = vm.stack.pop()?;
    vm.stack.push(Value::Bool(!value_eq(&a, &b)))
}

/// Lt: pops `b`, `a`; pushes `a < b`.
pub(crate) fn lt(vm: &mut VirtualMachine) -> VmResult<()> {
    ordered(vm, |ord| ord == Ordering::Less)
}

/// Le: pops `b`, `a`; pushes `a <= b`.
pub(crate) fn le(vm: &mut VirtualMachine) -> VmResult<()> {
    ordered(vm, |ord| ord != Ordering::Greater)
}

/// Gt: pops `b`, `a`; pushes `a > b`.
pub(crate) fn gt(vm: &mut VirtualMachine) -> VmResult<()> {
    ordered(vm, |ord| ord == Ordering::Greater)
}

/// Ge: pops `b`, `a`; pushes `a >= b`.
pub(crate) fn ge(vm: &mut VirtualMachine) -> VmResult<()> {
    ordered(vm, |ord| ord != Ordering::Less)
}

fn ordered(vm: &mut VirtualMachine, accept: fn(Ordering) -> bool) -> VmResult<()> {
    let b = vm.stack.pop()?;
    let a = vm.stack.pop()?;
    let holds = compare_numeric(&a, &b).is_some_and(accept);
    vm.stack.push(Value::Bool(holds))
}

// =============================================================================
// The comparison matrix
// =============================================================================

/// Value equality across the full type matrix.
pub(crate) fn value_eq(a: &Value, b: &Value) -> bool {
    use Value::*;
    match (a, b) {
        (Int(x), Int(y)) => x == y,
        (BigInt(x), BigInt(y)) => x == y,
        (Int(x), BigInt(y)) | (BigInt(y), Int(x)) => (*x as i128) == *y,
        (Float(x), Float(y)) => x == y,
        (Int(x), Float(y)) | (Float(y), Int(x)) => (*x as f64) == *y,
        (BigInt(x), Float(y)) | (Float(y), BigInt(x)) => (*x as f64) == *y,
        (Str(x), Str(y)) => x == y,
        (Bool(x), Bool(y)) => x == y,
        (Array(x), Array(y)) => {
            x.len() == y.len() && x.iter().zip(y.iter()).all(|(u, v)| value_eq(u, v))
        }
        (Null, Null) => true,
        _ => false,
    }
}

/// Numeric ordering with widening. `None` for non-numeric operands and
/// for NaN comparisons.
pub(crate) fn compare_numeric(a: &Value, b: &Value) -> Option<Ordering> {
    use Value::*;
    match (a, b) {
        (Int(x), Int(y)) => Some(x.cmp(y)),
        (BigInt(x), BigInt(y)) => Some(x.cmp(y)),
        (Int(x), BigInt(y)) => Some((*x as i128).cmp(y)),
        (BigInt(x), Int(y)) => Some(x.cmp(&(*y as i128))),
        (Float(x), Float(y)) => x.partial_cmp(y),
        (Int(x), Float(y)) => (*x as f64).partial_cmp(y),
        (Float(x), Int(y)) => x.partial_cmp(&(*y as f64)),
        (BigInt(x), Float(y)) => (*x as f64).partial_cmp(y),
        (Float(x), BigInt(y)) => x.partial_cmp(&(*y as f64)),
        _ => None,
    }
}
