//! Arithmetic opcode handlers and the numeric promotion engine.
//!
//! Operands promote along `integer < big_integer < float`. Two 64-bit
//! integers are computed in 128-bit precision and the result narrows
//! back to 64 bits only when it fits; any big-integer operand keeps the
//! result wide, and any float operand makes it a float. ADD additionally
//! accepts strings, absorbing numeric and boolean partners into
//! concatenation. Division and modulus truncate toward zero and take
//! the dividend's sign.

use crate::vm::VirtualMachine;
use carbn_core::{Value, VmError, VmResult};

/// Add: pops `b`, `a`; pushes `a + b`.
pub(crate) fn add(vm: &mut VirtualMachine) -> VmResult<()> {
    let b = vm.stack.pop()?;
    let a = vm.stack.pop()?;
    let result = binary_add(a, b)?;
    vm.stack.push(result)
}

/// Sub: pops `b`, `a`; pushes `a - b`.
pub(crate) fn sub(vm: &mut VirtualMachine) -> VmResult<()> {
    let b = vm.stack.pop()?;
    let a = vm.stack.pop()?;
    let result = binary_sub(a, b)?;
    vm.stack.push(result)
}

/// Mul: pops `b`, `a`; pushes `a * b`.
pub(crate) fn mul(vm: &mut VirtualMachine) -> VmResult<()> {
    let b = vm.stack.pop()?;
    let a = vm.stack.pop()?;
    let result = binary_mul(a, b)?;
    vm.stack.push(result)
}

/// Div: pops `b`, `a`; pushes `a / b`.
pub(crate) fn div(vm: &mut VirtualMachine) -> VmResult<()> {
    let b = vm.stack.pop()?;
    let a = vm.stack.pop()?;
    let result = binary_div(a, b)?;
    vm.stack.push(result)
}

/// Mod: pops `b`, `a`; pushes `a % b`.
pub(crate) fn modulo(vm: &mut VirtualMachine) -> VmResult<()> {
    let b = vm.stack.pop()?;
    let a = vm.stack.pop()?;
    let result = binary_mod(a, b)?;
    vm.stack.push(result)
}

// =============================================================================
// Promotion
// =============================================================================

/// A numeric operand pair after promotion to a common domain.
enum NumPair {
    /// Both operands were 64-bit; computed in 128-bit, narrowed after.
    Int(i128, i128),
    /// At least one big integer; stays wide.
    Big(i128, i128),
    /// At least one float; both widened.
    Float(f64, f64),
}

fn promote(op: &'static str, a: &Value, b: &Value) -> VmResult<NumPair> {
    use Value::*;
    match (a, b) {
        (Int(x), Int(y)) => Ok(NumPair::Int(*x as i128, *y as i128)),
        (BigInt(x), BigInt(y)) => Ok(NumPair::Big(*x, *y)),
        (BigInt(x), Int(y)) => Ok(NumPair::Big(*x, *y as i128)),
        (Int(x), BigInt(y)) => Ok(NumPair::Big(*x as i128, *y)),
        (Float(x), Float(y)) => Ok(NumPair::Float(*x, *y)),
        (Int(x), Float(y)) => Ok(NumPair::Float(*x as f64, *y)),
        (Float(x), Int(y)) => Ok(NumPair::Float(*x, *y as f64)),
        (BigInt(x), Float(y)) => Ok(NumPair::Float(*x as f64, *y)),
        (Float(x), BigInt(y)) => Ok(NumPair::Float(*x, *y as f64)),
        _ => Err(VmError::unsupported_operand(op, a.type_name(), b.type_name())),
    }
}

fn divisor_is_zero(pair: &NumPair) -> bool {
    match pair {
        NumPair::Int(_, y) | NumPair::Big(_, y) => *y == 0,
        NumPair::Float(_, y) => *y == 0.0,
    }
}

// =============================================================================
// Binary operations
// =============================================================================

/// Addition, including string concatenation.
pub(crate) fn binary_add(a: Value, b: Value) -> VmResult<Value> {
    if matches!(a, Value::Str(_)) || matches!(b, Value::Str(_)) {
        return concat(a, b);
    }
    match promote("+", &a, &b)? {
        NumPair::Int(x, y) => Ok(Value::narrowed(x + y)),
        NumPair::Big(x, y) => Ok(Value::BigInt(x.wrapping_add(y))),
        NumPair::Float(x, y) => Ok(Value::Float(x + y)),
    }
}

/// Subtraction.
pub(crate) fn binary_sub(a: Value, b: Value) -> VmResult<Value> {
    match promote("-", &a, &b)? {
        NumPair::Int(x, y) => Ok(Value::narrowed(x - y)),
        NumPair::Big(x, y) => Ok(Value::BigInt(x.wrapping_sub(y))),
        NumPair::Float(x, y) => Ok(Value::Float(x - y)),
    }
}

/// Multiplication.
pub(crate) fn binary_mul(a: Value, b: Value) -> VmResult<Value> {
    match promote("*", &a, &b)? {
        // 64x64-bit products always fit in 128 bits.
        NumPair::Int(x, y) => Ok(Value::narrowed(x * y)),
        NumPair::Big(x, y) => Ok(Value::BigInt(x.wrapping_mul(y))),
        NumPair::Float(x, y) => Ok(Value::Float(x * y)),
    }
}

/// Division, truncating toward zero in the integer domains.
///
/// A zero divisor in any numeric domain (including float 0.0) is an
/// error, not an IEEE infinity.
pub(crate) fn binary_div(a: Value, b: Value) -> VmResult<Value> {
    let pair = promote("/", &a, &b)?;
    if divisor_is_zero(&pair) {
        return Err(VmError::DivisionByZero);
    }
    match pair {
        NumPair::Int(x, y) => Ok(Value::narrowed(x / y)),
        NumPair::Big(x, y) => Ok(Value::BigInt(x.wrapping_div(y))),
        NumPair::Float(x, y) => Ok(Value::Float(x / y)),
    }
}

/// Modulus with the dividend's sign.
pub(crate) fn binary_mod(a: Value, b: Value) -> VmResult<Value> {
    let pair = promote("%", &a, &b)?;
    if divisor_is_zero(&pair) {
        return Err(VmError::DivisionByZero);
    }
    match pair {
        NumPair::Int(x, y) => Ok(Value::narrowed(x % y)),
        NumPair::Big(x, y) => Ok(Value::BigInt(x.wrapping_rem(y))),
        NumPair::Float(x, y) => Ok(Value::Float(x % y)),
    }
}

/// String concatenation. At least one side is a string; the other must
/// be a string, a number, or a boolean. String bytes pass through
/// untouched.
fn concat(a: Value, b: Value) -> VmResult<Value> {
    if !concatable(&a) || !concatable(&b) {
        return Err(VmError::unsupported_operand("+", a.type_name(), b.type_name()));
    }
    let mut out = a.render();
    b.render_bytes(&mut out);
    Ok(Value::Str(out))
}

fn concatable(v: &Value) -> bool {
    matches!(
        v,
        Value::Str(_) | Value::Int(_) | Value::BigInt(_) | Value::Float(_) | Value::Bool(_),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_int_int() {
        assert_eq!(
            binary_add(Value::Int(2), Value::Int(3)).unwrap(),
            Value::Int(5),
        );
    }

    #[test]
    fn test_add_overflow_widens() {
        let result = binary_add(Value::Int(i64::MAX), Value::Int(1)).unwrap();
        assert_eq!(result, Value::BigInt(i64::MAX as i128 + 1));
    }

    #[test]
    fn test_sub_underflow_widens() {
        let result = binary_sub(Value::Int(i64::MIN), Value::Int(1)).unwrap();
        assert_eq!(result, Value::BigInt(i64::MIN as i128 - 1));
    }

    #[test]
    fn test_mul_widens_exactly() {
        let result = binary_mul(Value::Int(i64::MAX), Value::Int(2)).unwrap();
        assert_eq!(result, Value::BigInt(i64::MAX as i128 * 2));
    }

    #[test]
    fn test_big_operand_keeps_result_wide() {
        // A big-integer operand promotes even when the result would fit.
        let result = binary_add(Value::BigInt(1), Value::Int(2)).unwrap();
        assert_eq!(result, Value::BigInt(3));
    }

    #[test]
    fn test_float_promotion() {
        assert_eq!(
            binary_add(Value::Int(1), Value::Float(0.5)).unwrap(),
            Value::Float(1.5),
        );
        assert_eq!(
            binary_mul(Value::BigInt(4), Value::Float(0.25)).unwrap(),
            Value::Float(1.0),
        );
    }

    #[test]
    fn test_concat_strings() {
        assert_eq!(
            binary_add(Value::Str("hi".into()), Value::Str(" there".into())).unwrap(),
            Value::Str("hi there".into()),
        );
    }

    #[test]
    fn test_concat_absorbs_numbers_and_bools() {
        assert_eq!(
            binary_add(Value::Str("n=".into()), Value::Int(-3)).unwrap(),
            Value::Str("n=-3".into()),
        );
        assert_eq!(
            binary_add(Value::Float(2.5), Value::Str("!".into())).unwrap(),
            Value::Str("2.5!".into()),
        );
        assert_eq!(
            binary_add(Value::Str("is ".into()), Value::Bool(true)).unwrap(),
            Value::Str("is true".into()),
        );
    }

    #[test]
    fn test_concat_rejects_null_and_array() {
        assert!(binary_add(Value::Str("x".into()), Value::Null).is_err());
        assert!(binary_add(Value::Array(vec![]), Value::Str("x".into())).is_err());
    }

    #[test]
    fn test_sub_rejects_strings() {
        let err = binary_sub(Value::Str("a".into()), Value::Str("b".into()));
        assert!(matches!(err, Err(VmError::InvalidCast(_))));
    }

    #[test]
    fn test_div_truncates_toward_zero() {
        assert_eq!(binary_div(Value::Int(7), Value::Int(2)).unwrap(), Value::Int(3));
        assert_eq!(binary_div(Value::Int(-7), Value::Int(2)).unwrap(), Value::Int(-3));
        assert_eq!(binary_div(Value::Int(7), Value::Int(-2)).unwrap(), Value::Int(-3));
    }

    #[test]
    fn test_mod_takes_dividend_sign() {
        assert_eq!(binary_mod(Value::Int(7), Value::Int(3)).unwrap(), Value::Int(1));
        assert_eq!(binary_mod(Value::Int(-7), Value::Int(3)).unwrap(), Value::Int(-1));
        assert_eq!(binary_mod(Value::Int(7), Value::Int(-3)).unwrap(), Value::Int(1));
    }

    #[test]
    fn test_div_min_by_minus_one_widens() {
        let result = binary_div(Value::Int(i64::MIN), Value::Int(-1)).unwrap();
        assert_eq!(result, Value::BigInt(-(i64::MIN as i128)));
    }

    #[test]
    fn test_division_by_zero() {
        assert_eq!(
            binary_div(Value::Int(1), Value::Int(0)),
            Err(VmError::DivisionByZero),
        );
        assert_eq!(
            binary_mod(Value::Int(1), Value::BigInt(0)),
            Err(VmError::DivisionByZero),
        );
        assert_eq!(
            binary_div(Value::Float(1.0), Value::Float(0.0)),
            Err(VmError::DivisionByZero),
        );
        // Mixed: integer dividend, float zero divisor.
        assert_eq!(
            binary_div(Value::Int(1), Value::Float(0.0)),
            Err(VmError::DivisionByZero),
        );
    }

    #[test]
    fn test_float_mod() {
        assert_eq!(
            binary_mod(Value::Float(7.5), Value::Float(2.0)).unwrap(),
            Value::Float(1.5),
        );
    }

    #[test]
    fn test_bool_is_not_numeric() {
        assert!(binary_add(Value::Bool(true), Value::Int(1)).is_err());
        assert!(binary_mul(Value::Bool(false), Value::Bool(true)).is_err());
    }

    #[test]
    fn test_narrow_back_into_int() {
        // A 128-bit intermediate that fits in 64 bits narrows back.
        let result = binary_sub(Value::Int(i64::MAX), Value::Int(i64::MAX)).unwrap();
        assert_eq!(result, Value::Int(0));
    }
}
