//! Type coercion handlers.

use crate::vm::VirtualMachine;
use carbn_core::{Value, VmError, VmResult};

/// CastInt: pops a value and pushes its integer coercion. A big integer
/// outside the signed-64 range keeps its wide form.
pub(crate) fn cast_int(vm: &mut VirtualMachine) -> VmResult<()> {
    let value = vm.stack.pop()?;
    let result = cast_to_int(value)?;
    vm.stack.push(result)
}

/// CastFloat: pops a value and pushes its float coercion.
pub(crate) fn cast_float(vm: &mut VirtualMachine) -> VmResult<()> {
    let value = vm.stack.pop()?;
    let result = cast_to_float(value)?;
    vm.stack.push(result)
}

/// Integer coercion: floats truncate, strings parse as decimal,
/// booleans map to 0/1. Big integers that do not fit in 64 bits are
/// returned unchanged.
pub(crate) fn cast_to_int(value: Value) -> VmResult<Value> {
    match value {
        Value::Int(v) => Ok(Value::Int(v)),
        Value::BigInt(v) => match i64::try_from(v) {
            Ok(small) => Ok(Value::Int(small)),
            Err(_) => Ok(Value::BigInt(v)),
        },
        Value::Float(v) => Ok(Value::Int(v.trunc() as i64)),
        Value::Str(s) => std::str::from_utf8(&s)
            .ok()
            .and_then(|text| text.parse::<i64>().ok())
            .map(Value::Int)
            .ok_or_else(|| {
                VmError::invalid_cast(format!(
                    "cannot parse {:?} as integer",
                    String::from_utf8_lossy(&s),
                ))
            }),
        Value::Bool(b) => Ok(Value::Int(b as i64)),
        other => Err(VmError::cast(other.type_name(), "integer")),
    }
}

/// Float coercion: integers widen, strings parse as decimal, booleans
/// map to 0.0/1.0.
pub(crate) fn cast_to_float(value: Value) -> VmResult<Value> {
    match value {
        Value::Int(v) => Ok(Value::Float(v as f64)),
        Value::BigInt(v) => Ok(Value::Float(v as f64)),
        Value::Float(v) => Ok(Value::Float(v)),
        Value::Str(s) => std::str::from_utf8(&s)
            .ok()
            .and_then(|text| text.parse::<f64>().ok())
            .map(Value::Float)
            .ok_or_else(|| {
                VmError::invalid_cast(format!(
                    "cannot parse {:?} as float",
                    String::from_utf8_lossy(&s),
                ))
            }),
        Value::Bool(b) => Ok(Value::Float(if b { 1.0 } else { 0.0 })),
        other => Err(VmError::cast(other.type_name(), "float")),
    }
}

/// Coerce a value to a non-negative element count.
pub(crate) fn to_index(value: Value) -> VmResult<usize> {
    match cast_to_int(value)? {
        Value::Int(v) if v >= 0 => Ok(v as usize),
        Value::Int(v) => Err(VmError::invalid_cast(format!(
            "array size cannot be negative: {}",
            v,
        ))),
        other => Err(VmError::invalid_cast(format!(
            "array size out of range: {}",
            other,
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cast_int_identity() {
        assert_eq!(cast_to_int(Value::Int(5)).unwrap(), Value::Int(5));
    }

    #[test]
    fn test_cast_int_from_big_in_range() {
        assert_eq!(cast_to_int(Value::BigInt(42)).unwrap(), Value::Int(42));
    }

    #[test]
    fn test_cast_int_big_out_of_range_stays_wide() {
        let wide = i64::MAX as i128 + 1;
        assert_eq!(cast_to_int(Value::BigInt(wide)).unwrap(), Value::BigInt(wide));
    }

    #[test]
    fn test_cast_int_truncates_float() {
        assert_eq!(cast_to_int(Value::Float(3.9)).unwrap(), Value::Int(3));
        assert_eq!(cast_to_int(Value::Float(-3.9)).unwrap(), Value::Int(-3));
    }

    #[test]
    fn test_cast_int_parses_string() {
        assert_eq!(cast_to_int(Value::Str("-17".into())).unwrap(), Value::Int(-17));
        assert!(cast_to_int(Value::Str("12.5".into())).is_err());
        assert!(cast_to_int(Value::Str("abc".into())).is_err());
    }

    #[test]
    fn test_cast_int_from_bool() {
        assert_eq!(cast_to_int(Value::Bool(true)).unwrap(), Value::Int(1));
        assert_eq!(cast_to_int(Value::Bool(false)).unwrap(), Value::Int(0));
    }

    #[test]
    fn test_cast_int_rejects_null_and_array() {
        assert!(cast_to_int(Value::Null).is_err());
        assert!(cast_to_int(Value::Array(vec![])).is_err());
    }

    #[test]
    fn test_cast_float_widens() {
        assert_eq!(cast_to_float(Value::Int(2)).unwrap(), Value::Float(2.0));
        assert_eq!(cast_to_float(Value::BigInt(3)).unwrap(), Value::Float(3.0));
    }

    #[test]
    fn test_cast_float_parses_string() {
        assert_eq!(cast_to_float(Value::Str("2.5".into())).unwrap(), Value::Float(2.5));
        assert!(cast_to_float(Value::Str("x".into())).is_err());
    }

    #[test]
    fn test_cast_float_from_bool() {
        assert_eq!(cast_to_float(Value::Bool(true)).unwrap(), Value::Float(1.0));
        assert_eq!(cast_to_float(Value::Bool(false)).unwrap(), Value::Float(0.0));
    }

    #[test]
    fn test_to_index() {
        assert_eq!(to_index(Value::Int(4)).unwrap(), 4);
        assert_eq!(to_index(Value::Bool(true)).unwrap(), 1);
        assert!(to_index(Value::Int(-1)).is_err());
        assert!(to_index(Value::BigInt(i64::MAX as i128 + 1)).is_err());
    }
}
