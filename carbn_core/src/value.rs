//! Tagged runtime value model.
//!
//! A [`Value`] is a sum over the seven runtime types the VM manipulates.
//! Strings and arrays own their heap storage exclusively: cloning a value
//! produces an independent deep copy (nested arrays and the strings inside
//! them included), and dropping it releases everything it owns. This is
//! what keeps the machine leak-free across every exit path — ownership is
//! never shared, so nothing is ever released twice.

use std::fmt;

/// A dynamically-typed runtime value.
///
/// The `Int`/`BigInt` split is semantic, not an implementation detail:
/// 64-bit arithmetic that overflows widens into the 128-bit domain and
/// stays there (see the arithmetic handlers in `carbn_vm`).
///
/// Strings are opaque byte sequences, UTF-8 by convention. Bytecode
/// string immediates and stdin lines round-trip byte-for-byte; nothing
/// is ever re-encoded.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Signed 64-bit integer.
    Int(i64),
    /// Signed 128-bit integer, produced by overflow widening.
    BigInt(i128),
    /// IEEE-754 double.
    Float(f64),
    /// Heap-owned byte string.
    Str(Vec<u8>),
    /// Boolean.
    Bool(bool),
    /// Heap-owned sequence. Fixed length at allocation; elements are owned.
    Array(Vec<Value>),
    /// The null value.
    Null,
}

impl Value {
    /// Narrow a 128-bit result back into `Int` when it fits, else `BigInt`.
    ///
    /// This is the overflow-widening rule: 64-bit operands are computed in
    /// 128-bit precision and only stay wide when they have to.
    #[inline]
    #[must_use]
    pub fn narrowed(v: i128) -> Self {
        if let Ok(small) = i64::try_from(v) {
            Value::Int(small)
        } else {
            Value::BigInt(v)
        }
    }

    /// Human-readable type name, used in error messages.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "integer",
            Value::BigInt(_) => "big_integer",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::Bool(_) => "boolean",
            Value::Array(_) => "array",
            Value::Null => "null",
        }
    }

    /// Truthiness projection: nonzero numbers, non-empty strings and
    /// arrays, and `true` are truthy; null is falsy.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Int(v) => *v != 0,
            Value::BigInt(v) => *v != 0,
            Value::Float(v) => *v != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::Bool(b) => *b,
            Value::Array(items) => !items.is_empty(),
            Value::Null => false,
        }
    }

    /// Check for null.
    #[inline]
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Check for any of the three numeric types.
    #[inline]
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Int(_) | Value::BigInt(_) | Value::Float(_))
    }

    /// Get the integer payload, if this is an `Int`.
    #[inline]
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Get the float payload, if this is a `Float`.
    #[inline]
    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Get the boolean payload, if this is a `Bool`.
    #[inline]
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get the string payload, if this is a `Str`.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Get the elements, if this is an `Array`.
    #[inline]
    #[must_use]
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Render into `out`, as PRINT emits it and as concatenation builds
    /// its result. String payloads pass through untouched; integers
    /// render in base 10, floats with the shortest decimal form that
    /// round-trips (no forced exponent), booleans as `true`/`false`,
    /// arrays as `[a, b, c]` with elements rendered recursively, and
    /// null as `null`.
    pub fn render_bytes(&self, out: &mut Vec<u8>) {
        match self {
            Value::Int(v) => out.extend_from_slice(v.to_string().as_bytes()),
            Value::BigInt(v) => out.extend_from_slice(v.to_string().as_bytes()),
            Value::Float(v) => out.extend_from_slice(v.to_string().as_bytes()),
            Value::Str(s) => out.extend_from_slice(s),
            Value::Bool(b) => out.extend_from_slice(if *b { b"true" as &[u8] } else { b"false" }),
            Value::Array(items) => {
                out.push(b'[');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.extend_from_slice(b", ");
                    }
                    item.render_bytes(out);
                }
                out.push(b']');
            }
            Value::Null => out.extend_from_slice(b"null"),
        }
    }

    /// Rendered bytes in a fresh buffer.
    #[must_use]
    pub fn render(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.render_bytes(&mut out);
        out
    }
}

/// Lossy text view of [`Value::render_bytes`], for error messages and
/// debugging. PRINT and concatenation go through `render_bytes` so that
/// non-UTF-8 string payloads survive unchanged; this impl substitutes
/// replacement characters instead.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.render()))
    }
}
