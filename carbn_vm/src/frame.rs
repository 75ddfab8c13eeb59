//! Call frames and per-frame local bindings.
//!
//! A frame is pushed by CALL and popped by RET. It records where to
//! resume, a snapshot of the operand-stack depth at the call site, and
//! the callee's local variables.
//!
//! # Inline local storage
//!
//! Most functions bind only a handful of names, so `Locals` keeps up to
//! [`INLINE_LOCALS`] entries inline in a small vector and only spills to
//! a hash map past that. The two representations are observationally
//! identical; the inline form trades a short linear scan for zero
//! hashing and zero heap maps in the common case. This mirrors the
//! inline-then-overflow shape used elsewhere in the runtime for small
//! capture sets.

use carbn_core::Value;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::sync::Arc;

/// Bindings kept inline before spilling to a hash map.
pub const INLINE_LOCALS: usize = 8;

/// A call frame representing one function invocation.
#[derive(Debug)]
pub struct Frame {
    /// Byte offset to resume at when RET fires.
    pub return_address: usize,
    /// Operand-stack depth at the call site. Informational; operands are
    /// not rewound on return.
    pub base_pointer: usize,
    /// The callee's local variable bindings.
    pub locals: Locals,
}

impl Frame {
    /// Create a frame for a call made at `return_address` with the given
    /// operand-stack depth.
    #[inline]
    #[must_use]
    pub fn new(return_address: usize, base_pointer: usize) -> Self {
        Self {
            return_address,
            base_pointer,
            locals: Locals::new(),
        }
    }
}

/// Name→value bindings for one frame.
///
/// Keys are owned independently of the code stream. Rebinding a name
/// drops the prior value and reuses the existing key.
#[derive(Debug, Default)]
pub struct Locals {
    repr: Repr,
}

#[derive(Debug)]
enum Repr {
    /// Up to [`INLINE_LOCALS`] bindings, scanned linearly.
    Inline(SmallVec<[(Arc<str>, Value); INLINE_LOCALS]>),
    /// Spilled representation for larger frames.
    Spilled(FxHashMap<Arc<str>, Value>),
}

impl Default for Repr {
    fn default() -> Self {
        Repr::Inline(SmallVec::new())
    }
}

impl Locals {
    /// Create an empty binding set.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a binding.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        match &self.repr {
            Repr::Inline(entries) => entries
                .iter()
                .find(|(key, _)| key.as_ref() == name)
                .map(|(_, value)| value),
            Repr::Spilled(map) => map.get(name),
        }
    }

    /// Bind a name, dropping any prior value bound to it.
    pub fn insert(&mut self, name: Arc<str>, value: Value) {
        match &mut self.repr {
            Repr::Inline(entries) => {
                if let Some(slot) = entries.iter_mut().find(|(key, _)| *key == name) {
                    slot.1 = value;
                    return;
                }
                if entries.len() < INLINE_LOCALS {
                    entries.push((name, value));
                    return;
                }
                // Ninth distinct name: spill everything to a map.
                let mut map = FxHashMap::with_capacity_and_hasher(
                    entries.len() + 1,
                    Default::default(),
                );
                for (key, val) in entries.drain(..) {
                    map.insert(key, val);
                }
                map.insert(name, value);
                self.repr = Repr::Spilled(map);
            }
            Repr::Spilled(map) => {
                map.insert(name, value);
            }
        }
    }

    /// Number of bindings.
    #[must_use]
    pub fn len(&self) -> usize {
        match &self.repr {
            Repr::Inline(entries) => entries.len(),
            Repr::Spilled(map) => map.len(),
        }
    }

    /// Check if no names are bound.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether bindings are still in the inline representation.
    #[inline]
    #[must_use]
    pub fn is_inline(&self) -> bool {
        matches!(self.repr, Repr::Inline(_))
    }
}
