//! Global variable scope.
//!
//! Module-level bindings live in an FxHashMap for minimal hashing
//! overhead on small identifier keys. Keys are owned independently of
//! the code stream; rebinding a name drops the prior value.

use carbn_core::Value;
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// Global scope containing top-level bindings.
#[derive(Debug, Default)]
pub struct GlobalScope {
    bindings: FxHashMap<Arc<str>, Value>,
}

impl GlobalScope {
    /// Create a new empty global scope.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            bindings: FxHashMap::default(),
        }
    }

    /// Create with pre-allocated capacity.
    #[inline]
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bindings: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
        }
    }

    /// Look up a binding.
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.bindings.get(name)
    }

    /// Bind a name, dropping any prior value bound to it.
    #[inline]
    pub fn insert(&mut self, name: Arc<str>, value: Value) {
        self.bindings.insert(name, value);
    }

    /// Remove a binding, returning the old value if present.
    #[inline]
    pub fn delete(&mut self, name: &str) -> Option<Value> {
        self.bindings.remove(name)
    }

    /// Check if a name is bound.
    #[inline]
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    /// Number of bindings.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Check if empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Iterate over all bindings.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (&Arc<str>, &Value)> {
        self.bindings.iter()
    }

    /// Drop every binding.
    pub fn clear(&mut self) {
        self.bindings.clear();
    }
}
