//! Scoped save/restore over an explicit namespace
//!
//! A [`Sandbox`] lets exploratory code change a [`Namespace`] and have every change
//! discarded when the scope ends. On entry, value bindings are deep-copied and module
//! bindings are kept by reference; on exit, which includes unwinding, the snapshot
//! is put back and bindings introduced inside the scope are deleted.

use serde_json::Value;
use std::collections::BTreeMap;
use std::collections::btree_map;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

/// An imported module, shared by reference
#[derive(Debug, PartialEq, Eq)]
pub struct Module {
    pub name: String,
}

impl Module {
    pub fn new(name: impl Into<String>) -> Arc<Self> {
        Arc::new(Self { name: name.into() })
    }
}

/// A namespace binding
#[derive(Debug, Clone, PartialEq)]
pub enum Binding {
    Value(Value),
    Module(Arc<Module>),
}

impl From<Value> for Binding {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<Arc<Module>> for Binding {
    fn from(module: Arc<Module>) -> Self {
        Self::Module(module)
    }
}

/// Mapping from names to bindings
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Namespace {
    bindings: BTreeMap<String, Binding>,
}

impl Namespace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Binding> {
        self.bindings.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Binding> {
        self.bindings.get_mut(name)
    }

    /// Bind `name`, returning the previous binding
    pub fn set(&mut self, name: impl Into<String>, binding: impl Into<Binding>) -> Option<Binding> {
        self.bindings.insert(name.into(), binding.into())
    }

    pub fn remove(&mut self, name: &str) -> Option<Binding> {
        self.bindings.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Binding> {
        self.bindings.iter()
    }
}

/// Guard that restores a namespace when dropped
pub struct Sandbox<'a> {
    namespace: &'a mut Namespace,
    saved: BTreeMap<String, Binding>,
}

impl<'a> Sandbox<'a> {
    /// Snapshot `namespace` and borrow it for the scope
    pub fn enter(namespace: &'a mut Namespace) -> Self {
        // Values are deep copies, modules share the Arc
        let saved = namespace.bindings.clone();
        tracing::trace!(bindings = namespace.len(), "Entered sandbox");
        Self { namespace, saved }
    }
}

impl Deref for Sandbox<'_> {
    type Target = Namespace;

    fn deref(&self) -> &Namespace {
        self.namespace
    }
}

impl DerefMut for Sandbox<'_> {
    fn deref_mut(&mut self) -> &mut Namespace {
        self.namespace
    }
}

impl Drop for Sandbox<'_> {
    fn drop(&mut self) {
        let saved = std::mem::take(&mut self.saved);
        let introduced = self
            .namespace
            .bindings
            .keys()
            .filter(|name| !saved.contains_key(*name))
            .count();
        tracing::trace!(
            restored = saved.len(),
            deleted = introduced,
            "Leaving sandbox"
        );
        self.namespace.bindings = saved;
    }
}

/// Run `f` against `namespace`, discarding every change it makes
pub fn scoped<R>(namespace: &mut Namespace, f: impl FnOnce(&mut Namespace) -> R) -> R {
    let mut sandbox = Sandbox::enter(namespace);
    f(&mut sandbox)
}
