// stepflow/src/core/context.rs

//! The per-invocation runtime context: typed capabilities shared by every stage.
//!
//! Values are keyed by their Rust type, so a step asks for exactly the capability it
//! needs (`ctx.require::<dyn GitHubApi>()`) instead of reading an untyped bag of
//! globals. Clones of a `RuntimeContext` share the same storage.
//!
//! Lock guards never escape this module; accessors hand out `Arc` clones, so no
//! lock is ever held across an `.await` in step code.

use parking_lot::RwLock;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// Identity of a capability type, used by steps to declare what they read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CapabilityKey {
  type_id: TypeId,
  type_name: &'static str,
}

impl CapabilityKey {
  pub fn of<T: ?Sized + 'static>() -> Self {
    Self {
      type_id: TypeId::of::<T>(),
      type_name: std::any::type_name::<T>(),
    }
  }

  pub fn type_name(&self) -> &'static str {
    self.type_name
  }
}

impl fmt::Display for CapabilityKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.type_name)
  }
}

/// Returned by [`RuntimeContext::require`] when the capability was never inserted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("capability '{capability}' is not present in the runtime context")]
pub struct MissingCapability {
  pub capability: &'static str,
}

struct Entry {
  type_name: &'static str,
  // Always an `Arc<T>` for the `T` whose TypeId keys this entry.
  value: Box<dyn Any + Send + Sync>,
}

/// Capability container handed to every step of an invocation.
#[derive(Clone)]
pub struct RuntimeContext {
  entries: Arc<RwLock<HashMap<TypeId, Entry>>>,
  trace_id: Uuid,
}

impl RuntimeContext {
  pub fn new() -> Self {
    Self {
      entries: Arc::new(RwLock::new(HashMap::new())),
      trace_id: Uuid::new_v4(),
    }
  }

  /// Correlation id for logs emitted during this invocation.
  pub fn trace_id(&self) -> Uuid {
    self.trace_id
  }

  /// Stores `value`, replacing any previous value of the same type.
  pub fn insert<T: Send + Sync + 'static>(&self, value: T) {
    self.insert_arc(Arc::new(value));
  }

  /// Stores an already shared value. Works for trait objects:
  /// `ctx.insert_arc::<dyn GitHubApi>(client)`.
  pub fn insert_arc<T: ?Sized + Send + Sync + 'static>(&self, value: Arc<T>) {
    let entry = Entry {
      type_name: std::any::type_name::<T>(),
      value: Box::new(value),
    };
    self.entries.write().insert(TypeId::of::<T>(), entry);
  }

  /// Builder-style [`insert`](Self::insert).
  pub fn with<T: Send + Sync + 'static>(self, value: T) -> Self {
    self.insert(value);
    self
  }

  pub fn with_arc<T: ?Sized + Send + Sync + 'static>(self, value: Arc<T>) -> Self {
    self.insert_arc(value);
    self
  }

  pub fn get<T: ?Sized + Send + Sync + 'static>(&self) -> Option<Arc<T>> {
    let guard = self.entries.read();
    guard
      .get(&TypeId::of::<T>())
      .and_then(|entry| entry.value.downcast_ref::<Arc<T>>())
      .cloned()
  }

  pub fn require<T: ?Sized + Send + Sync + 'static>(&self) -> Result<Arc<T>, MissingCapability> {
    self.get::<T>().ok_or(MissingCapability {
      capability: std::any::type_name::<T>(),
    })
  }

  pub fn contains<T: ?Sized + 'static>(&self) -> bool {
    self.has(&CapabilityKey::of::<T>())
  }

  pub fn has(&self, key: &CapabilityKey) -> bool {
    self.entries.read().contains_key(&key.type_id)
  }

  /// Type names of every capability currently stored, sorted.
  pub fn capability_names(&self) -> Vec<&'static str> {
    let mut names: Vec<&'static str> = self.entries.read().values().map(|e| e.type_name).collect();
    names.sort_unstable();
    names
  }
}

impl Default for RuntimeContext {
  fn default() -> Self {
    Self::new()
  }
}

impl fmt::Debug for RuntimeContext {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("RuntimeContext")
      .field("trace_id", &self.trace_id)
      .field("capabilities", &self.capability_names())
      .finish()
  }
}
