//! Shared, mutable metadata attached to structured errors.
//!
//! # Sharing Semantics
//!
//! `Metadata` is a *handle*, not a value. Cloning it (directly, or by cloning
//! the `StructuredError` or `Namespace` that holds it) yields a second handle
//! to the **same** map. This is what lets every error minted from one
//! namespace carry "exactly" the namespace's default metadata:
//!
//! ```rust
//! use stack_errors::{Metadata, create_namespace_error};
//!
//! let lib = create_namespace_error("LIB", Metadata::from([("package", "demo")]));
//! let first = lib.error(1, "first");
//! let second = lib.error(2, "second");
//!
//! // Mutation through one error is visible through every other holder.
//! first.metadata().insert("request", "r-42");
//! assert_eq!(second.metadata().get("request"), Some("r-42".into()));
//! assert!(first.metadata().shares_with(second.metadata()));
//! ```
//!
//! Callers who want an independent copy call [`Metadata::detach`] (or pass a
//! fresh `Metadata` per factory call).
//!
//! # Concurrency
//!
//! The map lives behind an `RwLock` so handles are `Send + Sync`. A poisoned
//! lock is recovered rather than propagated: metadata is diagnostic data and
//! a panic elsewhere must not make an error unreadable.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Plain map type behind a [`Metadata`] handle.
pub type MetadataMap = Map<String, Value>;

/// Shared handle to a string-keyed map of arbitrary JSON values.
///
/// Equality compares contents, never identity. Use [`Metadata::shares_with`]
/// to ask whether two handles point at the same map.
#[derive(Clone, Default)]
pub struct Metadata {
    inner: Arc<RwLock<MetadataMap>>,
}

impl Metadata {
    /// Create an empty metadata map.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    fn read(&self) -> RwLockReadGuard<'_, MetadataMap> {
        match self.inner.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    #[inline]
    fn write(&self) -> RwLockWriteGuard<'_, MetadataMap> {
        match self.inner.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Insert a value, returning the previous one for that key.
    ///
    /// Visible through every handle sharing this map.
    pub fn insert(&self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.write().insert(key.into(), value.into())
    }

    /// Get a copy of the value stored under `key`.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.read().get(key).cloned()
    }

    /// Remove and return the value stored under `key`.
    pub fn remove(&self, key: &str) -> Option<Value> {
        self.write().remove(key)
    }

    /// Check whether `key` is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.read().contains_key(key)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Check if the map has no entries.
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Deep copy of the current contents.
    pub fn snapshot(&self) -> MetadataMap {
        self.read().clone()
    }

    /// New handle owning a private deep copy of the current contents.
    ///
    /// Mutations through the returned handle are not visible to this one.
    pub fn detach(&self) -> Self {
        Self::from(self.snapshot())
    }

    /// Swap the whole map for `map`, returning the previous contents.
    pub fn replace(&self, map: MetadataMap) -> MetadataMap {
        std::mem::replace(&mut *self.write(), map)
    }

    /// Check whether both handles point at the same map.
    #[inline]
    pub fn shares_with(&self, other: &Metadata) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Borrow the map for the duration of `f` without copying it.
    pub fn with_map<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&MetadataMap) -> R,
    {
        let guard = self.read();
        f(&guard)
    }
}

impl PartialEq for Metadata {
    fn eq(&self, other: &Self) -> bool {
        // Same map: skip taking the lock twice.
        if self.shares_with(other) {
            return true;
        }
        // Never hold both locks at once: (a, b) and (b, a) could deadlock.
        let lhs = self.snapshot();
        lhs == *other.read()
    }
}

impl fmt::Debug for Metadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Metadata").field(&*self.read()).finish()
    }
}

impl From<MetadataMap> for Metadata {
    fn from(map: MetadataMap) -> Self {
        Self {
            inner: Arc::new(RwLock::new(map)),
        }
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for Metadata
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from(entries: [(K, V); N]) -> Self {
        entries.into_iter().collect()
    }
}

impl<K, V> FromIterator<(K, V)> for Metadata
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let map = iter
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect::<MetadataMap>();
        Self::from(map)
    }
}

impl Serialize for Metadata {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.read().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Metadata {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        MetadataMap::deserialize(deserializer).map(Self::from)
    }
}
