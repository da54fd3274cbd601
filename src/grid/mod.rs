//! Cache collaborator interface.
//!
//! The protocol core never owns storage; it talks to the grid's cache through
//! the narrow [`Cache`] trait. [`InMemoryCache`] is a self-contained
//! implementation used by tests and demos.

use crate::protocol::value::Value;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

/// Future type alias for dyn-compatible cache operations.
pub type CacheFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Cache abstraction consumed by operation handlers.
///
/// Implementations must be safe for concurrent use; the protocol core issues
/// at most one outstanding call per connection at a time.
pub trait Cache: Send + Sync {
    /// Whether the named region exists.
    fn region_exists(&self, region: &str) -> CacheFuture<'_, bool>;

    /// Look up a value by `(region, key)`.
    fn get(&self, region: &str, key: &Value) -> CacheFuture<'_, Option<Value>>;

    /// Store a value. Returns `false` when the region does not exist; no
    /// partial mutation happens in that case.
    fn put(&self, region: &str, key: Value, value: Value) -> CacheFuture<'_, bool>;

    /// Remove a key. Returns `None` when the region does not exist,
    /// otherwise whether the key was present.
    fn remove(&self, region: &str, key: &Value) -> CacheFuture<'_, Option<bool>>;
}

/// In-memory cache keyed by region name.
#[derive(Default)]
pub struct InMemoryCache {
    regions: RwLock<HashMap<String, HashMap<Value, Value>>>,
}

impl InMemoryCache {
    /// Create an empty cache with no regions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a region if it does not already exist.
    pub fn create_region(&self, name: impl Into<String>) {
        self.regions.write().entry(name.into()).or_default();
    }
}

impl Cache for InMemoryCache {
    fn region_exists(&self, region: &str) -> CacheFuture<'_, bool> {
        let region = region.to_string();
        Box::pin(async move { self.regions.read().contains_key(&region) })
    }

    fn get(&self, region: &str, key: &Value) -> CacheFuture<'_, Option<Value>> {
        let region = region.to_string();
        let key = key.clone();
        Box::pin(async move {
            self.regions
                .read()
                .get(&region)
                .and_then(|entries| entries.get(&key).cloned())
        })
    }

    fn put(&self, region: &str, key: Value, value: Value) -> CacheFuture<'_, bool> {
        let region = region.to_string();
        Box::pin(async move {
            match self.regions.write().get_mut(&region) {
                Some(entries) => {
                    entries.insert(key, value);
                    true
                }
                None => false,
            }
        })
    }

    fn remove(&self, region: &str, key: &Value) -> CacheFuture<'_, Option<bool>> {
        let region = region.to_string();
        let key = key.clone();
        Box::pin(async move {
            self.regions
                .write()
                .get_mut(&region)
                .map(|entries| entries.remove(&key).is_some())
        })
    }
}
