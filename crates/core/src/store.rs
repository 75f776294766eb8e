//! Environment stores the validator reads from and writes coercions to.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};

use serde::{Deserialize, Serialize};

use crate::value::EnvValue;

/// Key/value store holding configuration values.
///
/// `get` returns the most recently `set` value for a key, falling back to
/// whatever the backing source holds, or [`EnvValue::Absent`].
pub trait EnvironmentStore {
    fn get(&self, key: &str) -> EnvValue;

    fn set(&mut self, key: &str, value: EnvValue);
}

/// In-memory store, for embedding and tests.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemoryStore {
    values: HashMap<String, EnvValue>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<EnvValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<EnvValue>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<EnvValue> {
        self.values.remove(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl EnvironmentStore for MemoryStore {
    fn get(&self, key: &str) -> EnvValue {
        self.values.get(key).cloned().unwrap_or_default()
    }

    fn set(&mut self, key: &str, value: EnvValue) {
        self.values.insert(key.to_string(), value);
    }
}

impl<K, V> FromIterator<(K, V)> for MemoryStore
where
    K: Into<String>,
    V: Into<EnvValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut store = Self::new();
        for (key, value) in iter {
            store.insert(key, value);
        }
        store
    }
}

/// The process environment, with a typed cache in front of it.
///
/// Reads prefer the cache, then the raw process variable. Writes land in
/// the cache and are mirrored to the process environment in textual form,
/// so child processes and plain `std::env::var` readers see `"8080"` while
/// cache readers see `Int(8080)`.
#[derive(Debug, Default)]
pub struct ProcessEnv {
    cache: HashMap<String, EnvValue>,
}

static SHARED: OnceLock<Mutex<ProcessEnv>> = OnceLock::new();

impl ProcessEnv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock the process-wide instance.
    ///
    /// A poisoned lock is recovered rather than propagated.
    pub fn shared() -> MutexGuard<'static, ProcessEnv> {
        SHARED
            .get_or_init(|| Mutex::new(ProcessEnv::new()))
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Typed value previously written for `key`, if any.
    pub fn cached(&self, key: &str) -> Option<&EnvValue> {
        self.cache.get(key)
    }

    /// Drop the cached value so the next read goes to the process environment.
    pub fn forget(&mut self, key: &str) -> Option<EnvValue> {
        self.cache.remove(key)
    }
}

impl EnvironmentStore for ProcessEnv {
    fn get(&self, key: &str) -> EnvValue {
        if let Some(value) = self.cache.get(key) {
            return value.clone();
        }
        std::env::var_os(key)
            .map(|raw| EnvValue::Str(raw.to_string_lossy().into_owned()))
            .unwrap_or_default()
    }

    fn set(&mut self, key: &str, value: EnvValue) {
        if value.is_absent() {
            self.cache.remove(key);
            std::env::remove_var(key);
            return;
        }
        std::env::set_var(key, value.to_string());
        self.cache.insert(key.to_string(), value);
    }
}
