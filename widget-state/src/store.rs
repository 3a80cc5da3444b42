use fnv::FnvHashMap;
use std::any::Any;

/// Type-erased value held in a session store.
pub type StateValue = Box<dyn Any>;

/// A session-scoped key-value store, owned by the host application.
///
/// Errors returned by implementations are passed through to callers unchanged.
pub trait SessionStore {
    /// Returns the value stored under `key`, if any.
    fn get(&self, key: &str) -> anyhow::Result<Option<&dyn Any>>;

    /// Inserts or replaces the value stored under `key`.
    fn set(&mut self, key: &str, value: StateValue) -> anyhow::Result<()>;

    /// Returns whether a value is stored under `key`.
    fn contains(&self, key: &str) -> anyhow::Result<bool> {
        Ok(self.get(key)?.is_some())
    }

    /// Removes and returns the value stored under `key`.
    fn take(&mut self, key: &str) -> anyhow::Result<Option<StateValue>>;

    /// Returns all keys currently in the store, in no particular order.
    fn keys(&self) -> anyhow::Result<Vec<String>>;

    /// Re-writes the value stored under `key` so that the host considers it live during the
    /// current pass. Does nothing if the key is absent.
    ///
    /// Returns whether the key was present.
    fn retain(&mut self, key: &str) -> anyhow::Result<bool> {
        match self.take(key)? {
            Some(value) => {
                self.set(key, value)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// In-memory session store.
#[derive(Default)]
pub struct MemoryStore {
    entries: FnvHashMap<String, StateValue>,
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear()
    }
}

impl SessionStore for MemoryStore {
    fn get(&self, key: &str) -> anyhow::Result<Option<&dyn Any>> {
        Ok(self.entries.get(key).map(|value| &**value))
    }

    fn set(&mut self, key: &str, value: StateValue) -> anyhow::Result<()> {
        self.entries.insert(key.to_owned(), value);
        Ok(())
    }

    fn contains(&self, key: &str) -> anyhow::Result<bool> {
        Ok(self.entries.contains_key(key))
    }

    fn take(&mut self, key: &str) -> anyhow::Result<Option<StateValue>> {
        Ok(self.entries.remove(key))
    }

    fn keys(&self) -> anyhow::Result<Vec<String>> {
        Ok(self.entries.keys().cloned().collect())
    }

    fn retain(&mut self, key: &str) -> anyhow::Result<bool> {
        Ok(self.entries.contains_key(key))
    }
}
