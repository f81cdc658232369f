// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use std::{
    borrow::Cow,
    fmt,
    path::Path,
    sync::{Arc, Mutex, MutexGuard},
};

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

use crate::{InMemStore, IntoKey, KeyValStore, SledDb, WriteBatch};

/// Handle to a key value backend, pointed at one key.
/// DataStore is scopable and cheap to clone; every clone shares the same backend.
#[derive(Clone)]
pub struct DataStore {
    scope: Vec<u8>,
    store: Arc<Mutex<dyn KeyValStore>>,
}

impl fmt::Debug for DataStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataStore")
            .field("scope", &self.get_scope())
            .finish()
    }
}

impl DataStore {
    pub fn new(store: impl KeyValStore + 'static) -> Self {
        Self {
            scope: vec![],
            store: Arc::new(Mutex::new(store)),
        }
    }

    /// A store that lives only as long as the process.
    pub fn in_mem() -> Self {
        Self::new(InMemStore::new())
    }

    /// A store persisted to a sled database at `path`.
    pub fn sled(path: impl AsRef<Path>, tree: &str) -> Result<Self> {
        Ok(Self::new(SledDb::new(path, tree)?))
    }

    fn lock(&self) -> Result<MutexGuard<'_, dyn KeyValStore + 'static>> {
        self.store
            .lock()
            .map_err(|_| anyhow!("data store lock poisoned"))
    }

    /// Read data at the scope location
    pub fn read<T>(&self) -> Result<Option<T>>
    where
        T: for<'de> Deserialize<'de>,
    {
        let Some(bytes) = self.lock()?.fetch(&self.scope)? else {
            return Ok(None);
        };

        let value = bincode::deserialize(&bytes)
            .with_context(|| format!("Could not deserialize value at {}", self.get_scope()))?;
        Ok(Some(value))
    }

    /// Writes data to the scope location
    pub fn write<T: Serialize>(&self, value: T) -> Result<()> {
        let serialized = self.serialize(value)?;
        self.lock()?.put(&self.scope, serialized)
    }

    /// Queue a write to the scope location onto `batch`. Nothing is stored until the batch is
    /// committed.
    pub fn stage<T: Serialize>(&self, batch: &mut WriteBatch, value: T) -> Result<()> {
        let serialized = self.serialize(value)?;
        batch.put(self.scope.clone(), serialized);
        Ok(())
    }

    /// Apply a staged batch atomically. Keys in the batch are absolute.
    pub fn commit(&self, batch: WriteBatch) -> Result<()> {
        if batch.is_empty() {
            return Ok(());
        }
        self.lock()?.apply(batch)
    }

    /// Removes data from the scope location
    pub fn clear(&self) -> Result<()> {
        self.lock()?.delete(&self.scope)
    }

    /// Get the scope as a string
    pub fn get_scope(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.scope)
    }

    /// Changes the scope for the data store.
    /// Note that if the scope does not start with a slash one is appended.
    /// ```
    /// use arena_data::DataStore;
    ///
    /// let store = DataStore::in_mem();
    /// assert_eq!(store.base("//foo")
    ///   .scope("bar")
    ///   .scope("/baz")
    ///   .get_scope(), "//foo/bar/baz");
    /// ```
    pub fn scope<K: IntoKey>(&self, key: K) -> Self {
        let mut scope = self.scope.clone();
        let encoded_key = key.into_key();
        if !encoded_key.starts_with(b"/") {
            scope.push(b'/');
        }
        scope.extend(encoded_key);
        Self {
            scope,
            store: self.store.clone(),
        }
    }

    /// Same backend, scope replaced by `key`.
    pub fn base<K: IntoKey>(&self, key: K) -> Self {
        Self {
            scope: key.into_key(),
            store: self.store.clone(),
        }
    }

    fn serialize<T: Serialize>(&self, value: T) -> Result<Vec<u8>> {
        bincode::serialize(&value)
            .with_context(|| format!("Could not serialize value passed to {}", self.get_scope()))
    }
}
