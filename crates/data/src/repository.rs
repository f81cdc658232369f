// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use std::marker::PhantomData;

use anyhow::Result;
use serde::{de::DeserializeOwned, Serialize};

use crate::DataStore;

/// A DataStore location that only ever holds values of type `T`.
#[derive(Debug)]
pub struct Repository<S> {
    store: DataStore,
    _p: PhantomData<S>,
}

impl<S> Repository<S> {
    pub fn new(store: DataStore) -> Self {
        Self {
            store,
            _p: PhantomData,
        }
    }
}

impl<S> Clone for Repository<S> {
    fn clone(&self) -> Self {
        Self::new(self.store.clone())
    }
}

impl<T> From<Repository<T>> for DataStore {
    fn from(value: Repository<T>) -> Self {
        value.store
    }
}

impl<T> From<&Repository<T>> for DataStore {
    fn from(value: &Repository<T>) -> Self {
        value.store.clone()
    }
}

impl<T> Repository<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn read(&self) -> Result<Option<T>> {
        self.store.read()
    }

    pub fn write(&self, value: &T) -> Result<()> {
        self.store.write(value)
    }

    pub fn clear(&self) -> Result<()> {
        self.store.clear()
    }

    /// Read the stored value or persist and return the result of `f`.
    pub fn load_or_else<F>(&self, f: F) -> Result<T>
    where
        F: FnOnce() -> Result<T>,
    {
        if let Some(value) = self.read()? {
            return Ok(value);
        }
        let value = f()?;
        self.write(&value)?;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_or_else_persists_once() -> Result<()> {
        let repo: Repository<Vec<u8>> = Repository::new(DataStore::in_mem().scope("secret"));
        let first = repo.load_or_else(|| Ok(vec![1, 2, 3]))?;
        let second = repo.load_or_else(|| Ok(vec![9]))?;
        assert_eq!(first, second);
        repo.clear()?;
        assert_eq!(repo.read()?, None);
        Ok(())
    }
}
