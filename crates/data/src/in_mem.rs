// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use anyhow::Result;
use std::collections::BTreeMap;

use crate::{KeyValStore, WriteBatch};

/// Process local backend used by tests and `--in-mem` runs.
#[derive(Debug, Default)]
pub struct InMemStore {
    db: BTreeMap<Vec<u8>, Vec<u8>>,
}

impl InMemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.db.len()
    }

    pub fn is_empty(&self) -> bool {
        self.db.is_empty()
    }
}

impl KeyValStore for InMemStore {
    fn put(&mut self, key: &[u8], value: Vec<u8>) -> Result<()> {
        self.db.insert(key.to_vec(), value);
        Ok(())
    }

    fn apply(&mut self, batch: WriteBatch) -> Result<()> {
        for (key, value) in batch.writes() {
            self.db.insert(key.to_vec(), value.to_vec());
        }
        Ok(())
    }

    fn delete(&mut self, key: &[u8]) -> Result<()> {
        self.db.remove(key);
        Ok(())
    }

    fn fetch(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        Ok(self.db.get(key).cloned())
    }
}
