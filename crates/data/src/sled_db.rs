// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use sled::{Batch, Db, Tree};
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::Mutex,
};
use tracing::info;

use crate::{KeyValStore, WriteBatch};

// sled refuses to open the same file twice in one process, so handles are shared per path.
static OPEN_DBS: Lazy<Mutex<HashMap<PathBuf, Db>>> = Lazy::new(|| Mutex::new(HashMap::new()));

fn cache_key(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

fn open_tree(path: &Path, tree: &str) -> Result<Tree> {
    std::fs::create_dir_all(path)
        .with_context(|| format!("Could not create directory '{}'", path.display()))?;
    let mut dbs = OPEN_DBS
        .lock()
        .map_err(|_| anyhow!("sled handle cache poisoned"))?;
    let db = match dbs.get(&cache_key(path)) {
        Some(db) => db.clone(),
        None => {
            let db = sled::open(path)
                .with_context(|| format!("Could not open database at '{}'", path.display()))?;
            if db.was_recovered() {
                info!(path = %path.display(), "recovered db");
            } else {
                info!(path = %path.display(), "created db");
            }
            dbs.insert(cache_key(path), db.clone());
            db
        }
    };
    db.open_tree(tree)
        .with_context(|| format!("Could not open tree '{tree}'"))
}

/// One named tree of a sled database on disk.
pub struct SledDb {
    tree: Tree,
}

impl SledDb {
    pub fn new(path: impl AsRef<Path>, tree: &str) -> Result<Self> {
        Ok(Self {
            tree: open_tree(path.as_ref(), tree)?,
        })
    }

    /// Drop every shared handle so the files can be reopened or removed.
    pub fn close_all_connections() {
        if let Ok(mut dbs) = OPEN_DBS.lock() {
            dbs.clear();
        }
    }

    pub fn flush(&self) -> Result<()> {
        self.tree.flush().context("Could not flush db")?;
        Ok(())
    }
}

impl KeyValStore for SledDb {
    fn put(&mut self, key: &[u8], value: Vec<u8>) -> Result<()> {
        self.tree
            .insert(key, value)
            .context("Could not insert data into db")?;
        Ok(())
    }

    fn apply(&mut self, batch: WriteBatch) -> Result<()> {
        let mut sled_batch = Batch::default();
        for (key, value) in batch.writes() {
            sled_batch.insert(key, value);
        }
        self.tree
            .apply_batch(sled_batch)
            .context("Could not apply batch to db")?;
        Ok(())
    }

    fn delete(&mut self, key: &[u8]) -> Result<()> {
        self.tree
            .remove(key)
            .context("Could not remove data from db")?;
        Ok(())
    }

    fn fetch(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let value = self
            .tree
            .get(key)
            .with_context(|| format!("Failed to fetch {}", String::from_utf8_lossy(key)))?;
        Ok(value.map(|v| v.to_vec()))
    }
}
