// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use anyhow::Result;

use crate::WriteBatch;

/// A byte oriented key value backend. Keys are absolute.
pub trait KeyValStore: Send {
    fn put(&mut self, key: &[u8], value: Vec<u8>) -> Result<()>;
    /// Apply every write in `batch` atomically.
    fn apply(&mut self, batch: WriteBatch) -> Result<()>;
    fn delete(&mut self, key: &[u8]) -> Result<()>;
    fn fetch(&self, key: &[u8]) -> Result<Option<Vec<u8>>>;
}
