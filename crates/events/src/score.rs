// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy_primitives::{Address, B256};
use serde::{Deserialize, Serialize};

use crate::CiphertextHandle;

/// One confirmed submission. Created once, never mutated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub handle: CiphertextHandle,
    pub index: u64,
}

/// What the ledger hands back for an accepted `submitScore` call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionReceipt {
    pub transaction_hash: B256,
    pub user: Address,
    pub entry: ScoreEntry,
}
