// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

use crate::CiphertextHandle;

/// Emitted by the ledger after an entry has been appended.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScoreSubmitted {
    pub user: Address,
    pub contract: Address,
    pub index: u64,
    pub handle: CiphertextHandle,
}

impl Display for ScoreSubmitted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "user: {}, index: {}, handle: {:?}", self.user, self.index, self.handle)
    }
}
