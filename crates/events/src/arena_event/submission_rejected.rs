// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

use crate::{ArenaErrorType, CiphertextHandle};

/// Emitted by the ledger when a submission was refused. No entry was created.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubmissionRejected {
    pub user: Address,
    pub contract: Address,
    pub handle: CiphertextHandle,
    pub err_type: ArenaErrorType,
    pub reason: String,
}

impl Display for SubmissionRejected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "user: {}, {}: {}", self.user, self.err_type, self.reason)
    }
}
