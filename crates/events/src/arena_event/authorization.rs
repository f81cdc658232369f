// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

/// A user signed a decryption authorization for a contract.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AuthorizationGranted {
    pub user: Address,
    pub contract: Address,
    pub expires_at: u64,
}

impl Display for AuthorizationGranted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "user: {}, contract: {}, expires_at: {}",
            self.user, self.contract, self.expires_at
        )
    }
}

/// A cached authorization stopped being usable.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AuthorizationRevoked {
    pub user: Address,
    pub contract: Address,
    /// True when the authorization ran out rather than being dropped explicitly.
    pub expired: bool,
}

impl Display for AuthorizationRevoked {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "user: {}, contract: {}, expired: {}",
            self.user, self.contract, self.expired
        )
    }
}
