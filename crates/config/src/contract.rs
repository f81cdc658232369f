// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

/// A deployed ledger contract, either as a bare address or with the block it was deployed at.
#[derive(Debug, Clone, Copy, Hash, Eq, Deserialize, Serialize, PartialEq)]
#[serde(untagged)]
pub enum Contract {
    Full {
        address: Address,
        deploy_block: Option<u64>,
    },
    AddressOnly(Address),
}

impl Contract {
    pub fn address(&self) -> Address {
        use Contract::*;
        match self {
            Full { address, .. } => *address,
            AddressOnly(v) => *v,
        }
    }

    pub fn deploy_block(&self) -> Option<u64> {
        use Contract::*;
        match self {
            Full { deploy_block, .. } => *deploy_block,
            AddressOnly(_) => None,
        }
    }
}
