// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy_primitives::Address;

/// Top level DataStore scopes.
pub struct StoreKeys;

impl StoreKeys {
    /// Ciphertexts, access grants, spent proofs and key material of the local coprocessor.
    pub fn coprocessor() -> String {
        String::from("//coprocessor")
    }

    pub fn ledger(contract: &Address) -> String {
        format!("//ledger/{contract:x}")
    }
}
