// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use std::collections::HashMap;

use alloy::primitives::Address;
use arena_coprocessor::DecryptionAuthorization;

/// Where a `(contract, user)` pair stands in obtaining a decryption authorization.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthorizationState {
    Unauthorized,
    /// A signature prompt is outstanding.
    Authorizing,
    Authorized {
        expires_at: u64,
    },
    Expired,
    Revoked,
}

pub type AuthorizationKey = (Address, Address);

pub fn authorization_key(contract: Address, user: Address) -> AuthorizationKey {
    (contract, user)
}

pub enum CacheLookup {
    Valid(DecryptionAuthorization),
    /// There was an entry but it is no longer valid. It has been evicted.
    Expired(DecryptionAuthorization),
    Missing,
}

/// Signed authorizations held in memory, one per `(contract, user)`.
#[derive(Default)]
pub struct AuthorizationCache {
    entries: HashMap<AuthorizationKey, DecryptionAuthorization>,
    states: HashMap<AuthorizationKey, AuthorizationState>,
}

impl AuthorizationCache {
    pub fn lookup(&mut self, key: AuthorizationKey, now: u64) -> CacheLookup {
        let Some(auth) = self.entries.get(&key).cloned() else {
            return CacheLookup::Missing;
        };
        if auth.is_valid_at(now) {
            return CacheLookup::Valid(auth);
        }
        self.entries.remove(&key);
        self.states.insert(key, AuthorizationState::Expired);
        CacheLookup::Expired(auth)
    }

    pub fn insert(&mut self, auth: DecryptionAuthorization) {
        let key = authorization_key(auth.contract(), auth.user());
        self.states.insert(
            key,
            AuthorizationState::Authorized {
                expires_at: auth.expires_at(),
            },
        );
        self.entries.insert(key, auth);
    }

    /// Drop the entry, leaving the pair in `state`.
    pub fn evict(&mut self, key: AuthorizationKey, state: AuthorizationState) -> bool {
        self.states.insert(key, state);
        self.entries.remove(&key).is_some()
    }

    pub fn set_state(&mut self, key: AuthorizationKey, state: AuthorizationState) {
        self.states.insert(key, state);
    }

    /// Read only. An expired entry is reported as `Expired` but stays cached until `lookup`
    /// evicts it.
    pub fn state(&self, key: AuthorizationKey, now: u64) -> AuthorizationState {
        match self.entries.get(&key) {
            Some(auth) if auth.is_valid_at(now) => AuthorizationState::Authorized {
                expires_at: auth.expires_at(),
            },
            Some(_) => AuthorizationState::Expired,
            None => self
                .states
                .get(&key)
                .copied()
                .unwrap_or(AuthorizationState::Unauthorized),
        }
    }
}
