// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use core::fmt;

use alloy::primitives::{Address, Signature, B256, U256};
use alloy::sol;
use alloy::sol_types::{Eip712Domain, SolStruct};
use arena_events::ArenaError;
use arena_utils::short_hex;

pub const AUTHORIZATION_DOMAIN_NAME: &str = "Decryption";
pub const AUTHORIZATION_DOMAIN_VERSION: &str = "1";

sol! {
    #[derive(Debug, PartialEq, Eq)]
    struct UserDecryptRequest {
        address user;
        address contractAddress;
        uint256 startTimestamp;
        uint256 durationSeconds;
        bytes32 nonce;
    }
}

pub fn authorization_domain(chain_id: u64, verifying_contract: Address) -> Eip712Domain {
    Eip712Domain::new(
        Some(AUTHORIZATION_DOMAIN_NAME.into()),
        Some(AUTHORIZATION_DOMAIN_VERSION.into()),
        Some(U256::from(chain_id)),
        Some(verifying_contract),
        None,
    )
}

impl UserDecryptRequest {
    pub fn build(
        user: Address,
        contract: Address,
        start_timestamp: u64,
        duration_seconds: u64,
        nonce: B256,
    ) -> Self {
        Self {
            user,
            contractAddress: contract,
            startTimestamp: U256::from(start_timestamp),
            durationSeconds: U256::from(duration_seconds),
            nonce,
        }
    }

    pub fn signing_hash(&self, domain: &Eip712Domain) -> B256 {
        self.eip712_signing_hash(domain)
    }
}

/// A signed, time boxed permission for `user` to decrypt handles granted to `(contract, user)`.
///
/// Held in memory only; it is never serialized.
#[derive(Clone, PartialEq, Eq)]
pub struct DecryptionAuthorization {
    request: UserDecryptRequest,
    signature: Signature,
}

impl DecryptionAuthorization {
    pub fn new(request: UserDecryptRequest, signature: Signature) -> Self {
        Self { request, signature }
    }

    pub fn request(&self) -> &UserDecryptRequest {
        &self.request
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn user(&self) -> Address {
        self.request.user
    }

    pub fn contract(&self) -> Address {
        self.request.contractAddress
    }

    pub fn start_timestamp(&self) -> u64 {
        u64::try_from(self.request.startTimestamp).unwrap_or(u64::MAX)
    }

    pub fn expires_at(&self) -> u64 {
        let end = self
            .request
            .startTimestamp
            .saturating_add(self.request.durationSeconds);
        u64::try_from(end).unwrap_or(u64::MAX)
    }

    pub fn is_valid_at(&self, now: u64) -> bool {
        self.start_timestamp() <= now && now < self.expires_at()
    }

    pub fn recover_signer(&self, domain: &Eip712Domain) -> Result<Address, ArenaError> {
        let hash = self.request.signing_hash(domain);
        self.signature
            .recover_address_from_prehash(&hash)
            .map_err(|e| ArenaError::AuthorizationDenied(format!("unrecoverable signature: {e}")))
    }

    /// Check the signature and the validity window against `now`.
    pub fn verify(&self, domain: &Eip712Domain, now: u64) -> Result<(), ArenaError> {
        if !self.is_valid_at(now) {
            return Err(ArenaError::AuthorizationDenied(format!(
                "authorization expired at {}",
                self.expires_at()
            )));
        }
        let signer = self.recover_signer(domain)?;
        if signer != self.user() {
            return Err(ArenaError::AuthorizationDenied(format!(
                "signed by {} instead of {}",
                signer,
                self.user()
            )));
        }
        Ok(())
    }
}

impl fmt::Debug for DecryptionAuthorization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecryptionAuthorization")
            .field("user", &self.user())
            .field("contract", &self.contract())
            .field("start", &self.start_timestamp())
            .field("expires_at", &self.expires_at())
            .field("signature", &short_hex(&self.signature.as_bytes()))
            .finish()
    }
}
