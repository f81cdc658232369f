// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy::primitives::{Address, Signature};
use alloy::signers::{local::PrivateKeySigner, Signer};
use alloy::sol_types::Eip712Domain;
use anyhow::{anyhow, Result};
use arena_coprocessor::UserDecryptRequest;
use arena_events::ArenaError;
use async_trait::async_trait;

/// An account identity able to sign decryption authorizations.
#[async_trait]
pub trait SigningCapability: Send + Sync {
    fn address(&self) -> Address;

    /// Ask the account holder to sign `request`. Declining is `AuthorizationDenied`.
    async fn sign_authorization(
        &self,
        request: &UserDecryptRequest,
        domain: &Eip712Domain,
    ) -> Result<Signature, ArenaError>;
}

/// A private key held in memory that signs without asking.
#[derive(Clone, Debug)]
pub struct LocalWallet {
    signer: PrivateKeySigner,
}

impl LocalWallet {
    pub fn new(signer: PrivateKeySigner) -> Self {
        Self { signer }
    }

    pub fn address(&self) -> Address {
        self.signer.address()
    }

    pub fn random() -> Self {
        Self::new(PrivateKeySigner::random())
    }

    pub fn from_private_key(key: &str) -> Result<Self> {
        let signer: PrivateKeySigner = key
            .trim()
            .parse()
            .map_err(|e| anyhow!("Invalid private key: {e}"))?;
        Ok(Self::new(signer))
    }
}

#[async_trait]
impl SigningCapability for LocalWallet {
    fn address(&self) -> Address {
        self.signer.address()
    }

    async fn sign_authorization(
        &self,
        request: &UserDecryptRequest,
        domain: &Eip712Domain,
    ) -> Result<Signature, ArenaError> {
        self.signer
            .sign_hash(&request.signing_hash(domain))
            .await
            .map_err(|e| ArenaError::AuthorizationDenied(e.to_string()))
    }
}
