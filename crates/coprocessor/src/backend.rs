// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use std::collections::HashMap;

use alloy::primitives::Address;
use alloy::sol_types::Eip712Domain;
use arena_events::{
    ArenaError, CiphertextHandle, ClearValue, EncryptedInput, EncryptedType, SubmissionProof,
};
use async_trait::async_trait;

use crate::DecryptionAuthorization;

/// A plaintext to be encrypted for use by `user` in calls to `contract`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncryptionRequest {
    pub value: ClearValue,
    pub encrypted_type: EncryptedType,
    pub contract: Address,
    pub user: Address,
}

#[async_trait]
pub trait EncryptionBackend: Send + Sync {
    /// Encrypt a value and return a fresh handle with its submission proof.
    async fn encrypt(&self, request: EncryptionRequest) -> Result<EncryptedInput, ArenaError>;
}

#[async_trait]
pub trait InputVerifier: Send + Sync {
    /// Check that `proof` binds `handle` to `(contract, user)`. On success the proof is spent.
    async fn verify_input(
        &self,
        handle: &CiphertextHandle,
        proof: &SubmissionProof,
        contract: Address,
        user: Address,
    ) -> Result<(), ArenaError>;

    /// Grant `(contract, user)` access to a verified handle. Called once the submission is
    /// recorded.
    async fn allow(
        &self,
        handle: &CiphertextHandle,
        contract: Address,
        user: Address,
    ) -> Result<(), ArenaError>;
}

#[async_trait]
pub trait DecryptionBackend: Send + Sync {
    /// The EIP-712 domain decryption authorizations must be signed under.
    fn authorization_domain(&self) -> Eip712Domain;

    /// Decrypt a batch of handles on behalf of the authorization's user.
    ///
    /// The whole batch fails if the authorization is expired, badly signed, or if any handle was
    /// not granted to the authorization's `(contract, user)`.
    async fn user_decrypt(
        &self,
        handles: &[CiphertextHandle],
        authorization: &DecryptionAuthorization,
    ) -> Result<HashMap<CiphertextHandle, ClearValue>, ArenaError>;
}
