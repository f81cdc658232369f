// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
};

use alloy::primitives::{address, Address, B256};
use alloy::sol_types::Eip712Domain;
use anyhow::Result;
use arena_data::{DataStore, Repository};
use arena_events::{
    ArenaError, CiphertextHandle, ClearValue, EncryptedInput, EncryptedType, SubmissionProof,
};
use arena_fhe::{BfvPreset, Fhe, FheKeys, SharedRng};
use arena_utils::Clock;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
    authorization_domain, check_proof, derive_handle, issue_proof, DecryptionAuthorization,
    DecryptionBackend, EncryptionBackend, EncryptionRequest, InputVerifier,
};

pub const DEFAULT_DECRYPTION_ADDRESS: Address =
    address!("0000000000000000000000000000000000000dec");

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalCoprocessorConfig {
    pub chain_id: u64,
    /// Verifying contract of the authorization EIP-712 domain.
    pub decryption_address: Address,
    pub preset: BfvPreset,
}

impl Default for LocalCoprocessorConfig {
    fn default() -> Self {
        Self {
            chain_id: 31337,
            decryption_address: DEFAULT_DECRYPTION_ADDRESS,
            preset: BfvPreset::default(),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct StoredCiphertext {
    encrypted_type: EncryptedType,
    bytes: Vec<u8>,
}

struct Inner {
    fhe: Fhe,
    keys: FheKeys,
    proof_secret: B256,
    config: LocalCoprocessorConfig,
    store: DataStore,
    clock: Arc<dyn Clock>,
    online: AtomicBool,
    verify_lock: Mutex<()>,
}

/// In-process coprocessor backed by BFV.
///
/// Ciphertexts, access grants, spent proofs and key material live in the given DataStore, so a
/// sled backed instance survives restarts.
#[derive(Clone)]
pub struct LocalCoprocessor {
    inner: Arc<Inner>,
}

impl LocalCoprocessor {
    pub fn new(
        store: DataStore,
        clock: Arc<dyn Clock>,
        config: LocalCoprocessorConfig,
        rng: SharedRng,
    ) -> Result<Self> {
        let fhe = Fhe::from_preset(config.preset, rng)?;
        let keys_store = store.scope("keys");
        let secret_repo: Repository<Vec<u8>> =
            Repository::new(keys_store.scope(config.preset.to_string()).scope("secret"));
        let secret = secret_repo.load_or_else(|| Ok(fhe.generate_secret_key()?.to_vec()))?;
        let keys = fhe.load_keys(&secret)?;

        let proof_repo: Repository<B256> = Repository::new(keys_store.scope("proof_secret"));
        let proof_secret = proof_repo.load_or_else(|| Ok(B256::from(rand::random::<[u8; 32]>())))?;

        info!(
            chain_id = config.chain_id,
            preset = %config.preset,
            "local coprocessor ready"
        );

        Ok(Self {
            inner: Arc::new(Inner {
                fhe,
                keys,
                proof_secret,
                config,
                store,
                clock,
                online: AtomicBool::new(true),
                verify_lock: Mutex::new(()),
            }),
        })
    }

    pub fn config(&self) -> &LocalCoprocessorConfig {
        &self.inner.config
    }

    /// Take the coprocessor offline or bring it back. Every call fails while offline.
    pub fn set_online(&self, online: bool) {
        if !online {
            warn!("local coprocessor going offline");
        }
        self.inner.online.store(online, Ordering::SeqCst);
    }

    pub fn is_online(&self) -> bool {
        self.inner.online.load(Ordering::SeqCst)
    }

    fn ciphertext(&self, handle: &CiphertextHandle) -> DataStore {
        self.inner
            .store
            .scope("ciphertexts")
            .scope(handle.to_string())
    }

    fn grant(&self, handle: &CiphertextHandle, contract: Address, user: Address) -> DataStore {
        self.inner
            .store
            .scope("acl")
            .scope(handle.to_string())
            .scope(contract)
            .scope(user)
    }

    fn spent(&self, handle: &CiphertextHandle) -> DataStore {
        self.inner.store.scope("spent").scope(handle.to_string())
    }

    /// Whether `(contract, user)` was granted access to `handle`.
    pub fn has_access(
        &self,
        handle: &CiphertextHandle,
        contract: Address,
        user: Address,
    ) -> Result<bool, ArenaError> {
        Ok(self
            .grant(handle, contract, user)
            .read::<bool>()
            .map_err(ArenaError::storage)?
            .unwrap_or(false))
    }

    fn verify_sync(
        &self,
        handle: &CiphertextHandle,
        proof: &SubmissionProof,
        contract: Address,
        user: Address,
    ) -> Result<(), ArenaError> {
        let _guard = self
            .inner
            .verify_lock
            .lock()
            .map_err(|_| ArenaError::Storage("verify lock poisoned".into()))?;

        check_proof(&self.inner.proof_secret, handle, proof, contract, user)?;

        let spent = self.spent(handle);
        if spent
            .read::<bool>()
            .map_err(ArenaError::storage)?
            .unwrap_or(false)
        {
            return Err(ArenaError::InvalidProof("proof already used".into()));
        }

        let known = self
            .ciphertext(handle)
            .read::<StoredCiphertext>()
            .map_err(ArenaError::storage)?
            .is_some();
        if !known {
            return Err(ArenaError::CoprocessorUnavailable(format!(
                "cannot resolve handle {handle}"
            )));
        }

        spent.write(true).map_err(ArenaError::storage)?;

        debug!(%handle, %contract, %user, "input verified");
        Ok(())
    }
}

#[async_trait]
impl EncryptionBackend for LocalCoprocessor {
    async fn encrypt(&self, request: EncryptionRequest) -> Result<EncryptedInput, ArenaError> {
        if !self.is_online() {
            return Err(ArenaError::EncryptionBackendError(
                "local coprocessor is offline".into(),
            ));
        }
        let EncryptionRequest {
            value,
            encrypted_type,
            contract,
            user,
        } = request;
        encrypted_type.check_value(value)?;

        let inner = self.inner.clone();
        let ciphertext = tokio::task::spawn_blocking(move || {
            inner
                .fhe
                .encrypt_value(inner.keys.public_key(), value, encrypted_type)
        })
        .await
        .map_err(|e| ArenaError::EncryptionBackendError(e.to_string()))?
        .map_err(|e| ArenaError::EncryptionBackendError(format!("{e:#}")))?;

        let nonce = B256::from(rand::random::<[u8; 32]>());
        let handle = derive_handle(
            &ciphertext,
            encrypted_type,
            contract,
            user,
            self.inner.config.chain_id,
            nonce,
        );
        self.ciphertext(&handle)
            .write(StoredCiphertext {
                encrypted_type,
                bytes: ciphertext,
            })
            .map_err(ArenaError::storage)?;
        let proof = issue_proof(&self.inner.proof_secret, &handle, contract, user, nonce)?;

        debug!(%handle, %encrypted_type, "encrypted input");
        Ok(EncryptedInput { handle, proof })
    }
}

#[async_trait]
impl InputVerifier for LocalCoprocessor {
    async fn verify_input(
        &self,
        handle: &CiphertextHandle,
        proof: &SubmissionProof,
        contract: Address,
        user: Address,
    ) -> Result<(), ArenaError> {
        if !self.is_online() {
            return Err(ArenaError::CoprocessorUnavailable(
                "local coprocessor is offline".into(),
            ));
        }
        self.verify_sync(handle, proof, contract, user)
    }

    async fn allow(
        &self,
        handle: &CiphertextHandle,
        contract: Address,
        user: Address,
    ) -> Result<(), ArenaError> {
        self.grant(handle, contract, user)
            .write(true)
            .map_err(ArenaError::storage)?;
        debug!(%handle, %contract, %user, "access granted");
        Ok(())
    }
}

#[async_trait]
impl DecryptionBackend for LocalCoprocessor {
    fn authorization_domain(&self) -> Eip712Domain {
        authorization_domain(
            self.inner.config.chain_id,
            self.inner.config.decryption_address,
        )
    }

    async fn user_decrypt(
        &self,
        handles: &[CiphertextHandle],
        authorization: &DecryptionAuthorization,
    ) -> Result<HashMap<CiphertextHandle, ClearValue>, ArenaError> {
        if !self.is_online() {
            return Err(ArenaError::DecryptionBackendError(
                "local coprocessor is offline".into(),
            ));
        }
        authorization.verify(&self.authorization_domain(), self.inner.clock.now())?;

        let contract = authorization.contract();
        let user = authorization.user();
        let mut pending = Vec::with_capacity(handles.len());
        for handle in handles {
            if !self.has_access(handle, contract, user)? {
                return Err(ArenaError::AuthorizationDenied(format!(
                    "{handle} is not granted to {user} on {contract}"
                )));
            }
            let stored = self
                .ciphertext(handle)
                .read::<StoredCiphertext>()
                .map_err(ArenaError::storage)?
                .ok_or_else(|| {
                    ArenaError::DecryptionBackendError(format!("unknown handle {handle}"))
                })?;
            pending.push((*handle, stored));
        }

        let inner = self.inner.clone();
        let values = tokio::task::spawn_blocking(move || {
            pending
                .into_iter()
                .map(|(handle, stored)| {
                    inner
                        .fhe
                        .decrypt_value(&inner.keys, &stored.bytes, stored.encrypted_type)
                        .map(|value| (handle, value))
                })
                .collect::<Result<HashMap<_, _>>>()
        })
        .await
        .map_err(|e| ArenaError::DecryptionBackendError(e.to_string()))?
        .map_err(|e| ArenaError::DecryptionBackendError(format!("{e:#}")))?;

        debug!(count = values.len(), %user, "user decrypt");
        Ok(values)
    }
}
