// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use std::sync::Arc;

use alloy::primitives::{Address, U256};
use arena_coprocessor::{EncryptionBackend, EncryptionRequest};
use arena_events::{ArenaError, EncryptedInput, EncryptedType};
use arena_ledger::LedgerInterface;
use tracing::debug;

/// Turns plaintext values into submittable `(handle, proof)` pairs of one encrypted type.
#[derive(Clone)]
pub struct EncryptionBuilder {
    backend: Arc<dyn EncryptionBackend>,
    encrypted_type: EncryptedType,
}

impl EncryptionBuilder {
    pub fn new(backend: Arc<dyn EncryptionBackend>, encrypted_type: EncryptedType) -> Self {
        Self {
            backend,
            encrypted_type,
        }
    }

    /// Use the type the ledger declares for the first parameter of `function`.
    pub fn from_interface(
        backend: Arc<dyn EncryptionBackend>,
        interface: &LedgerInterface,
        function: &str,
    ) -> Result<Self, ArenaError> {
        let encrypted_type = interface.submission_input_type(function)?;
        Ok(Self::new(backend, encrypted_type))
    }

    pub fn encrypted_type(&self) -> EncryptedType {
        self.encrypted_type
    }

    /// Name of the builder method used, e.g. `add32`.
    pub fn method(&self) -> &'static str {
        self.encrypted_type.method()
    }

    pub async fn encrypt(
        &self,
        value: impl Into<U256>,
        contract: Address,
        caller: Address,
    ) -> Result<EncryptedInput, ArenaError> {
        self.encrypt_with_type(value, contract, caller, self.encrypted_type)
            .await
    }

    /// Encrypt as the type `bits` wide, e.g. 8 for `add8`. Widths without an encrypted type
    /// are `UnsupportedWidth`.
    pub async fn encrypt_with_width(
        &self,
        value: impl Into<U256>,
        contract: Address,
        caller: Address,
        bits: u16,
    ) -> Result<EncryptedInput, ArenaError> {
        let encrypted_type = EncryptedType::from_bits(bits)?;
        self.encrypt_with_type(value, contract, caller, encrypted_type)
            .await
    }

    pub async fn encrypt_with_type(
        &self,
        value: impl Into<U256>,
        contract: Address,
        caller: Address,
        encrypted_type: EncryptedType,
    ) -> Result<EncryptedInput, ArenaError> {
        let value = value.into();
        encrypted_type.check_value(value)?;
        let input = self
            .backend
            .encrypt(EncryptionRequest {
                value,
                encrypted_type,
                contract,
                user: caller,
            })
            .await?;
        debug!(handle = %input.handle, method = encrypted_type.method(), "value encrypted");
        Ok(input)
    }
}
