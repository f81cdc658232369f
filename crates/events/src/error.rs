// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};
use strum::Display;
use thiserror::Error;

use crate::EncryptedType;

/// Failures surfaced by the ledger, the coprocessor backends and the client pipelines.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArenaError {
    /// The proof does not match the handle/user/contract triple, is malformed or was already used.
    #[error("invalid input proof: {0}")]
    InvalidProof(String),

    /// The coprocessor could not resolve the handle at submission time.
    #[error("coprocessor unavailable: {0}")]
    CoprocessorUnavailable(String),

    /// The requested field width has no corresponding encryption method.
    #[error("unsupported encrypted type: {0}")]
    UnsupportedWidth(String),

    #[error("value {value} does not fit in {encrypted_type}")]
    ValueOutOfRange {
        value: U256,
        encrypted_type: EncryptedType,
    },

    #[error("encryption failed: {0}")]
    EncryptionBackendError(String),

    /// The user declined to sign, or the authorization does not cover the request.
    #[error("decryption authorization denied: {0}")]
    AuthorizationDenied(String),

    #[error("decryption failed: {0}")]
    DecryptionBackendError(String),

    /// Missing identity, signing capability, ledger or coprocessor.
    #[error("missing capability: {0}")]
    NoCapability(String),

    #[error("a decryption is already in flight")]
    DecryptionInFlight,

    #[error("storage error: {0}")]
    Storage(String),
}

impl ArenaError {
    pub fn error_type(&self) -> ArenaErrorType {
        use ArenaError::*;
        match self {
            InvalidProof(_) => ArenaErrorType::InvalidProof,
            CoprocessorUnavailable(_) => ArenaErrorType::CoprocessorUnavailable,
            UnsupportedWidth(_) | ValueOutOfRange { .. } => ArenaErrorType::Encryption,
            EncryptionBackendError(_) => ArenaErrorType::Encryption,
            AuthorizationDenied(_) => ArenaErrorType::Authorization,
            DecryptionBackendError(_) | DecryptionInFlight => ArenaErrorType::Decryption,
            NoCapability(_) => ArenaErrorType::Capability,
            Storage(_) => ArenaErrorType::Data,
        }
    }

    /// Lift a storage failure into the error taxonomy.
    pub fn storage(err: impl Into<anyhow::Error>) -> Self {
        ArenaError::Storage(format!("{:#}", err.into()))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum ArenaErrorType {
    InvalidProof,
    CoprocessorUnavailable,
    Encryption,
    Authorization,
    Decryption,
    Capability,
    Data,
}
