// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use core::fmt;

use alloy_primitives::B256;
use arena_utils::{short_hex, ArcBytes};
use serde::{Deserialize, Serialize};

use crate::EncryptedType;

/// Opaque reference to an encrypted scalar held by the coprocessor that issued it.
///
/// A handle carries no ciphertext. Byte 30 holds the encrypted type tag and byte 31 the handle
/// version; everything else is issuer defined.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct CiphertextHandle(B256);

impl CiphertextHandle {
    pub const VERSION: u8 = 0;

    pub fn new(bytes: B256) -> Self {
        Self(bytes)
    }

    pub fn as_b256(&self) -> B256 {
        self.0
    }

    pub fn as_slice(&self) -> &[u8] {
        self.0.as_slice()
    }

    /// The encrypted type stamped into the handle by its issuer.
    pub fn encrypted_type(&self) -> Option<EncryptedType> {
        EncryptedType::from_tag(self.0[30])
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl From<B256> for CiphertextHandle {
    fn from(value: B256) -> Self {
        Self(value)
    }
}

impl From<CiphertextHandle> for B256 {
    fn from(value: CiphertextHandle) -> Self {
        value.0
    }
}

impl fmt::Display for CiphertextHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for CiphertextHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CiphertextHandle({})", short_hex(self.as_slice()))
    }
}

/// Proof that a handle was derived from a value encrypted for a given contract and user.
/// Valid for exactly one submission.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct SubmissionProof(ArcBytes);

impl SubmissionProof {
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(ArcBytes::from_bytes(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for SubmissionProof {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SubmissionProof({:?})", self.0)
    }
}

/// A handle ready for submission together with its proof.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncryptedInput {
    pub handle: CiphertextHandle,
    pub proof: SubmissionProof,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_tag_is_read_from_byte_30() {
        let mut bytes = [0u8; 32];
        bytes[30] = EncryptedType::Uint32.tag();
        let handle = CiphertextHandle::new(B256::from(bytes));
        assert_eq!(handle.encrypted_type(), Some(EncryptedType::Uint32));
        assert!(!handle.is_zero());
        assert!(CiphertextHandle::default().is_zero());
    }

    #[test]
    fn display_is_full_hex() {
        let handle = CiphertextHandle::new(B256::repeat_byte(0xab));
        assert_eq!(handle.to_string(), format!("0x{}", "ab".repeat(32)));
    }
}
