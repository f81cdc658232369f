// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! Handle derivation and input proofs issued by the local coprocessor.
//!
//! A proof is `nonce || mac` where the mac is keccak256 over the coprocessor's secret together
//! with the handle, contract, user, type tag and nonce. Only the issuing coprocessor can check it.

use alloy::primitives::{keccak256, Address, B256};
use alloy::sol_types::SolValue;
use arena_events::{ArenaError, CiphertextHandle, EncryptedType, SubmissionProof};

pub const PROOF_LEN: usize = 64;

/// Derive the handle of a freshly encrypted value.
pub fn derive_handle(
    ciphertext: &[u8],
    encrypted_type: EncryptedType,
    contract: Address,
    user: Address,
    chain_id: u64,
    nonce: B256,
) -> CiphertextHandle {
    let encoded = (keccak256(ciphertext), contract, user, chain_id, nonce).abi_encode_packed();
    let mut bytes = keccak256(&encoded);
    bytes[30] = encrypted_type.tag();
    bytes[31] = CiphertextHandle::VERSION;
    CiphertextHandle::new(bytes)
}

fn proof_mac(
    secret: &B256,
    handle: &CiphertextHandle,
    contract: Address,
    user: Address,
    tag: u8,
    nonce: &B256,
) -> B256 {
    let encoded = (*secret, handle.as_b256(), contract, user, tag, *nonce).abi_encode_packed();
    keccak256(&encoded)
}

pub fn issue_proof(
    secret: &B256,
    handle: &CiphertextHandle,
    contract: Address,
    user: Address,
    nonce: B256,
) -> Result<SubmissionProof, ArenaError> {
    let tag = handle
        .encrypted_type()
        .ok_or_else(|| ArenaError::EncryptionBackendError("handle carries no type tag".into()))?
        .tag();
    let mac = proof_mac(secret, handle, contract, user, tag, &nonce);
    let mut bytes = Vec::with_capacity(PROOF_LEN);
    bytes.extend_from_slice(nonce.as_slice());
    bytes.extend_from_slice(mac.as_slice());
    Ok(SubmissionProof::from_bytes(bytes))
}

/// Structural and cryptographic check of a proof. Does not know whether it was already spent.
pub fn check_proof(
    secret: &B256,
    handle: &CiphertextHandle,
    proof: &SubmissionProof,
    contract: Address,
    user: Address,
) -> Result<(), ArenaError> {
    if proof.len() != PROOF_LEN {
        return Err(ArenaError::InvalidProof(format!(
            "expected {} bytes, got {}",
            PROOF_LEN,
            proof.len()
        )));
    }
    let Some(encrypted_type) = handle.encrypted_type() else {
        return Err(ArenaError::InvalidProof("unknown handle type".into()));
    };
    let bytes = proof.as_bytes();
    let nonce = B256::from_slice(&bytes[..32]);
    let mac = B256::from_slice(&bytes[32..]);

    if proof_mac(secret, handle, contract, user, encrypted_type.tag(), &nonce) != mac {
        return Err(ArenaError::InvalidProof(
            "proof does not match handle, contract and user".into(),
        ));
    }
    Ok(())
}
