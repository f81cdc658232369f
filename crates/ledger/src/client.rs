// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy::primitives::{keccak256, Address, Bytes, B256, U256};
use alloy::sol_types::{SolCall, SolValue};
use arena_events::{ArenaError, CiphertextHandle, SubmissionProof, SubmissionReceipt};
use async_trait::async_trait;

use crate::{IScoreLedger, ScoreLedger};

/// Read side of a score ledger. Needs no signing capability.
#[async_trait]
pub trait LedgerRead: Send + Sync {
    fn contract(&self) -> Address;
    async fn get_score_history(&self, user: Address)
        -> Result<Vec<CiphertextHandle>, ArenaError>;
    async fn get_submit_count(&self, user: Address) -> Result<u64, ArenaError>;
}

/// Write side of a score ledger. `caller` is the identity of the signing capability.
#[async_trait]
pub trait LedgerWrite: Send + Sync {
    async fn submit_score(
        &self,
        caller: Address,
        handle: CiphertextHandle,
        proof: &SubmissionProof,
    ) -> Result<SubmissionReceipt, ArenaError>;
}

/// Talks to an in-process ScoreLedger as if it were the deployed contract.
#[derive(Clone)]
pub struct LocalLedgerClient {
    ledger: ScoreLedger,
}

impl LocalLedgerClient {
    pub fn new(ledger: ScoreLedger) -> Self {
        Self { ledger }
    }

    pub fn ledger(&self) -> &ScoreLedger {
        &self.ledger
    }
}

/// Deterministic stand-in for a transaction hash: keccak over the calldata, caller and index.
pub fn local_transaction_hash(
    caller: Address,
    handle: &CiphertextHandle,
    proof: &SubmissionProof,
    index: u64,
) -> B256 {
    let calldata = IScoreLedger::submitScoreCall {
        score: handle.as_b256(),
        inputProof: Bytes::copy_from_slice(proof.as_bytes()),
    }
    .abi_encode();
    keccak256((Bytes::from(calldata), caller, U256::from(index)).abi_encode_packed())
}

#[async_trait]
impl LedgerRead for LocalLedgerClient {
    fn contract(&self) -> Address {
        self.ledger.contract()
    }

    async fn get_score_history(
        &self,
        user: Address,
    ) -> Result<Vec<CiphertextHandle>, ArenaError> {
        self.ledger.get_score_history(user)
    }

    async fn get_submit_count(&self, user: Address) -> Result<u64, ArenaError> {
        self.ledger.get_submit_count(user)
    }
}

#[async_trait]
impl LedgerWrite for LocalLedgerClient {
    async fn submit_score(
        &self,
        caller: Address,
        handle: CiphertextHandle,
        proof: &SubmissionProof,
    ) -> Result<SubmissionReceipt, ArenaError> {
        let entry = self.ledger.submit(caller, handle, proof).await?;
        Ok(SubmissionReceipt {
            transaction_hash: local_transaction_hash(caller, &handle, proof, entry.index),
            user: caller,
            entry,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transaction_hash_depends_on_every_input() {
        let handle = CiphertextHandle::new(B256::repeat_byte(1));
        let proof = SubmissionProof::from_bytes(vec![2u8; 64]);
        let caller = Address::repeat_byte(3);
        let base = local_transaction_hash(caller, &handle, &proof, 0);
        assert_eq!(base, local_transaction_hash(caller, &handle, &proof, 0));
        assert_ne!(base, local_transaction_hash(caller, &handle, &proof, 1));
        assert_ne!(
            base,
            local_transaction_hash(Address::repeat_byte(4), &handle, &proof, 0)
        );
    }
}
