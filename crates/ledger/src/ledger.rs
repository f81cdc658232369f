// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use alloy::primitives::Address;
use arena_coprocessor::InputVerifier;
use arena_data::{DataStore, WriteBatch};
use arena_events::{
    ArenaError, CiphertextHandle, EventBus, ScoreEntry, ScoreSubmitted, SubmissionProof,
    SubmissionRejected,
};
use tracing::{error, info, instrument, warn};

type AppendLock = Arc<tokio::sync::Mutex<()>>;

struct Inner {
    contract: Address,
    store: DataStore,
    verifier: Arc<dyn InputVerifier>,
    bus: EventBus,
    append_locks: Mutex<HashMap<Address, AppendLock>>,
}

/// A user's append lock, dropped from the table once its last holder is gone.
struct AppendSlot<'a> {
    inner: &'a Inner,
    user: Address,
    lock: AppendLock,
}

impl Drop for AppendSlot<'_> {
    fn drop(&mut self) {
        let Ok(mut locks) = self.inner.append_locks.lock() else {
            return;
        };
        let idle = locks
            .get(&self.user)
            .is_some_and(|held| Arc::ptr_eq(held, &self.lock) && Arc::strong_count(held) == 2);
        if idle {
            locks.remove(&self.user);
        }
    }
}

/// Append only store of score handles, one history per user.
///
/// Layout under the given store: `<user>/count` holds the number of entries and
/// `<user>/entries/<index>` each ScoreEntry. Both are written in one batch.
#[derive(Clone)]
pub struct ScoreLedger {
    inner: Arc<Inner>,
}

impl ScoreLedger {
    pub fn new(
        contract: Address,
        store: DataStore,
        verifier: Arc<dyn InputVerifier>,
        bus: EventBus,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                contract,
                store,
                verifier,
                bus,
                append_locks: Mutex::new(HashMap::new()),
            }),
        }
    }

    pub fn contract(&self) -> Address {
        self.inner.contract
    }

    fn user_store(&self, user: Address) -> DataStore {
        self.inner.store.scope(user)
    }

    fn count_store(&self, user: Address) -> DataStore {
        self.user_store(user).scope("count")
    }

    fn entry_store(&self, user: Address, index: u64) -> DataStore {
        self.user_store(user).scope("entries").scope(index)
    }

    fn append_slot(&self, user: Address) -> Result<AppendSlot<'_>, ArenaError> {
        let mut locks = self
            .inner
            .append_locks
            .lock()
            .map_err(|_| ArenaError::Storage("append lock table poisoned".into()))?;
        Ok(AppendSlot {
            inner: &self.inner,
            user,
            lock: locks.entry(user).or_default().clone(),
        })
    }

    /// Users with a submission currently queued or running.
    pub fn pending_appends(&self) -> usize {
        self.inner
            .append_locks
            .lock()
            .map(|locks| locks.len())
            .unwrap_or(0)
    }

    fn reject(&self, user: Address, handle: CiphertextHandle, err: &ArenaError) {
        warn!(%user, %handle, "submission rejected: {err}");
        self.inner.bus.publish(SubmissionRejected {
            user,
            contract: self.inner.contract,
            handle,
            err_type: err.error_type(),
            reason: err.to_string(),
        });
    }

    /// Verify the proof for `handle`, append it to `user`'s history and grant `(contract, user)`
    /// access to it.
    #[instrument(name = "ledger_submit", skip(self, proof), fields(contract = %self.inner.contract))]
    pub async fn submit(
        &self,
        user: Address,
        handle: CiphertextHandle,
        proof: &SubmissionProof,
    ) -> Result<ScoreEntry, ArenaError> {
        let slot = self.append_slot(user)?;
        let _guard = slot.lock.lock().await;

        if let Err(err) = self
            .inner
            .verifier
            .verify_input(&handle, proof, self.inner.contract, user)
            .await
        {
            self.reject(user, handle, &err);
            return Err(err);
        }

        let index = self.get_submit_count(user)?;
        let entry = ScoreEntry { handle, index };

        let mut batch = WriteBatch::new();
        self.entry_store(user, index)
            .stage(&mut batch, entry)
            .map_err(ArenaError::storage)?;
        self.count_store(user)
            .stage(&mut batch, index + 1)
            .map_err(ArenaError::storage)?;
        if let Err(err) = self.inner.store.commit(batch) {
            let err = ArenaError::storage(err);
            self.reject(user, handle, &err);
            return Err(err);
        }

        // Access follows the recorded entry; a rejected or failed append grants nothing.
        if let Err(err) = self
            .inner
            .verifier
            .allow(&handle, self.inner.contract, user)
            .await
        {
            error!(%user, index, %handle, "score recorded but access grant failed: {err}");
            self.inner.bus.err(&err);
        }

        info!(%user, index, %handle, "score submitted");
        self.inner.bus.publish(ScoreSubmitted {
            user,
            contract: self.inner.contract,
            index,
            handle,
        });
        Ok(entry)
    }

    /// All handles submitted by `user`, in submission order.
    pub fn get_score_history(&self, user: Address) -> Result<Vec<CiphertextHandle>, ArenaError> {
        let count = self.get_submit_count(user)?;
        (0..count)
            .map(|index| {
                self.get_entry(user, index)?
                    .map(|e| e.handle)
                    .ok_or_else(|| {
                        ArenaError::Storage(format!("missing entry {index} for {user}"))
                    })
            })
            .collect()
    }

    pub fn get_submit_count(&self, user: Address) -> Result<u64, ArenaError> {
        Ok(self
            .count_store(user)
            .read::<u64>()
            .map_err(ArenaError::storage)?
            .unwrap_or(0))
    }

    pub fn get_entry(&self, user: Address, index: u64) -> Result<Option<ScoreEntry>, ArenaError> {
        self.entry_store(user, index)
            .read()
            .map_err(ArenaError::storage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::U256;
    use arena_coprocessor::{
        EncryptionBackend, EncryptionRequest, LocalCoprocessor, LocalCoprocessorConfig,
    };
    use arena_data::KeyValStore;
    use arena_events::{ArenaEvent, EncryptedInput, EncryptedType};
    use arena_fhe::shared_rng_from_seed;
    use arena_utils::SystemClock;

    fn contract() -> Address {
        Address::repeat_byte(0xC0)
    }

    fn setup() -> anyhow::Result<(ScoreLedger, LocalCoprocessor, EventBus)> {
        let store = DataStore::in_mem();
        let copro = LocalCoprocessor::new(
            store.base("//coprocessor"),
            Arc::new(SystemClock),
            LocalCoprocessorConfig::default(),
            shared_rng_from_seed(7),
        )?;
        let bus = EventBus::with_history();
        let ledger = ScoreLedger::new(
            contract(),
            store.base("//ledger"),
            Arc::new(copro.clone()),
            bus.clone(),
        );
        Ok((ledger, copro, bus))
    }

    async fn encrypt(copro: &LocalCoprocessor, user: Address, v: u64) -> EncryptedInput {
        copro
            .encrypt(EncryptionRequest {
                value: U256::from(v),
                encrypted_type: EncryptedType::Uint32,
                contract: contract(),
                user,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn new_user_has_empty_history() -> anyhow::Result<()> {
        let (ledger, _, _) = setup()?;
        let user = Address::repeat_byte(1);
        assert!(ledger.get_score_history(user)?.is_empty());
        assert_eq!(ledger.get_submit_count(user)?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn submissions_append_in_order() -> anyhow::Result<()> {
        let (ledger, copro, bus) = setup()?;
        let user = Address::repeat_byte(1);
        let mut handles = vec![];
        for (i, v) in [10, 20, 30].into_iter().enumerate() {
            let input = encrypt(&copro, user, v).await;
            let entry = ledger.submit(user, input.handle, &input.proof).await?;
            assert_eq!(entry.index, i as u64);
            handles.push(input.handle);
        }
        assert_eq!(ledger.get_score_history(user)?, handles);
        assert_eq!(ledger.get_submit_count(user)?, 3);
        assert_eq!(bus.history_of("ScoreSubmitted").len(), 3);
        Ok(())
    }

    #[tokio::test]
    async fn rejected_submission_leaves_history_untouched() -> anyhow::Result<()> {
        let (ledger, copro, bus) = setup()?;
        let alice = Address::repeat_byte(1);
        let bob = Address::repeat_byte(2);
        let input = encrypt(&copro, alice, 5).await;

        let res = ledger.submit(bob, input.handle, &input.proof).await;
        assert!(matches!(res, Err(ArenaError::InvalidProof(_))));
        assert_eq!(ledger.get_submit_count(bob)?, 0);

        ledger.submit(alice, input.handle, &input.proof).await?;
        let replay = ledger.submit(alice, input.handle, &input.proof).await;
        assert!(matches!(replay, Err(ArenaError::InvalidProof(_))));
        assert_eq!(ledger.get_submit_count(alice)?, 1);

        let rejected = bus.history_of("SubmissionRejected");
        assert_eq!(rejected.len(), 2);
        assert!(matches!(
            &rejected[0],
            ArenaEvent::SubmissionRejected(SubmissionRejected { user, .. }) if *user == bob
        ));
        Ok(())
    }

    #[tokio::test]
    async fn offline_coprocessor_is_unavailable() -> anyhow::Result<()> {
        let (ledger, copro, _) = setup()?;
        let user = Address::repeat_byte(1);
        let input = encrypt(&copro, user, 5).await;
        copro.set_online(false);
        let res = ledger.submit(user, input.handle, &input.proof).await;
        assert!(matches!(res, Err(ArenaError::CoprocessorUnavailable(_))));
        assert_eq!(ledger.get_submit_count(user)?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn concurrent_submissions_get_gap_free_indices() -> anyhow::Result<()> {
        let (ledger, copro, _) = setup()?;
        let user = Address::repeat_byte(1);
        let mut inputs = vec![];
        for v in 0..8 {
            inputs.push(encrypt(&copro, user, v).await);
        }
        let results = futures::future::join_all(
            inputs
                .iter()
                .map(|input| ledger.submit(user, input.handle, &input.proof)),
        )
        .await;

        let mut indices: Vec<u64> = results
            .into_iter()
            .map(|r| r.map(|e| e.index))
            .collect::<Result<_, _>>()?;
        indices.sort();
        assert_eq!(indices, (0..8).collect::<Vec<_>>());
        assert_eq!(ledger.get_score_history(user)?.len(), 8);
        assert_eq!(ledger.pending_appends(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn append_locks_are_released() -> anyhow::Result<()> {
        let (ledger, copro, _) = setup()?;
        for byte in 1..=5u8 {
            let user = Address::repeat_byte(byte);
            let input = encrypt(&copro, user, byte as u64).await;
            ledger.submit(user, input.handle, &input.proof).await?;
        }
        let user = Address::repeat_byte(9);
        let input = encrypt(&copro, user, 1).await;
        assert!(ledger
            .submit(Address::repeat_byte(8), input.handle, &input.proof)
            .await
            .is_err());
        assert_eq!(ledger.pending_appends(), 0);
        Ok(())
    }

    /// Reads nothing, refuses every write.
    struct ReadOnlyStore;

    impl KeyValStore for ReadOnlyStore {
        fn put(&mut self, _key: &[u8], _value: Vec<u8>) -> anyhow::Result<()> {
            anyhow::bail!("store is read only")
        }

        fn apply(&mut self, _batch: WriteBatch) -> anyhow::Result<()> {
            anyhow::bail!("store is read only")
        }

        fn delete(&mut self, _key: &[u8]) -> anyhow::Result<()> {
            Ok(())
        }

        fn fetch(&self, _key: &[u8]) -> anyhow::Result<Option<Vec<u8>>> {
            Ok(None)
        }
    }

    #[tokio::test]
    async fn failed_append_grants_no_access() -> anyhow::Result<()> {
        let (_, copro, bus) = setup()?;
        let ledger = ScoreLedger::new(
            contract(),
            DataStore::new(ReadOnlyStore),
            Arc::new(copro.clone()),
            bus.clone(),
        );
        let user = Address::repeat_byte(1);
        let input = encrypt(&copro, user, 5).await;

        let res = ledger.submit(user, input.handle, &input.proof).await;
        assert!(matches!(res, Err(ArenaError::Storage(_))));
        assert!(!copro.has_access(&input.handle, contract(), user)?);
        assert_eq!(bus.history_of("SubmissionRejected").len(), 1);
        assert!(bus.history_of("ScoreSubmitted").is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn recorded_entry_is_granted_access() -> anyhow::Result<()> {
        let (ledger, copro, _) = setup()?;
        let user = Address::repeat_byte(1);
        let input = encrypt(&copro, user, 5).await;
        ledger.submit(user, input.handle, &input.proof).await?;
        assert!(copro.has_access(&input.handle, contract(), user)?);
        assert!(!copro.has_access(&input.handle, contract(), Address::repeat_byte(2))?);
        Ok(())
    }
}
