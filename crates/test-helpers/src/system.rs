// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use std::{path::Path, sync::Arc};

use alloy::primitives::{Address, U256};
use anyhow::Result;
use arena_client::{ArenaSession, SessionBackends, SigningCapability, DEFAULT_AUTHORIZATION_DAYS};
use arena_config::StoreKeys;
use arena_coprocessor::{
    EncryptionBackend, EncryptionRequest, LocalCoprocessor, LocalCoprocessorConfig,
};
use arena_data::DataStore;
use arena_events::{ArenaEvent, EncryptedInput, EncryptedType, EventBus, SubmissionReceipt};
use arena_ledger::{LedgerInterface, LedgerWrite, LocalLedgerClient, ScoreLedger, SUBMIT_SCORE};
use arena_utils::ManualClock;

use crate::create_shared_rng_from_u64;

pub const TEST_START: u64 = 1_700_000_000;

/// Local coprocessor and any number of ledgers wired over one in-memory store, a manual clock
/// and a bus that records every event.
pub struct ArenaTestSystem {
    pub store: DataStore,
    pub clock: ManualClock,
    pub bus: EventBus,
    pub coprocessor: LocalCoprocessor,
    pub interface: LedgerInterface,
}

impl ArenaTestSystem {
    pub fn new(seed: u64) -> Result<Self> {
        Self::with_store(DataStore::in_mem(), seed)
    }

    /// Same as `new` but persisted with sled under `path`.
    pub fn sled(path: &Path, seed: u64) -> Result<Self> {
        Self::with_store(DataStore::sled(path.join("db"), "arena")?, seed)
    }

    fn with_store(store: DataStore, seed: u64) -> Result<Self> {
        let clock = ManualClock::new(TEST_START);
        let coprocessor = LocalCoprocessor::new(
            store.base(StoreKeys::coprocessor()),
            Arc::new(clock.clone()),
            LocalCoprocessorConfig::default(),
            create_shared_rng_from_u64(seed),
        )?;
        Ok(Self {
            store,
            clock,
            bus: EventBus::with_history(),
            coprocessor,
            interface: LedgerInterface::bundled()?,
        })
    }

    /// A client for the ledger deployed at `contract`.
    pub fn ledger(&self, contract: Address) -> LocalLedgerClient {
        LocalLedgerClient::new(ScoreLedger::new(
            contract,
            self.store.base(StoreKeys::ledger(&contract)),
            Arc::new(self.coprocessor.clone()),
            self.bus.clone(),
        ))
    }

    pub fn session(&self, contract: Address) -> Result<ArenaSession> {
        let backends = SessionBackends::local(
            &self.coprocessor,
            &self.ledger(contract),
            &self.interface,
            SUBMIT_SCORE,
        )?;
        Ok(ArenaSession::new(
            backends,
            Arc::new(self.clock.clone()),
            self.bus.clone(),
            DEFAULT_AUTHORIZATION_DAYS,
        ))
    }

    /// A session with `signer` already connected.
    pub async fn session_for(
        &self,
        contract: Address,
        signer: Arc<dyn SigningCapability>,
    ) -> Result<ArenaSession> {
        let session = self.session(contract)?;
        session.set_signer(Some(signer)).await?;
        Ok(session)
    }

    pub async fn encrypt(
        &self,
        value: u64,
        contract: Address,
        user: Address,
    ) -> Result<EncryptedInput> {
        Ok(self
            .coprocessor
            .encrypt(EncryptionRequest {
                value: U256::from(value),
                encrypted_type: EncryptedType::Uint32,
                contract,
                user,
            })
            .await?)
    }

    /// Encrypt and submit without going through a session.
    pub async fn submit(
        &self,
        ledger: &LocalLedgerClient,
        user: Address,
        value: u64,
    ) -> Result<SubmissionReceipt> {
        let input = self.encrypt(value, ledger.ledger().contract(), user).await?;
        Ok(ledger.submit_score(user, input.handle, &input.proof).await?)
    }

    pub fn events_of(&self, event_type: &str) -> Vec<ArenaEvent> {
        self.bus.history_of(event_type)
    }
}
