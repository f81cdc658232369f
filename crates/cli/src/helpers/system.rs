// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use std::sync::Arc;

use anyhow::{Context, Result};
use arena_client::{ArenaSession, SessionBackends};
use arena_config::{ArenaConfig, StoreKeys};
use arena_coprocessor::{LocalCoprocessor, LocalCoprocessorConfig};
use arena_data::DataStore;
use arena_events::EventBus;
use arena_fhe::shared_rng_from_entropy;
use arena_ledger::{LedgerInterface, LocalLedgerClient, ScoreLedger};
use arena_logger::EventLogger;
use arena_utils::SystemClock;
use tracing::info;

pub const DB_TREE: &str = "arena";

/// Local coprocessor and ledger built from configuration, sharing one store and one bus.
pub struct LocalSystem {
    pub bus: EventBus,
    pub coprocessor: LocalCoprocessor,
    pub ledger: LocalLedgerClient,
    pub interface: LedgerInterface,
}

impl LocalSystem {
    pub fn setup(config: &ArenaConfig) -> Result<Self> {
        let store = if config.use_in_mem_store() {
            DataStore::in_mem()
        } else {
            info!(db = ?config.db_file(), "opening local store");
            DataStore::sled(config.db_file(), DB_TREE)?
        };

        let bus = EventBus::default();
        EventLogger::attach(config.name(), &bus);

        let coprocessor = LocalCoprocessor::new(
            store.base(StoreKeys::coprocessor()),
            Arc::new(SystemClock),
            LocalCoprocessorConfig {
                chain_id: config.chain_id(),
                decryption_address: config.decryption_address(),
                preset: config.preset(),
            },
            shared_rng_from_entropy(),
        )
        .context("Could not start the local coprocessor")?;

        let contract = config.contract().address();
        let ledger = ScoreLedger::new(
            contract,
            store.base(StoreKeys::ledger(&contract)),
            Arc::new(coprocessor.clone()),
            bus.clone(),
        );

        let interface = match config.interface_file() {
            Some(path) => LedgerInterface::load(path)?,
            None => LedgerInterface::bundled()?,
        };

        Ok(Self {
            bus,
            coprocessor,
            ledger: LocalLedgerClient::new(ledger),
            interface,
        })
    }

    pub fn session(&self, config: &ArenaConfig) -> Result<ArenaSession> {
        let backends = SessionBackends::local(
            &self.coprocessor,
            &self.ledger,
            &self.interface,
            config.submit_function(),
        )?;
        Ok(ArenaSession::new(
            backends,
            Arc::new(SystemClock),
            self.bus.clone(),
            config.authorization_days(),
        ))
    }
}
