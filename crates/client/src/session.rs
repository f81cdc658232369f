// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use std::sync::{Arc, RwLock};

use alloy::primitives::{Address, U256};
use arena_coprocessor::{DecryptionBackend, LocalCoprocessor};
use arena_events::{ArenaError, CiphertextHandle, EventBus};
use arena_ledger::{LedgerInterface, LedgerRead, LedgerWrite, LocalLedgerClient};
use arena_utils::Clock;
use tokio::sync::watch;
use tracing::info;

use crate::{
    DecryptionManager, DecryptionRequest, DecryptionResult, EncryptionBuilder, ReadModel,
    SessionSnapshot, SigningCapability, StatusBoard, SubmissionOrchestrator, SubmitOutcome,
};

/// The ledger and coprocessor endpoints a session talks to.
#[derive(Clone)]
pub struct SessionBackends {
    pub reader: Arc<dyn LedgerRead>,
    pub writer: Option<Arc<dyn LedgerWrite>>,
    pub encryption: Option<EncryptionBuilder>,
    pub decryption: Arc<dyn DecryptionBackend>,
}

impl SessionBackends {
    /// Wire an in-process ledger to a local coprocessor. The encrypted type of the submission is
    /// taken from `interface`.
    pub fn local(
        coprocessor: &LocalCoprocessor,
        ledger: &LocalLedgerClient,
        interface: &LedgerInterface,
        submit_function: &str,
    ) -> Result<Self, ArenaError> {
        let encryption = EncryptionBuilder::from_interface(
            Arc::new(coprocessor.clone()),
            interface,
            submit_function,
        )?;
        Ok(Self {
            reader: Arc::new(ledger.clone()),
            writer: Some(Arc::new(ledger.clone())),
            encryption: Some(encryption),
            decryption: Arc::new(coprocessor.clone()),
        })
    }
}

/// One user's view of a score ledger: submit, list and decrypt.
///
/// Every change is published on the snapshot channel returned by `subscribe`.
#[derive(Clone)]
pub struct ArenaSession {
    board: StatusBoard,
    read_model: ReadModel,
    orchestrator: SubmissionOrchestrator,
    decryption: DecryptionManager,
    signer: Arc<RwLock<Option<Arc<dyn SigningCapability>>>>,
}

impl ArenaSession {
    pub fn new(
        backends: SessionBackends,
        clock: Arc<dyn Clock>,
        bus: EventBus,
        authorization_days: u64,
    ) -> Self {
        let board = StatusBoard::new(SessionSnapshot {
            contract: backends.reader.contract(),
            ..SessionSnapshot::default()
        });
        let read_model = ReadModel::new(backends.reader, board.clone());
        let orchestrator = SubmissionOrchestrator::new(read_model.clone(), board.clone(), bus.clone());
        orchestrator.set_ledger(backends.writer);
        orchestrator.set_encryption(backends.encryption);
        let decryption = DecryptionManager::new(
            backends.decryption,
            clock,
            bus,
            board.clone(),
            authorization_days,
        );
        Self {
            board,
            read_model,
            orchestrator,
            decryption,
            signer: Arc::new(RwLock::new(None)),
        }
    }

    pub fn contract(&self) -> Address {
        self.read_model.contract()
    }

    pub fn user(&self) -> Option<Address> {
        self.signer().map(|s| s.address())
    }

    fn signer(&self) -> Option<Arc<dyn SigningCapability>> {
        self.signer.read().ok().and_then(|s| s.clone())
    }

    pub fn orchestrator(&self) -> &SubmissionOrchestrator {
        &self.orchestrator
    }

    pub fn decryption(&self) -> &DecryptionManager {
        &self.decryption
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.board.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.board.subscribe()
    }

    /// Switch account. Clears the status line and the previous account's view, then loads the
    /// new account's history.
    pub async fn set_signer(
        &self,
        signer: Option<Arc<dyn SigningCapability>>,
    ) -> Result<(), ArenaError> {
        if let Ok(mut current) = self.signer.write() {
            *current = signer.clone();
        }
        self.orchestrator.set_signer(signer.clone());
        self.decryption.set_signer(signer.clone());
        let user = signer.as_ref().map(|s| s.address());
        self.board.update(|s| {
            s.user = user;
            s.status.clear();
        });
        self.read_model.clear();
        match user {
            Some(user) => {
                info!(%user, "account connected");
                self.refresh_history().await.map(|_| ())
            }
            None => {
                self.sync_flags();
                Ok(())
            }
        }
    }

    pub async fn submit_score(&self, value: impl Into<U256>) -> SubmitOutcome {
        let outcome = self.orchestrator.submit_score(value).await;
        self.sync_flags();
        outcome
    }

    pub async fn refresh_history(&self) -> Result<Vec<CiphertextHandle>, ArenaError> {
        let user = self
            .user()
            .ok_or_else(|| ArenaError::NoCapability("no account connected".into()))?;
        let result = self.read_model.refresh(user).await;
        self.sync_flags();
        result
    }

    /// Decrypt every handle currently in the history.
    pub async fn decrypt_history(&self) -> Result<DecryptionResult, ArenaError> {
        let requests = self.history_requests();
        let result = self.decryption.decrypt(&requests).await;
        self.sync_flags();
        result
    }

    /// Forget the decryption authorization of the connected account.
    pub fn revoke(&self) -> bool {
        let revoked = self
            .user()
            .map(|user| self.decryption.revoke(self.contract(), user))
            .unwrap_or(false);
        self.sync_flags();
        revoked
    }

    fn history_requests(&self) -> Vec<DecryptionRequest> {
        let contract = self.contract();
        self.read_model
            .handles()
            .into_iter()
            .map(|handle| DecryptionRequest { handle, contract })
            .collect()
    }

    fn sync_flags(&self) {
        let can_submit = self.orchestrator.can_submit();
        let can_decrypt = self.decryption.can_decrypt(&self.history_requests());
        self.board.update(|s| {
            s.can_submit = can_submit;
            s.can_decrypt = can_decrypt;
        });
    }
}
