// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use std::{
    fmt,
    sync::{Arc, Mutex, RwLock},
};

use alloy::primitives::U256;
use arena_events::{ArenaError, EventBus, SubmissionReceipt};
use arena_ledger::LedgerWrite;
use tracing::{info, instrument, warn};

use crate::{EncryptionBuilder, ReadModel, SigningCapability, StatusBoard};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    AlreadySubmitting,
    NoLedger,
    NoCoprocessor,
    NoSigner,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            SkipReason::AlreadySubmitting => "a submission is already in progress",
            SkipReason::NoLedger | SkipReason::NoSigner => "Contract unavailable or signer missing",
            SkipReason::NoCoprocessor => "Encryption unavailable",
        };
        f.write_str(msg)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    Skipped(SkipReason),
    Submitted(SubmissionReceipt),
    Failed(ArenaError),
}

impl SubmitOutcome {
    pub fn receipt(&self) -> Option<&SubmissionReceipt> {
        match self {
            SubmitOutcome::Submitted(receipt) => Some(receipt),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SubmissionState {
    #[default]
    Idle,
    Submitting,
}

struct Inner {
    ledger: RwLock<Option<Arc<dyn LedgerWrite>>>,
    encryption: RwLock<Option<EncryptionBuilder>>,
    signer: RwLock<Option<Arc<dyn SigningCapability>>>,
    read_model: ReadModel,
    board: StatusBoard,
    bus: EventBus,
    state: Mutex<SubmissionState>,
}

/// Drives one score at a time through encrypt, submit and refresh.
#[derive(Clone)]
pub struct SubmissionOrchestrator {
    inner: Arc<Inner>,
}

struct SubmittingGuard<'a> {
    orchestrator: &'a SubmissionOrchestrator,
}

impl Drop for SubmittingGuard<'_> {
    fn drop(&mut self) {
        if let Ok(mut state) = self.orchestrator.inner.state.lock() {
            *state = SubmissionState::Idle;
        }
        self.orchestrator
            .inner
            .board
            .update(|s| s.is_submitting = false);
    }
}

fn read<T: Clone>(lock: &RwLock<Option<T>>) -> Option<T> {
    lock.read().ok().and_then(|v| v.clone())
}

fn write<T>(lock: &RwLock<Option<T>>, value: Option<T>) {
    if let Ok(mut current) = lock.write() {
        *current = value;
    }
}

impl SubmissionOrchestrator {
    pub fn new(read_model: ReadModel, board: StatusBoard, bus: EventBus) -> Self {
        Self {
            inner: Arc::new(Inner {
                ledger: RwLock::new(None),
                encryption: RwLock::new(None),
                signer: RwLock::new(None),
                read_model,
                board,
                bus,
                state: Mutex::new(SubmissionState::Idle),
            }),
        }
    }

    pub fn set_ledger(&self, ledger: Option<Arc<dyn LedgerWrite>>) {
        write(&self.inner.ledger, ledger)
    }

    pub fn set_encryption(&self, encryption: Option<EncryptionBuilder>) {
        write(&self.inner.encryption, encryption)
    }

    pub fn set_signer(&self, signer: Option<Arc<dyn SigningCapability>>) {
        write(&self.inner.signer, signer)
    }

    pub fn state(&self) -> SubmissionState {
        self.inner
            .state
            .lock()
            .map(|s| *s)
            .unwrap_or(SubmissionState::Idle)
    }

    pub fn is_submitting(&self) -> bool {
        self.state() == SubmissionState::Submitting
    }

    /// Whether a call to `submit_score` would get past its preconditions.
    pub fn can_submit(&self) -> bool {
        !self.is_submitting()
            && read(&self.inner.ledger).is_some()
            && read(&self.inner.encryption).is_some()
            && read(&self.inner.signer).is_some()
    }

    fn begin(&self) -> Option<SubmittingGuard<'_>> {
        let mut state = self.inner.state.lock().ok()?;
        if *state == SubmissionState::Submitting {
            return None;
        }
        *state = SubmissionState::Submitting;
        drop(state);
        self.inner.board.update(|s| {
            s.is_submitting = true;
            s.can_submit = false;
        });
        Some(SubmittingGuard { orchestrator: self })
    }

    /// Encrypt `value`, submit it to the ledger and refresh the read model.
    ///
    /// Never retries. Failures are reported through the status line, the event bus and the
    /// returned outcome.
    #[instrument(name = "submit_score", skip_all)]
    pub async fn submit_score(&self, value: impl Into<U256>) -> SubmitOutcome {
        let value = value.into();
        let (Some(ledger), Some(signer)) = (read(&self.inner.ledger), read(&self.inner.signer))
        else {
            let reason = if read(&self.inner.ledger).is_none() {
                SkipReason::NoLedger
            } else {
                SkipReason::NoSigner
            };
            self.inner.board.set_status(reason.to_string());
            return SubmitOutcome::Skipped(reason);
        };
        let Some(encryption) = read(&self.inner.encryption) else {
            self.inner
                .board
                .set_status(SkipReason::NoCoprocessor.to_string());
            return SubmitOutcome::Skipped(SkipReason::NoCoprocessor);
        };
        let Some(_guard) = self.begin() else {
            return SubmitOutcome::Skipped(SkipReason::AlreadySubmitting);
        };

        match self.run(value, ledger, signer, encryption).await {
            Ok(receipt) => {
                info!(index = receipt.entry.index, tx = %receipt.transaction_hash, "score submitted");
                self.inner
                    .board
                    .set_status(format!("Score ({value}) submitted!"));
                SubmitOutcome::Submitted(receipt)
            }
            Err(err) => {
                warn!("submission failed: {err}");
                self.inner.bus.err(&err);
                self.inner
                    .board
                    .set_status(format!("submitScore() failed: {err}"));
                SubmitOutcome::Failed(err)
            }
        }
    }

    async fn run(
        &self,
        value: U256,
        ledger: Arc<dyn LedgerWrite>,
        signer: Arc<dyn SigningCapability>,
        encryption: EncryptionBuilder,
    ) -> Result<SubmissionReceipt, ArenaError> {
        let board = &self.inner.board;
        let caller = signer.address();
        let contract = self.inner.read_model.contract();

        board.set_status(format!("Submitting score ({value})..."));
        board.set_status(format!("Encrypting with {}...", encryption.method()));
        let input = encryption.encrypt(value, contract, caller).await?;

        board.set_status("Waiting for transaction...");
        let receipt = ledger
            .submit_score(caller, input.handle, &input.proof)
            .await?;

        if let Err(err) = self.inner.read_model.refresh(caller).await {
            warn!("could not refresh score history: {err}");
        }
        Ok(receipt)
    }
}
