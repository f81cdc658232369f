// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use alloy::primitives::{Address, Signature, B256};
use alloy::signers::{local::PrivateKeySigner, SignerSync};
use alloy::sol_types::Eip712Domain;
use arena_coprocessor::{
    authorization_domain, DecryptionAuthorization, EncryptionBackend, EncryptionRequest,
    LocalCoprocessor, LocalCoprocessorConfig, UserDecryptRequest,
};
use arena_data::DataStore;
use arena_events::{
    ArenaError, CiphertextHandle, EncryptedType, EventBus, SubmissionProof, SubmissionReceipt,
    U256,
};
use arena_fhe::shared_rng_from_seed;
use arena_ledger::{LedgerInterface, LedgerWrite, LocalLedgerClient, ScoreLedger};
use arena_utils::ManualClock;
use async_trait::async_trait;
use tokio::sync::Notify;

use crate::{LocalWallet, SigningCapability};

pub const START: u64 = 1_700_000_000;

pub fn contract() -> Address {
    Address::repeat_byte(0xC0)
}

pub fn sign_authorization(start: u64, duration: u64) -> (DecryptionAuthorization, Address, Address) {
    let signer = PrivateKeySigner::random();
    let request = UserDecryptRequest::build(signer.address(), contract(), start, duration, B256::ZERO);
    let domain = authorization_domain(31337, Address::ZERO);
    let signature = signer.sign_hash_sync(&request.signing_hash(&domain)).unwrap();
    (
        DecryptionAuthorization::new(request, signature),
        contract(),
        signer.address(),
    )
}

/// Local coprocessor and ledger sharing one in-memory store.
pub struct LocalStack {
    pub copro: LocalCoprocessor,
    pub ledger: LocalLedgerClient,
    pub interface: LedgerInterface,
    pub clock: ManualClock,
    pub bus: EventBus,
}

pub fn local_stack() -> LocalStack {
    let store = DataStore::in_mem();
    let clock = ManualClock::new(START);
    let copro = LocalCoprocessor::new(
        store.base("//coprocessor"),
        Arc::new(clock.clone()),
        LocalCoprocessorConfig::default(),
        shared_rng_from_seed(11),
    )
    .unwrap();
    let bus = EventBus::with_history();
    let ledger = ScoreLedger::new(
        contract(),
        store.base("//ledger"),
        Arc::new(copro.clone()),
        bus.clone(),
    );
    LocalStack {
        copro,
        ledger: LocalLedgerClient::new(ledger),
        interface: LedgerInterface::bundled().unwrap(),
        clock,
        bus,
    }
}

/// Encrypt and submit each value as `user`, returning the handles in order.
pub async fn submit_values(
    stack: &LocalStack,
    user: Address,
    values: &[u64],
) -> anyhow::Result<Vec<CiphertextHandle>> {
    let mut handles = Vec::new();
    for value in values {
        let input = stack
            .copro
            .encrypt(EncryptionRequest {
                value: U256::from(*value),
                encrypted_type: EncryptedType::Uint32,
                contract: contract(),
                user,
            })
            .await?;
        stack
            .ledger
            .submit_score(user, input.handle, &input.proof)
            .await?;
        handles.push(input.handle);
    }
    Ok(handles)
}

/// Signs every prompt and counts them.
#[derive(Clone)]
pub struct CountingSigner {
    wallet: LocalWallet,
    prompts: Arc<AtomicUsize>,
}

impl CountingSigner {
    pub fn new() -> Self {
        Self {
            wallet: LocalWallet::random(),
            prompts: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn prompts(&self) -> usize {
        self.prompts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SigningCapability for CountingSigner {
    fn address(&self) -> Address {
        self.wallet.address()
    }

    async fn sign_authorization(
        &self,
        request: &UserDecryptRequest,
        domain: &Eip712Domain,
    ) -> Result<Signature, ArenaError> {
        self.prompts.fetch_add(1, Ordering::SeqCst);
        self.wallet.sign_authorization(request, domain).await
    }
}

/// Declines every prompt.
#[derive(Clone)]
pub struct DecliningSigner {
    address: Address,
}

impl DecliningSigner {
    pub fn new() -> Self {
        Self {
            address: Address::repeat_byte(0xDD),
        }
    }
}

#[async_trait]
impl SigningCapability for DecliningSigner {
    fn address(&self) -> Address {
        self.address
    }

    async fn sign_authorization(
        &self,
        _request: &UserDecryptRequest,
        _domain: &Eip712Domain,
    ) -> Result<Signature, ArenaError> {
        Err(ArenaError::AuthorizationDenied("user rejected the request".into()))
    }
}

/// Holds every prompt open until released.
#[derive(Clone)]
pub struct GatedSigner {
    wallet: LocalWallet,
    prompted: Arc<Notify>,
    gate: Arc<Notify>,
}

impl GatedSigner {
    pub fn new() -> Self {
        Self {
            wallet: LocalWallet::random(),
            prompted: Arc::new(Notify::new()),
            gate: Arc::new(Notify::new()),
        }
    }

    pub async fn wait_for_prompt(&self) {
        self.prompted.notified().await
    }

    pub fn release(&self) {
        self.gate.notify_one()
    }
}

#[async_trait]
impl SigningCapability for GatedSigner {
    fn address(&self) -> Address {
        self.wallet.address()
    }

    async fn sign_authorization(
        &self,
        request: &UserDecryptRequest,
        domain: &Eip712Domain,
    ) -> Result<Signature, ArenaError> {
        self.prompted.notify_one();
        self.gate.notified().await;
        self.wallet.sign_authorization(request, domain).await
    }
}

/// Holds every submission until released.
#[derive(Clone)]
pub struct StalledLedger {
    entered: Arc<Notify>,
    gate: Arc<Notify>,
    inner: LocalLedgerClient,
}

impl StalledLedger {
    pub fn new(inner: LocalLedgerClient) -> Self {
        Self {
            entered: Arc::new(Notify::new()),
            gate: Arc::new(Notify::new()),
            inner,
        }
    }

    pub async fn wait_for_submission(&self) {
        self.entered.notified().await
    }

    pub fn release(&self) {
        self.gate.notify_one()
    }
}

#[async_trait]
impl LedgerWrite for StalledLedger {
    async fn submit_score(
        &self,
        caller: Address,
        handle: CiphertextHandle,
        proof: &SubmissionProof,
    ) -> Result<SubmissionReceipt, ArenaError> {
        self.entered.notify_one();
        self.gate.notified().await;
        self.inner.submit_score(caller, handle, proof).await
    }
}
