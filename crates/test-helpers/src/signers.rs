// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use alloy::primitives::{Address, Signature};
use alloy::sol_types::Eip712Domain;
use arena_client::{LocalWallet, SigningCapability};
use arena_coprocessor::UserDecryptRequest;
use arena_events::ArenaError;
use async_trait::async_trait;

/// An account that refuses every signature request.
#[derive(Clone, Debug)]
pub struct DecliningSigner {
    address: Address,
}

impl DecliningSigner {
    pub fn new(address: Address) -> Self {
        Self { address }
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
        Err(ArenaError::AuthorizationDenied(
            "user rejected the request".into(),
        ))
    }
}

/// Signs with the wrapped wallet and counts how often it was asked.
#[derive(Clone)]
pub struct CountingSigner {
    wallet: LocalWallet,
    prompts: Arc<AtomicUsize>,
}

impl CountingSigner {
    pub fn new(wallet: LocalWallet) -> Self {
        Self {
            wallet,
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
