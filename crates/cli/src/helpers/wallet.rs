// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy::primitives::{Address, Signature};
use alloy::sol_types::Eip712Domain;
use anyhow::{Context, Result};
use arena_client::{LocalWallet, SigningCapability};
use arena_config::ArenaConfig;
use arena_coprocessor::UserDecryptRequest;
use arena_events::ArenaError;
use async_trait::async_trait;

use crate::helpers::prompt::prompt_confirm;

/// The wallet configured through `private_key` / `ARENA_PRIVATE_KEY`.
pub fn configured_wallet(config: &ArenaConfig) -> Result<LocalWallet> {
    let key = config.private_key().context(
        "No wallet configured. Set `private_key` in arena.config.yaml or ARENA_PRIVATE_KEY.",
    )?;
    LocalWallet::from_private_key(key.expose())
}

/// Asks on the terminal before signing a decryption authorization.
pub struct PromptingSigner {
    wallet: LocalWallet,
}

impl PromptingSigner {
    pub fn new(wallet: LocalWallet) -> Self {
        Self { wallet }
    }
}

#[async_trait]
impl SigningCapability for PromptingSigner {
    fn address(&self) -> Address {
        self.wallet.address()
    }

    async fn sign_authorization(
        &self,
        request: &UserDecryptRequest,
        domain: &Eip712Domain,
    ) -> Result<Signature, ArenaError> {
        let days = request.durationSeconds.saturating_to::<u64>() / (24 * 60 * 60);
        let prompt = format!(
            "Allow {} to decrypt your scores on {} for {} day(s)?",
            self.wallet.address(),
            request.contractAddress,
            days
        );
        let confirmed = tokio::task::spawn_blocking(move || prompt_confirm(prompt))
            .await
            .map_err(|e| ArenaError::AuthorizationDenied(e.to_string()))?
            .map_err(|e| ArenaError::AuthorizationDenied(format!("{e:#}")))?;
        if !confirmed {
            return Err(ArenaError::AuthorizationDenied(
                "user rejected the request".into(),
            ));
        }
        self.wallet.sign_authorization(request, domain).await
    }
}
