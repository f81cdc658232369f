// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy::primitives::{Address, B256, U256};
use alloy::signers::local::PrivateKeySigner;
use anyhow::Result;
use arena_client::LocalWallet;
use arena_coprocessor::{DecryptionAuthorization, UserDecryptRequest};
use alloy::signers::SignerSync;
use alloy::sol_types::Eip712Domain;
use arena_fhe::{shared_rng_from_seed, SharedRng};
use rand::Rng;
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::{fmt, EnvFilter};

pub fn rand_eth_addr(rng: &mut impl Rng) -> Address {
    Address::from(rng.gen::<[u8; 20]>())
}

pub fn create_shared_rng_from_u64(seed: u64) -> SharedRng {
    shared_rng_from_seed(seed)
}

/// Wallet with a key derived from `seed`.
pub fn wallet_from_seed(seed: u8) -> Result<(LocalWallet, PrivateKeySigner)> {
    let key = B256::repeat_byte(seed.max(1));
    let signer = PrivateKeySigner::from_bytes(&key)?;
    Ok((LocalWallet::new(signer.clone()), signer))
}

/// Sign an authorization for `(contract, signer)` directly, bypassing any prompt.
pub fn sign_authorization(
    signer: &PrivateKeySigner,
    contract: Address,
    domain: &Eip712Domain,
    start: u64,
    duration: u64,
) -> Result<DecryptionAuthorization> {
    let request = UserDecryptRequest::build(signer.address(), contract, start, duration, B256::ZERO);
    let signature = signer.sign_hash_sync(&request.signing_hash(domain))?;
    Ok(DecryptionAuthorization::new(request, signature))
}

pub fn to_u64(value: U256) -> u64 {
    value.saturating_to::<u64>()
}

/// Route this test's logs to the test writer. Keep the guard alive for the test's duration.
pub fn setup_test_tracing(filter: &str) -> DefaultGuard {
    let subscriber = fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_test_writer()
        .finish();
    tracing::subscriber::set_default(subscriber)
}
