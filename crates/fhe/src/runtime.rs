// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy_primitives::U256;
use anyhow::{anyhow, Context, Result};
use arena_events::EncryptedType;
use fhe::bfv::{BfvParameters, Ciphertext, Encoding, Plaintext, PublicKey, SecretKey};
use fhe_traits::{
    DeserializeParametrized, FheDecoder, FheDecrypter, FheEncoder, FheEncrypter, Serialize,
};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use std::sync::{Arc, Mutex, MutexGuard};
use zeroize::Zeroizing;

use crate::{decode_limbs, encode_limbs, BfvPreset};

pub type SharedRng = Arc<Mutex<ChaCha20Rng>>;

pub fn shared_rng_from_entropy() -> SharedRng {
    Arc::new(Mutex::new(ChaCha20Rng::from_entropy()))
}

pub fn shared_rng_from_seed(seed: u64) -> SharedRng {
    Arc::new(Mutex::new(ChaCha20Rng::seed_from_u64(seed)))
}

/// A BFV key pair. The public key is always derived from the secret.
pub struct FheKeys {
    secret: SecretKey,
    public: PublicKey,
}

impl FheKeys {
    pub fn public_key(&self) -> &PublicKey {
        &self.public
    }
}

/// Fhe library adaptor.
#[derive(Clone)]
pub struct Fhe {
    pub params: Arc<BfvParameters>,
    rng: SharedRng,
}

impl Fhe {
    pub fn new(params: Arc<BfvParameters>, rng: SharedRng) -> Self {
        Self { params, rng }
    }

    pub fn from_preset(preset: BfvPreset, rng: SharedRng) -> Result<Self> {
        Ok(Self::new(preset.build()?, rng))
    }

    fn rng(&self) -> Result<MutexGuard<'_, ChaCha20Rng>> {
        self.rng.lock().map_err(|_| anyhow!("fhe rng lock poisoned"))
    }

    /// Fresh secret key in its persisted form.
    pub fn generate_secret_key(&self) -> Result<Zeroizing<Vec<u8>>> {
        let sk = SecretKey::random(&self.params, &mut *self.rng()?);
        Ok(Zeroizing::new(SecretKeySerializer::to_bytes(&sk)?))
    }

    /// Restore a key pair from a persisted secret key.
    pub fn load_keys(&self, secret: &[u8]) -> Result<FheKeys> {
        let secret = SecretKeySerializer::from_bytes(secret, &self.params)?;
        let public = PublicKey::new(&secret, &mut *self.rng()?);
        Ok(FheKeys { secret, public })
    }

    /// Encrypt `value` as `encrypted_type` and return the serialized ciphertext.
    pub fn encrypt_value(
        &self,
        pk: &PublicKey,
        value: U256,
        encrypted_type: EncryptedType,
    ) -> Result<Vec<u8>> {
        let limbs = encode_limbs(value, encrypted_type);
        let pt = Plaintext::try_encode(&limbs, Encoding::poly(), &self.params)
            .map_err(|e| anyhow!("Error encoding plaintext: {e}"))?;
        let ct = pk
            .try_encrypt(&pt, &mut *self.rng()?)
            .map_err(|e| anyhow!("Error encrypting data: {e}"))?;
        Ok(ct.to_bytes())
    }

    pub fn decrypt_value(
        &self,
        keys: &FheKeys,
        ciphertext: &[u8],
        encrypted_type: EncryptedType,
    ) -> Result<U256> {
        let ct = Ciphertext::from_bytes(ciphertext, &self.params)
            .context("Error deserializing ciphertext")?;
        let pt = keys
            .secret
            .try_decrypt(&ct)
            .map_err(|e| anyhow!("Error decrypting ciphertext: {e}"))?;
        let limbs = Vec::<u64>::try_decode(&pt, Encoding::poly())
            .map_err(|e| anyhow!("Error decoding plaintext: {e}"))?;
        decode_limbs(&limbs, encrypted_type)
    }
}

struct SecretKeySerializer;

#[derive(serde::Serialize, serde::Deserialize)]
struct SecretKeyData {
    coeffs: Box<[i64]>,
}

impl SecretKeySerializer {
    pub fn to_bytes(inner: &SecretKey) -> Result<Vec<u8>> {
        Ok(bincode::serialize(&SecretKeyData {
            coeffs: inner.coeffs.clone(),
        })?)
    }

    pub fn from_bytes(bytes: &[u8], params: &Arc<BfvParameters>) -> Result<SecretKey> {
        let SecretKeyData { coeffs } =
            bincode::deserialize(bytes).context("Could not deserialize secret key")?;
        Ok(SecretKey::new(coeffs.to_vec(), params))
    }
}
