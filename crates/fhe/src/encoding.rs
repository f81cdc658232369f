// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy_primitives::U256;
use anyhow::{bail, Result};
use arena_events::EncryptedType;

/// Width of one plaintext limb. Every limb is below the plaintext modulus of all presets.
pub const LIMB_BITS: u16 = 16;

/// Number of limbs a value of the given type is split into.
pub fn limb_count(encrypted_type: EncryptedType) -> usize {
    (encrypted_type.bits().div_ceil(LIMB_BITS)).max(1) as usize
}

/// Split `value` into little endian 16 bit limbs.
pub fn encode_limbs(value: U256, encrypted_type: EncryptedType) -> Vec<u64> {
    let bytes = value.to_le_bytes::<32>();
    bytes
        .chunks(2)
        .take(limb_count(encrypted_type))
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]) as u64)
        .collect()
}

/// Reassemble a value from decrypted limbs. Coefficients past the type's limb count are ignored.
pub fn decode_limbs(limbs: &[u64], encrypted_type: EncryptedType) -> Result<U256> {
    let count = limb_count(encrypted_type);
    if limbs.len() < count {
        bail!("expected {} limbs, got {}", count, limbs.len());
    }

    let mut bytes = [0u8; 32];
    for (i, limb) in limbs.iter().take(count).enumerate() {
        if *limb > u16::MAX as u64 {
            bail!("limb {} out of range: {}", i, limb);
        }
        bytes[2 * i..2 * i + 2].copy_from_slice(&(*limb as u16).to_le_bytes());
    }
    let value = U256::from_le_bytes(bytes);
    if value > encrypted_type.max_value() {
        bail!("decoded value does not fit in {}", encrypted_type);
    }
    Ok(value)
}
