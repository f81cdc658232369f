// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use crate::ArenaError;

/// The encrypted scalar types a coprocessor can produce inputs for.
///
/// The discriminant is the type tag carried in byte 30 of every handle.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, EnumIter,
)]
#[repr(u8)]
pub enum EncryptedType {
    #[strum(serialize = "ebool")]
    Bool = 0,
    #[strum(serialize = "euint8")]
    Uint8 = 2,
    #[strum(serialize = "euint16")]
    Uint16 = 3,
    #[strum(serialize = "euint32")]
    Uint32 = 4,
    #[strum(serialize = "euint64")]
    Uint64 = 5,
    #[strum(serialize = "euint128")]
    Uint128 = 6,
    #[strum(serialize = "eaddress")]
    Address = 7,
    #[strum(serialize = "euint256")]
    Uint256 = 8,
}

impl EncryptedType {
    /// Resolve the encrypted type declared by a contract parameter's `internalType`.
    ///
    /// Both the external input form (`externalEuint32`) and the stored form (`euint32`) are
    /// accepted. Anything else has no encryption method and is rejected.
    pub fn from_internal_type(internal_type: &str) -> Result<Self, ArenaError> {
        let name = internal_type
            .strip_prefix("externalE")
            .or_else(|| internal_type.strip_prefix('e'))
            .ok_or_else(|| ArenaError::UnsupportedWidth(internal_type.to_string()))?;

        use EncryptedType::*;
        Ok(match name {
            "bool" => Bool,
            "uint8" => Uint8,
            "uint16" => Uint16,
            "uint32" => Uint32,
            "uint64" => Uint64,
            "uint128" => Uint128,
            "uint256" => Uint256,
            "address" => Address,
            _ => return Err(ArenaError::UnsupportedWidth(internal_type.to_string())),
        })
    }

    /// Resolve an encrypted type from a plain bit width.
    pub fn from_bits(bits: u16) -> Result<Self, ArenaError> {
        use EncryptedType::*;
        Ok(match bits {
            1 => Bool,
            8 => Uint8,
            16 => Uint16,
            32 => Uint32,
            64 => Uint64,
            128 => Uint128,
            160 => Address,
            256 => Uint256,
            _ => return Err(ArenaError::UnsupportedWidth(format!("{bits} bits"))),
        })
    }

    pub fn from_tag(tag: u8) -> Option<Self> {
        use EncryptedType::*;
        match tag {
            0 => Some(Bool),
            2 => Some(Uint8),
            3 => Some(Uint16),
            4 => Some(Uint32),
            5 => Some(Uint64),
            6 => Some(Uint128),
            7 => Some(Address),
            8 => Some(Uint256),
            _ => None,
        }
    }

    pub fn tag(&self) -> u8 {
        *self as u8
    }

    pub fn bits(&self) -> u16 {
        use EncryptedType::*;
        match self {
            Bool => 1,
            Uint8 => 8,
            Uint16 => 16,
            Uint32 => 32,
            Uint64 => 64,
            Uint128 => 128,
            Address => 160,
            Uint256 => 256,
        }
    }

    /// Name of the input builder method that encrypts this type.
    pub fn method(&self) -> &'static str {
        use EncryptedType::*;
        match self {
            Bool => "addBool",
            Uint8 => "add8",
            Uint16 => "add16",
            Uint32 => "add32",
            Uint64 => "add64",
            Uint128 => "add128",
            Address => "addAddress",
            Uint256 => "add256",
        }
    }

    pub fn max_value(&self) -> U256 {
        let bits = self.bits() as usize;
        if bits >= 256 {
            return U256::MAX;
        }
        (U256::from(1u8) << bits) - U256::from(1u8)
    }

    pub fn check_value(&self, value: U256) -> Result<(), ArenaError> {
        if value > self.max_value() {
            return Err(ArenaError::ValueOutOfRange {
                value,
                encrypted_type: *self,
            });
        }
        Ok(())
    }
}
