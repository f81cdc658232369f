// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use std::sync::Arc;

use anyhow::{anyhow, Result};
use fhe::bfv::{BfvParameters, BfvParametersBuilder};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Named BFV parameter sets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
pub enum BfvPreset {
    /// Small and fast. DO NOT USE IN PRODUCTION
    #[default]
    #[serde(rename = "INSECURE_SET_2048")]
    #[strum(serialize = "INSECURE_SET_2048")]
    InsecureSet2048,
    #[serde(rename = "SECURE_SET_8192")]
    #[strum(serialize = "SECURE_SET_8192")]
    SecureSet8192,
}

pub struct BfvParamSet {
    pub degree: usize,
    pub plaintext_modulus: u64,
    pub moduli: &'static [u64],
}

impl BfvPreset {
    pub fn param_set(&self) -> BfvParamSet {
        match self {
            BfvPreset::InsecureSet2048 => BfvParamSet {
                degree: 2048,
                plaintext_modulus: 1032193,
                moduli: &[0x3FFFFFFF000001],
            },
            BfvPreset::SecureSet8192 => BfvParamSet {
                degree: 8192,
                plaintext_modulus: 1032193,
                moduli: &[288230376173076481, 288230376167047169],
            },
        }
    }

    pub fn build(&self) -> Result<Arc<BfvParameters>> {
        let set = self.param_set();
        build_bfv_params_arc(set.degree, set.plaintext_modulus, set.moduli)
    }
}

pub fn build_bfv_params_arc(
    degree: usize,
    plaintext_modulus: u64,
    moduli: &[u64],
) -> Result<Arc<BfvParameters>> {
    BfvParametersBuilder::new()
        .set_degree(degree)
        .set_plaintext_modulus(plaintext_modulus)
        .set_moduli(moduli)
        .build_arc()
        .map_err(|e| anyhow!("Failed to build BFV parameters: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn preset_names_parse() {
        assert_eq!(
            BfvPreset::from_str("INSECURE_SET_2048").unwrap(),
            BfvPreset::InsecureSet2048
        );
        assert_eq!(BfvPreset::SecureSet8192.to_string(), "SECURE_SET_8192");
    }

    #[test]
    fn default_preset_builds() {
        let params = BfvPreset::default().build().unwrap();
        assert_eq!(params.degree(), 2048);
        assert_eq!(params.plaintext(), 1032193);
    }
}
