// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use anyhow::{Context, Result};
use arena_events::{ArenaError, EncryptedType};
use serde::Deserialize;
use std::path::Path;

/// The ledger's published interface description, as shipped with this crate.
pub const SCORE_LEDGER_ABI: &str = include_str!("../abi/ScoreLedger.json");

pub const SUBMIT_SCORE: &str = "submitScore";

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbiParam {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default)]
    pub internal_type: Option<String>,
    #[serde(default)]
    pub indexed: Option<bool>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbiEntry {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub inputs: Vec<AbiParam>,
    #[serde(default)]
    pub outputs: Vec<AbiParam>,
    #[serde(default)]
    pub state_mutability: Option<String>,
}

impl AbiEntry {
    /// Canonical signature, e.g. `submitScore(bytes32,bytes)`.
    pub fn signature(&self) -> String {
        let types: Vec<&str> = self.inputs.iter().map(|p| p.ty.as_str()).collect();
        format!(
            "{}({})",
            self.name.as_deref().unwrap_or_default(),
            types.join(",")
        )
    }
}

/// Parsed interface description of a ledger contract.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LedgerInterface {
    entries: Vec<AbiEntry>,
}

impl LedgerInterface {
    pub fn parse(json: &str) -> Result<Self> {
        let entries = serde_json::from_str(json).context("Could not parse interface description")?;
        Ok(Self { entries })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Could not read interface description {}", path.display()))?;
        Self::parse(&json)
    }

    /// The interface bundled with this crate.
    pub fn bundled() -> Result<Self> {
        Self::parse(SCORE_LEDGER_ABI)
    }

    pub fn entries(&self) -> &[AbiEntry] {
        &self.entries
    }

    pub fn function(&self, name: &str) -> Option<&AbiEntry> {
        self.entries
            .iter()
            .find(|e| e.kind == "function" && e.name.as_deref() == Some(name))
    }

    pub fn event(&self, name: &str) -> Option<&AbiEntry> {
        self.entries
            .iter()
            .find(|e| e.kind == "event" && e.name.as_deref() == Some(name))
    }

    /// Encrypted type declared by the first parameter of `function`.
    pub fn submission_input_type(&self, function: &str) -> Result<EncryptedType, ArenaError> {
        let entry = self
            .function(function)
            .ok_or_else(|| ArenaError::NoCapability(format!("No ABI for {function}")))?;
        let first = entry
            .inputs
            .first()
            .ok_or_else(|| ArenaError::NoCapability(format!("No inputs for {function}")))?;
        let internal_type = first.internal_type.as_deref().unwrap_or(first.ty.as_str());
        EncryptedType::from_internal_type(internal_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::IScoreLedger;
    use alloy::sol_types::{SolCall, SolEvent};

    #[test]
    fn bundled_interface_declares_euint32_scores() -> Result<()> {
        let iface = LedgerInterface::bundled()?;
        assert_eq!(
            iface.submission_input_type(SUBMIT_SCORE)?,
            EncryptedType::Uint32
        );
        Ok(())
    }

    #[test]
    fn bundled_interface_matches_binding() -> Result<()> {
        let iface = LedgerInterface::bundled()?;
        let sig = |name: &str| iface.function(name).map(|f| f.signature());

        assert_eq!(
            sig("submitScore").as_deref(),
            Some(IScoreLedger::submitScoreCall::SIGNATURE)
        );
        assert_eq!(
            sig("getScoreHistory").as_deref(),
            Some(IScoreLedger::getScoreHistoryCall::SIGNATURE)
        );
        assert_eq!(
            sig("getSubmitCount").as_deref(),
            Some(IScoreLedger::getSubmitCountCall::SIGNATURE)
        );
        assert_eq!(
            iface.event("ScoreSubmitted").map(|e| e.signature()).as_deref(),
            Some(IScoreLedger::ScoreSubmitted::SIGNATURE)
        );
        Ok(())
    }

    #[test]
    fn missing_function_or_inputs() -> Result<()> {
        let iface = LedgerInterface::parse(
            r#"[{"type":"function","name":"noop","inputs":[]}]"#,
        )?;
        assert!(matches!(
            iface.submission_input_type("submitScore"),
            Err(ArenaError::NoCapability(msg)) if msg == "No ABI for submitScore"
        ));
        assert!(matches!(
            iface.submission_input_type("noop"),
            Err(ArenaError::NoCapability(msg)) if msg == "No inputs for noop"
        ));
        Ok(())
    }

    #[test]
    fn plain_integer_parameters_have_no_method() -> Result<()> {
        let iface = LedgerInterface::parse(
            r#"[{"type":"function","name":"submitScore","inputs":[{"name":"s","type":"uint32","internalType":"uint32"}]}]"#,
        )?;
        assert!(matches!(
            iface.submission_input_type("submitScore"),
            Err(ArenaError::UnsupportedWidth(_))
        ));
        Ok(())
    }
}
