// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy::primitives::Address;
use anyhow::Result;
use arena_config::ArenaConfig;
use arena_ledger::LedgerRead;

use crate::helpers::{system::LocalSystem, wallet::configured_wallet};

pub async fn execute(config: &ArenaConfig, user: Option<Address>) -> Result<()> {
    let user = match user {
        Some(user) => user,
        None => configured_wallet(config)?.address(),
    };
    let system = LocalSystem::setup(config)?;
    let handles = system.ledger.get_score_history(user).await?;
    if handles.is_empty() {
        println!("No scores submitted by {user}");
    }
    for (index, handle) in handles.iter().enumerate() {
        println!("{index:>4}  {handle}");
    }
    Ok(())
}
