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
    println!("{}", system.ledger.get_submit_count(user).await?);
    Ok(())
}
