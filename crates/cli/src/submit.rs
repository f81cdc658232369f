// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use std::sync::Arc;

use anyhow::{bail, Result};
use arena_client::SubmitOutcome;
use arena_config::ArenaConfig;

use crate::helpers::{system::LocalSystem, wallet::configured_wallet};

pub async fn execute(config: &ArenaConfig, score: u32) -> Result<()> {
    let system = LocalSystem::setup(config)?;
    let session = system.session(config)?;
    session
        .set_signer(Some(Arc::new(configured_wallet(config)?)))
        .await?;

    match session.submit_score(score).await {
        SubmitOutcome::Submitted(receipt) => {
            println!("{}", session.snapshot().status);
            println!("index:       {}", receipt.entry.index);
            println!("handle:      {}", receipt.entry.handle);
            println!("transaction: {}", receipt.transaction_hash);
        }
        SubmitOutcome::Skipped(reason) => bail!("Submission skipped: {reason}"),
        SubmitOutcome::Failed(_) => bail!("{}", session.snapshot().status),
    }
    Ok(())
}
