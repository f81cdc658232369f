// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use std::sync::Arc;

use anyhow::{bail, Result};
use arena_client::{LocalWallet, SubmitOutcome};
use arena_config::ArenaConfig;

use crate::{decrypt::decrypt_and_print, helpers::system::LocalSystem};

/// Submit every score from a fresh wallet, then decrypt the history. Nothing is persisted.
pub async fn execute(config: &ArenaConfig, scores: Vec<u32>) -> Result<()> {
    let system = LocalSystem::setup(config)?;
    let session = system.session(config)?;
    let wallet = LocalWallet::random();
    println!("Playing as {}", wallet.address());
    session.set_signer(Some(Arc::new(wallet))).await?;

    for score in scores {
        match session.submit_score(score).await {
            SubmitOutcome::Submitted(_) => println!("{}", session.snapshot().status),
            SubmitOutcome::Skipped(reason) => bail!("Submission skipped: {reason}"),
            SubmitOutcome::Failed(_) => bail!("{}", session.snapshot().status),
        }
    }
    println!("Submitted {} score(s)", session.snapshot().submit_count);
    decrypt_and_print(&session).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use arena_config::ConfigFile;
    use std::path::Path;

    #[tokio::test]
    async fn plays_in_memory() -> Result<()> {
        let config = ArenaConfig::try_from_file(
            ConfigFile {
                in_mem: true,
                ..ConfigFile::default()
            },
            Path::new("/unused/data"),
            Path::new("/unused/config"),
            Path::new("/unused"),
        )?;
        execute(&config, vec![5, 15, 25]).await?;
        Ok(())
    }
}
