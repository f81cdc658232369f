// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use std::sync::Arc;

use anyhow::{bail, Result};
use arena_client::{ArenaSession, SessionSnapshot, SigningCapability};
use arena_config::ArenaConfig;

use crate::helpers::{
    system::LocalSystem,
    wallet::{configured_wallet, PromptingSigner},
};

pub async fn execute(config: &ArenaConfig, yes: bool) -> Result<()> {
    let system = LocalSystem::setup(config)?;
    let session = system.session(config)?;
    let wallet = configured_wallet(config)?;
    let signer: Arc<dyn SigningCapability> = if yes {
        Arc::new(wallet)
    } else {
        Arc::new(PromptingSigner::new(wallet))
    };
    session.set_signer(Some(signer)).await?;
    decrypt_and_print(&session).await
}

pub async fn decrypt_and_print(session: &ArenaSession) -> Result<()> {
    if session.snapshot().handles.is_empty() {
        println!("Nothing to decrypt");
        return Ok(());
    }
    let result = session.decrypt_history().await?;
    let snapshot = session.snapshot();
    print_history(&snapshot);
    if !result.is_complete() {
        bail!("{}", snapshot.status);
    }
    Ok(())
}

pub fn print_history(snapshot: &SessionSnapshot) {
    for (index, value) in snapshot.clear_history().into_iter().enumerate() {
        match value {
            Some(value) => println!("{index:>4}  {value}"),
            None => println!("{index:>4}  <encrypted>"),
        }
    }
}
