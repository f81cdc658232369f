// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use anyhow::{Context, Result};
use arena_config::ArenaConfig;
use arena_data::SledDb;
use tracing::info;

/// Delete all local data for this node
pub async fn execute(config: &ArenaConfig) -> Result<()> {
    SledDb::close_all_connections();
    let db_file = config.db_file();
    let data_dir = config.data_dir();
    if !db_file.starts_with(&data_dir) && db_file.exists() {
        tokio::fs::remove_dir_all(&db_file)
            .await
            .with_context(|| format!("Could not remove {}", db_file.display()))?;
    }
    if !data_dir.exists() {
        println!("Nothing to purge at {}", data_dir.display());
        return Ok(());
    }
    tokio::fs::remove_dir_all(&data_dir)
        .await
        .with_context(|| format!("Could not remove {}", data_dir.display()))?;
    info!(dir = ?data_dir, "purged local data");
    println!("Purged {}", data_dir.display());
    Ok(())
}
