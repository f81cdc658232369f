// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use std::sync::Arc;

use alloy::primitives::Address;
use arena_events::{ArenaError, CiphertextHandle};
use arena_ledger::LedgerRead;
use tracing::debug;

use crate::StatusBoard;

/// Local view of one user's ledger state, refreshed on demand.
#[derive(Clone)]
pub struct ReadModel {
    reader: Arc<dyn LedgerRead>,
    board: StatusBoard,
}

impl ReadModel {
    pub fn new(reader: Arc<dyn LedgerRead>, board: StatusBoard) -> Self {
        Self { reader, board }
    }

    pub fn contract(&self) -> Address {
        self.reader.contract()
    }

    /// Re-read history and count for `user` and publish them, unless the board has since
    /// switched to another account.
    pub async fn refresh(&self, user: Address) -> Result<Vec<CiphertextHandle>, ArenaError> {
        let handles = self.reader.get_score_history(user).await?;
        let submit_count = self.reader.get_submit_count(user).await?;
        let published = handles.clone();
        let applied = self.board.update_for(user, move |s| {
            s.results.retain(|h, _| published.contains(h));
            s.handles = published;
            s.submit_count = submit_count;
        });
        if applied {
            debug!(%user, submit_count, "read model refreshed");
        } else {
            debug!(%user, "account switched, refresh dropped");
        }
        Ok(handles)
    }

    /// Forget the published view, e.g. when the account changes.
    pub fn clear(&self) {
        self.board.update(|s| {
            s.handles.clear();
            s.results.clear();
            s.submit_count = 0;
        });
    }

    pub fn handles(&self) -> Vec<CiphertextHandle> {
        self.board.snapshot().handles
    }
}
