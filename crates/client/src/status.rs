// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use std::{collections::HashMap, sync::Arc};

use alloy::primitives::Address;
use arena_events::{CiphertextHandle, ClearValue};
use tokio::sync::watch;

/// Everything a presentation layer needs to render a session. Read only.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub status: String,
    pub can_submit: bool,
    pub can_decrypt: bool,
    pub handles: Vec<CiphertextHandle>,
    pub submit_count: u64,
    pub results: HashMap<CiphertextHandle, ClearValue>,
    pub is_submitting: bool,
    pub is_decrypting: bool,
    pub user: Option<Address>,
    pub contract: Address,
}

impl SessionSnapshot {
    /// Decrypted history in submission order. `None` for handles not decrypted yet.
    pub fn clear_history(&self) -> Vec<Option<ClearValue>> {
        self.handles
            .iter()
            .map(|h| self.results.get(h).copied())
            .collect()
    }
}

/// Shared, observable SessionSnapshot. Every component of a session writes its part here.
#[derive(Clone, Debug)]
pub struct StatusBoard {
    tx: Arc<watch::Sender<SessionSnapshot>>,
}

impl Default for StatusBoard {
    fn default() -> Self {
        Self::new(SessionSnapshot::default())
    }
}

impl StatusBoard {
    pub fn new(initial: SessionSnapshot) -> Self {
        let (tx, _) = watch::channel(initial);
        Self { tx: Arc::new(tx) }
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.tx.subscribe()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.tx.borrow().clone()
    }

    pub fn status(&self) -> String {
        self.tx.borrow().status.clone()
    }

    pub fn update(&self, f: impl FnOnce(&mut SessionSnapshot)) {
        self.tx.send_modify(f);
    }

    /// Apply `f` only while the board still belongs to `user`. Returns whether it was applied.
    pub fn update_for(&self, user: Address, f: impl FnOnce(&mut SessionSnapshot)) -> bool {
        self.tx.send_if_modified(|s| {
            if s.user != Some(user) {
                return false;
            }
            f(s);
            true
        })
    }

    pub fn set_status(&self, status: impl Into<String>) {
        let status = status.into();
        self.update(|s| s.status = status);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribers_see_updates() -> anyhow::Result<()> {
        let board = StatusBoard::default();
        let mut rx = board.subscribe();
        board.set_status("hello");
        rx.changed().await?;
        assert_eq!(rx.borrow().status, "hello");
        Ok(())
    }

    #[test]
    fn updates_for_another_user_are_dropped() {
        let alice = Address::repeat_byte(0xA1);
        let board = StatusBoard::default();
        assert!(!board.update_for(alice, |s| s.submit_count = 3));

        board.update(|s| s.user = Some(alice));
        assert!(board.update_for(alice, |s| s.submit_count = 3));
        board.update(|s| s.user = Some(Address::repeat_byte(0xB0)));
        assert!(!board.update_for(alice, |s| s.submit_count = 9));
        assert_eq!(board.snapshot().submit_count, 3);
    }

    #[test]
    fn clear_history_follows_handle_order() {
        let a = CiphertextHandle::new([1u8; 32].into());
        let b = CiphertextHandle::new([2u8; 32].into());
        let snapshot = SessionSnapshot {
            handles: vec![a, b],
            results: HashMap::from([(b, ClearValue::from(9))]),
            ..Default::default()
        };
        assert_eq!(snapshot.clear_history(), vec![None, Some(ClearValue::from(9))]);
    }
}
