// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use std::sync::{Arc, Mutex};

use tokio::sync::broadcast;
use tracing::{debug, error};

use crate::{ArenaError, ArenaEvent, PipelineError};

pub const DEFAULT_BUS_CAPACITY: usize = 1024;

/// Configuration for EventBus behavior
#[derive(Clone, Debug)]
pub struct EventBusConfig {
    pub capacity: usize,
    /// Keep every published event so tests can inspect what happened.
    pub capture_history: bool,
}

impl Default for EventBusConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_BUS_CAPACITY,
            capture_history: false,
        }
    }
}

/// Process-local fan-out of ArenaEvents. Cloning yields another handle to the same bus.
///
/// Publishing never blocks and never fails: events published while nobody is subscribed are
/// dropped (but still recorded when history capture is on).
#[derive(Clone, Debug)]
pub struct EventBus {
    tx: broadcast::Sender<ArenaEvent>,
    history: Option<Arc<Mutex<Vec<ArenaEvent>>>>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(EventBusConfig::default())
    }
}

impl EventBus {
    pub fn new(config: EventBusConfig) -> Self {
        let (tx, _) = broadcast::channel(config.capacity.max(1));
        Self {
            tx,
            history: config
                .capture_history
                .then(|| Arc::new(Mutex::new(Vec::new()))),
        }
    }

    /// A bus that records everything published on it.
    pub fn with_history() -> Self {
        Self::new(EventBusConfig {
            capture_history: true,
            ..EventBusConfig::default()
        })
    }

    pub fn publish(&self, data: impl Into<ArenaEvent>) {
        let event: ArenaEvent = data.into();
        debug!(">>> {}", event);
        if let Some(history) = &self.history {
            match history.lock() {
                Ok(mut h) => h.push(event.clone()),
                Err(_) => error!("event history lock poisoned; dropping record of {}", event),
            }
        }
        // An error only means there are no receivers right now.
        let _ = self.tx.send(event);
    }

    /// Publish an error event for the given failure.
    pub fn err(&self, error: &ArenaError) {
        self.publish(PipelineError::from(error))
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ArenaEvent> {
        self.tx.subscribe()
    }

    /// Everything published so far. Empty unless history capture is on.
    pub fn history(&self) -> Vec<ArenaEvent> {
        self.history
            .as_ref()
            .and_then(|h| h.lock().ok().map(|h| h.clone()))
            .unwrap_or_default()
    }

    /// Recorded events of a single type, e.g. `"ScoreSubmitted"`.
    pub fn history_of(&self, event_type: &str) -> Vec<ArenaEvent> {
        self.history()
            .into_iter()
            .filter(|e| e.event_type() == event_type)
            .collect()
    }
}
