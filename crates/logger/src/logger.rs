// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use arena_events::{ArenaEvent, EventBus};
use tokio::{sync::broadcast::error::RecvError, task::JoinHandle};
use tracing::{error, info, warn, Instrument};

pub trait EventLogging {
    fn log(&self, logger_name: &str);
}

impl EventLogging for ArenaEvent {
    fn log(&self, logger_name: &str) {
        match self {
            ArenaEvent::PipelineError(_) => error!(me = logger_name, event = %self, "ERROR!"),
            ArenaEvent::SubmissionRejected(_) => {
                warn!(me = logger_name, event = %self, "Submission rejected")
            }
            _ => info!(me = logger_name, evt = %self, "Event Broadcasted"),
        }
    }
}

/// Logs everything published on a bus until the bus goes away.
pub struct EventLogger;

impl EventLogger {
    pub fn attach(name: &str, bus: &EventBus) -> JoinHandle<()> {
        let mut rx = bus.subscribe();
        let name = name.to_owned();
        info!(node = %name, "READY!");
        tokio::spawn(
            async move {
                loop {
                    match rx.recv().await {
                        Ok(event) => event.log(&name),
                        Err(RecvError::Lagged(skipped)) => {
                            warn!(me = %name, skipped, "event logger fell behind")
                        }
                        Err(RecvError::Closed) => break,
                    }
                }
            }
            .in_current_span(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arena_events::{Address, ArenaError, HistoryDecrypted};
    use tracing_test::traced_test;

    #[tokio::test]
    #[traced_test]
    async fn logs_until_the_bus_closes() -> anyhow::Result<()> {
        let bus = EventBus::default();
        let handle = EventLogger::attach("test", &bus);

        bus.publish(HistoryDecrypted {
            user: Address::ZERO,
            contract: Address::ZERO,
            count: 3,
        });
        bus.err(&ArenaError::DecryptionInFlight);
        drop(bus);
        handle.await?;

        assert!(logs_contain("Event Broadcasted"));
        assert!(logs_contain("ERROR!"));
        Ok(())
    }
}
