// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

mod authorization;
mod history_decrypted;
mod pipeline_error;
mod score_submitted;
mod submission_rejected;

pub use authorization::*;
pub use history_decrypted::*;
pub use pipeline_error::*;
pub use score_submitted::*;
pub use submission_rejected::*;

use serde::{Deserialize, Serialize};
use std::fmt;
use strum::IntoStaticStr;

/// Macro to help define From traits for ArenaEvent
macro_rules! impl_from_event {
    ($($variant:ident),*) => {
        $(
            impl From<$variant> for ArenaEvent {
                fn from(data: $variant) -> Self {
                    ArenaEvent::$variant(data)
                }
            }
        )*
    };
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, IntoStaticStr)]
pub enum ArenaEvent {
    ScoreSubmitted(ScoreSubmitted),
    SubmissionRejected(SubmissionRejected),
    AuthorizationGranted(AuthorizationGranted),
    AuthorizationRevoked(AuthorizationRevoked),
    HistoryDecrypted(HistoryDecrypted),
    PipelineError(PipelineError),
}

impl_from_event!(
    ScoreSubmitted,
    SubmissionRejected,
    AuthorizationGranted,
    AuthorizationRevoked,
    HistoryDecrypted,
    PipelineError
);

impl ArenaEvent {
    pub fn event_type(&self) -> &'static str {
        self.into()
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ArenaEvent::PipelineError(_))
    }
}

impl fmt::Display for ArenaEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use ArenaEvent::*;
        let data: &dyn fmt::Display = match self {
            ScoreSubmitted(d) => d,
            SubmissionRejected(d) => d,
            AuthorizationGranted(d) => d,
            AuthorizationRevoked(d) => d,
            HistoryDecrypted(d) => d,
            PipelineError(d) => d,
        };
        write!(f, "{}({})", self.event_type(), data)
    }
}
