// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

use crate::{ArenaError, ArenaErrorType};

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PipelineError {
    pub err_type: ArenaErrorType,
    pub message: String,
}

impl PipelineError {
    pub fn new(err_type: ArenaErrorType, message: &str) -> Self {
        Self {
            err_type,
            message: message.to_string(),
        }
    }
}

impl From<&ArenaError> for PipelineError {
    fn from(value: &ArenaError) -> Self {
        Self {
            err_type: value.error_type(),
            message: value.to_string(),
        }
    }
}

impl Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.err_type, self.message)
    }
}
