// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

mod authorization;
mod decryption;
mod encryption;
mod orchestrator;
mod read_model;
mod session;
mod signer;
mod status;

pub use authorization::*;
pub use decryption::*;
pub use encryption::*;
pub use orchestrator::*;
pub use read_model::*;
pub use session::*;
pub use signer::*;
pub use status::*;

#[cfg(test)]
mod test_utils;
