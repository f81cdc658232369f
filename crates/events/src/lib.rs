// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

mod arena_event;
mod encrypted_type;
mod error;
mod eventbus;
mod handle;
mod score;

pub use alloy_primitives::{Address, B256, U256};
pub use arena_event::*;
pub use encrypted_type::*;
pub use error::*;
pub use eventbus::*;
pub use handle::*;
pub use score::*;

/// Cleartext value of an encrypted scalar. Every supported width fits into 256 bits.
pub type ClearValue = U256;
