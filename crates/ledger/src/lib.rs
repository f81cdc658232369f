// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

mod client;
mod contract;
mod interface;
mod ledger;

pub use client::*;
pub use contract::*;
pub use interface::*;
pub use ledger::*;
