// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

mod arena_config;
pub mod contract;
pub mod load_config;
pub mod paths;
mod store_keys;
pub mod validation;
mod yaml;

pub use arena_config::*;
pub use contract::*;
pub use store_keys::*;
