// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

mod authorization;
mod backend;
mod local;
mod proof;

pub use authorization::*;
pub use backend::*;
pub use local::*;
pub use proof::*;
