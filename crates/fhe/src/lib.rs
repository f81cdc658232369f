// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

mod encoding;
mod runtime;
mod presets;

pub use encoding::*;
pub use runtime::*;
pub use presets::*;
