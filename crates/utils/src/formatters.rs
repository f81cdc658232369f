// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use core::fmt;

/// Hex display for byte blobs. Long blobs are elided in the middle so proofs and ciphertexts do
/// not flood the logs.
pub fn hexf(data: &[u8], f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "{}", truncate(to_hex(data)))
}

/// Short `0xabcd…ef01` form used for handles and addresses in status lines.
pub fn short_hex(data: &[u8]) -> String {
    let s = to_hex(data);
    if s.len() <= 12 {
        return format!("0x{s}");
    }
    format!("0x{}…{}", &s[..6], &s[s.len() - 4..])
}

fn to_hex(data: &[u8]) -> String {
    data.iter().map(|b| format!("{:02x}", b)).collect()
}

fn truncate(s: String) -> String {
    let threshold = 100;
    let limit = 50;
    let cutoff = limit / 2;
    if s.len() <= threshold {
        format!("0x{}", s)
    } else {
        let start = &s[..cutoff];
        let end = &s[s.len() - (limit - cutoff)..];
        format!("<bytes({}):0x{}..{}>", s.len(), start, end)
    }
}
