// SPDX-FileCopyrightText: 2026 Lockboot Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Two-pass keyed SHA-512 authenticator.
//!
//! The tag has the form `SHA512(key ∥ SHA512(key ∥ msg))`. The scheme is
//! fixed by the host toolchain and must be reproduced bit-exactly; it is not
//! interchangeable with HMAC-SHA-512.

use consts::{KEY_BYTES, TAG_BYTES};
use sha2::{Digest, Sha512};
use subtle::ConstantTimeEq;

/// Compute the 64-byte tag over `msg` under `key`.
pub fn tag(key: &[u8; KEY_BYTES], msg: &[u8]) -> [u8; TAG_BYTES] {
    let mut hasher = Sha512::new();
    hasher.update(key);
    hasher.update(msg);
    let inner = hasher.finalize();

    let mut hasher = Sha512::new();
    hasher.update(key);
    hasher.update(&inner);

    let mut out = [0u8; TAG_BYTES];
    out.copy_from_slice(&hasher.finalize());
    out
}

/// Constant-time tag comparison.
///
/// The two 32-byte halves are checked independently and the results
/// combined, so a difference in either half fails while both comparisons
/// always run to completion.
pub fn verify(received: &[u8; TAG_BYTES], computed: &[u8; TAG_BYTES]) -> bool {
    let lo = received[..32].ct_eq(&computed[..32]);
    let hi = received[32..].ct_eq(&computed[32..]);
    bool::from(lo & hi)
}
