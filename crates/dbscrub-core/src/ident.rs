//! Deterministic identifier encoding.
//!
//! Users and groups coming from a directory-backed domain are known to the
//! database by an opaque specific identifier (a distinguished name, a GUID,
//! ...). Converting such a domain to SQL storage requires a numeric primary
//! key, and the same opaque identifier can be met several times in one run
//! (once as an entity's own id, once as another group's parent reference),
//! so the derivation must be stable within a run and across runs.
//!
//! The hash is pinned to FNV-1a 32-bit with the sign bit cleared. Do not
//! substitute another hash: the encoded values are persisted as primary keys
//! and re-derived by later passes.

/// Derives a stable non-negative integer from a specific identifier.
///
/// A specific identifier that already is a non-negative base-10 integer is
/// returned unchanged; anything else (including a negative number) is hashed.
/// Collisions between distinct opaque identifiers are not resolved.
#[must_use]
pub fn encode_specific_id(specific_id: &str) -> i64 {
    match specific_id.parse::<i64>() {
        Ok(n) if n >= 0 => n,
        _ => i64::from(fnv1a32(specific_id.as_bytes()) & 0x7fff_ffff),
    }
}

fn fnv1a32(bytes: &[u8]) -> u32 {
    const OFFSET: u32 = 0x811c_9dc5;
    const PRIME: u32 = 0x0100_0193;

    let mut hash = OFFSET;
    for byte in bytes {
        hash ^= u32::from(*byte);
        hash = hash.wrapping_mul(PRIME);
    }
    hash
}
