//! Step 4: walk each binary-search hit's chain forward to its candidate
//! position and confirm it against the target digest.
//!
//! A real GPU back-end would do the walk on-device and only hand the host a
//! coarse index-level match to re-check; with one CPU device in this
//! engine, the walk and the confirming hash recompute collapse into a
//! single CPU-side pass, so a regular false alarm (the walk disagrees with
//! the chain at an earlier column) and a "super" false alarm (the walk
//! lands on the right index but a different plaintext hashes to it) are
//! both just "the final hash doesn't match".

use rainbow_core::{hash_to_index, index_to_plaintext, ntlm_hash, PlaintextSpace, TableParams};

use super::search::PotentialMatch;

/// Walks `start_index` forward through `position` reduction steps and
/// checks whether the plaintext landed on hashes to `target_digest`.
///
/// Returns the recovered plaintext on a genuine crack, `None` on a false
/// alarm (ordinary or super).
pub fn confirm_candidate(
    start_index: u64,
    position: u64,
    target_digest: &[u8; 16],
    params: &TableParams,
    space: &PlaintextSpace,
    total: u64,
) -> Option<Vec<u8>> {
    let mut idx = start_index;
    for step in 0..position {
        let pt = index_to_plaintext(idx, &params.charset, space);
        let h = ntlm_hash(&pt);
        idx = hash_to_index(&h, params.reduction_offset(), total, step);
    }

    let candidate = index_to_plaintext(idx, &params.charset, space);
    if ntlm_hash(&candidate) == *target_digest {
        Some(candidate)
    } else {
        None
    }
}

/// Runs [`confirm_candidate`] over every potential match for one hash,
/// returning the first confirmed plaintext, if any.
pub fn confirm_first(
    matches: &[PotentialMatch],
    target_digest: &[u8; 16],
    params: &TableParams,
    space: &PlaintextSpace,
    total: u64,
) -> Option<Vec<u8>> {
    matches.iter().find_map(|m| {
        confirm_candidate(m.start_index, m.position, target_digest, params, space, total)
    })
}
