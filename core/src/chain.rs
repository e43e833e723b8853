//! Chain arithmetic: the index/plaintext/hash/index cycle a rainbow chain walks.

use digest::Digest;
use md4::Md4;

use crate::space::PlaintextSpace;

/// Plaintexts longer than this are truncated before hashing.
pub const MAX_PLAINTEXT_LEN_ALLOWED: usize = 27;

/// NTLM9 fast path is only defined for charsets up to this size: each of the
/// nine fixed-width fields budgets 7 bits per position.
const NTLM9_MAX_CHARSET_LEN: usize = 128;

/// UTF-16LE-encodes `plaintext` and runs MD4 over it, the NTLM digest.
///
/// `plaintext` is clamped to [`MAX_PLAINTEXT_LEN_ALLOWED`] bytes first.
pub fn ntlm_hash(plaintext: &[u8]) -> [u8; 16] {
    let clamped = &plaintext[..plaintext.len().min(MAX_PLAINTEXT_LEN_ALLOWED)];
    let mut utf16le = Vec::with_capacity(clamped.len() * 2);
    for &b in clamped {
        utf16le.push(b);
        utf16le.push(0);
    }
    let digest = Md4::digest(&utf16le);
    let mut out = [0u8; 16];
    out.copy_from_slice(&digest);
    out
}

/// Reduces a digest back into the plaintext space.
///
/// Only the first 8 bytes of `digest` participate; `total` must be nonzero.
pub fn hash_to_index(digest: &[u8; 16], reduction_offset: u64, total: u64, position: u64) -> u64 {
    let mut first8 = [0u8; 8];
    first8.copy_from_slice(&digest[0..8]);
    let raw = u64::from_le_bytes(first8);
    raw.wrapping_add(reduction_offset)
        .wrapping_add(position)
        .rem_euclid(total)
}

/// Whether `(charset, min_len, max_len)` are NTLM9-shaped: a 9-character
/// fixed length over a charset small enough for the fast-path bit layout in
/// [`ntlm9_index_to_plaintext`].
///
/// This is a parameter check only. It does not select the reduction used by
/// [`index_to_plaintext`]/[`generate_rainbow_chain`] (see their docs); the
/// verifier uses it on its own to pick a sample size.
pub fn is_ntlm9_fast_path(charset_len: usize, min_len: u8, max_len: u8) -> bool {
    min_len == 9 && max_len == 9 && charset_len <= NTLM9_MAX_CHARSET_LEN
}

/// `index_to_plaintext`: maps a plaintext-space index back to its string.
///
/// Always uses the generic per-length decomposition, including for
/// NTLM9-shaped params. [`ntlm9_index_to_plaintext`] implements the
/// alternate fast-path bit layout for a single conversion, but chain
/// generation does not call it: a chain walked with it does not reach the
/// published NTLM9 endpoints (see `DESIGN.md`).
pub fn index_to_plaintext(idx: u64, charset: &[u8], space: &PlaintextSpace) -> Vec<u8> {
    generic_index_to_plaintext(idx, charset, space)
}

/// `plaintext_to_index`: the inverse of the generic decomposition
/// [`index_to_plaintext`] performs.
pub fn plaintext_to_index(plaintext: &[u8], charset: &[u8], space: &PlaintextSpace) -> u64 {
    generic_plaintext_to_index(plaintext, charset, space)
}

fn generic_index_to_plaintext(idx: u64, charset: &[u8], space: &PlaintextSpace) -> Vec<u8> {
    let len = space.length_of(idx);
    let base = if len == 0 { 0 } else { space.at(len - 1) };
    let mut r = idx - base;
    let clen = charset.len() as u64;
    let mut out = vec![0u8; len as usize];
    for slot in out.iter_mut().rev() {
        *slot = charset[(r % clen) as usize];
        r /= clen;
    }
    out
}

fn generic_plaintext_to_index(plaintext: &[u8], charset: &[u8], space: &PlaintextSpace) -> u64 {
    let len = plaintext.len() as u8;
    let base = if len == 0 { 0 } else { space.at(len - 1) };
    let clen = charset.len() as u64;
    let mut r: u64 = 0;
    for &c in plaintext {
        let digit = charset.iter().position(|&b| b == c).expect("char in charset") as u64;
        r = r * clen + digit;
    }
    base + r
}

/// Splits `idx` into nine 7-bit fields and indexes `charset` directly with
/// each one, low field first: no length search, no division, just a mask
/// and a shift per character. Unlike [`generic_index_to_plaintext`] this is
/// not a bijection between `0..charset_len.pow(9)` and 9-character strings
/// when `charset_len < 256` (the 8-bit mask and 7-bit shift overlap by a
/// bit), so there is no corresponding `plaintext_to_index`.
fn ntlm9_index_to_plaintext(idx: u64, charset: &[u8]) -> Vec<u8> {
    let clen = charset.len() as u64;
    let mut out = vec![0u8; 9];
    let mut r = idx;
    for slot in out.iter_mut() {
        *slot = charset[(r & 0xff) as usize % clen as usize];
        r >>= 7;
    }
    out
}

/// Walks a full chain from `start`, returning the endpoint.
///
/// `total` is `space`'s [`PlaintextSpace::total`]; passed separately so
/// callers that already have it on hand don't recompute it per chain.
pub fn generate_rainbow_chain(
    start: u64,
    chain_len: u64,
    charset: &[u8],
    space: &PlaintextSpace,
    reduction_offset: u64,
    total: u64,
) -> u64 {
    let mut i = start;
    for p in 0..chain_len.saturating_sub(1) {
        let pt = index_to_plaintext(i, charset, space);
        let h = ntlm_hash(&pt);
        i = hash_to_index(&h, reduction_offset, total, p);
    }
    i
}
