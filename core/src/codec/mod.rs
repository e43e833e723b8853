//! Reading and writing chain files: uncompressed `.rt` and compressed `.rtc`.

pub mod rt;
pub mod rtc;

/// A chain record as stored on disk: a start/end pair of plaintext-space
/// indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChainRecord {
    pub start: u64,
    pub end: u64,
}

/// Byte width of one uncompressed record.
pub const RECORD_LEN: usize = 16;
