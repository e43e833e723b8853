use std::io;

use thiserror::Error;

pub type RainbowResult<T> = std::result::Result<T, RainbowError>;

/// The error taxonomy of the tradeoff engine.
///
/// These are kinds, not exceptions: callers are expected to match on the
/// variant and decide locally whether to skip a file, abort a run, or
/// surface the error to the user.
#[derive(Error, Debug)]
pub enum RainbowError {
    #[error("bad usage: {0}")]
    Usage(String),

    #[error("could not parse table parameters from filename: {0}")]
    ParseParams(String),

    #[error("malformed table file: {0}")]
    BadFormat(String),

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("recomputed endpoint for chain {chain} does not match the stored endpoint")]
    ChainMismatch { chain: u64 },

    #[error("candidate plaintext's hash does not match the target (super false alarm)")]
    SuperFalseAlarm,

    #[error("compute device exhausted: {0}")]
    ResourceExhausted(String),
}
