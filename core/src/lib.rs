//! Chain arithmetic and table codec for a time-memory tradeoff password
//! recovery engine: the pure, deterministic core shared by the generator,
//! verifier and lookup pipelines.

pub mod chain;
pub mod charset;
pub mod codec;
pub mod compute;
pub mod error;
pub mod hash;
pub mod params;
pub mod space;

pub use chain::{generate_rainbow_chain, hash_to_index, index_to_plaintext, ntlm_hash};
pub use codec::ChainRecord;
pub use compute::{CpuDevice, ComputeDevice, KernelParams};
pub use error::{RainbowError, RainbowResult};
pub use hash::HashKind;
pub use params::TableParams;
pub use space::PlaintextSpace;

/// Per-launch chain-length cap so a single kernel invocation stays within a
/// watchdog-friendly wall time; longer chains are walked in multiple passes.
pub const MAX_CHAIN_LEN: u64 = 450_000;

/// Hard ceiling on plaintext length; `ntlm_hash` clamps to this before
/// hashing.
pub const MAX_PASSWORD_LENGTH_ALLOWED: u8 = 27;

/// Random chain sample size the verifier uses for non-NTLM9 tables.
pub const DEFAULT_VERIFY_SAMPLE: usize = 100;

/// Random chain sample size the verifier uses for NTLM9 tables.
pub const NTLM9_VERIFY_SAMPLE: usize = 50;

/// Default bound on the background table preloader's queue depth.
pub const DEFAULT_PRELOAD_QUEUE_DEPTH: usize = 2;
