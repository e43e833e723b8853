//! The generation, verification and lookup pipelines built on top of
//! `rainbow-core`'s chain arithmetic and table codec.

pub mod file_lock;
pub mod generator;
pub mod lookup;
pub mod verifier;

pub use generator::{generate, GeneratorConfig, GeneratorReport};
pub use verifier::{default_sample_size, verify, VerifyMode, VerifyOutcome};
