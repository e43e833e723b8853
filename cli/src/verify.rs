use std::fs::OpenOptions;
use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Args;

use rainbow_core::TableParams;
use rainbow_engine::{verify as run_verify, VerifyMode, VerifyOutcome};

/// Check a table file's structural integrity and spot-check some chains.
#[derive(Args)]
pub struct Verify {
    /// Treat the file as freshly generated: starts must run consecutively.
    #[clap(long)]
    raw: bool,

    /// Skip structural checks; spot-check 5 random chains only.
    #[clap(long)]
    quick: bool,

    /// Treat the file as sorted for lookup: ends must be non-decreasing.
    #[clap(long)]
    sorted: bool,

    /// In `--raw` mode, truncate the file at the first defective chain
    /// instead of failing outright.
    #[clap(long)]
    truncate: bool,

    /// Override the number of chains spot-checked (defaults by charset).
    #[clap(long)]
    num_chains: Option<usize>,

    /// The table file to verify.
    file: PathBuf,
}

pub fn verify(args: Verify) -> Result<()> {
    let mode = match (args.raw, args.quick, args.sorted) {
        (true, false, false) => VerifyMode::Generated {
            truncate: args.truncate,
        },
        (false, true, false) => VerifyMode::Quick,
        (false, false, true) => VerifyMode::Lookup,
        _ => bail!("exactly one of --raw, --quick, --sorted must be given"),
    };

    let params = crate::table_params(&args.file)?;
    let file = OpenOptions::new().read(true).write(true).open(&args.file)?;

    let first_chain = params.part * params.num_chains;
    let outcome = run_verify(&file, &params, first_chain, mode, args.num_chains)?;

    match outcome {
        VerifyOutcome::Ok { checked_bytes } => {
            tracing::info!(checked_bytes, "table verified");
        }
        VerifyOutcome::TruncatedAt {
            checked_bytes,
            chain_index,
        } => {
            tracing::warn!(checked_bytes, chain_index, "table truncated at defect");
        }
    }

    Ok(())
}
