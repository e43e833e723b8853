mod generate;
mod lookup;
mod verify;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use generate::{generate, Generate};
use lookup::{lookup, Lookup};
use verify::{verify, Verify};

/// Password recovery rainbow table generator, lookup engine and verifier.
#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    Generate(Generate),
    Lookup(Lookup),
    Verify(Verify),
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Generate(args) => generate(args),
        Command::Lookup(args) => lookup(args),
        Command::Verify(args) => verify(args),
    }
}

/// Parses a `<hash>_<charset>#<minL>-<maxL>_<tableIdx>_<chainLen>x<numChains>_<part>.rt`-style
/// table file path into its parameters, for subcommands that take a single table.
pub(crate) fn table_params(path: &PathBuf) -> Result<rainbow_core::TableParams> {
    Ok(rainbow_core::TableParams::parse(path)?)
}
