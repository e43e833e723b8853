use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use rainbow_engine::lookup::run_lookup;

/// Crack one hash or a file of hashes against every table in a directory.
#[derive(Args)]
pub struct Lookup {
    /// Directory containing the `.rt`/`.rtc` table files to search.
    rt_dir: PathBuf,

    /// Either a single hex-encoded NTLM digest, or a path to a file with one
    /// per line.
    target: String,

    /// Base path cracked hash:plaintext pairs are appended to; `.pot` and
    /// `.hashcat.pot` are appended to this base for the two pot file
    /// formats.
    pot_base: Option<PathBuf>,

    /// Accepted for CLI-surface parity with the generator; the lookup
    /// pipeline parallelizes the search stage across all CPU cores
    /// regardless of this value.
    #[clap(short = 'g', long = "gws")]
    _gws: Option<u64>,
}

pub fn lookup(args: Lookup) -> Result<()> {
    let hashes = read_targets(&args.target)?;

    let pot_base = args.pot_base.unwrap_or_else(|| PathBuf::from("rcracki"));
    let pot_dir = pot_base
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    std::fs::create_dir_all(&pot_dir)?;

    let cache_dir = std::env::current_dir()?.join("rcracki-precalc");
    std::fs::create_dir_all(&cache_dir)?;

    let report = run_lookup(&args.rt_dir, &cache_dir, &pot_dir, hashes)?;

    for (hex, plaintext) in &report.cracked {
        println!("{hex}:{plaintext}");
    }
    tracing::info!(cracked = report.cracked.len(), "lookup complete");

    Ok(())
}

/// Reads either a single hex digest or a newline-delimited file of them.
fn read_targets(target: &str) -> Result<Vec<(String, [u8; 16])>> {
    let lines: Vec<String> = if is_plausible_digest(target) {
        vec![target.to_string()]
    } else {
        std::fs::read_to_string(target)
            .with_context(|| format!("reading hashes file {target}"))?
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect()
    };

    lines
        .into_iter()
        .map(|hex_str| {
            let digest = rainbow_core::hash::parse_ntlm_digest_hex(&hex_str)?;
            Ok((hex_str, digest))
        })
        .collect::<rainbow_core::RainbowResult<Vec<_>>>()
        .map_err(Into::into)
}

fn is_plausible_digest(s: &str) -> bool {
    s.len() == 32 && s.chars().all(|c| c.is_ascii_hexdigit())
}
