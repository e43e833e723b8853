use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::Args;

use rainbow_core::compute::{ComputeDevice, CpuDevice};
use rainbow_core::TableParams;
use rainbow_engine::{generate as run_generate, GeneratorConfig};

/// Generate a rainbow table, or benchmark chain-walking throughput.
#[derive(Args)]
pub struct Generate {
    /// Hash kind, e.g. `ntlm`.
    hash: String,

    /// Charset name, e.g. `ascii-32-95`.
    charset: String,

    /// Minimum plaintext length.
    min_len: u8,

    /// Maximum plaintext length.
    max_len: u8,

    /// Table index, mixed into every reduction as a per-table offset.
    table_index: u32,

    /// Chain length (number of reduction/hash columns per chain).
    chain_len: u64,

    /// Number of chains in this table.
    num_chains: u64,

    /// Part number within a table split across multiple files, or `-bench`
    /// to time chain-walking throughput instead of writing a table.
    part: String,

    /// Override the device work-group size (chains per kernel launch).
    #[clap(short = 'g', long = "gws")]
    gws: Option<u64>,

    /// Directory the generated table file is written into.
    #[clap(long, default_value = ".")]
    dir: PathBuf,
}

pub fn generate(args: Generate) -> Result<()> {
    let devices: Vec<Arc<dyn ComputeDevice>> = vec![Arc::new(CpuDevice::new())];

    if args.part == "-bench" {
        return bench(&args, &devices);
    }

    let part: u64 = args
        .part
        .parse()
        .with_context(|| format!("part must be a number or -bench, got {}", args.part))?;

    let filename = format!(
        "{}_{}#{}-{}_{}_{}x{}_{}.rt",
        args.hash,
        args.charset,
        args.min_len,
        args.max_len,
        args.table_index,
        args.chain_len,
        args.num_chains,
        part
    );
    let params = TableParams::parse(&PathBuf::from(&filename))?;

    let space = params.plaintext_space()?;
    if !params.part_in_range(space.total()) {
        bail!("part {part} puts this table's chains outside the plaintext space");
    }

    let path = args.dir.join(&filename);
    let config = GeneratorConfig {
        group_size: args.gws,
    };

    let report = run_generate(&path, &params, &devices, config)?;
    tracing::info!(
        chains_written = report.chains_written,
        path = %path.display(),
        "table generated"
    );

    Ok(())
}

/// Times chain-walking throughput on each available device without writing
/// anything to disk.
fn bench(args: &Generate, devices: &[Arc<dyn ComputeDevice>]) -> Result<()> {
    let filename = format!(
        "{}_{}#{}-{}_{}_{}x1000_0.rt",
        args.hash, args.charset, args.min_len, args.max_len, args.table_index, args.chain_len,
    );
    let params = TableParams::parse(&PathBuf::from(&filename))?;
    let space = params.plaintext_space()?;
    let total = space.total();

    for device in devices {
        let kernel_params = rainbow_core::compute::KernelParams {
            charset: &params.charset,
            space: &space,
            reduction_offset: params.reduction_offset(),
            total,
        };

        let starts: Vec<u64> = (0..1000u64).collect();
        let started = Instant::now();
        device.launch(&starts, kernel_params, 0, params.chain_len.saturating_sub(1))?;
        let elapsed = started.elapsed();

        let chains_per_sec = 1000.0 / elapsed.as_secs_f64().max(f64::EPSILON);
        tracing::info!(
            device = device.name(),
            chains_per_sec,
            "benchmark complete"
        );
    }

    Ok(())
}
