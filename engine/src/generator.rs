//! C3: drives compute devices in parallel to fill a table file with chain
//! endpoints, resumably.

use std::fs::{File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use rainbow_core::codec::rt;
use rainbow_core::codec::ChainRecord;
use rainbow_core::compute::{ComputeDevice, KernelParams};
use rainbow_core::{RainbowError, RainbowResult, TableParams, MAX_CHAIN_LEN};

use crate::file_lock::ExclusiveFileLock;
use crate::verifier::{verify, VerifyMode, VerifyOutcome};

/// Generator tuning a caller can override; `group_size` defaults to each
/// device's own preferred work-group size when left unset.
#[derive(Clone, Copy, Debug, Default)]
pub struct GeneratorConfig {
    pub group_size: Option<u64>,
}

/// What a completed (or resumed-and-completed) generation run produced.
#[derive(Debug)]
pub struct GeneratorReport {
    pub chains_written: u64,
}

/// Runs the generator against `path`, using `devices` in parallel.
///
/// On a non-empty, partially-written file this resumes: it verifies in
/// `Generated` mode with truncation enabled, then continues from the last
/// intact record.
pub fn generate(
    path: &Path,
    params: &TableParams,
    devices: &[Arc<dyn ComputeDevice>],
    config: GeneratorConfig,
) -> RainbowResult<GeneratorReport> {
    if devices.is_empty() {
        return Err(RainbowError::Usage("no compute devices available".into()));
    }

    let space = params.plaintext_space()?;
    let total = space.total();
    let first_chain = params.part * params.num_chains;

    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .open(path)?;

    let resume_from = resume_point(&file, params)?;
    let next_start = AtomicU64::new(first_chain + resume_from);
    let last_start = first_chain + params.num_chains;

    if resume_from >= params.num_chains {
        return Ok(GeneratorReport {
            chains_written: params.num_chains,
        });
    }

    std::thread::scope(|scope| -> RainbowResult<()> {
        let mut handles = Vec::new();
        for device in devices {
            let device = device.clone();
            let next_start = &next_start;
            let group_size = config.group_size.unwrap_or_else(|| device.work_group_size());
            let path = path.to_path_buf();
            let charset = params.charset.clone();
            let space = space.clone();

            handles.push(scope.spawn(move || -> RainbowResult<()> {
                loop {
                    let block_start = next_start.fetch_add(group_size, Ordering::SeqCst);
                    if block_start >= last_start {
                        break;
                    }
                    let block_end = (block_start + group_size).min(last_start);
                    let starts: Vec<u64> = (block_start..block_end).collect();

                    let kernel_params = KernelParams {
                        charset: &charset,
                        space: &space,
                        reduction_offset: params.reduction_offset(),
                        total,
                    };
                    let ends = walk_chains_in_passes(
                        device.as_ref(),
                        &starts,
                        kernel_params,
                        params.chain_len,
                    )?;

                    let records: Vec<ChainRecord> = starts
                        .into_iter()
                        .zip(ends)
                        .map(|(start, end)| ChainRecord { start, end })
                        .collect();

                    write_block(&path, first_chain, &records)?;
                }
                Ok(())
            }));
        }

        for handle in handles {
            handle.join().expect("generator worker panicked")?;
        }
        Ok(())
    })?;

    finalize(&file, params.num_chains)
}

/// Invokes `device.launch` in [`MAX_CHAIN_LEN`]-sized passes, so no single
/// kernel launch walks more than that many columns.
fn walk_chains_in_passes(
    device: &dyn ComputeDevice,
    starts: &[u64],
    params: KernelParams<'_>,
    chain_len: u64,
) -> RainbowResult<Vec<u64>> {
    let total_columns = chain_len.saturating_sub(1);
    let mut current: Vec<u64> = starts.to_vec();
    let mut col_start = 0u64;
    while col_start < total_columns {
        let col_end = (col_start + MAX_CHAIN_LEN).min(total_columns);
        current = device.launch(&current, params, col_start, col_end)?;
        col_start = col_end;
    }
    Ok(current)
}

/// Verifies and truncates a partially-written file, then reports how many
/// chains (counted from `first_chain`) are intact and should be skipped.
fn resume_point(file: &File, params: &TableParams) -> RainbowResult<u64> {
    let len = file.metadata()?.len();
    if len == 0 {
        return Ok(0);
    }

    let first_chain = params.part * params.num_chains;
    let outcome = verify(
        file,
        params,
        first_chain,
        VerifyMode::Generated { truncate: true },
        None,
    )?;
    let intact_bytes = match outcome {
        VerifyOutcome::Ok { checked_bytes } => checked_bytes,
        VerifyOutcome::TruncatedAt { checked_bytes, .. } => checked_bytes,
    };
    Ok(intact_bytes / rainbow_core::codec::RECORD_LEN as u64)
}

/// Applies the five-step write protocol: lock, pad gaps with zero records,
/// seek and write the block, log, unlock (the unlock happens on drop).
fn write_block(path: &Path, first_chain: u64, records: &[ChainRecord]) -> RainbowResult<()> {
    let Some(first) = records.first() else {
        return Ok(());
    };

    let mut file = OpenOptions::new().read(true).write(true).open(path)?;
    let lock_file = file.try_clone()?;
    let _lock = ExclusiveFileLock::acquire(&lock_file)?;

    let record_len = rainbow_core::codec::RECORD_LEN as u64;
    let current_len = file.metadata()?.len();
    let target = (first.start - first_chain) * record_len;

    if current_len < target {
        let gap_records = (target - current_len) / record_len;
        file.seek(SeekFrom::End(0))?;
        let zero = ChainRecord { start: 0, end: 0 };
        for _ in 0..gap_records {
            file.write_all(&rt::encode_record(&zero))?;
        }
    }

    file.seek(SeekFrom::Start(target))?;
    rt::write_all(&mut file, records)?;

    let log_path = log_path_for(path);
    let mut log = OpenOptions::new().create(true).append(true).open(log_path)?;
    writeln!(
        log,
        "Thread #{:?}: wrote chains {}..{}",
        std::thread::current().id(),
        first.start,
        records.last().unwrap().start
    )?;

    Ok(())
}

fn log_path_for(path: &Path) -> std::path::PathBuf {
    let mut s = path.as_os_str().to_owned();
    s.push(".log");
    s.into()
}

/// Truncates the file to its expected size if workers overshot, and fails
/// if it's short.
fn finalize(file: &File, num_chains: u64) -> RainbowResult<GeneratorReport> {
    let expected = num_chains * rainbow_core::codec::RECORD_LEN as u64;
    let len = file.metadata()?.len();
    if len > expected {
        file.set_len(expected)?;
    } else if len < expected {
        return Err(RainbowError::Io(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            format!("generated {len} bytes, expected {expected}"),
        )));
    }
    Ok(GeneratorReport {
        chains_written: num_chains,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rainbow_core::compute::CpuDevice;
    use std::path::PathBuf;

    fn standard_params(num_chains: u64, chain_len: u64) -> TableParams {
        TableParams::parse(&PathBuf::from(format!(
            "ntlm_numeric#4-4_0_{chain_len}x{num_chains}_0.rt"
        )))
        .unwrap()
    }

    #[test]
    fn generates_full_table_from_scratch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ntlm_numeric#4-4_0_10x8_0.rt");
        let params = standard_params(8, 10);
        let devices: Vec<Arc<dyn ComputeDevice>> = vec![Arc::new(CpuDevice::new())];

        let report = generate(&path, &params, &devices, GeneratorConfig::default()).unwrap();
        assert_eq!(8, report.chains_written);

        let file = File::open(&path).unwrap();
        let records = rt::read_all(&file).unwrap();
        assert_eq!(8, records.len());
        for (i, record) in records.iter().enumerate() {
            assert_eq!(i as u64, record.start);
        }
    }

    #[test]
    fn resumes_a_partially_written_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ntlm_numeric#4-4_0_10x8_0.rt");
        let params = standard_params(8, 10);
        let devices: Vec<Arc<dyn ComputeDevice>> = vec![Arc::new(CpuDevice::new())];

        // Pre-write the first 3 chains by hand, as a prior interrupted run would have.
        let space = params.plaintext_space().unwrap();
        let total = space.total();
        let device = CpuDevice::new();
        let kernel_params = KernelParams {
            charset: &params.charset,
            space: &space,
            reduction_offset: 0,
            total,
        };
        let mut file = File::create(&path).unwrap();
        for start in 0..3u64 {
            let end = device
                .launch(&[start], kernel_params, 0, params.chain_len - 1)
                .unwrap()[0];
            rt::write_all(&mut file, &[ChainRecord { start, end }]).unwrap();
        }
        drop(file);

        let report = generate(&path, &params, &devices, GeneratorConfig::default()).unwrap();
        assert_eq!(8, report.chains_written);

        let file = File::open(&path).unwrap();
        let records = rt::read_all(&file).unwrap();
        assert_eq!(8, records.len());
        for (i, record) in records.iter().enumerate() {
            assert_eq!(i as u64, record.start);
        }
    }
}
