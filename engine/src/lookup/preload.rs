//! Step 2: background table preloading into a bounded queue.

use std::fs::File;
use std::path::{Path, PathBuf};

use crossbeam_channel::{Receiver, Sender};

use rainbow_core::codec::{rt, rtc, ChainRecord};
use rainbow_core::{RainbowResult, TableParams, DEFAULT_PRELOAD_QUEUE_DEPTH};

use crate::verifier::{verify, VerifyMode};

/// One fully decoded table, ready for the search stage.
pub struct PreloadedTable {
    pub path: PathBuf,
    pub params: TableParams,
    pub records: Vec<ChainRecord>,
}

/// Walks `dir` recursively on a background thread, decoding each table file
/// it finds and feeding it into a bounded channel the search stage drains.
///
/// Malformed tables are skipped with a warning rather than aborting the
/// whole walk.
pub fn spawn_preloader(dir: PathBuf) -> Receiver<PreloadedTable> {
    let (tx, rx) = crossbeam_channel::bounded(DEFAULT_PRELOAD_QUEUE_DEPTH);
    std::thread::spawn(move || walk_and_load(&dir, &tx));
    rx
}

fn walk_and_load(dir: &Path, tx: &Sender<PreloadedTable>) {
    let mut stack = vec![dir.to_path_buf()];
    while let Some(current) = stack.pop() {
        let entries = match std::fs::read_dir(&current) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!("could not read directory {current:?}: {e}");
                continue;
            }
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                stack.push(path);
                continue;
            }
            match load_table(&path) {
                Ok(Some(table)) => {
                    if tx.send(table).is_err() {
                        return;
                    }
                }
                Ok(None) => {}
                Err(e) => tracing::warn!("skipping {path:?}: {e}"),
            }
        }
    }
}

/// Loads and, for uncompressed tables, structurally verifies one table file.
///
/// Returns `Ok(None)` for files the filename parser rejects outright (not a
/// table at all), consistent with `ParseParams`'s "skip with warning,
/// continue" policy.
fn load_table(path: &Path) -> RainbowResult<Option<PreloadedTable>> {
    let params = match TableParams::parse(path) {
        Ok(p) => p,
        Err(_) => return Ok(None),
    };

    let file = File::open(path)?;
    let records = if params.compressed {
        rtc::read_all(&file, params.num_chains)?
    } else {
        verify(&file, &params, 0, VerifyMode::Lookup, None)?;
        rt::read_all(&file)?
    };

    Ok(Some(PreloadedTable {
        path: path.to_path_buf(),
        params,
        records,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rainbow_core::{generate_rainbow_chain, ChainRecord as Record};
    use std::io::Write as _;
    use std::time::Duration;

    fn write_table(dir: &Path, name: &str, num_chains: u64, chain_len: u64) -> TableParams {
        let path = dir.join(name);
        let params = TableParams::parse(&path).unwrap();
        let space = params.plaintext_space().unwrap();
        let total = space.total();
        let mut records: Vec<Record> = (0..num_chains)
            .map(|start| Record {
                start,
                end: generate_rainbow_chain(
                    start,
                    chain_len,
                    &params.charset,
                    &space,
                    params.reduction_offset(),
                    total,
                ),
            })
            .collect();
        records.sort_by_key(|r| r.end);
        let mut file = File::create(&path).unwrap();
        for r in &records {
            file.write_all(&rt::encode_record(r)).unwrap();
        }
        params
    }

    #[test]
    fn preloads_a_well_formed_table() {
        let dir = tempfile::tempdir().unwrap();
        write_table(dir.path(), "ntlm_numeric#4-4_0_8x10_0.rt", 10, 8);

        let rx = spawn_preloader(dir.path().to_path_buf());
        let table = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(10, table.records.len());
    }

    #[test]
    fn skips_files_that_do_not_look_like_tables() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("README.txt"), b"not a table").unwrap();
        write_table(dir.path(), "ntlm_numeric#4-4_0_8x5_0.rt", 5, 8);

        let rx = spawn_preloader(dir.path().to_path_buf());
        let table = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(5, table.records.len());
        assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());
    }
}
