//! C5: orchestrates precomputation, table preloading, binary search and
//! false-alarm confirmation across every target hash.

pub mod falsealarm;
pub mod potfile;
pub mod precompute;
pub mod preload;
pub mod search;

use std::path::Path;

use itertools::Itertools;

use rainbow_core::RainbowResult;

use falsealarm::confirm_first;
use precompute::PrecomputeCache;
use preload::spawn_preloader;
use search::search_table;

/// `Loaded -> Precomputed -> {Cracked | Searched} -> Cracked_or_Unsolved`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HashState {
    Loaded,
    Precomputed,
    Searched,
    Cracked,
}

/// One target hash being tracked across the lookup run.
pub struct HashJob {
    pub digest: [u8; 16],
    pub hex: String,
    pub state: HashState,
    pub plaintext: Option<String>,
}

impl HashJob {
    pub fn new(hex: String, digest: [u8; 16]) -> Self {
        Self {
            digest,
            hex,
            state: HashState::Loaded,
            plaintext: None,
        }
    }

    fn is_cracked(&self) -> bool {
        self.state == HashState::Cracked
    }
}

#[derive(Debug)]
pub struct LookupReport {
    pub cracked: Vec<(String, String)>,
}

/// Runs the full C5 pipeline against every table under `table_dir`, writing
/// confirmed cracks to both pot files under `pot_dir` and caching
/// precompute results under `cache_dir`.
///
/// Terminates once every hash is `Cracked`, or once the preloader has no
/// more tables to offer.
pub fn run_lookup(
    table_dir: &Path,
    cache_dir: &Path,
    pot_dir: &Path,
    hashes: Vec<(String, [u8; 16])>,
) -> RainbowResult<LookupReport> {
    let mut jobs: Vec<HashJob> = hashes
        .into_iter()
        .unique_by(|(hex, _)| hex.clone())
        .map(|(hex, digest)| HashJob::new(hex, digest))
        .collect();

    let cache = PrecomputeCache::new(cache_dir);
    let rx = spawn_preloader(table_dir.to_path_buf());
    let mut cracked = Vec::new();

    for table in rx {
        if jobs.iter().all(HashJob::is_cracked) {
            break;
        }

        let space = table.params.plaintext_space()?;
        let total = space.total();

        for job in jobs.iter_mut().filter(|j| !j.is_cracked()) {
            let endpoints = match cache.load(&table.params, &job.hex)? {
                Some(e) => e,
                None => {
                    let e = precompute::precompute_endpoints(&job.digest, &table.params, &space);
                    cache.store(&table.params, &job.hex, &e)?;
                    e
                }
            };
            job.state = HashState::Precomputed;

            let matches = search_table(&table.records, &endpoints);
            job.state = HashState::Searched;

            if let Some(plaintext) =
                confirm_first(&matches, &job.digest, &table.params, &space, total)
            {
                let plaintext = String::from_utf8_lossy(&plaintext).into_owned();
                potfile::append_crack(pot_dir, &job.hex, &plaintext)?;
                job.state = HashState::Cracked;
                job.plaintext = Some(plaintext.clone());
                cracked.push((job.hex.clone(), plaintext));
            }
        }
    }

    Ok(LookupReport { cracked })
}
