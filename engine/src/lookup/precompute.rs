//! Step 1: per-hash truncated endpoint precomputation, with a disk cache.

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::PathBuf;

use rainbow_core::{hash_to_index, index_to_plaintext, ntlm_hash, PlaintextSpace, RainbowResult, TableParams};

const CACHE_SEARCH_LIMIT: u32 = 1 << 20;

/// `E_i[p]`: the endpoint that would be observed for a chain whose `p`-th
/// reduction produced `digest`.
pub fn precompute_endpoint(
    digest: &[u8; 16],
    params: &TableParams,
    space: &PlaintextSpace,
    total: u64,
    position: u64,
) -> u64 {
    let mut idx = hash_to_index(digest, params.reduction_offset(), total, position);
    let steps = params.chain_len.saturating_sub(2).saturating_sub(position);
    for step in 0..steps {
        let pt = index_to_plaintext(idx, &params.charset, space);
        let h = ntlm_hash(&pt);
        idx = hash_to_index(&h, params.reduction_offset(), total, position + 1 + step);
    }
    idx
}

/// `E_i[0..chainLen-2]`, the full precomputed array for one hash.
pub fn precompute_endpoints(digest: &[u8; 16], params: &TableParams, space: &PlaintextSpace) -> Vec<u64> {
    let total = space.total();
    (0..params.chain_len.saturating_sub(1))
        .map(|p| precompute_endpoint(digest, params, space, total, p))
        .collect()
}

/// The parameter string identifying one (table parameters, hash) precompute
/// result, matching the sidecar `.index` file's contents.
pub fn cache_key(params: &TableParams, digest_hex: &str) -> String {
    format!(
        "{}_{}#{}-{}_{}_{}:{}",
        params.hash_kind.as_str(),
        params.charset_name,
        params.min_len,
        params.max_len,
        params.table_index,
        params.chain_len,
        digest_hex
    )
}

/// The on-disk `rcracki.precalc.<n>` / `.index` cache, rooted at `dir`
/// (conventionally the current working directory).
pub struct PrecomputeCache {
    dir: PathBuf,
}

impl PrecomputeCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Looks up a cached precompute result by exact sidecar string equality,
    /// scanning candidate names `rcracki.precalc.0..2^20`.
    pub fn load(&self, params: &TableParams, digest_hex: &str) -> RainbowResult<Option<Vec<u64>>> {
        let key = cache_key(params, digest_hex);
        for n in 0..CACHE_SEARCH_LIMIT {
            let index_path = self.index_path(n);
            let Ok(contents) = fs::read_to_string(&index_path) else {
                continue;
            };
            if contents.trim_end() == key {
                return Ok(Some(self.read_data(n)?));
            }
        }
        Ok(None)
    }

    /// Stores a precompute result under the first unused slot.
    pub fn store(&self, params: &TableParams, digest_hex: &str, endpoints: &[u64]) -> RainbowResult<()> {
        fs::create_dir_all(&self.dir)?;
        let key = cache_key(params, digest_hex);
        for n in 0..CACHE_SEARCH_LIMIT {
            if self.index_path(n).exists() {
                continue;
            }
            let mut index_file = File::create(self.index_path(n))?;
            writeln!(index_file, "{key}")?;

            let mut data_file = File::create(self.data_path(n))?;
            for &e in endpoints {
                data_file.write_all(&e.to_le_bytes())?;
            }
            return Ok(());
        }
        Ok(())
    }

    fn read_data(&self, n: u32) -> RainbowResult<Vec<u64>> {
        let mut f = File::open(self.data_path(n))?;
        let mut buf = Vec::new();
        f.read_to_end(&mut buf)?;
        Ok(buf
            .chunks_exact(8)
            .map(|c| u64::from_le_bytes(c.try_into().unwrap()))
            .collect())
    }

    fn index_path(&self, n: u32) -> PathBuf {
        self.dir.join(format!("rcracki.precalc.{n}.index"))
    }

    fn data_path(&self, n: u32) -> PathBuf {
        self.dir.join(format!("rcracki.precalc.{n}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf as StdPathBuf;

    fn ntlm8_params() -> TableParams {
        TableParams::parse(&StdPathBuf::from(
            "ntlm_ascii-32-95#8-8_0_422000x67108864_0.rt",
        ))
        .unwrap()
    }

    #[test]
    fn precompute_endpoint_at_last_position_is_direct_reduction() {
        let params = ntlm8_params();
        let space = params.plaintext_space().unwrap();
        let total = space.total();
        let digest = [0xabu8; 16];

        let position = params.chain_len - 2;
        let endpoint = precompute_endpoint(&digest, &params, &space, total, position);
        let direct = hash_to_index(&digest, params.reduction_offset(), total, position);
        assert_eq!(direct, endpoint);
    }

    #[test]
    fn cache_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let cache = PrecomputeCache::new(dir.path());
        let params = ntlm8_params();
        let endpoints = vec![1u64, 2, 3, 4];

        assert!(cache.load(&params, "deadbeef").unwrap().is_none());
        cache.store(&params, "deadbeef", &endpoints).unwrap();
        let loaded = cache.load(&params, "deadbeef").unwrap().unwrap();
        assert_eq!(endpoints, loaded);
    }

    #[test]
    fn cache_miss_on_different_hash() {
        let dir = tempfile::tempdir().unwrap();
        let cache = PrecomputeCache::new(dir.path());
        let params = ntlm8_params();
        cache.store(&params, "deadbeef", &[1, 2, 3]).unwrap();
        assert!(cache.load(&params, "cafebabe").unwrap().is_none());
    }
}
