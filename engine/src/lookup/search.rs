//! Step 3: binary search of a preloaded table's end column for precomputed
//! endpoints, fanned out across CPU cores.

use rayon::prelude::*;

use rainbow_core::codec::ChainRecord;

/// A binary-search hit: the chain it came from, and which precomputed
/// position matched.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PotentialMatch {
    pub start_index: u64,
    pub position: u64,
}

/// Searches `table` (sorted by `end`) for every entry in `endpoints`,
/// splitting positions across threads via `rayon`'s work-stealing pool —
/// the CPU-side equivalent of the spec's strided position assignment.
pub fn search_table(table: &[ChainRecord], endpoints: &[u64]) -> Vec<PotentialMatch> {
    endpoints
        .par_iter()
        .enumerate()
        .filter_map(|(position, &endpoint)| {
            binary_search_end(table, endpoint).map(|start_index| PotentialMatch {
                start_index,
                position: position as u64,
            })
        })
        .collect()
}

/// Standard binary descent, falling back to a linear scan once the window
/// narrows to 8 entries or fewer.
fn binary_search_end(table: &[ChainRecord], target: u64) -> Option<u64> {
    let mut lo = 0usize;
    let mut hi = table.len();

    while hi - lo > 8 {
        let mid = lo + (hi - lo) / 2;
        match table[mid].end.cmp(&target) {
            std::cmp::Ordering::Less => lo = mid + 1,
            std::cmp::Ordering::Greater => hi = mid,
            std::cmp::Ordering::Equal => return Some(table[mid].start),
        }
    }

    table[lo..hi].iter().find(|r| r.end == target).map(|r| r.start)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted_table() -> Vec<ChainRecord> {
        (0..1000u64)
            .map(|i| ChainRecord {
                start: i,
                end: i * 3,
            })
            .collect()
    }

    #[test]
    fn finds_exact_matches() {
        let table = sorted_table();
        let hits = search_table(&table, &[0, 300, 2997]);
        assert_eq!(3, hits.len());
        let starts: Vec<u64> = hits.iter().map(|m| m.start_index).collect();
        assert!(starts.contains(&0));
        assert!(starts.contains(&100));
        assert!(starts.contains(&999));
    }

    #[test]
    fn misses_produce_no_match() {
        let table = sorted_table();
        let hits = search_table(&table, &[1, 2, 4]);
        assert!(hits.is_empty());
    }

    #[test]
    fn position_is_preserved_per_endpoint() {
        let table = sorted_table();
        let hits = search_table(&table, &[0, 3, 9999999]);
        let hit_for = |p: u64| hits.iter().find(|m| m.position == p).cloned();
        assert_eq!(Some(0), hit_for(0).map(|m| m.start_index));
        assert_eq!(Some(1), hit_for(1).map(|m| m.start_index));
        assert!(hit_for(2).is_none());
    }
}
