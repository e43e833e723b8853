//! Table filename parsing: `<hash>_<charset>#<minL>-<maxL>_<tableIdx>_<chainLen>x<numChains>_<part>.{rt|rtc}`.

use std::path::Path;

use crate::charset;
use crate::error::{RainbowError, RainbowResult};
use crate::hash::HashKind;
use crate::space::PlaintextSpace;

/// Every field derivable from a table filename, validated and resolved.
#[derive(Clone, Debug)]
pub struct TableParams {
    pub hash_kind: HashKind,
    pub charset_name: String,
    pub charset: Vec<u8>,
    pub min_len: u8,
    pub max_len: u8,
    pub table_index: u32,
    pub chain_len: u64,
    pub num_chains: u64,
    pub part: u64,
    pub compressed: bool,
}

impl TableParams {
    /// `tableIndex * 65536`, mixed into every reduction in this table.
    pub fn reduction_offset(&self) -> u64 {
        self.table_index as u64 * 65536
    }

    /// Builds the `PlaintextSpace` this table's parameters imply.
    pub fn plaintext_space(&self) -> RainbowResult<PlaintextSpace> {
        PlaintextSpace::build(self.charset.len() as u64, self.min_len, self.max_len)
    }

    /// Whether the first `part * numChains + numChains` indices still fit
    /// inside the plaintext space, i.e. this part is within range.
    pub fn part_in_range(&self, plaintext_space_total: u64) -> bool {
        match self.part.checked_mul(self.num_chains) {
            Some(start) => match start.checked_add(self.num_chains) {
                Some(end) => end <= plaintext_space_total,
                None => false,
            },
            None => false,
        }
    }

    /// Parses and validates a table filename, per the filename grammar.
    ///
    /// The directory prefix, if any, is discarded: only the final path
    /// component is parsed.
    pub fn parse(path: &Path) -> RainbowResult<Self> {
        let file_name = path
            .file_name()
            .and_then(|s| s.to_str())
            .ok_or_else(|| RainbowError::ParseParams("filename is not valid UTF-8".into()))?;

        let compressed = if let Some(stem) = file_name.strip_suffix(".rtc") {
            Some((stem, true))
        } else {
            file_name.strip_suffix(".rt").map(|stem| (stem, false))
        };
        let (stem, compressed) = compressed.ok_or_else(|| {
            RainbowError::ParseParams(format!("{file_name} does not end in .rt or .rtc"))
        })?;

        let fail = |msg: &str| Err(RainbowError::ParseParams(format!("{file_name}: {msg}")));

        let Some((head, rest)) = stem.split_once('#') else {
            return fail("missing '#' separating charset from length range");
        };

        let Some((hash_str, charset_name)) = head.split_once('_') else {
            return fail("missing '_' separating hash kind from charset");
        };

        let hash_kind = match HashKind::from_str_opt(hash_str) {
            Some(k) => k,
            None => return fail("unrecognized hash kind"),
        };

        let charset = match charset::by_name(charset_name) {
            Some(c) => c,
            None => return fail("unrecognized charset name"),
        };

        let fields: Vec<&str> = rest.split('_').collect();
        let [len_range, table_index, chain_spec, part] = fields.as_slice() else {
            return fail("expected minL-maxL_tableIdx_chainLenxnumChains_part");
        };

        let Some((min_len, max_len)) = len_range.split_once('-') else {
            return fail("missing '-' in length range");
        };
        let Some((chain_len, num_chains)) = chain_spec.split_once('x') else {
            return fail("missing 'x' in chainLenxnumChains");
        };

        let parse_u64 = |field: &str, name: &str| -> RainbowResult<u64> {
            field
                .parse::<u64>()
                .map_err(|_| RainbowError::ParseParams(format!("{file_name}: bad {name}: {field}")))
        };

        let min_len = parse_u64(min_len, "minL")?;
        let max_len = parse_u64(max_len, "maxL")?;
        let table_index = parse_u64(table_index, "tableIdx")?;
        let chain_len = parse_u64(chain_len, "chainLen")?;
        let num_chains = parse_u64(num_chains, "numChains")?;
        let part = parse_u64(part, "part")?;

        if min_len < 1 || min_len > max_len || max_len >= 16 {
            return fail("length range must satisfy 1 <= minL <= maxL < 16");
        }
        if chain_len < 1 {
            return fail("chainLen must be >= 1");
        }
        if num_chains < 1 {
            return fail("numChains must be >= 1");
        }
        if table_index > u32::MAX as u64 {
            return fail("tableIdx out of range");
        }

        Ok(Self {
            hash_kind,
            charset_name: charset_name.to_string(),
            charset,
            min_len: min_len as u8,
            max_len: max_len as u8,
            table_index: table_index as u32,
            chain_len,
            num_chains,
            part,
            compressed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_standard_ntlm8_filename() {
        let p = TableParams::parse(Path::new("ntlm_ascii-32-95#8-8_0_422000x67108864_0.rt")).unwrap();
        assert_eq!(HashKind::Ntlm, p.hash_kind);
        assert_eq!("ascii-32-95", p.charset_name);
        assert_eq!(95, p.charset.len());
        assert_eq!(8, p.min_len);
        assert_eq!(8, p.max_len);
        assert_eq!(0, p.table_index);
        assert_eq!(422000, p.chain_len);
        assert_eq!(67108864, p.num_chains);
        assert_eq!(0, p.part);
        assert!(!p.compressed);
        assert_eq!(0, p.reduction_offset());
    }

    #[test]
    fn parses_compressed_extension() {
        let p = TableParams::parse(Path::new("ntlm_numeric#4-4_1_1000x100_2.rtc")).unwrap();
        assert!(p.compressed);
        assert_eq!(65536, p.reduction_offset());
    }

    #[test]
    fn ignores_directory_prefix() {
        let p =
            TableParams::parse(Path::new("/data/tables/ntlm_numeric#4-4_0_1000x100_0.rt")).unwrap();
        assert_eq!(4, p.min_len);
    }

    #[test]
    fn rejects_unknown_extension() {
        assert!(TableParams::parse(Path::new("ntlm_numeric#4-4_0_1000x100_0.txt")).is_err());
    }

    #[test]
    fn rejects_bad_length_range() {
        assert!(TableParams::parse(Path::new("ntlm_numeric#0-4_0_1000x100_0.rt")).is_err());
        assert!(TableParams::parse(Path::new("ntlm_numeric#6-4_0_1000x100_0.rt")).is_err());
        assert!(TableParams::parse(Path::new("ntlm_numeric#1-16_0_1000x100_0.rt")).is_err());
    }

    #[test]
    fn rejects_unrecognized_charset() {
        assert!(TableParams::parse(Path::new("ntlm_bogus#4-4_0_1000x100_0.rt")).is_err());
    }

    #[test]
    fn part_in_range_checks_against_total() {
        let p = TableParams::parse(Path::new("ntlm_numeric#4-4_0_1000x5_2.rt")).unwrap();
        assert!(p.part_in_range(10_000));
        assert!(!p.part_in_range(10));
    }
}
