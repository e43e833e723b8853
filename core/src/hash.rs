//! Hash-kind resolution and digest parsing.

use crate::error::{RainbowError, RainbowResult};

/// The hash family a table or target digest belongs to.
///
/// Only [`HashKind::Ntlm`] participates in chain arithmetic; `Lm` is parsed
/// for filename compatibility but is rejected the moment it would be used to
/// generate, verify or look up a table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HashKind {
    Ntlm,
    Lm,
}

impl HashKind {
    /// Resolves a filename's hash field, mirroring `hash_str_to_type`: an
    /// unrecognized string is not an error here, just "no match".
    pub fn from_str_opt(s: &str) -> Option<Self> {
        match s {
            "ntlm" => Some(Self::Ntlm),
            "lm" => Some(Self::Lm),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ntlm => "ntlm",
            Self::Lm => "lm",
        }
    }
}

/// Parses a hex-encoded digest into raw bytes, rejecting anything that
/// isn't exactly `expected_len` bytes of valid hex.
pub fn parse_digest_hex(hex_str: &str, expected_len: usize) -> RainbowResult<Vec<u8>> {
    let hex_str = hex_str.trim();
    if hex_str.len() != expected_len * 2 {
        return Err(RainbowError::ParseParams(format!(
            "digest must be {} hex characters, got {}",
            expected_len * 2,
            hex_str.len()
        )));
    }

    let mut out = Vec::with_capacity(expected_len);
    for chunk in hex_str.as_bytes().chunks(2) {
        let s = std::str::from_utf8(chunk).map_err(|_| {
            RainbowError::ParseParams("digest contains non-ASCII characters".into())
        })?;
        let byte = u8::from_str_radix(s, 16)
            .map_err(|_| RainbowError::ParseParams(format!("invalid hex byte: {s}")))?;
        out.push(byte);
    }
    Ok(out)
}

/// Parses a 16-byte NTLM digest, the only width the lookup pipeline accepts.
pub fn parse_ntlm_digest_hex(hex_str: &str) -> RainbowResult<[u8; 16]> {
    let bytes = parse_digest_hex(hex_str, 16)?;
    let mut out = [0u8; 16];
    out.copy_from_slice(&bytes);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_kind_round_trips() {
        assert_eq!(Some(HashKind::Ntlm), HashKind::from_str_opt("ntlm"));
        assert_eq!(Some(HashKind::Lm), HashKind::from_str_opt("lm"));
        assert_eq!(None, HashKind::from_str_opt("sha1"));
    }

    #[test]
    fn parse_ntlm_digest_accepts_well_formed_hex() {
        let hex_str = "8846f7eaee8fb117ad06bdd830b7586c";
        let digest = parse_ntlm_digest_hex(hex_str).unwrap();
        assert_eq!([0x88, 0x46, 0xf7, 0xea], digest[..4]);
    }

    #[test]
    fn parse_ntlm_digest_rejects_odd_length() {
        assert!(parse_ntlm_digest_hex("8846f7eaee8fb117ad06bdd830b7586c0").is_err());
    }

    #[test]
    fn parse_digest_hex_rejects_wrong_length() {
        assert!(parse_digest_hex("abcd", 16).is_err());
    }

    #[test]
    fn parse_digest_hex_rejects_non_hex() {
        assert!(parse_digest_hex(&"zz".repeat(16), 16).is_err());
    }
}
