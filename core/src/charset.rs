//! The closed registry of named charsets a table filename can reference.
//!
//! Unlike the teacher crate (which lets a caller hand in any byte slice),
//! rainbow table files only ever name one of a fixed set of charsets in
//! their filename, so lookups here either resolve to the registry's bytes
//! or fail outright — there is no "custom charset" path.

/// Every charset name this engine recognizes.
pub const NAMES: &[&str] = &[
    "numeric",
    "alpha",
    "alpha-numeric",
    "loweralpha",
    "loweralpha-numeric",
    "mixalpha",
    "mixalpha-numeric",
    "ascii-32-95",
    "ascii-32-65-123-4",
    "alpha-numeric-symbol32-space",
];

const NUMERIC: &[u8] = b"0123456789";
const ALPHA: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const LOWERALPHA: &[u8] = b"abcdefghijklmnopqrstuvwxyz";

/// Looks up the raw bytes of a charset by name.
///
/// Returns `None` for any name outside [`NAMES`]; callers treat that as a
/// validation failure.
pub fn by_name(name: &str) -> Option<Vec<u8>> {
    Some(match name {
        "numeric" => NUMERIC.to_vec(),
        "alpha" => ALPHA.to_vec(),
        "alpha-numeric" => concat(ALPHA, NUMERIC),
        "loweralpha" => LOWERALPHA.to_vec(),
        "loweralpha-numeric" => concat(LOWERALPHA, NUMERIC),
        "mixalpha" => concat(LOWERALPHA, ALPHA),
        "mixalpha-numeric" => concat3(LOWERALPHA, ALPHA, NUMERIC),
        "ascii-32-95" => (0x20u8..=0x7e).collect(),
        // historically "32-65" plus "123-4": 32..=65 inclusive, then 4 bytes starting at 123.
        "ascii-32-65-123-4" => (0x20u8..=0x41).chain(0x7bu8..=0x7e).collect(),
        "alpha-numeric-symbol32-space" => {
            let mut v = concat3(LOWERALPHA, ALPHA, NUMERIC);
            v.extend(symbol32());
            v.push(b' ');
            v
        }
        _ => return None,
    })
}

fn concat(a: &[u8], b: &[u8]) -> Vec<u8> {
    let mut v = Vec::with_capacity(a.len() + b.len());
    v.extend_from_slice(a);
    v.extend_from_slice(b);
    v
}

fn concat3(a: &[u8], b: &[u8], c: &[u8]) -> Vec<u8> {
    let mut v = Vec::with_capacity(a.len() + b.len() + c.len());
    v.extend_from_slice(a);
    v.extend_from_slice(b);
    v.extend_from_slice(c);
    v
}

/// The 32 printable ASCII symbols that aren't letters, digits or space.
fn symbol32() -> impl Iterator<Item = u8> {
    (0x21u8..=0x2f)
        .chain(0x3au8..=0x40)
        .chain(0x5bu8..=0x60)
        .chain(0x7bu8..=0x7e)
}
