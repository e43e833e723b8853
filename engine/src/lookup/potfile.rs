//! Pot file writers: append-only, one line per confirmed crack.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use rainbow_core::RainbowResult;

pub const JTR_POT_NAME: &str = "rainbowcrackalack_jtr.pot";
pub const HASHCAT_POT_NAME: &str = "rainbowcrackalack_hashcat.pot";

/// Appends one crack to both pot file forms, unconditionally: every crack is
/// logged in both formats, regardless of which tool the caller intends to
/// use downstream.
pub fn append_crack(pot_dir: &Path, digest_hex: &str, plaintext: &str) -> RainbowResult<()> {
    append_line(
        &pot_dir.join(JTR_POT_NAME),
        &format!("[$NT$]{digest_hex}:{plaintext}"),
    )?;
    append_line(
        &pot_dir.join(HASHCAT_POT_NAME),
        &format!("{digest_hex}:{plaintext}"),
    )?;
    Ok(())
}

fn append_line(path: &PathBuf, line: &str) -> RainbowResult<()> {
    let mut f = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(f, "{line}")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_both_pot_files() {
        let dir = tempfile::tempdir().unwrap();
        append_crack(dir.path(), "8846f7eaee8fb117ad06bdd830b7586c", "password").unwrap();

        let jtr = std::fs::read_to_string(dir.path().join(JTR_POT_NAME)).unwrap();
        assert_eq!("[$NT$]8846f7eaee8fb117ad06bdd830b7586c:password\n", jtr);

        let hashcat = std::fs::read_to_string(dir.path().join(HASHCAT_POT_NAME)).unwrap();
        assert_eq!("8846f7eaee8fb117ad06bdd830b7586c:password\n", hashcat);
    }

    #[test]
    fn crack_lines_accumulate_in_order() {
        let dir = tempfile::tempdir().unwrap();
        append_crack(dir.path(), "aa", "one").unwrap();
        append_crack(dir.path(), "bb", "two").unwrap();

        let hashcat = std::fs::read_to_string(dir.path().join(HASHCAT_POT_NAME)).unwrap();
        assert_eq!("aa:one\nbb:two\n", hashcat);
    }
}
