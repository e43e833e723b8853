//! Uncompressed `.rt` table I/O: `u64 start; u64 end;` records, little-endian,
//! no header.

use std::io::{self, Read, Write};

use super::{ChainRecord, RECORD_LEN};
use crate::error::{RainbowError, RainbowResult};

/// Reads every record in `reader` in file order.
///
/// A trailing partial record (fewer than [`RECORD_LEN`] bytes left) is
/// reported as [`RainbowError::BadFormat`]; a clean EOF at a record boundary
/// ends the table normally.
pub fn read_all<R: Read>(mut reader: R) -> RainbowResult<Vec<ChainRecord>> {
    let mut out = Vec::new();
    let mut buf = [0u8; RECORD_LEN];
    loop {
        match read_exact_or_eof(&mut reader, &mut buf)? {
            true => break,
            false => out.push(decode_record(&buf)),
        }
    }
    Ok(out)
}

/// Reads exactly one record at the given zero-based chain index, using
/// `seek` rather than a linear scan. Suited to the random-access reads the
/// binary-search stage performs.
pub fn read_record_at<R: Read + io::Seek>(mut reader: R, chain_index: u64) -> RainbowResult<ChainRecord> {
    reader.seek(io::SeekFrom::Start(chain_index * RECORD_LEN as u64))?;
    let mut buf = [0u8; RECORD_LEN];
    reader.read_exact(&mut buf)?;
    Ok(decode_record(&buf))
}

/// Writes `records` back to back, in order.
pub fn write_all<W: Write>(mut writer: W, records: &[ChainRecord]) -> RainbowResult<()> {
    for record in records {
        writer.write_all(&encode_record(record))?;
    }
    Ok(())
}

/// Encodes a single record to its 16-byte little-endian form.
pub fn encode_record(record: &ChainRecord) -> [u8; RECORD_LEN] {
    let mut buf = [0u8; RECORD_LEN];
    buf[0..8].copy_from_slice(&record.start.to_le_bytes());
    buf[8..16].copy_from_slice(&record.end.to_le_bytes());
    buf
}

fn decode_record(buf: &[u8; RECORD_LEN]) -> ChainRecord {
    let mut start = [0u8; 8];
    let mut end = [0u8; 8];
    start.copy_from_slice(&buf[0..8]);
    end.copy_from_slice(&buf[8..16]);
    ChainRecord {
        start: u64::from_le_bytes(start),
        end: u64::from_le_bytes(end),
    }
}

/// Reads into `buf`, returning `Ok(true)` on a clean EOF before any byte was
/// read, `Ok(false)` once `buf` is full, or `BadFormat` on a short read.
fn read_exact_or_eof<R: Read>(reader: &mut R, buf: &mut [u8]) -> RainbowResult<bool> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = reader.read(&mut buf[filled..])?;
        if n == 0 {
            if filled == 0 {
                return Ok(true);
            }
            return Err(RainbowError::BadFormat(format!(
                "truncated record: got {filled} of {} bytes",
                buf.len()
            )));
        }
        filled += n;
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn round_trips_records() {
        let records = vec![
            ChainRecord { start: 0, end: 0 },
            ChainRecord {
                start: 1,
                end: u64::MAX,
            },
            ChainRecord {
                start: 456,
                end: 6_003_715_575_086_450,
            },
        ];

        let mut buf = Vec::new();
        write_all(&mut buf, &records).unwrap();
        assert_eq!(records.len() * RECORD_LEN, buf.len());

        let read_back = read_all(Cursor::new(buf)).unwrap();
        assert_eq!(records, read_back);
    }

    #[test]
    fn empty_file_is_empty_table() {
        let read_back = read_all(Cursor::new(Vec::new())).unwrap();
        assert!(read_back.is_empty());
    }

    #[test]
    fn truncated_record_is_bad_format() {
        let mut buf = Vec::new();
        write_all(&mut buf, &[ChainRecord { start: 1, end: 2 }]).unwrap();
        buf.truncate(10);
        assert!(matches!(
            read_all(Cursor::new(buf)),
            Err(RainbowError::BadFormat(_))
        ));
    }

    #[test]
    fn read_record_at_seeks_to_the_right_offset() {
        let records = vec![
            ChainRecord { start: 1, end: 2 },
            ChainRecord { start: 3, end: 4 },
            ChainRecord { start: 5, end: 6 },
        ];
        let mut buf = Vec::new();
        write_all(&mut buf, &records).unwrap();

        let got = read_record_at(Cursor::new(&buf), 1).unwrap();
        assert_eq!(records[1], got);
    }
}
