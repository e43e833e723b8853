//! Compressed `.rtc` (RTC v3) table reader.
//!
//! Only the reader is implemented; the writer is a peripheral tool outside
//! this engine's scope.

use std::io::Read;

use super::ChainRecord;
use crate::error::{RainbowError, RainbowResult};

pub const MAGIC: u32 = 0x3043_5452;
/// magic(4) + sBits(2) + eBits(2) + sMin(8) + eMin(8) + eInterval(8).
const HEADER_LEN: usize = 32;

/// The fixed header every RTC v3 file starts with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RtcHeader {
    pub index_s_bits: u16,
    pub index_e_bits: u16,
    pub index_s_min: u64,
    pub index_e_min: u64,
    pub index_e_interval: u64,
}

impl RtcHeader {
    /// Bytes one packed chain record occupies.
    pub fn chain_size(&self) -> RainbowResult<usize> {
        let bits = self.index_s_bits as u32 + self.index_e_bits as u32;
        let size = bits.div_ceil(8) as usize;
        if size > 16 {
            return Err(RainbowError::BadFormat(format!(
                "packed chain record is {size} bytes, exceeds the 16-byte maximum"
            )));
        }
        Ok(size)
    }

    fn parse(buf: &[u8; HEADER_LEN]) -> RainbowResult<Self> {
        let magic = u32::from_le_bytes(buf[0..4].try_into().unwrap());
        if magic != MAGIC {
            return Err(RainbowError::BadFormat(format!(
                "bad RTC magic: {magic:#010x}, expected {MAGIC:#010x}"
            )));
        }

        let index_s_bits = u16::from_le_bytes(buf[4..6].try_into().unwrap());
        let index_e_bits = u16::from_le_bytes(buf[6..8].try_into().unwrap());
        let index_s_min = u64::from_le_bytes(buf[8..16].try_into().unwrap());
        let index_e_min = u64::from_le_bytes(buf[16..24].try_into().unwrap());
        let index_e_interval = u64::from_le_bytes(buf[24..32].try_into().unwrap());

        if index_s_bits > 64 || index_e_bits > 64 {
            return Err(RainbowError::BadFormat(format!(
                "index bit widths out of range: sBits={index_s_bits}, eBits={index_e_bits}"
            )));
        }

        Ok(Self {
            index_s_bits,
            index_e_bits,
            index_s_min,
            index_e_min,
            index_e_interval,
        })
    }
}

/// Reads an RTC v3 file, given the chain count recovered from its filename
/// (the `...xN_...` field — this reader trusts the caller to have parsed
/// that already via [`crate::params::TableParams`]).
pub fn read_all<R: Read>(mut reader: R, num_chains: u64) -> RainbowResult<Vec<ChainRecord>> {
    let mut header_buf = [0u8; HEADER_LEN];
    reader.read_exact(&mut header_buf)?;
    let header = RtcHeader::parse(&header_buf)?;
    let chain_size = header.chain_size()?;

    // index_s_bits is already validated to be <= 64, so this never overflows u128.
    let s_mask: u128 = (1u128 << header.index_s_bits) - 1;

    let mut out = Vec::with_capacity(num_chains as usize);
    let mut raw = [0u8; 16];
    for i in 0..num_chains {
        raw.fill(0);
        reader.read_exact(&mut raw[..chain_size])?;

        let b0 = u64::from_le_bytes(raw[0..8].try_into().unwrap());
        let b1 = u64::from_le_bytes(raw[8..16].try_into().unwrap());
        let combined: u128 = (b1 as u128) << 64 | b0 as u128;

        let start = (combined & s_mask) as u64 + header.index_s_min;
        let e_term = (combined >> header.index_s_bits) as u64;
        let end = header
            .index_e_min
            .wrapping_add(header.index_e_interval.wrapping_mul(i))
            .wrapping_add(e_term);

        out.push(ChainRecord { start, end });
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn header_bytes(s_bits: u16, e_bits: u16, s_min: u64, e_min: u64, e_interval: u64) -> Vec<u8> {
        let mut buf = Vec::with_capacity(HEADER_LEN);
        buf.extend_from_slice(&MAGIC.to_le_bytes());
        buf.extend_from_slice(&s_bits.to_le_bytes());
        buf.extend_from_slice(&e_bits.to_le_bytes());
        buf.extend_from_slice(&s_min.to_le_bytes());
        buf.extend_from_slice(&e_min.to_le_bytes());
        buf.extend_from_slice(&e_interval.to_le_bytes());
        buf
    }

    #[test]
    fn all_zero_chain_decodes_to_zero_pair() {
        let mut buf = header_bytes(26, 38, 0, 0, 0);
        buf.extend_from_slice(&[0u8; 8]);
        let records = read_all(Cursor::new(buf), 1).unwrap();
        assert_eq!(vec![ChainRecord { start: 0, end: 0 }], records);
    }

    #[test]
    fn rejects_bad_magic() {
        let mut buf = header_bytes(26, 38, 0, 0, 0);
        buf[0] = 0;
        assert!(matches!(
            read_all(Cursor::new(buf), 0),
            Err(RainbowError::BadFormat(_))
        ));
    }

    #[test]
    fn rejects_oversized_bit_widths() {
        let buf = header_bytes(65, 10, 0, 0, 0);
        assert!(matches!(
            read_all(Cursor::new(buf), 0),
            Err(RainbowError::BadFormat(_))
        ));
    }

    #[test]
    fn recovers_start_and_end_with_offsets() {
        // sBits=8, eBits=8: chain_size = 2 bytes. s_min=100, e_min=1000, interval=5.
        let mut buf = header_bytes(8, 8, 100, 1000, 5);
        // chain 0: packed byte0=3 (s field), byte1=7 (e field).
        buf.extend_from_slice(&[3, 7]);
        // chain 1: packed byte0=0, byte1=0.
        buf.extend_from_slice(&[0, 0]);

        let records = read_all(Cursor::new(buf), 2).unwrap();
        assert_eq!(103, records[0].start);
        assert_eq!(1000 + 0 + 7, records[0].end);
        assert_eq!(100, records[1].start);
        assert_eq!(1000 + 5, records[1].end);
    }

    #[test]
    fn chain_size_over_16_bytes_is_rejected() {
        let header = RtcHeader {
            index_s_bits: 64,
            index_e_bits: 64,
            index_s_min: 0,
            index_e_min: 0,
            index_e_interval: 0,
        };
        assert_eq!(16, header.chain_size().unwrap());

        let header = RtcHeader {
            index_s_bits: 64,
            index_e_bits: 65,
            ..header
        };
        assert!(header.chain_size().is_err());
    }
}
