//! WOFF 1.0 encoding.

use flate2::Compression;
use flate2::write::ZlibEncoder;
use std::io::Write;

use super::sfnt::Sfnt;
use super::{FontError, align4};

const SIGNATURE: &[u8; 4] = b"wOFF";
const HEADER_LEN: usize = 44;
const ENTRY_LEN: usize = 20;

/// Wrap an SFNT font as WOFF.
///
/// Each table is zlib-compressed, or stored raw when compression does not
/// make it smaller.
pub fn to_woff(data: &[u8]) -> Result<Vec<u8>, FontError> {
    let font = Sfnt::parse(data)?;

    let bodies = font
        .tables
        .iter()
        .map(|table| {
            let mut encoder = ZlibEncoder::new(Vec::new(), Compression::best());
            encoder.write_all(table.data)?;
            let compressed = encoder.finish()?;
            Ok(if compressed.len() < table.data.len() {
                compressed
            } else {
                table.data.to_vec()
            })
        })
        .collect::<Result<Vec<_>, FontError>>()?;

    let mut offset = HEADER_LEN + ENTRY_LEN * font.tables.len();
    let total = offset + bodies.iter().map(|b| align4(b.len())).sum::<usize>();

    let mut out = Vec::with_capacity(total);
    out.extend_from_slice(SIGNATURE);
    put_u32(&mut out, font.flavor);
    put_u32(&mut out, total as u32);
    put_u16(&mut out, font.tables.len() as u16);
    put_u16(&mut out, 0);
    put_u32(&mut out, font.total_sfnt_size() as u32);
    put_u16(&mut out, 1); // majorVersion
    put_u16(&mut out, 0);
    // metadata and private blocks
    for _ in 0..5 {
        put_u32(&mut out, 0);
    }

    for (table, body) in font.tables.iter().zip(&bodies) {
        out.extend_from_slice(&table.tag);
        put_u32(&mut out, offset as u32);
        put_u32(&mut out, body.len() as u32);
        put_u32(&mut out, table.data.len() as u32);
        put_u32(&mut out, table.checksum);
        offset += align4(body.len());
    }

    for body in &bodies {
        out.extend_from_slice(body);
        out.resize(align4(out.len()), 0);
    }

    Ok(out)
}

fn put_u32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_be_bytes());
}

fn put_u16(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_be_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::fixtures::{be16, be32, sfnt};
    use flate2::read::ZlibDecoder;
    use std::io::Read;

    #[test]
    fn test_woff_header() {
        let woff = to_woff(&sfnt()).unwrap();
        assert_eq!(&woff[..4], b"wOFF");
        assert_eq!(be32(&woff, 4), 0x0001_0000);
        assert_eq!(be32(&woff, 8) as usize, woff.len());
        assert_eq!(be16(&woff, 12), 3);
        assert_eq!(be32(&woff, 16), 252);
        assert_eq!(woff.len() % 4, 0);
    }

    #[test]
    fn test_woff_tables_recoverable() {
        let source = sfnt();
        let woff = to_woff(&source).unwrap();

        // glyf is the first entry after sorting; 101 repeated bytes compress well
        let entry = HEADER_LEN;
        assert_eq!(&woff[entry..entry + 4], b"glyf");
        let offset = be32(&woff, entry + 4) as usize;
        let comp_len = be32(&woff, entry + 8) as usize;
        let orig_len = be32(&woff, entry + 12) as usize;
        assert_eq!(orig_len, 101);
        assert!(comp_len < orig_len);
        assert_eq!(offset % 4, 0);

        let mut table = Vec::new();
        ZlibDecoder::new(&woff[offset..offset + comp_len])
            .read_to_end(&mut table)
            .unwrap();
        assert_eq!(table, vec![7u8; 101]);
        assert_eq!(be32(&woff, entry + 16), 0xdead_beef);
    }

    #[test]
    fn test_woff_rejects_non_sfnt() {
        assert!(to_woff(b"<svg/>").is_err());
    }
}
