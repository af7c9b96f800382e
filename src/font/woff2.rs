//! WOFF2 encoding with null table transforms.
//!
//! All tables are concatenated, unpadded, in directory order and compressed
//! as one brotli stream. `glyf` and `loca` use transform version 3 (null),
//! every other table version 0 (null).

use std::io::Write;

use super::sfnt::Sfnt;
use super::{FontError, align4};

const SIGNATURE: &[u8; 4] = b"wOF2";
const HEADER_LEN: usize = 48;

const BROTLI_QUALITY: u32 = 11;
const BROTLI_WINDOW: u32 = 22;

/// Tags with a one-byte index in the table directory.
const KNOWN_TAGS: [&[u8; 4]; 63] = [
    b"cmap", b"head", b"hhea", b"hmtx", b"maxp", b"name", b"OS/2", b"post", b"cvt ", b"fpgm",
    b"glyf", b"loca", b"prep", b"CFF ", b"VORG", b"EBDT", b"EBLC", b"gasp", b"hdmx", b"kern",
    b"LTSH", b"PCLT", b"VDMX", b"vhea", b"vmtx", b"BASE", b"GDEF", b"GPOS", b"GSUB", b"EBSC",
    b"JSTF", b"MATH", b"CBDT", b"CBLC", b"COLR", b"CPAL", b"SVG ", b"sbix", b"acnt", b"avar",
    b"bdat", b"bloc", b"bsln", b"cvar", b"fdsc", b"feat", b"fmtx", b"fvar", b"gvar", b"hsty",
    b"just", b"lcar", b"mort", b"morx", b"opbd", b"prop", b"trak", b"Zapf", b"Silf", b"Glat",
    b"Gloc", b"Feat", b"Sill",
];

const ARBITRARY_TAG: u8 = 63;

/// Wrap an SFNT font as WOFF2.
pub fn to_woff2(data: &[u8]) -> Result<Vec<u8>, FontError> {
    let font = Sfnt::parse(data)?;

    let mut directory = Vec::new();
    let mut stream = Vec::new();
    for table in &font.tables {
        let index = KNOWN_TAGS.iter().position(|t| **t == table.tag);
        let transform: u8 = if matches!(&table.tag, b"glyf" | b"loca") { 3 } else { 0 };

        match index {
            Some(i) => directory.push(i as u8 | (transform << 6)),
            None => {
                directory.push(ARBITRARY_TAG | (transform << 6));
                directory.extend_from_slice(&table.tag);
            }
        }
        push_base128(&mut directory, table.data.len() as u32);
        stream.extend_from_slice(table.data);
    }

    let compressed = {
        let mut writer =
            brotli::CompressorWriter::new(Vec::new(), 4096, BROTLI_QUALITY, BROTLI_WINDOW);
        writer.write_all(&stream)?;
        writer.flush()?;
        writer.into_inner()
    };

    let unpadded = HEADER_LEN + directory.len() + compressed.len();
    let total = align4(unpadded);

    let mut out = Vec::with_capacity(total);
    out.extend_from_slice(SIGNATURE);
    out.extend_from_slice(&font.flavor.to_be_bytes());
    out.extend_from_slice(&(total as u32).to_be_bytes());
    out.extend_from_slice(&(font.tables.len() as u16).to_be_bytes());
    out.extend_from_slice(&0u16.to_be_bytes());
    out.extend_from_slice(&(font.total_sfnt_size() as u32).to_be_bytes());
    out.extend_from_slice(&(compressed.len() as u32).to_be_bytes());
    out.extend_from_slice(&1u16.to_be_bytes()); // majorVersion
    out.extend_from_slice(&0u16.to_be_bytes());
    // metadata and private blocks
    out.extend_from_slice(&[0u8; 20]);

    out.extend_from_slice(&directory);
    out.extend_from_slice(&compressed);
    out.resize(total, 0);

    Ok(out)
}

/// Append `value` as a UIntBase128: big-endian 7-bit groups, high bit set on
/// all but the last byte, no leading zero groups.
fn push_base128(out: &mut Vec<u8>, value: u32) {
    let mut groups = [0u8; 5];
    let mut len = 0;
    let mut rest = value;
    loop {
        groups[len] = (rest & 0x7f) as u8;
        len += 1;
        rest >>= 7;
        if rest == 0 {
            break;
        }
    }
    for i in (0..len).rev() {
        let continuation = if i == 0 { 0 } else { 0x80 };
        out.push(groups[i] | continuation);
    }
}
