//! SFNT table directory parsing.

use super::{FontError, align4};

const TRUETYPE: u32 = 0x0001_0000;
const OPENTYPE_CFF: u32 = u32::from_be_bytes(*b"OTTO");
const APPLE_TRUE: u32 = u32::from_be_bytes(*b"true");
const COLLECTION: u32 = u32::from_be_bytes(*b"ttcf");

/// One table of an SFNT font.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table<'a> {
    pub tag: [u8; 4],
    pub checksum: u32,
    pub data: &'a [u8],
}

impl Table<'_> {
    pub fn tag_str(&self) -> String {
        String::from_utf8_lossy(&self.tag).into_owned()
    }
}

/// A parsed SFNT font borrowing its table data.
#[derive(Debug)]
pub struct Sfnt<'a> {
    pub flavor: u32,
    /// Sorted by tag.
    pub tables: Vec<Table<'a>>,
}

impl<'a> Sfnt<'a> {
    pub fn parse(data: &'a [u8]) -> Result<Self, FontError> {
        let flavor = read_u32(data, 0)?;
        match flavor {
            TRUETYPE | OPENTYPE_CFF | APPLE_TRUE => {}
            COLLECTION => return Err(FontError::Collection),
            other => return Err(FontError::Signature(other)),
        }

        let count = usize::from(read_u16(data, 4)?);
        let mut tables = Vec::with_capacity(count);
        for i in 0..count {
            let record = 12 + i * 16;
            let tag: [u8; 4] = data
                .get(record..record + 4)
                .and_then(|t| t.try_into().ok())
                .ok_or(FontError::Truncated)?;
            let checksum = read_u32(data, record + 4)?;
            let offset = read_u32(data, record + 8)? as usize;
            let length = read_u32(data, record + 12)? as usize;

            let body = offset
                .checked_add(length)
                .and_then(|end| data.get(offset..end))
                .ok_or_else(|| FontError::TableBounds {
                    tag: String::from_utf8_lossy(&tag).into_owned(),
                })?;

            tables.push(Table {
                tag,
                checksum,
                data: body,
            });
        }
        tables.sort_by(|a, b| a.tag.cmp(&b.tag));

        Ok(Self { flavor, tables })
    }

    /// Size of the font rebuilt as a plain SFNT (header, directory, padded tables).
    pub fn total_sfnt_size(&self) -> usize {
        12 + 16 * self.tables.len()
            + self
                .tables
                .iter()
                .map(|t| align4(t.data.len()))
                .sum::<usize>()
    }
}

fn read_u32(data: &[u8], at: usize) -> Result<u32, FontError> {
    data.get(at..at + 4)
        .and_then(|b| b.try_into().ok())
        .map(u32::from_be_bytes)
        .ok_or(FontError::Truncated)
}

fn read_u16(data: &[u8], at: usize) -> Result<u16, FontError> {
    data.get(at..at + 2)
        .and_then(|b| b.try_into().ok())
        .map(u16::from_be_bytes)
        .ok_or(FontError::Truncated)
}
