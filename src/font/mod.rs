//! Web font containers.
//!
//! Reads an SFNT font (TrueType or CFF-flavored OpenType) and rewraps its
//! tables as WOFF (zlib per table) or WOFF2 (one brotli stream, null table
//! transforms). Glyph data is never reinterpreted.

mod sfnt;
mod woff;
mod woff2;

pub use sfnt::Sfnt;
pub use woff::to_woff;
pub use woff2::to_woff2;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FontError {
    #[error("font data is truncated")]
    Truncated,

    #[error("unsupported font signature {0:#010x}")]
    Signature(u32),

    #[error("font collections are not supported")]
    Collection,

    #[error("table `{tag}` lies outside the font data")]
    TableBounds { tag: String },

    #[error("failed to compress font data")]
    Compress(#[from] std::io::Error),
}

/// Pad a length to the next multiple of four.
const fn align4(n: usize) -> usize {
    (n + 3) & !3
}

#[cfg(test)]
pub(crate) mod fixtures {
    /// A tiny SFNT with three tables, deliberately out of tag order.
    pub fn sfnt() -> Vec<u8> {
        let tables: [(&[u8; 4], Vec<u8>); 3] = [
            (b"name", b"assetflow test font name table".to_vec()),
            (b"head", vec![0u8; 54]),
            (b"glyf", vec![7u8; 101]),
        ];

        let mut out = Vec::new();
        out.extend_from_slice(&0x0001_0000u32.to_be_bytes());
        out.extend_from_slice(&(tables.len() as u16).to_be_bytes());
        out.extend_from_slice(&[0, 32, 0, 1, 0, 16]);

        let mut offset = 12 + 16 * tables.len();
        let mut data = Vec::new();
        for (tag, body) in &tables {
            out.extend_from_slice(*tag);
            out.extend_from_slice(&0xdead_beefu32.to_be_bytes());
            out.extend_from_slice(&(offset as u32).to_be_bytes());
            out.extend_from_slice(&(body.len() as u32).to_be_bytes());
            data.extend_from_slice(body);
            while data.len() % 4 != 0 {
                data.push(0);
            }
            offset = 12 + 16 * tables.len() + data.len();
        }
        out.extend_from_slice(&data);
        out
    }

    pub fn be32(data: &[u8], at: usize) -> u32 {
        u32::from_be_bytes(data[at..at + 4].try_into().unwrap())
    }

    pub fn be16(data: &[u8], at: usize) -> u16 {
        u16::from_be_bytes(data[at..at + 2].try_into().unwrap())
    }
}
