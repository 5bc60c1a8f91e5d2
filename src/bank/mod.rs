//! Wwise sound bank containers
//!
//! A bank is a sequence of `tag(4) + size(u32 LE) + payload` chunks. Embedded
//! media is listed in `DIDX` as `(id, offset, size)` records pointing into the
//! `DATA` payload. Banks that do not follow this layout are searched for raw
//! `RIFF` signatures instead.

pub mod wem;

use std::io::Cursor;
use std::path::Path;
use byteorder::{LittleEndian, ReadBytesExt};
use crate::error::{Wsb2WavError, Result};

pub use wem::{WemCodec, WemHeader, parse_wem_header, looks_like_wem};

const DIDX_RECORD_SIZE: usize = 12;
const CHUNK_HEADER_SIZE: usize = 8;
/// Largest single stream the signature scan will accept
const MAX_SCANNED_STREAM: usize = 100_000_000;

/// Which parse path produced the entries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BankLayout {
    /// BKHD / DIDX / DATA
    Indexed,
    /// RIFF signature scan
    Scanned,
}

/// One embedded, still-encoded stream
#[derive(Debug, Clone, PartialEq)]
pub struct BankEntry {
    pub id: String,
    /// Absolute offset of the stream within the bank file
    pub offset: usize,
    pub data: Vec<u8>,
}

/// Index record that could not be resolved against the DATA chunk
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedEntry {
    pub id: String,
    pub reason: String,
}

#[derive(Debug, Clone)]
pub struct SoundBank {
    pub layout: BankLayout,
    pub entries: Vec<BankEntry>,
    pub skipped: Vec<SkippedEntry>,
}

#[derive(Debug, Clone, Copy)]
struct Chunk<'a> {
    tag: [u8; 4],
    /// Offset of the payload within the file
    offset: usize,
    payload: &'a [u8],
}

impl SoundBank {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| Wsb2WavError::decode(format!(
            "Cannot read sound bank {}: {}", path.display(), e
        )))?;
        Self::parse(&bytes)
    }

    /// Extract every embedded stream, preferring the DIDX index.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if let Some(bank) = Self::parse_indexed(bytes)? {
            if !bank.entries.is_empty() || !bank.skipped.is_empty() {
                return Ok(bank);
            }
        }

        log::debug!("No usable DIDX/DATA index, scanning for RIFF signatures");
        let entries = scan_riff_streams(bytes);
        if entries.is_empty() {
            return Err(Wsb2WavError::decode("No audio streams found"));
        }

        Ok(Self { layout: BankLayout::Scanned, entries, skipped: Vec::new() })
    }

    fn parse_indexed(bytes: &[u8]) -> Result<Option<Self>> {
        let chunks = read_chunks(bytes);
        if chunks.first().is_none_or(|c| &c.tag != b"BKHD") {
            return Ok(None);
        }

        let didx = chunks.iter().find(|c| &c.tag == b"DIDX");
        let data = chunks.iter().find(|c| &c.tag == b"DATA");
        let (Some(didx), Some(data)) = (didx, data) else {
            return Ok(None);
        };

        let mut entries = Vec::new();
        let mut skipped = Vec::new();
        let mut reader = Cursor::new(didx.payload);

        for _ in 0..didx.payload.len() / DIDX_RECORD_SIZE {
            let id = reader.read_u32::<LittleEndian>()?;
            let offset = reader.read_u32::<LittleEndian>()? as usize;
            let size = reader.read_u32::<LittleEndian>()? as usize;
            let id = format_stream_id(id);

            match offset.checked_add(size).filter(|&end| end <= data.payload.len()) {
                Some(end) => entries.push(BankEntry {
                    id,
                    offset: data.offset + offset,
                    data: data.payload[offset..end].to_vec(),
                }),
                None => {
                    log::warn!(
                        "Stream {} at {:#x}+{:#x} lies outside the {}-byte DATA chunk",
                        id, offset, size, data.payload.len()
                    );
                    skipped.push(SkippedEntry {
                        id,
                        reason: format!("index points outside DATA chunk ({:#x}+{:#x})", offset, size),
                    });
                }
            }
        }

        Ok(Some(Self { layout: BankLayout::Indexed, entries, skipped }))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Media ids are zero-padded to eight digits.
pub fn format_stream_id(id: u32) -> String {
    format!("{:08}", id)
}

/// Walk top-level chunks until the data runs out or a size overruns the file.
fn read_chunks(bytes: &[u8]) -> Vec<Chunk<'_>> {
    let mut chunks = Vec::new();
    let mut pos = 0usize;

    while pos + CHUNK_HEADER_SIZE <= bytes.len() {
        let tag = [bytes[pos], bytes[pos + 1], bytes[pos + 2], bytes[pos + 3]];
        let size = u32::from_le_bytes([bytes[pos + 4], bytes[pos + 5], bytes[pos + 6], bytes[pos + 7]]) as usize;
        let start = pos + CHUNK_HEADER_SIZE;

        let Some(end) = start.checked_add(size).filter(|&end| end <= bytes.len()) else {
            log::debug!("Chunk {:?} at {:#x} overruns the file", String::from_utf8_lossy(&tag), pos);
            break;
        };

        chunks.push(Chunk { tag, offset: start, payload: &bytes[start..end] });
        pos = end;
    }

    chunks
}

/// Find `RIFF` blobs anywhere in the file. Ids are the ordinal of the
/// signature among all matches, so they stay stable whether or not a
/// candidate is accepted.
fn scan_riff_streams(bytes: &[u8]) -> Vec<BankEntry> {
    let mut entries = Vec::new();
    let mut resume_at = 0usize;

    let positions = bytes
        .windows(4)
        .enumerate()
        .filter(|(_, window)| *window == b"RIFF")
        .map(|(pos, _)| pos);

    for (ordinal, pos) in positions.enumerate() {
        if pos < resume_at || pos + CHUNK_HEADER_SIZE > bytes.len() {
            continue;
        }

        let size = u32::from_le_bytes([bytes[pos + 4], bytes[pos + 5], bytes[pos + 6], bytes[pos + 7]]) as usize;
        if !(CHUNK_HEADER_SIZE..=MAX_SCANNED_STREAM).contains(&size) || pos + size + CHUNK_HEADER_SIZE > bytes.len() {
            continue;
        }

        let end = pos + size + CHUNK_HEADER_SIZE;
        entries.push(BankEntry {
            id: format_stream_id(ordinal as u32),
            offset: pos,
            data: bytes[pos..end].to_vec(),
        });
        resume_at = end;
    }

    entries
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    pub(crate) fn chunk(tag: &[u8; 4], payload: &[u8]) -> Vec<u8> {
        let mut out = tag.to_vec();
        out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        out.extend_from_slice(payload);
        out
    }

    /// Build a BKHD/DIDX/DATA bank holding `streams` back to back.
    pub(crate) fn build_bank(streams: &[(u32, Vec<u8>)]) -> Vec<u8> {
        let mut didx = Vec::new();
        let mut data = Vec::new();
        for (id, blob) in streams {
            didx.extend_from_slice(&id.to_le_bytes());
            didx.extend_from_slice(&(data.len() as u32).to_le_bytes());
            didx.extend_from_slice(&(blob.len() as u32).to_le_bytes());
            data.extend_from_slice(blob);
        }

        let mut bank = chunk(b"BKHD", &[0x71, 0, 0, 0, 0x2A, 0, 0, 0]);
        bank.extend(chunk(b"DIDX", &didx));
        bank.extend(chunk(b"DATA", &data));
        bank.extend(chunk(b"HIRC", &[0, 0, 0, 0]));
        bank
    }

    fn fake_riff(fill: u8, body: usize) -> Vec<u8> {
        let mut out = b"RIFF".to_vec();
        out.extend_from_slice(&((body + 4) as u32).to_le_bytes());
        out.extend_from_slice(b"WAVE");
        out.extend(std::iter::repeat_n(fill, body));
        out
    }

    #[test]
    fn test_parse_indexed_bank() {
        let bank = build_bank(&[(1, fake_riff(1, 4)), (934_221, fake_riff(2, 8))]);
        let parsed = SoundBank::parse(&bank).unwrap();

        assert_eq!(parsed.layout, BankLayout::Indexed);
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed.entries[0].id, "00000001");
        assert_eq!(parsed.entries[1].id, "00934221");
        assert_eq!(parsed.entries[1].data, fake_riff(2, 8));
        assert_eq!(&bank[parsed.entries[0].offset..parsed.entries[0].offset + 4], b"RIFF");
    }

    #[test]
    fn test_out_of_range_index_is_skipped() {
        let mut didx = Vec::new();
        for (id, offset, size) in [(5u32, 0u32, 12u32), (6, 8, 100)] {
            didx.extend_from_slice(&id.to_le_bytes());
            didx.extend_from_slice(&offset.to_le_bytes());
            didx.extend_from_slice(&size.to_le_bytes());
        }
        let mut bank = chunk(b"BKHD", &[0; 8]);
        bank.extend(chunk(b"DIDX", &didx));
        bank.extend(chunk(b"DATA", &fake_riff(0, 4)));

        let parsed = SoundBank::parse(&bank).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed.skipped.len(), 1);
        assert_eq!(parsed.skipped[0].id, "00000006");
    }

    #[test]
    fn test_scan_fallback_without_index() {
        let mut blob = vec![0xAA; 5];
        blob.extend(fake_riff(3, 6));
        blob.extend([0xBB; 3]);
        blob.extend(fake_riff(4, 2));

        let parsed = SoundBank::parse(&blob).unwrap();
        assert_eq!(parsed.layout, BankLayout::Scanned);
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed.entries[0].id, "00000000");
        assert_eq!(parsed.entries[0].offset, 5);
        assert_eq!(parsed.entries[1].id, "00000001");
        assert_eq!(parsed.entries[1].data, fake_riff(4, 2));
    }

    #[test]
    fn test_scan_skips_bogus_sizes() {
        let mut blob = b"RIFF\xff\xff\xff\xff".to_vec();
        blob.extend(fake_riff(7, 4));

        let parsed = SoundBank::parse(&blob).unwrap();
        assert_eq!(parsed.len(), 1);
        // second signature in the file
        assert_eq!(parsed.entries[0].id, "00000001");
    }

    #[test]
    fn test_scan_does_not_split_nested_riff() {
        let inner = fake_riff(1, 2);
        let mut outer = b"RIFF".to_vec();
        outer.extend_from_slice(&((inner.len() + 4) as u32).to_le_bytes());
        outer.extend_from_slice(b"WAVE");
        outer.extend(&inner);

        let parsed = SoundBank::parse(&outer).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed.entries[0].data.len(), outer.len());
    }

    #[test]
    fn test_bank_without_media_fails() {
        let bank = chunk(b"BKHD", &[0; 8]);
        let err = SoundBank::parse(&bank).unwrap_err();
        assert!(matches!(err, Wsb2WavError::Decode { .. }));
        assert!(SoundBank::parse(&[]).is_err());
    }

    #[test]
    fn test_loose_wem_is_single_stream() {
        let wem = wem::tests::build_wem(1, 1, 8000, 2, 16, &[0u8; 4]);
        let parsed = SoundBank::parse(&wem).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed.entries[0].data, wem);
    }
}
