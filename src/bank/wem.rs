//! WEM (Wwise Encoded Media) header parsing
//!
//! A WEM is a RIFF/WAVE file whose `fmt ` tag selects the codec. PCM and IMA
//! payloads can be decoded here; Vorbis, Opus and friends need vgmstream.

use std::fmt;
use std::io::{Cursor, Read, Seek, SeekFrom};
use byteorder::{LittleEndian, ReadBytesExt};
use crate::error::{Wsb2WavError, Result};

const RIFF_MAGIC: &[u8; 4] = b"RIFF";
const RIFX_MAGIC: &[u8; 4] = b"RIFX";
const WAVE_MAGIC: &[u8; 4] = b"WAVE";

/// Codec named by the `fmt ` format tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WemCodec {
    Pcm,
    ImaAdpcm,
    IeeeFloat,
    Extensible,
    WwiseVorbis,
    Opus,
    Xma2,
    Other(u16),
}

impl WemCodec {
    pub fn from_tag(tag: u16) -> Self {
        match tag {
            0x0001 => WemCodec::Pcm,
            0x0002 => WemCodec::ImaAdpcm,
            0x0003 => WemCodec::IeeeFloat,
            0x0166 => WemCodec::Xma2,
            0x3040 | 0x3041 => WemCodec::Opus,
            0xFFFE => WemCodec::Extensible,
            0xFFFF => WemCodec::WwiseVorbis,
            other => WemCodec::Other(other),
        }
    }
}

impl fmt::Display for WemCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WemCodec::Pcm => write!(f, "PCM"),
            WemCodec::ImaAdpcm => write!(f, "IMA ADPCM"),
            WemCodec::IeeeFloat => write!(f, "IEEE float"),
            WemCodec::Extensible => write!(f, "PCM (extensible)"),
            WemCodec::WwiseVorbis => write!(f, "Wwise Vorbis"),
            WemCodec::Opus => write!(f, "Wwise Opus"),
            WemCodec::Xma2 => write!(f, "XMA2"),
            WemCodec::Other(tag) => write!(f, "unknown ({:#06x})", tag),
        }
    }
}

/// Parsed WEM header information
#[derive(Debug, Clone, PartialEq)]
pub struct WemHeader {
    /// Big-endian RIFX container; chunk fields below are only filled for RIFF
    pub big_endian: bool,
    pub format_tag: u16,
    pub channels: u16,
    pub sample_rate: u32,
    pub avg_bytes_per_sec: u32,
    pub block_align: u16,
    /// Often 0 for compressed formats
    pub bits_per_sample: u16,
    /// Extra format data from the fmt chunk (Wwise-specific)
    pub extra_data: Vec<u8>,
    pub data_offset: usize,
    pub data_size: usize,
}

impl WemHeader {
    pub fn codec(&self) -> WemCodec {
        WemCodec::from_tag(self.format_tag)
    }

    /// The audio payload, clipped to what the buffer actually holds
    pub fn data<'a>(&self, wem: &'a [u8]) -> &'a [u8] {
        let start = self.data_offset.min(wem.len());
        let end = self.data_offset.saturating_add(self.data_size).min(wem.len());
        &wem[start..end]
    }
}

/// Quick check for a RIFF/RIFX + WAVE signature
pub fn looks_like_wem(bytes: &[u8]) -> bool {
    bytes.len() >= 12
        && (&bytes[0..4] == RIFF_MAGIC || &bytes[0..4] == RIFX_MAGIC)
        && &bytes[8..12] == WAVE_MAGIC
}

/// Parse the WEM header of an in-memory stream.
pub fn parse_wem_header(bytes: &[u8]) -> Result<WemHeader> {
    let mut reader = Cursor::new(bytes);

    let mut magic = [0u8; 4];
    reader.read_exact(&mut magic).map_err(truncated)?;
    let big_endian = match &magic {
        RIFF_MAGIC => false,
        RIFX_MAGIC => true,
        _ => return Err(Wsb2WavError::decode("Invalid RIFF header")),
    };

    let _riff_size = reader.read_u32::<LittleEndian>().map_err(truncated)?;
    reader.read_exact(&mut magic).map_err(truncated)?;
    if &magic != WAVE_MAGIC {
        return Err(Wsb2WavError::decode("Invalid WAVE format"));
    }

    let mut header = WemHeader {
        big_endian,
        format_tag: 0,
        channels: 0,
        sample_rate: 0,
        avg_bytes_per_sec: 0,
        block_align: 0,
        bits_per_sample: 0,
        extra_data: Vec::new(),
        data_offset: 0,
        data_size: 0,
    };

    // RIFX fields are big-endian throughout; vgmstream deals with those.
    if big_endian {
        return Ok(header);
    }

    let mut found_fmt = false;
    let mut found_data = false;

    while !found_data {
        let mut chunk_id = [0u8; 4];
        if reader.read_exact(&mut chunk_id).is_err() {
            break;
        }
        let chunk_size = reader.read_u32::<LittleEndian>().map_err(truncated)?;
        let chunk_start = reader.position();

        match &chunk_id {
            b"fmt " => {
                if chunk_size < 16 {
                    return Err(Wsb2WavError::decode(format!("fmt chunk too small: {} bytes", chunk_size)));
                }
                header.format_tag = reader.read_u16::<LittleEndian>().map_err(truncated)?;
                header.channels = reader.read_u16::<LittleEndian>().map_err(truncated)?;
                header.sample_rate = reader.read_u32::<LittleEndian>().map_err(truncated)?;
                header.avg_bytes_per_sec = reader.read_u32::<LittleEndian>().map_err(truncated)?;
                header.block_align = reader.read_u16::<LittleEndian>().map_err(truncated)?;
                header.bits_per_sample = reader.read_u16::<LittleEndian>().map_err(truncated)?;

                if chunk_size > 16 {
                    let mut extra = vec![0u8; (chunk_size - 16) as usize];
                    reader.read_exact(&mut extra).map_err(truncated)?;
                    header.extra_data = extra;
                }
                found_fmt = true;
            }
            b"data" => {
                header.data_offset = chunk_start as usize;
                header.data_size = chunk_size as usize;
                found_data = true;
            }
            _ => {}
        }

        // chunks are word aligned
        let next = chunk_start + u64::from(chunk_size);
        reader.seek(SeekFrom::Start((next + 1) & !1))?;
    }

    if !found_fmt {
        return Err(Wsb2WavError::decode("Missing required chunk: fmt "));
    }
    if !found_data {
        return Err(Wsb2WavError::decode("Missing required chunk: data"));
    }

    Ok(header)
}

fn truncated(err: std::io::Error) -> Wsb2WavError {
    Wsb2WavError::decode(format!("Truncated WEM header: {}", err))
}
