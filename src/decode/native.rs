//! In-process decoding for uncompressed PCM and Wwise IMA ADPCM streams

use crate::audio::{AudioData, AudioStream, WwiseImaDecoder};
use crate::bank::{BankEntry, WemCodec, WemHeader};
use crate::error::{Wsb2WavError, Result};
use super::StreamDecoder;

/// Extensible sub-format tags (first two bytes of the GUID)
const SUBFORMAT_PCM: u16 = 0x0001;
const SUBFORMAT_FLOAT: u16 = 0x0003;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PcmKind {
    Int,
    Float,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NativeDecoder;

impl NativeDecoder {
    pub fn new() -> Self {
        Self
    }

    /// Resolve the sample layout of an uncompressed stream, if it is one.
    fn pcm_kind(header: &WemHeader) -> Option<PcmKind> {
        let kind = match header.codec() {
            WemCodec::Pcm => PcmKind::Int,
            WemCodec::IeeeFloat => PcmKind::Float,
            // Wwise writes a short extensible fmt (no GUID) for plain PCM
            WemCodec::Extensible => match header.extra_data.get(8..10) {
                None => PcmKind::Int,
                Some(&[lo, hi]) => match u16::from_le_bytes([lo, hi]) {
                    SUBFORMAT_PCM => PcmKind::Int,
                    SUBFORMAT_FLOAT => PcmKind::Float,
                    _ => return None,
                },
                Some(_) => return None,
            },
            _ => return None,
        };

        let valid_bits = match kind {
            PcmKind::Int => matches!(header.bits_per_sample, 8 | 16 | 24 | 32),
            PcmKind::Float => header.bits_per_sample == 32,
        };
        let frame_bytes = usize::from(header.channels) * usize::from(header.bits_per_sample / 8);

        (valid_bits && header.channels > 0 && usize::from(header.block_align) == frame_bytes).then_some(kind)
    }

    fn decode_pcm(entry: &BankEntry, header: &WemHeader, kind: PcmKind) -> Result<AudioStream> {
        let payload = header.data(&entry.data);
        let block_align = usize::from(header.block_align);
        let whole = payload.len() - payload.len() % block_align;
        if whole != payload.len() {
            log::warn!(
                "Stream {}: dropping {} trailing bytes of a partial frame",
                entry.id, payload.len() - whole
            );
        }
        let payload = &payload[..whole];

        let data = match (kind, header.bits_per_sample) {
            (PcmKind::Float, _) => AudioData::Float32(
                payload.chunks_exact(4).map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]])).collect(),
            ),
            // 8-bit WAV is unsigned
            (PcmKind::Int, 8) => AudioData::Int8(payload.iter().map(|&b| (i16::from(b) - 128) as i8).collect()),
            (PcmKind::Int, 16) => AudioData::Int16(
                payload.chunks_exact(2).map(|b| i16::from_le_bytes([b[0], b[1]])).collect(),
            ),
            (PcmKind::Int, 24) => AudioData::Int24(
                payload.chunks_exact(3).map(|b| i32::from_le_bytes([0, b[0], b[1], b[2]]) >> 8).collect(),
            ),
            (PcmKind::Int, 32) => AudioData::Int32(
                payload.chunks_exact(4).map(|b| i32::from_le_bytes([b[0], b[1], b[2], b[3]])).collect(),
            ),
            (PcmKind::Int, bits) => {
                return Err(Wsb2WavError::decode(format!("Unsupported PCM bit depth: {}", bits)));
            }
        };

        Ok(AudioStream::new(entry.id.clone(), header.sample_rate, header.channels, data))
    }

    fn decode_ima(entry: &BankEntry, header: &WemHeader) -> Result<AudioStream> {
        let decoder = WwiseImaDecoder::new(header.channels, header.block_align)?;
        let samples = decoder.decode(header.data(&entry.data))?;
        Ok(AudioStream::new(entry.id.clone(), header.sample_rate, header.channels, AudioData::Int16(samples)))
    }
}

impl StreamDecoder for NativeDecoder {
    fn name(&self) -> &'static str {
        "native"
    }

    fn supports(&self, header: &WemHeader) -> bool {
        if header.big_endian {
            return false;
        }
        if header.codec() == WemCodec::ImaAdpcm {
            // Layouts the block decoder rejects are left to the next decoder.
            return WwiseImaDecoder::new(header.channels, header.block_align).is_ok();
        }
        Self::pcm_kind(header).is_some()
    }

    fn decode(&self, entry: &BankEntry, header: &WemHeader) -> Result<AudioStream> {
        let stream = if header.codec() == WemCodec::ImaAdpcm {
            Self::decode_ima(entry, header)?
        } else {
            let kind = Self::pcm_kind(header).ok_or_else(|| {
                Wsb2WavError::decode(format!("{} is not decoded natively", header.codec()))
            })?;
            Self::decode_pcm(entry, header, kind)?
        };

        stream.validate()?;
        Ok(stream)
    }
}
