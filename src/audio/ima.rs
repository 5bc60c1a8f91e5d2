//! Wwise IMA ADPCM decoding
//!
//! Each block holds, for every channel, a 4-byte header (history sample as
//! `i16`, step index, one reserved byte), followed by every channel's nibble
//! data stored contiguously. Nibbles are read low first; the header sample is
//! the first output sample of the block.

use crate::error::{Wsb2WavError, Result};

const IMA_STEP_TABLE: [i32; 89] = [
    7, 8, 9, 10, 11, 12, 13, 14, 16, 17, 19, 21, 23, 25, 28, 31, 34, 37, 41, 45, 50, 55, 60, 66,
    73, 80, 88, 97, 107, 118, 130, 143, 157, 173, 190, 209, 230, 253, 279, 307, 337, 371, 408,
    449, 494, 544, 598, 658, 724, 796, 876, 963, 1060, 1166, 1282, 1411, 1552, 1707, 1878, 2066,
    2272, 2499, 2749, 3024, 3327, 3660, 4026, 4428, 4871, 5358, 5894, 6484, 7132, 7845, 8630,
    9493, 10442, 11487, 12635, 13899, 15289, 16818, 18500, 20350, 22385, 24623, 27086, 29794,
    32767,
];

const IMA_INDEX_TABLE: [i32; 16] = [-1, -1, -1, -1, 2, 4, 6, 8, -1, -1, -1, -1, 2, 4, 6, 8];

const BLOCK_HEADER_SIZE: usize = 4;

#[derive(Debug, Clone, Copy, Default)]
struct ImaChannelState {
    predictor: i32,
    step_index: i32,
}

impl ImaChannelState {
    fn decode_sample(&mut self, nibble: u8) -> i16 {
        let step = IMA_STEP_TABLE[self.step_index as usize];

        let mut diff = step >> 3;
        if nibble & 1 != 0 {
            diff += step >> 2;
        }
        if nibble & 2 != 0 {
            diff += step >> 1;
        }
        if nibble & 4 != 0 {
            diff += step;
        }
        if nibble & 8 != 0 {
            diff = -diff;
        }

        self.predictor = (self.predictor + diff).clamp(i32::from(i16::MIN), i32::from(i16::MAX));
        self.step_index = (self.step_index + IMA_INDEX_TABLE[usize::from(nibble & 0x0F)]).clamp(0, 88);

        self.predictor as i16
    }
}

/// Decoder for the blocked IMA variant Wwise stores with format tag `0x0002`.
#[derive(Debug, Clone)]
pub struct WwiseImaDecoder {
    channels: usize,
    block_align: usize,
}

impl WwiseImaDecoder {
    pub fn new(channels: u16, block_align: u16) -> Result<Self> {
        let channels = usize::from(channels);
        let block_align = usize::from(block_align);

        if channels == 0 {
            return Err(Wsb2WavError::decode("IMA ADPCM stream has no channels"));
        }
        if block_align <= BLOCK_HEADER_SIZE * channels {
            return Err(Wsb2WavError::decode(format!(
                "IMA ADPCM block align {} too small for {} channels", block_align, channels
            )));
        }
        if (block_align - BLOCK_HEADER_SIZE * channels) % channels != 0 {
            return Err(Wsb2WavError::decode(format!(
                "IMA ADPCM block align {} not divisible across {} channels", block_align, channels
            )));
        }

        Ok(Self { channels, block_align })
    }

    /// Samples per channel in a full block
    pub fn samples_per_block(&self) -> usize {
        1 + (self.block_align - BLOCK_HEADER_SIZE * self.channels) / self.channels * 2
    }

    /// Decode the whole data chunk into interleaved 16-bit samples.
    ///
    /// A trailing partial block is decoded as far as its bytes allow.
    pub fn decode(&self, data: &[u8]) -> Result<Vec<i16>> {
        let blocks = data.len().div_ceil(self.block_align);
        let mut output = Vec::with_capacity(blocks * self.samples_per_block() * self.channels);

        for block in data.chunks(self.block_align) {
            self.decode_block(block, &mut output)?;
        }

        Ok(output)
    }

    fn decode_block(&self, block: &[u8], output: &mut Vec<i16>) -> Result<()> {
        let headers = BLOCK_HEADER_SIZE * self.channels;
        if block.len() < headers {
            return Err(Wsb2WavError::decode(format!(
                "Truncated IMA ADPCM block: {} bytes, need {} for headers", block.len(), headers
            )));
        }

        let bytes_per_channel = (block.len() - headers) / self.channels;
        let mut states = Vec::with_capacity(self.channels);

        for header in block[..headers].chunks_exact(BLOCK_HEADER_SIZE) {
            let state = ImaChannelState {
                predictor: i32::from(i16::from_le_bytes([header[0], header[1]])),
                step_index: i32::from(header[2]).min(88),
            };
            output.push(state.predictor as i16);
            states.push(state);
        }

        let payload = &block[headers..];
        for i in 0..bytes_per_channel * 2 {
            for (ch, state) in states.iter_mut().enumerate() {
                let byte = payload[ch * bytes_per_channel + i / 2];
                let nibble = if i % 2 == 0 { byte & 0x0F } else { byte >> 4 };
                output.push(state.decode_sample(nibble));
            }
        }

        Ok(())
    }
}
