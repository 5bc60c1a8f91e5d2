//! Audio Module
//!
//! Decoded PCM streams, WAV reading/writing and the Wwise IMA ADPCM decoder.

pub mod wav;
pub mod ima;

pub use wav::{AudioStream, AudioFormat, AudioHeader, AudioData};
pub use ima::WwiseImaDecoder;
