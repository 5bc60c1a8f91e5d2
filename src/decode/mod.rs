//! Stream decoders
//!
//! Natively decodable codecs never leave the process. Anything else goes to
//! vgmstream-cli when it is installed.

pub mod native;
pub mod vgmstream;

use crate::audio::AudioStream;
use crate::bank::{BankEntry, WemHeader, parse_wem_header};
use crate::config::Config;
use crate::error::{Wsb2WavError, Result};

pub use native::NativeDecoder;
pub use vgmstream::VgmstreamDecoder;

/// Turns one encoded bank entry into PCM.
pub trait StreamDecoder: Send + Sync {
    fn name(&self) -> &'static str;

    fn supports(&self, header: &WemHeader) -> bool;

    fn decode(&self, entry: &BankEntry, header: &WemHeader) -> Result<AudioStream>;
}

/// Tries each decoder in order, using the first that supports the stream.
pub struct ChainedDecoder {
    decoders: Vec<Box<dyn StreamDecoder>>,
}

impl ChainedDecoder {
    pub fn new(decoders: Vec<Box<dyn StreamDecoder>>) -> Self {
        Self { decoders }
    }

    /// Native decoding, plus vgmstream-cli when allowed and found.
    pub fn from_config(config: &Config) -> Self {
        let mut decoders: Vec<Box<dyn StreamDecoder>> = vec![Box::new(NativeDecoder::new())];

        if config.decode.native_only {
            log::info!("Native decoding only; Vorbis/Opus streams will be reported as failures");
        } else {
            match VgmstreamDecoder::locate(config.decode.vgmstream_path.as_deref()) {
                Some(external) => {
                    log::info!("Found vgmstream-cli: {}", external.cli().display());
                    decoders.push(Box::new(external));
                }
                None => log::warn!(
                    "vgmstream-cli not found. Only PCM and IMA ADPCM streams will be converted."
                ),
            }
        }

        Self::new(decoders)
    }

    pub fn decoder_names(&self) -> Vec<&'static str> {
        self.decoders.iter().map(|d| d.name()).collect()
    }

    pub fn decode(&self, entry: &BankEntry) -> Result<AudioStream> {
        let header = parse_wem_header(&entry.data)
            .map_err(|e| Wsb2WavError::decode(format!("Stream {}: {}", entry.id, e)))?;

        let decoder = self.decoders.iter().find(|d| d.supports(&header)).ok_or_else(|| {
            Wsb2WavError::decode(format!(
                "Stream {}: no decoder for {} (install vgmstream-cli or pass --vgmstream)",
                entry.id, header.codec()
            ))
        })?;

        log::debug!("Stream {}: {} via {}", entry.id, header.codec(), decoder.name());
        decoder.decode(entry, &header)
    }
}

impl std::fmt::Debug for ChainedDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainedDecoder").field("decoders", &self.decoder_names()).finish()
    }
}
