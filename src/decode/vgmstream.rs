//! External decoding through vgmstream-cli
//!
//! vgmstream handles every Wwise codec variant (Vorbis with external
//! codebooks, Opus, XMA, RIFX...). Streams are staged in a scratch directory,
//! converted with `vgmstream-cli -o out.wav in.wem`, and read back.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use crate::audio::AudioStream;
use crate::bank::{BankEntry, WemHeader};
use crate::error::{Wsb2WavError, Result};
use super::StreamDecoder;

pub const DEFAULT_VGMSTREAM: &str = "vgmstream-cli";

#[derive(Debug, Clone)]
pub struct VgmstreamDecoder {
    cli: PathBuf,
}

impl VgmstreamDecoder {
    /// Use `cli` without checking that it runs.
    pub fn new<P: Into<PathBuf>>(cli: P) -> Self {
        Self { cli: cli.into() }
    }

    /// Find a runnable vgmstream-cli: the configured path first, then `PATH`.
    pub fn locate(configured: Option<&Path>) -> Option<Self> {
        let candidates = configured
            .map(Path::to_path_buf)
            .into_iter()
            .chain(std::iter::once(PathBuf::from(DEFAULT_VGMSTREAM)));

        for candidate in candidates {
            if Self::probe(&candidate) {
                log::debug!("Using vgmstream-cli at {}", candidate.display());
                return Some(Self::new(candidate));
            }
            log::debug!("vgmstream-cli not runnable at {}", candidate.display());
        }

        None
    }

    /// The tool exits non-zero on `-h`, so only a failed spawn counts.
    fn probe(cli: &Path) -> bool {
        Command::new(cli)
            .arg("-h")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .is_ok()
    }

    pub fn cli(&self) -> &Path {
        &self.cli
    }
}

impl StreamDecoder for VgmstreamDecoder {
    fn name(&self) -> &'static str {
        "vgmstream"
    }

    fn supports(&self, _header: &WemHeader) -> bool {
        true
    }

    fn decode(&self, entry: &BankEntry, _header: &WemHeader) -> Result<AudioStream> {
        let scratch = tempfile::Builder::new()
            .prefix("wsb2wav_")
            .tempdir()
            .map_err(|e| Wsb2WavError::io(format!("Cannot create scratch directory: {}", e)))?;

        let wem_path = scratch.path().join("stream.wem");
        let wav_path = scratch.path().join("stream.wav");
        std::fs::write(&wem_path, &entry.data)?;

        let output = Command::new(&self.cli)
            .arg("-o")
            .arg(&wav_path)
            .arg(&wem_path)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| Wsb2WavError::decode(format!(
                "Failed to run {}: {}", self.cli.display(), e
            )))?;

        if !output.status.success() || !wav_path.exists() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Wsb2WavError::decode(format!(
                "vgmstream-cli failed on stream {} ({}): {}",
                entry.id, output.status, stderr.trim()
            )));
        }

        // A short or malformed WAV from the tool is a bad stream, not a broken run.
        AudioStream::from_file(entry.id.clone(), &wav_path).map_err(|e| Wsb2WavError::decode(format!(
            "Unreadable vgmstream-cli output for stream {}: {}", entry.id, e
        )))
    }
}
