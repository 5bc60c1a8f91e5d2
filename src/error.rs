//! Error Types

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Main error type
#[derive(Debug, Error)]
pub enum Wsb2WavError {
    /// Input directory is missing or cannot be listed. Aborts the run.
    #[error("Unreadable input {}: {message}", path.display())]
    UnreadableInput { path: PathBuf, message: String },

    /// A container or one of its streams could not be decoded. Recorded, not fatal.
    #[error("Decode error: {message}")]
    Decode { message: String },

    /// Output directory or WAV file could not be written.
    #[error("Write error {}: {message}", path.display())]
    Write { path: PathBuf, message: String },

    #[error("Config error: {message}")]
    Config { message: String },

    #[error("IO error: {message}")]
    Io { message: String },
}

impl Wsb2WavError {
    pub fn unreadable_input<P: AsRef<Path>, S: Into<String>>(path: P, msg: S) -> Self {
        Self::UnreadableInput { path: path.as_ref().to_path_buf(), message: msg.into() }
    }
    pub fn decode<S: Into<String>>(msg: S) -> Self { Self::Decode { message: msg.into() } }
    pub fn write<P: AsRef<Path>, S: Into<String>>(path: P, msg: S) -> Self {
        Self::Write { path: path.as_ref().to_path_buf(), message: msg.into() }
    }
    pub fn config<S: Into<String>>(msg: S) -> Self { Self::Config { message: msg.into() } }
    pub fn io<S: Into<String>>(msg: S) -> Self { Self::Io { message: msg.into() } }

    /// Whether the batch run must stop on this error.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::Decode { .. })
    }
}

pub type Result<T> = std::result::Result<T, Wsb2WavError>;

impl From<std::io::Error> for Wsb2WavError {
    fn from(err: std::io::Error) -> Self { Self::io(err.to_string()) }
}

// Bytes that fail to parse as WAV are a decode problem, not an I/O one.
impl From<hound::Error> for Wsb2WavError {
    fn from(err: hound::Error) -> Self {
        match err {
            hound::Error::IoError(e) => Self::io(e.to_string()),
            other => Self::decode(format!("WAV: {}", other)),
        }
    }
}
