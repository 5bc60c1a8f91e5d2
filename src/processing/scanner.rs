//! Input folder scanning

use std::path::{Path, PathBuf};
use walkdir::WalkDir;
use crate::config::ScanConfig;
use crate::error::{Wsb2WavError, Result};

#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub recursive: bool,
    /// Lowercased, without the leading dot
    pub extensions: Vec<String>,
}

impl From<&ScanConfig> for ScanOptions {
    fn from(config: &ScanConfig) -> Self {
        Self {
            recursive: config.recursive,
            extensions: config.extensions.iter().map(|e| e.to_ascii_lowercase()).collect(),
        }
    }
}

/// Lazy sequence of sound bank paths below an input folder, in file name order.
///
/// Entries that cannot be read mid-walk are yielded as errors; they do not
/// end the scan.
pub struct SoundBankScan {
    walker: walkdir::IntoIter,
    extensions: Vec<String>,
}

impl std::fmt::Debug for SoundBankScan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SoundBankScan").field("extensions", &self.extensions).finish_non_exhaustive()
    }
}

/// Open `input` for scanning. Fails with `UnreadableInput` when the folder is
/// missing, not a folder, or cannot be listed.
pub fn scan_sound_banks(input: &Path, options: &ScanOptions) -> Result<SoundBankScan> {
    let metadata = std::fs::metadata(input)
        .map_err(|e| Wsb2WavError::unreadable_input(input, e.to_string()))?;
    if !metadata.is_dir() {
        return Err(Wsb2WavError::unreadable_input(input, "not a directory"));
    }
    std::fs::read_dir(input).map_err(|e| Wsb2WavError::unreadable_input(input, e.to_string()))?;

    let max_depth = if options.recursive { usize::MAX } else { 1 };
    let walker = WalkDir::new(input)
        .min_depth(1)
        .max_depth(max_depth)
        .sort_by_file_name()
        .into_iter();

    Ok(SoundBankScan { walker, extensions: options.extensions.clone() })
}

impl SoundBankScan {
    fn matches(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
    }
}

impl Iterator for SoundBankScan {
    type Item = Result<PathBuf>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.walker.next()? {
                Ok(entry) => {
                    if entry.file_type().is_file() && self.matches(entry.path()) {
                        return Some(Ok(entry.into_path()));
                    }
                }
                Err(err) => {
                    let location = err.path().map(|p| p.display().to_string()).unwrap_or_default();
                    log::warn!("Skipping unreadable entry {}: {}", location, err);
                    return Some(Err(Wsb2WavError::io(format!("{}: {}", location, err))));
                }
            }
        }
    }
}
