//! Output file naming
//!
//! Names are `{prefix}{bank stem}_{stream id}` inside the bank's mirrored
//! sub-folder, so equal stems from different input folders never meet.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Folder that receives the streams of `bank`.
pub fn output_dir_for(output_root: &Path, input_root: &Path, bank: &Path) -> PathBuf {
    match bank.strip_prefix(input_root).ok().and_then(Path::parent) {
        Some(parent) if !parent.as_os_str().is_empty() => output_root.join(parent),
        _ => output_root.to_path_buf(),
    }
}

/// Stem used in output names. When another scanned bank in the same folder
/// shares the stem (`music.bnk` next to `music.wsb`), the extension is kept
/// as `music_bnk` so the two banks write different files.
pub fn bank_stem(bank: &Path, extensions: &[String]) -> String {
    let stem = bank.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "bank".to_string());

    let Some(own_ext) = bank.extension().map(|e| e.to_string_lossy().into_owned()) else {
        return stem;
    };

    let shared = extensions.iter().any(|ext| {
        let sibling = bank.with_extension(ext.to_ascii_lowercase());
        sibling != bank && sibling.is_file()
    });

    if shared {
        format!("{}_{}", stem, own_ext)
    } else {
        stem
    }
}

/// Give every stream a name unique within its bank. Repeated ids get
/// `_2`, `_3`, ... in index order.
pub fn unique_stream_names<'a, I>(ids: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut used = HashSet::new();
    let mut names = Vec::new();

    for id in ids {
        let mut candidate = id.to_string();
        let mut n = 2;
        while used.contains(&candidate) {
            candidate = format!("{}_{}", id, n);
            n += 1;
        }
        used.insert(candidate.clone());
        names.push(candidate);
    }

    names
}

pub fn stream_file_name(prefix: &str, stem: &str, stream: &str, extension: &str) -> String {
    format!("{}{}_{}.{}", prefix, stem, stream, extension)
}
