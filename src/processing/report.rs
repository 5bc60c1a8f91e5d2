//! End-of-run conversion report

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// A recorded, non-fatal failure
#[derive(Debug, Clone, PartialEq)]
pub struct Failure {
    pub path: PathBuf,
    /// Stream id when a single stream failed rather than the whole bank
    pub stream: Option<String>,
    pub reason: String,
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.stream {
            Some(stream) => write!(f, "{} [{}]: {}", self.path.display(), stream, self.reason),
            None if self.path.as_os_str().is_empty() => write!(f, "{}", self.reason),
            None => write!(f, "{}: {}", self.path.display(), self.reason),
        }
    }
}

/// What happened to one sound bank
#[derive(Debug, Clone, Default)]
pub struct BankOutcome {
    pub bank: PathBuf,
    pub streams_found: usize,
    pub wav_files: Vec<PathBuf>,
    pub wem_files: Vec<PathBuf>,
    pub failures: Vec<Failure>,
}

impl BankOutcome {
    pub fn new(bank: &Path) -> Self {
        Self { bank: bank.to_path_buf(), ..Self::default() }
    }

    pub fn fail_bank(&mut self, reason: impl Into<String>) {
        self.failures.push(Failure { path: self.bank.clone(), stream: None, reason: reason.into() });
    }

    pub fn fail_stream(&mut self, stream: &str, reason: impl Into<String>) {
        self.failures.push(Failure {
            path: self.bank.clone(),
            stream: Some(stream.to_string()),
            reason: reason.into(),
        });
    }
}

#[derive(Debug, Clone, Default)]
pub struct ConversionReport {
    pub banks_scanned: usize,
    pub streams_found: usize,
    pub wav_files: Vec<PathBuf>,
    pub wem_files: Vec<PathBuf>,
    pub failures: Vec<Failure>,
    pub elapsed: Duration,
}

impl ConversionReport {
    pub fn absorb(&mut self, outcome: BankOutcome) {
        self.banks_scanned += 1;
        self.streams_found += outcome.streams_found;
        self.wav_files.extend(outcome.wav_files);
        self.wem_files.extend(outcome.wem_files);
        self.failures.extend(outcome.failures);
    }

    /// A scan entry that never became a bank
    pub fn record_scan_failure(&mut self, reason: impl Into<String>) {
        self.failures.push(Failure { path: PathBuf::new(), stream: None, reason: reason.into() });
    }

    /// Order everything by path so worker scheduling does not show.
    pub fn sort(&mut self) {
        self.wav_files.sort();
        self.wem_files.sort();
        self.failures.sort_by(|a, b| (&a.path, &a.stream).cmp(&(&b.path, &b.stream)));
    }

    pub fn files_converted(&self) -> usize {
        self.wav_files.len()
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn summary(&self) -> String {
        format!("{} files converted, {} failed", self.files_converted(), self.failed())
    }
}

impl fmt::Display for ConversionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.summary())?;
        write!(
            f,
            "Banks: {}  Streams: {}  Time: {:.2}s",
            self.banks_scanned, self.streams_found, self.elapsed.as_secs_f64()
        )?;
        for failure in &self.failures {
            write!(f, "\n  {}", failure)?;
        }
        Ok(())
    }
}
