//! Batch conversion of a folder of sound banks

use std::path::{Path, PathBuf};
use std::time::Instant;
use rayon::prelude::*;

use crate::bank::SoundBank;
use crate::config::Config;
use crate::decode::ChainedDecoder;
use crate::error::{Wsb2WavError, Result};
use super::naming::{bank_stem, output_dir_for, stream_file_name, unique_stream_names};
use super::report::{BankOutcome, ConversionReport};
use super::scanner::{scan_sound_banks, ScanOptions};

#[derive(Debug)]
pub struct BatchConverter {
    config: Config,
    decoder: ChainedDecoder,
}

impl BatchConverter {
    /// Validate the config and set up decoders, probing for vgmstream-cli.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let decoder = ChainedDecoder::from_config(&config);
        Ok(Self { config, decoder })
    }

    pub fn with_decoder(config: Config, decoder: ChainedDecoder) -> Self {
        Self { config, decoder }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Convert every sound bank under the input folder.
    ///
    /// Returns `Err` only for run-level problems: unreadable input, an output
    /// folder or file that cannot be written. Bank and stream decode failures
    /// are collected in the report.
    pub fn run(&self) -> Result<ConversionReport> {
        let start = Instant::now();
        let input = &self.config.input_dir;
        let output = &self.config.output_dir;

        let scan = scan_sound_banks(input, &ScanOptions::from(&self.config.scan))?;

        std::fs::create_dir_all(output)
            .map_err(|e| Wsb2WavError::write(output, format!("Cannot create output directory: {}", e)))?;

        let workers = self.config.worker_count();
        log::info!(
            "Converting sound banks from {} to {} ({} worker{})",
            input.display(), output.display(), workers, if workers == 1 { "" } else { "s" }
        );

        let mut report = ConversionReport::default();

        if workers == 1 {
            for item in scan {
                match item {
                    Ok(bank) => report.absorb(self.convert_bank(&bank)?),
                    Err(e) => report.record_scan_failure(e.to_string()),
                }
            }
        } else {
            let mut banks = Vec::new();
            for item in scan {
                match item {
                    Ok(bank) => banks.push(bank),
                    Err(e) => report.record_scan_failure(e.to_string()),
                }
            }

            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(workers)
                .build()
                .map_err(|e| Wsb2WavError::config(format!("Cannot start worker pool: {}", e)))?;

            let outcomes = pool.install(|| {
                banks.par_iter()
                    .map(|bank| self.convert_bank(bank))
                    .collect::<Result<Vec<_>>>()
            })?;

            for outcome in outcomes {
                report.absorb(outcome);
            }
        }

        report.sort();
        report.elapsed = start.elapsed();

        if report.banks_scanned == 0 {
            log::warn!("No sound banks found in {}", input.display());
        }
        log::info!("{}", report.summary());

        Ok(report)
    }

    /// Extract, decode and write every stream of one bank.
    pub fn convert_bank(&self, bank_path: &Path) -> Result<BankOutcome> {
        let mut outcome = BankOutcome::new(bank_path);

        let bank = match SoundBank::from_file(bank_path) {
            Ok(bank) => bank,
            Err(e) if !e.is_fatal() => {
                log::warn!("{}: {}", bank_path.display(), e);
                outcome.fail_bank(e.to_string());
                return Ok(outcome);
            }
            Err(e) => return Err(e),
        };

        outcome.streams_found = bank.len() + bank.skipped.len();
        log::debug!(
            "{}: {} streams ({:?} layout)",
            bank_path.display(), outcome.streams_found, bank.layout
        );

        for skipped in &bank.skipped {
            outcome.fail_stream(&skipped.id, skipped.reason.clone());
        }

        let out_dir = output_dir_for(&self.config.output_dir, &self.config.input_dir, bank_path);
        std::fs::create_dir_all(&out_dir)
            .map_err(|e| Wsb2WavError::write(&out_dir, format!("Cannot create output directory: {}", e)))?;

        let stem = bank_stem(bank_path, &self.config.scan.extensions);
        let prefix = &self.config.output.prefix;
        let names = unique_stream_names(bank.entries.iter().map(|e| e.id.as_str()));

        for (entry, name) in bank.entries.iter().zip(&names) {
            if self.config.output.keep_wem {
                let wem_path = out_dir.join(stream_file_name(prefix, &stem, name, "wem"));
                std::fs::write(&wem_path, &entry.data)
                    .map_err(|e| Wsb2WavError::write(&wem_path, e.to_string()))?;
                outcome.wem_files.push(wem_path);
            }

            let stream = match self.decoder.decode(entry) {
                Ok(stream) => stream,
                Err(e) if !e.is_fatal() => {
                    log::warn!("{} [{}]: {}", bank_path.display(), name, e);
                    outcome.fail_stream(name, e.to_string());
                    continue;
                }
                Err(e) => return Err(e),
            };

            let wav_path: PathBuf = out_dir.join(stream_file_name(prefix, &stem, name, "wav"));
            stream.save_to_file(&wav_path)?;
            log::debug!(
                "Wrote {} ({}Hz, {}ch, {}, {:.2}s)",
                wav_path.display(), stream.sample_rate(), stream.channels(),
                stream.format().name(), stream.duration()
            );
            outcome.wav_files.push(wav_path);
        }

        log::info!(
            "{}: {}/{} streams converted",
            bank_path.display(), outcome.wav_files.len(), outcome.streams_found
        );

        Ok(outcome)
    }
}
