//! Batch Conversion Pipeline

pub mod scanner;
pub mod naming;
pub mod report;
pub mod converter;

pub use scanner::{scan_sound_banks, ScanOptions, SoundBankScan};
pub use report::{BankOutcome, ConversionReport, Failure};
pub use converter::BatchConverter;
