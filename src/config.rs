//! Configuration management for batch conversion

use crate::error::{Wsb2WavError, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub scan: ScanConfig,
    pub decode: DecodeConfig,
    pub output: OutputConfig,
    pub processing: ProcessingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScanConfig {
    pub recursive: bool,
    pub extensions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct DecodeConfig {
    /// Explicit vgmstream-cli location; `PATH` is searched when unset.
    pub vgmstream_path: Option<PathBuf>,
    /// Only decode natively, never shell out.
    pub native_only: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct OutputConfig {
    pub prefix: String,
    pub keep_wem: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProcessingConfig {
    /// 0 = one worker per logical CPU, 1 = sequential
    pub workers: usize,
    pub verbose: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("input"),
            output_dir: PathBuf::from("output"),
            scan: ScanConfig::default(),
            decode: DecodeConfig::default(),
            output: OutputConfig::default(),
            processing: ProcessingConfig::default(),
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            recursive: true,
            extensions: vec!["wsb".to_string(), "bnk".to_string()],
        }
    }
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            workers: 1,
            verbose: false,
        }
    }
}

impl Config {
    /// Get verbose mode (convenience method)
    pub fn verbose(&self) -> bool {
        self.processing.verbose
    }

    /// Effective worker count, resolving 0 to the CPU count
    pub fn worker_count(&self) -> usize {
        match self.processing.workers {
            0 => utils::cpu_count(),
            n => n,
        }
    }
}

#[derive(Debug, Clone, Parser)]
#[command(name = "wsb2wav", about = "Convert Wwise sound banks to WAV files", version, author)]
pub struct Args {
    #[arg(short = 'i', long = "input", help = "Input folder containing sound banks [default: input]")]
    pub input: Option<PathBuf>,

    #[arg(short = 'o', long = "output", help = "Output folder for WAV files [default: output]")]
    pub output: Option<PathBuf>,

    #[arg(short = 'c', long = "config", help = "Config file path (TOML format)")]
    pub config_file: Option<PathBuf>,

    #[arg(short = 'p', long = "prefix", help = "Prefix added to every output file name")]
    pub prefix: Option<String>,

    #[arg(short = 'k', long = "keep-wem", help = "Also write the extracted WEM streams")]
    pub keep_wem: bool,

    #[arg(short = 'w', long = "workers", help = "Worker threads (0 = number of CPU cores)")]
    pub workers: Option<usize>,

    #[arg(long = "vgmstream", help = "Path to vgmstream-cli for codecs without a native decoder")]
    pub vgmstream: Option<PathBuf>,

    #[arg(long = "native-only", help = "Never call vgmstream-cli")]
    pub native_only: bool,

    #[arg(long = "no-recursive", help = "Only scan the top level of the input folder")]
    pub no_recursive: bool,

    #[arg(short = 'e', long = "ext", help = "Sound bank file extension to scan for (repeatable)")]
    pub extensions: Vec<String>,

    #[arg(short = 'v', long = "verbose", help = "Enable verbose output mode")]
    pub verbose: bool,

    #[arg(long = "write-config", help = "Write the effective config to this path and exit")]
    pub write_config: Option<PathBuf>,
}

impl Config {
    /// Create config from command line arguments and config file
    pub fn from_args_and_config(args: &Args) -> Result<Self> {
        let mut config = if let Some(config_path) = &args.config_file {
            Self::from_file(config_path)?
        } else {
            Self::default()
        };

        // Command line arguments override config file settings
        if let Some(input) = &args.input {
            config.input_dir = input.clone();
        }
        if let Some(output) = &args.output {
            config.output_dir = output.clone();
        }
        if let Some(prefix) = &args.prefix {
            config.output.prefix = prefix.clone();
        }
        if let Some(workers) = args.workers {
            config.processing.workers = workers;
        }
        if let Some(vgmstream) = &args.vgmstream {
            config.decode.vgmstream_path = Some(vgmstream.clone());
        }
        if !args.extensions.is_empty() {
            config.scan.extensions = args.extensions.clone();
        }
        config.output.keep_wem |= args.keep_wem;
        config.decode.native_only |= args.native_only;
        config.processing.verbose |= args.verbose;
        if args.no_recursive {
            config.scan.recursive = false;
        }

        config.validate()?;

        Ok(config)
    }

    /// Load config from TOML config file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Wsb2WavError::config(format!("Failed to read config file: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| Wsb2WavError::config(format!("Failed to parse config file: {}", e)))
    }

    /// Validate configuration parameter validity
    pub fn validate(&self) -> Result<()> {
        if self.input_dir.as_os_str().is_empty() {
            return Err(Wsb2WavError::config("Input folder must not be empty"));
        }
        if self.output_dir.as_os_str().is_empty() {
            return Err(Wsb2WavError::config("Output folder must not be empty"));
        }

        if self.scan.extensions.is_empty() {
            return Err(Wsb2WavError::config("At least one sound bank extension is required"));
        }
        for ext in &self.scan.extensions {
            if ext.is_empty() || ext.starts_with('.') || ext.contains(['/', '\\']) {
                return Err(Wsb2WavError::config(format!(
                    "Invalid extension '{}': use a bare extension such as 'bnk'", ext
                )));
            }
        }

        if self.output.prefix.contains(['/', '\\']) {
            return Err(Wsb2WavError::config("Prefix must not contain path separators"));
        }

        if self.processing.workers > utils::cpu_count() * 4 {
            return Err(Wsb2WavError::config("Worker count cannot exceed 4x logical CPU cores"));
        }

        Ok(())
    }

    /// Save config to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Wsb2WavError::config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| Wsb2WavError::config(format!("Failed to write config file: {}", e)))
    }

    /// Create default config file
    pub fn create_default_config<P: AsRef<Path>>(path: P) -> Result<()> {
        Self::default().save_to_file(path)
    }
}

pub mod utils {
    pub fn cpu_count() -> usize {
        num_cpus::get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["wsb2wav"];
        argv.extend_from_slice(extra);
        Args::parse_from(argv)
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.input_dir, PathBuf::from("input"));
        assert_eq!(config.output_dir, PathBuf::from("output"));
        assert!(config.scan.recursive);
        assert_eq!(config.scan.extensions, vec!["wsb", "bnk"]);
        assert_eq!(config.processing.workers, 1);
        assert!(!config.output.keep_wem);
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.scan.extensions = vec![];
        assert!(config.validate().is_err());

        config.scan.extensions = vec![".bnk".to_string()];
        assert!(config.validate().is_err());
        config.scan.extensions = vec!["bnk".to_string()];

        config.output.prefix = "a/b".to_string();
        assert!(config.validate().is_err());
        config.output.prefix = "sfx_".to_string();
        assert!(config.validate().is_ok());

        config.processing.workers = utils::cpu_count() * 4 + 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_file_operations() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");

        let mut config = Config::default();
        config.output.prefix = "ow_".to_string();
        config.decode.vgmstream_path = Some(PathBuf::from("/opt/vgmstream-cli"));

        assert!(config.save_to_file(&config_path).is_ok());
        assert!(config_path.exists());

        let loaded = Config::from_file(&config_path).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_partial_config_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        std::fs::write(&config_path, "input_dir = \"banks\"\n[scan]\nrecursive = false\n").unwrap();

        let loaded = Config::from_file(&config_path).unwrap();
        assert_eq!(loaded.input_dir, PathBuf::from("banks"));
        assert_eq!(loaded.output_dir, PathBuf::from("output"));
        assert!(!loaded.scan.recursive);
        assert_eq!(loaded.scan.extensions, vec!["wsb", "bnk"]);
    }

    #[test]
    fn test_args_override_config_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        std::fs::write(&config_path, "input_dir = \"banks\"\noutput_dir = \"wavs\"\n").unwrap();

        let path = config_path.to_str().unwrap();
        let config = Config::from_args_and_config(&args(&[
            "-c", path, "-o", "elsewhere", "-e", "WSB", "--no-recursive", "-k", "-w", "2",
        ]))
        .unwrap();

        assert_eq!(config.input_dir, PathBuf::from("banks"));
        assert_eq!(config.output_dir, PathBuf::from("elsewhere"));
        assert_eq!(config.scan.extensions, vec!["WSB"]);
        assert!(!config.scan.recursive);
        assert!(config.output.keep_wem);
        assert_eq!(config.processing.workers, 2);
    }

    #[test]
    fn test_no_arguments_uses_defaults() {
        let config = Config::from_args_and_config(&args(&[])).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_worker_count_resolution() {
        let mut config = Config::default();
        config.processing.workers = 0;
        assert_eq!(config.worker_count(), utils::cpu_count());
        config.processing.workers = 3;
        assert_eq!(config.worker_count(), 3);
    }
}
