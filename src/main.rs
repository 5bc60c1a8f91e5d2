//! wsb2wav - batch convert Wwise sound banks to WAV

use anyhow::Context;
use clap::Parser;
use std::process;
use wsb2wav::{init_logging, Args, BatchConverter, Config};

fn main() {
    let args = Args::parse();

    if let Err(e) = run(args) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    let config = Config::from_args_and_config(&args).context("Invalid configuration")?;

    // `--verbose` or `processing.verbose` in the config file
    init_logging(config.verbose());

    if config.verbose() {
        println!("{}", wsb2wav::get_library_info());
        println!();
    }

    if let Some(path) = &args.write_config {
        config.save_to_file(path)?;
        println!("Config written to {}", path.display());
        return Ok(());
    }

    let converter = BatchConverter::new(config)?;
    let settings = converter.config();

    println!("=== wsb2wav ===");
    println!("Input: {}", settings.input_dir.display());
    println!("Output: {}", settings.output_dir.display());
    println!("Workers: {}", settings.worker_count());
    println!("===============\n");

    let report = converter.run()?;

    println!("=== Conversion Complete ===");
    println!("{}", report);

    Ok(())
}
