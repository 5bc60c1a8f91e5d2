//! List the streams embedded in a sound bank without converting anything

use clap::Parser;
use std::path::PathBuf;
use std::process;
use wsb2wav::bank::{parse_wem_header, SoundBank};
use wsb2wav::init_logging;

#[derive(Parser, Debug)]
#[command(name = "bankinfo")]
#[command(about = "Show the audio streams inside a Wwise sound bank")]
struct Args {
    /// Sound bank file
    bank: PathBuf,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Err(e) = run(&args) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run(args: &Args) -> anyhow::Result<()> {
    let bank = SoundBank::from_file(&args.bank)?;

    println!("Sound bank: {}", args.bank.display());
    println!("Layout:     {:?}", bank.layout);
    println!("Streams:    {}", bank.len());
    println!("---------------------------------");

    for entry in &bank.entries {
        match parse_wem_header(&entry.data) {
            Ok(header) => println!(
                "{}  offset {:#010x}  {:>9} bytes  {:<16} {}ch {}Hz",
                entry.id, entry.offset, entry.data.len(), header.codec().to_string(),
                header.channels, header.sample_rate
            ),
            Err(e) => println!(
                "{}  offset {:#010x}  {:>9} bytes  (unreadable header: {})",
                entry.id, entry.offset, entry.data.len(), e
            ),
        }
    }

    for skipped in &bank.skipped {
        println!("{}  skipped: {}", skipped.id, skipped.reason);
    }

    Ok(())
}
