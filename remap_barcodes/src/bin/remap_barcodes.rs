//! remap_barcodes
#![deny(missing_docs)]

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use remap_barcodes::mylog::init_log;
use remap_barcodes::{run, RemapParams};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

/// Re-map cell barcodes onto a list of barcodes to use, correcting one substitution or
/// one shifted deletion. Writes tab-separated `observed<TAB>corrected` pairs.
#[derive(Debug, Parser)]
#[clap(name = "remap_barcodes", version)]
struct Args {
    /// Barcodes to use, one per line (optionally gzipped)
    barcodes_use: PathBuf,

    /// Barcodes to re-map, one per line (optionally gzipped)
    barcodes_remap: PathBuf,

    /// Exact number of barcodes to use; overrides the parameters file [default: 1000]
    num_barcodes: Option<usize>,

    /// TOML file with run parameters
    #[clap(long)]
    params: Option<PathBuf>,

    /// Write pairs to this file instead of stdout
    #[clap(long, short)]
    output: Option<PathBuf>,

    /// Write a JSON summary of the run to this file
    #[clap(long)]
    summary_json: Option<PathBuf>,
}

fn main() -> Result<()> {
    init_log();
    let args = Args::parse();

    let mut params = match &args.params {
        Some(path) => RemapParams::from_toml_file(path)?,
        None => RemapParams::default(),
    };
    if let Some(num_barcodes) = args.num_barcodes {
        params.num_barcodes = num_barcodes;
    }

    let out: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| path.display().to_string())?,
        )),
        None => Box::new(BufWriter::new(std::io::stdout().lock())),
    };
    let summary = run(&args.barcodes_use, &args.barcodes_remap, &params, out)?;

    if let Some(path) = &args.summary_json {
        let file = File::create(path).with_context(|| path.display().to_string())?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, &summary)
            .with_context(|| format!("while writing {}", path.display()))?;
        info!("wrote summary to {}", path.display());
    }
    Ok(())
}
