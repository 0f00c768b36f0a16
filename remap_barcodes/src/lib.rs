//! remap_barcodes
//!
//! Re-map observed cell barcodes onto a list of trusted barcodes ("barcodes to use"),
//! writing `observed\ttrusted` for every observed barcode that corrects unambiguously.
//! Trusted barcodes one substitution apart are first collapsed and reported as
//! `original\tcollapsed`.

use anyhow::{Context, Result};
use barcode::correction_map::CorrectionMapSummary;
use barcode::io_utils::{open_with_gz, BarcodeLines};
use barcode::{BarcodeCorrector, Correction, PairSink, RemapMetrics, TsvPairWriter, Whitelist};
use log::info;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;

pub mod mylog;
pub mod params;

pub use params::RemapParams;

/// Everything worth reporting about a finished run.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct RemapSummary {
    pub trusted_barcodes: usize,
    pub collapsed_barcodes: usize,
    pub correction_map: CorrectionMapSummary,
    pub remap: RemapMetrics,
}

/// Load the barcodes to use, build and collapse the correction map, then re-map every
/// barcode in `barcodes_remap`. All output goes to `out` as tab-separated pairs.
/// Any malformed input aborts the run.
pub fn run<W: Write>(
    barcodes_use: &Path,
    barcodes_remap: &Path,
    params: &RemapParams,
    out: W,
) -> Result<RemapSummary> {
    params.validate()?;
    let whitelist = Whitelist::from_path(barcodes_use, params.whitelist_params())?;
    info!(
        "loaded {} barcodes to use from {}",
        whitelist.len(),
        barcodes_use.display()
    );

    let mut writer = TsvPairWriter::new(out);
    let corrector = BarcodeCorrector::new(whitelist, &mut writer)?;

    let mut metrics = RemapMetrics::default();
    for line in BarcodeLines::new(open_with_gz(barcodes_remap)?) {
        let (line, observed) =
            line.with_context(|| format!("while reading {}", barcodes_remap.display()))?;
        let correction = corrector
            .classify_line(line, &observed)
            .with_context(|| format!("while re-mapping {}", barcodes_remap.display()))?;
        metrics.observe(correction);
        if let Correction::Corrected(id) = correction {
            let trusted = corrector.whitelist().get(id).display();
            writer.write_pair(&observed, trusted.as_bytes())?;
        }
    }
    writer.finish()?;

    info!(
        "re-mapped {} of {} barcodes ({} exact, {} ambiguous, {} unassigned)",
        metrics.remapped, metrics.total, metrics.exact, metrics.ambiguous, metrics.unassigned
    );
    Ok(RemapSummary {
        trusted_barcodes: corrector.whitelist().len(),
        collapsed_barcodes: corrector.collapsed().len(),
        correction_map: corrector.correction_map().summary(),
        remap: metrics,
    })
}
