//!
//! Corrects observed barcodes onto the trusted barcodes, allowing one substitution or one
//! shifted deletion.
//!
use crate::collapse::{collapse_near_duplicates, CollapseRecord};
use crate::correction_map::{CorrectionEntry, CorrectionMap, CorrectionMapBuilder};
use crate::io_utils::PairSink;
use crate::whitelist::{check_length, BarcodeId, Whitelist};
use crate::BcSeq;
use anyhow::Result;
use log::info;
use serde::{Deserialize, Serialize};

/// Result of looking up one observed barcode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Correction {
    /// Unambiguously one edit away from this trusted barcode.
    Corrected(BarcodeId),
    /// Exactly a trusted barcode.
    Exact(BarcodeId),
    /// Reachable from several trusted barcodes.
    Ambiguous,
    /// Not within one edit of any trusted barcode.
    Unassigned,
}

impl From<Option<CorrectionEntry>> for Correction {
    fn from(entry: Option<CorrectionEntry>) -> Self {
        match entry {
            Some(CorrectionEntry::Owned(id)) => Correction::Corrected(id),
            Some(CorrectionEntry::Blocked(id)) => Correction::Exact(id),
            Some(CorrectionEntry::Ambiguous) => Correction::Ambiguous,
            None => Correction::Unassigned,
        }
    }
}

/// Counts of observed barcodes by outcome.
#[derive(Serialize, Deserialize, Clone, Copy, Default, Debug, PartialEq, Eq)]
pub struct RemapMetrics {
    pub total: usize,
    pub remapped: usize,
    pub exact: usize,
    pub ambiguous: usize,
    pub unassigned: usize,
}

impl RemapMetrics {
    pub fn observe(&mut self, correction: Correction) {
        self.total += 1;
        match correction {
            Correction::Corrected(_) => self.remapped += 1,
            Correction::Exact(_) => self.exact += 1,
            Correction::Ambiguous => self.ambiguous += 1,
            Correction::Unassigned => self.unassigned += 1,
        }
    }
}

/// Owns the trusted barcodes and their finished, collapsed correction map.
/// Constructing one runs the whole build phase, so queries only ever see the final table.
pub struct BarcodeCorrector {
    whitelist: Whitelist,
    map: CorrectionMap,
    collapsed: Vec<CollapseRecord>,
}

impl BarcodeCorrector {
    /// Build the correction map for `whitelist`, then collapse near-duplicate trusted
    /// barcodes, writing each collapse to `sink`.
    pub fn new(mut whitelist: Whitelist, sink: &mut impl PairSink) -> Result<Self> {
        let map = CorrectionMapBuilder::new(&mut whitelist).build();
        let summary = map.summary();
        info!(
            "correction map: {} trusted, {} correctable, {} ambiguous sequences",
            summary.blocked, summary.owned, summary.ambiguous
        );
        let collapsed = collapse_near_duplicates(&mut whitelist, sink)?;
        info!("collapsed {} near-duplicate trusted barcodes", collapsed.len());
        Ok(BarcodeCorrector {
            whitelist,
            map,
            collapsed,
        })
    }

    pub fn whitelist(&self) -> &Whitelist {
        &self.whitelist
    }

    pub fn correction_map(&self) -> &CorrectionMap {
        &self.map
    }

    pub fn collapsed(&self) -> &[CollapseRecord] {
        &self.collapsed
    }

    /// Classify an observed barcode. A barcode of the wrong length is an error.
    /// Characters outside ACGT, including N and lowercase bases, never match.
    pub fn classify(&self, observed: &[u8]) -> Result<Correction> {
        self.classify_line(0, observed)
    }

    /// Like `classify`, with the input line number reported in errors.
    pub fn classify_line(&self, line: usize, observed: &[u8]) -> Result<Correction> {
        check_length(line, observed, self.whitelist.barcode_length())?;
        Ok(match BcSeq::from_bytes(observed) {
            Ok(seq) => self.map.lookup(&seq).into(),
            Err(_) => Correction::Unassigned,
        })
    }

    /// The trusted barcode an observed barcode unambiguously corrects to.
    pub fn resolve(&self, observed: &[u8]) -> Result<Option<BarcodeId>> {
        Ok(match self.classify(observed)? {
            Correction::Corrected(id) => Some(id),
            Correction::Exact(_) | Correction::Ambiguous | Correction::Unassigned => None,
        })
    }

    /// The (possibly wildcarded) display form of the trusted barcode that `observed`
    /// corrects to.
    pub fn correct_barcode(&self, observed: &[u8]) -> Result<Option<&BcSeq>> {
        Ok(self
            .resolve(observed)?
            .map(|id| self.whitelist.get(id).display()))
    }
}
