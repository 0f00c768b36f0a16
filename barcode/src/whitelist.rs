//!
//! The set of trusted barcodes ("barcodes to use") that observed barcodes are corrected onto.
//!
use crate::error::BarcodeError;
use crate::io_utils::{open_with_gz, BarcodeLines};
use crate::{BcSeq, MAX_NUM_BARCODES};
use anyhow::{Context, Result};
use fxhash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::Entry;
use std::fmt;
use std::io::BufRead;
use std::path::Path;

const PREALLOC_BARCODES: usize = 1 << 16;

/// Identifier of a trusted barcode: its 1-based position in the input list.
#[derive(Serialize, Deserialize, Clone, Copy, PartialOrd, Ord, PartialEq, Eq, Hash, Debug)]
pub struct BarcodeId(u32);

impl BarcodeId {
    /// `index` is below `MAX_NUM_BARCODES`, which `Whitelist::from_reader` enforces.
    fn from_index(index: usize) -> Self {
        BarcodeId(index as u32 + 1)
    }

    fn index(self) -> usize {
        self.0 as usize - 1
    }
}

impl fmt::Display for BarcodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Another trusted barcode one substitution away, and the position at which they differ.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Hit {
    pub partner: BarcodeId,
    pub position: usize,
}

/// A trusted barcode together with its hit record.
#[derive(Clone, Debug)]
pub struct TrustedBarcode {
    /// The barcode as read from the input. This is the key used in the correction map.
    sequence: BcSeq,
    /// The barcode as reported in the output. Differs from `sequence` once collapsed.
    display: BcSeq,
    /// Hits in insertion order. Iterate with `hits()` to see the most recent first.
    hits: Vec<Hit>,
}

impl TrustedBarcode {
    fn new(sequence: BcSeq) -> Self {
        TrustedBarcode {
            sequence,
            display: sequence,
            hits: Vec::new(),
        }
    }

    pub fn sequence(&self) -> &BcSeq {
        &self.sequence
    }

    pub fn display(&self) -> &BcSeq {
        &self.display
    }

    /// The hit record, most recently recorded hit first.
    pub fn hits(&self) -> impl ExactSizeIterator<Item = &Hit> + '_ {
        self.hits.iter().rev()
    }

    pub fn num_hits(&self) -> usize {
        self.hits.len()
    }

    /// The hit pointing at `partner`, if any.
    pub fn hit_with(&self, partner: BarcodeId) -> Option<&Hit> {
        self.hits().find(|hit| hit.partner == partner)
    }

    pub(crate) fn record_hit(&mut self, hit: Hit) {
        self.hits.push(hit);
    }

    /// Invalidate the hit record once it has been consumed.
    pub(crate) fn clear_hits(&mut self) {
        self.hits.clear();
    }

    /// Overwrite `pos` of the displayed barcode with the wildcard base.
    pub(crate) fn set_wildcard(&mut self, pos: usize) {
        self.display = self.display.with_wildcard(pos);
    }
}

/// How many trusted barcodes to expect and how long each must be.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WhitelistParams {
    pub barcode_length: usize,
    pub num_barcodes: usize,
}

impl Default for WhitelistParams {
    fn default() -> Self {
        WhitelistParams {
            barcode_length: crate::DEFAULT_BARCODE_LENGTH,
            num_barcodes: crate::DEFAULT_NUM_BARCODES,
        }
    }
}

/// Ordered collection of trusted barcodes, addressed by `BarcodeId`.
#[derive(Clone, Debug)]
pub struct Whitelist {
    barcodes: Vec<TrustedBarcode>,
    barcode_length: usize,
}

impl Whitelist {
    /// Load the whitelist from a plain or gzipped file with one barcode per line.
    pub fn from_path(path: &Path, params: WhitelistParams) -> Result<Self> {
        Self::from_reader(open_with_gz(path)?, params)
            .with_context(|| format!("while loading barcodes to use from {}", path.display()))
    }

    /// Read exactly `params.num_barcodes` barcodes of `params.barcode_length` bases each.
    pub fn from_reader<R: BufRead>(reader: R, params: WhitelistParams) -> Result<Self> {
        if params.num_barcodes > MAX_NUM_BARCODES {
            return Err(BarcodeError::UnsupportedBarcodeCount {
                requested: params.num_barcodes,
                max: MAX_NUM_BARCODES,
            }
            .into());
        }
        let mut barcodes = Vec::with_capacity(params.num_barcodes.min(PREALLOC_BARCODES));
        let mut first_seen: FxHashMap<BcSeq, usize> = FxHashMap::default();

        for line in BarcodeLines::new(reader) {
            let (line, bytes) = line?;
            if barcodes.len() == params.num_barcodes {
                return Err(BarcodeError::TooManyBarcodes {
                    expected: params.num_barcodes,
                }
                .into());
            }
            check_length(line, &bytes, params.barcode_length)?;
            let sequence = BcSeq::from_acgt_bytes(&bytes)?;
            match first_seen.entry(sequence) {
                Entry::Occupied(first) => {
                    return Err(BarcodeError::DuplicateBarcode {
                        barcode: sequence.to_string(),
                        line,
                        first_line: *first.get(),
                    }
                    .into());
                }
                Entry::Vacant(slot) => {
                    slot.insert(line);
                }
            }
            barcodes.push(TrustedBarcode::new(sequence));
        }

        if barcodes.len() < params.num_barcodes {
            return Err(BarcodeError::TooFewBarcodes {
                expected: params.num_barcodes,
                found: barcodes.len(),
            }
            .into());
        }
        Ok(Whitelist {
            barcodes,
            barcode_length: params.barcode_length,
        })
    }

    pub fn barcode_length(&self) -> usize {
        self.barcode_length
    }

    pub fn len(&self) -> usize {
        self.barcodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.barcodes.is_empty()
    }

    pub fn get(&self, id: BarcodeId) -> &TrustedBarcode {
        &self.barcodes[id.index()]
    }

    pub(crate) fn get_mut(&mut self, id: BarcodeId) -> &mut TrustedBarcode {
        &mut self.barcodes[id.index()]
    }

    /// Iterate over the ids in read order.
    pub fn ids(&self) -> impl Iterator<Item = BarcodeId> {
        (0..self.barcodes.len()).map(BarcodeId::from_index)
    }

    /// Iterate over `(id, barcode)` in read order.
    pub fn iter(&self) -> impl Iterator<Item = (BarcodeId, &TrustedBarcode)> + '_ {
        self.barcodes
            .iter()
            .enumerate()
            .map(|(i, bc)| (BarcodeId::from_index(i), bc))
    }

    /// Record that `a` and `b` are one substitution apart at `position`, in both directions.
    pub(crate) fn record_mutual_hit(&mut self, a: BarcodeId, b: BarcodeId, position: usize) {
        self.get_mut(a).record_hit(Hit {
            partner: b,
            position,
        });
        self.get_mut(b).record_hit(Hit {
            partner: a,
            position,
        });
    }
}

/// Reject a barcode line that does not have the configured length.
pub(crate) fn check_length(line: usize, bytes: &[u8], expected: usize) -> Result<(), BarcodeError> {
    if bytes.len() == expected {
        Ok(())
    } else {
        Err(BarcodeError::WrongLength {
            line,
            expected,
            actual: bytes.len(),
            barcode: String::from_utf8_lossy(bytes).into_owned(),
        })
    }
}
