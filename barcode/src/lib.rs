//! Crate for correcting cell barcodes onto a list of trusted barcodes.
//!
//! Every sequence within one substitution, or one deletion followed by a shift, of a
//! trusted barcode is precomputed into a `CorrectionMap`. Sequences reachable from several
//! trusted barcodes are ambiguous and never corrected, and trusted barcodes that are
//! themselves one substitution apart are collapsed by wildcarding the differing position.

pub mod collapse;
pub mod correction_map;
pub mod corrector;
pub mod error;
pub mod io_utils;
pub mod sseq;
pub mod whitelist;

pub use collapse::{collapse_near_duplicates, CollapseRecord};
pub use correction_map::{CorrectionEntry, CorrectionMap, CorrectionMapBuilder};
pub use corrector::{BarcodeCorrector, Correction, RemapMetrics};
pub use error::BarcodeError;
pub use io_utils::{PairSink, TsvPairWriter};
pub use sseq::BcSeq;
pub use whitelist::{BarcodeId, Whitelist, WhitelistParams};

/* ---------------------------------------------------------------------------------------------- */

/// The maximum supported barcode length
pub const MAX_BARCODE_LENGTH: usize = 32;

/// The maximum number of trusted barcodes, bounded by the range of `BarcodeId`
pub const MAX_NUM_BARCODES: usize = u32::MAX as usize;

/// Length of a barcode unless configured otherwise
pub const DEFAULT_BARCODE_LENGTH: usize = 12;

/// Number of trusted barcodes expected unless configured otherwise
pub const DEFAULT_NUM_BARCODES: usize = 1000;

/// Bases considered when generating the neighbourhood of a trusted barcode.
pub const BASE_OPTS: [u8; 4] = [b'A', b'C', b'G', b'T'];

/// Written over the differing position of collapsed trusted barcodes.
pub const WILDCARD_BASE: u8 = b'N';
