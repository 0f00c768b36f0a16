//!
//! Input-shape errors raised while loading or querying barcodes.
//!
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BarcodeError {
    /// A barcode line does not have the configured length.
    #[error(
        "wrong barcode length on line {line}: expected {expected} bases, \
         found {actual} in '{barcode}'"
    )]
    WrongLength {
        line: usize,
        expected: usize,
        actual: usize,
        barcode: String,
    },

    /// A barcode contains a character outside of the allowed alphabet.
    #[error("invalid base '{base}' at position {pos} in barcode '{barcode}'")]
    InvalidBase {
        base: char,
        pos: usize,
        barcode: String,
    },

    /// A barcode is longer than the capacity of `BcSeq`.
    #[error("barcode of length {len} exceeds the supported maximum of {max}")]
    TooLong { len: usize, max: usize },

    #[error("cannot use {requested} barcodes, at most {max} are supported")]
    UnsupportedBarcodeCount { requested: usize, max: usize },

    #[error("too many barcodes to use in input list: expected {expected}")]
    TooManyBarcodes { expected: usize },

    #[error("too few barcodes to use in input list: expected {expected}, found {found}")]
    TooFewBarcodes { expected: usize, found: usize },

    #[error("barcode '{barcode}' on line {line} duplicates the barcode on line {first_line}")]
    DuplicateBarcode {
        barcode: String,
        line: usize,
        first_line: usize,
    },
}
