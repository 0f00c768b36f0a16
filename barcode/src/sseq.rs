//! Sized, stack-allocated container for a barcode sequence, and the
//! generators for its single-edit neighbourhood.

use crate::error::BarcodeError;
use crate::{BASE_OPTS, MAX_BARCODE_LENGTH, WILDCARD_BASE};
use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Index;

const UPPER_ACGTN: &[u8; 5] = b"ACGTN";

/// Fixed-capacity container for a barcode sequence of up to `MAX_BARCODE_LENGTH` bases.
/// A `BcSeq` is guaranteed to contain only "ACGTN" characters. Trusted barcodes never
/// contain an N until the collapser overwrites a position with the wildcard.
#[derive(Clone, Copy)]
pub struct BcSeq {
    bytes: [u8; MAX_BARCODE_LENGTH],
    length: u8,
}

impl BcSeq {
    /// Create a barcode from the given bytes, rejecting anything that is not "ACGTN"
    /// or that does not fit into `MAX_BARCODE_LENGTH`.
    pub fn from_bytes(src: &[u8]) -> Result<Self, BarcodeError> {
        if src.len() > MAX_BARCODE_LENGTH {
            return Err(BarcodeError::TooLong {
                len: src.len(),
                max: MAX_BARCODE_LENGTH,
            });
        }
        if let Some((pos, &base)) = src
            .iter()
            .enumerate()
            .find(|(_, b)| !UPPER_ACGTN.contains(b))
        {
            return Err(BarcodeError::InvalidBase {
                base: char::from(base),
                pos,
                barcode: String::from_utf8_lossy(src).into_owned(),
            });
        }
        let mut bytes = [0; MAX_BARCODE_LENGTH];
        bytes[..src.len()].copy_from_slice(src);
        Ok(BcSeq {
            bytes,
            length: src.len() as u8,
        })
    }

    /// Like `from_bytes`, but the wildcard N is rejected as well.
    pub fn from_acgt_bytes(src: &[u8]) -> Result<Self, BarcodeError> {
        let seq = Self::from_bytes(src)?;
        if let Some(pos) = seq.iter().position(|&b| b == WILDCARD_BASE) {
            return Err(BarcodeError::InvalidBase {
                base: char::from(WILDCARD_BASE),
                pos,
                barcode: seq.to_string(),
            });
        }
        Ok(seq)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.length as usize]
    }

    pub fn as_str(&self) -> &str {
        // Only ASCII bytes ever make it past from_bytes.
        std::str::from_utf8(self.as_bytes()).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.length as usize
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, u8> {
        self.as_bytes().iter()
    }

    /// Returns true if this sequence contains the wildcard base.
    pub fn has_n(&self) -> bool {
        self.iter().any(|&c| c == WILDCARD_BASE)
    }

    /// Return a copy of this sequence with `pos` replaced by the wildcard base.
    pub fn with_wildcard(&self, pos: usize) -> Self {
        assert!(pos < self.len(), "wildcard position {pos} out of bounds");
        let mut seq = *self;
        seq.bytes[pos] = WILDCARD_BASE;
        seq
    }

    /// Iterator over every sequence one substitution away, paired with the mutated position.
    /// Positions are visited left to right and replacement bases in "ACGT" order.
    pub fn one_hamming_iter(&self) -> OneHammingIter {
        OneHammingIter {
            source: *self,
            position: 0,
            chars_index: 0,
        }
    }

    /// Iterator over the sequences produced when the base at some position is lost and
    /// the downstream bases shift left by one, pulling an unknown base into the last slot.
    ///
    /// The deleted position ranges over `0..len - 1`; deleting the last base would only
    /// change the unknown tail, which the substitutions already cover. Every deleted
    /// position yields four candidates, one per tail base, paired with that position.
    pub fn one_deletion_shift_iter(&self) -> impl Iterator<Item = (BcSeq, usize)> {
        let source = *self;
        let last = source.len().saturating_sub(1);
        (0..last).flat_map(move |pos| {
            BASE_OPTS.iter().map(move |&tail| {
                let mut seq = source;
                seq.bytes.copy_within(pos + 1..=last, pos);
                seq.bytes[last] = tail;
                (seq, pos)
            })
        })
    }

    /// Number of positions at which two equal-length sequences differ.
    pub fn hamming_distance(&self, other: &BcSeq) -> Option<usize> {
        (self.len() == other.len()).then(|| {
            self.iter()
                .zip(other.iter())
                .filter(|(a, b)| a != b)
                .count()
        })
    }
}

/// An iterator over `(sequence, position)` pairs one hamming distance away from a `BcSeq`.
pub struct OneHammingIter {
    /// Sequence from which the neighbours are generated
    source: BcSeq,
    /// Position currently being mutated
    position: usize,
    /// Index into `BASE_OPTS` of the next replacement base
    chars_index: usize,
}

impl Iterator for OneHammingIter {
    type Item = (BcSeq, usize);

    fn next(&mut self) -> Option<Self::Item> {
        while self.position < self.source.len() {
            if self.chars_index >= BASE_OPTS.len() {
                self.position += 1;
                self.chars_index = 0;
                continue;
            }
            let base = BASE_OPTS[self.chars_index];
            self.chars_index += 1;
            if base == self.source.bytes[self.position] {
                continue;
            }
            let mut next_seq = self.source;
            next_seq.bytes[self.position] = base;
            return Some((next_seq, self.position));
        }
        None
    }
}

impl PartialEq for BcSeq {
    fn eq(&self, other: &Self) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl Eq for BcSeq {}

impl Hash for BcSeq {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_bytes().hash(state);
    }
}

impl PartialOrd for BcSeq {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BcSeq {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_bytes().cmp(other.as_bytes())
    }
}

impl Index<usize> for BcSeq {
    type Output = u8;

    fn index(&self, index: usize) -> &Self::Output {
        assert!(index < self.len(), "index out of bounds");
        &self.bytes[index]
    }
}

impl Borrow<[u8]> for BcSeq {
    fn borrow(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl AsRef<[u8]> for BcSeq {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl fmt::Display for BcSeq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for BcSeq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
