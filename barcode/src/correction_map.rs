//!
//! Precomputed map from every sequence within one edit of a trusted barcode to the
//! trusted barcode it should be corrected to.
//!
use crate::whitelist::{BarcodeId, Whitelist};
use crate::BcSeq;
use fxhash::FxHashMap;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::Entry;

/// Classification of a sequence that is present in the correction map.
/// A sequence missing from the map is unassigned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CorrectionEntry {
    /// The sequence is itself a trusted barcode and is never corrected to anything else.
    Blocked(BarcodeId),
    /// Exactly one trusted barcode has this sequence in its neighbourhood.
    Owned(BarcodeId),
    /// The neighbourhoods of at least two trusted barcodes collide on this sequence.
    Ambiguous,
}

/// Number of map entries in each class.
#[derive(Serialize, Deserialize, Clone, Copy, Default, Debug, PartialEq, Eq)]
pub struct CorrectionMapSummary {
    pub blocked: usize,
    pub owned: usize,
    pub ambiguous: usize,
}

/// Lookup table from candidate sequence to `CorrectionEntry`.
#[derive(Default, Debug)]
pub struct CorrectionMap {
    entries: FxHashMap<BcSeq, CorrectionEntry>,
}

impl CorrectionMap {
    /// Classification of `seq`, or None if no trusted barcode claims it.
    pub fn lookup(&self, seq: &BcSeq) -> Option<CorrectionEntry> {
        self.entries.get(seq).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn summary(&self) -> CorrectionMapSummary {
        let mut summary = CorrectionMapSummary::default();
        for entry in self.entries.values() {
            match entry {
                CorrectionEntry::Blocked(_) => summary.blocked += 1,
                CorrectionEntry::Owned(_) => summary.owned += 1,
                CorrectionEntry::Ambiguous => summary.ambiguous += 1,
            }
        }
        summary
    }
}

/// Builds a `CorrectionMap` from a whitelist, recording in the whitelist which trusted
/// barcodes are themselves one substitution apart.
pub struct CorrectionMapBuilder<'a> {
    whitelist: &'a mut Whitelist,
    map: CorrectionMap,
}

impl<'a> CorrectionMapBuilder<'a> {
    pub fn new(whitelist: &'a mut Whitelist) -> Self {
        let capacity = whitelist.len() * (1 + 7 * whitelist.barcode_length());
        CorrectionMapBuilder {
            whitelist,
            map: CorrectionMap {
                entries: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            },
        }
    }

    /// Add every trusted barcode and its neighbourhood, in whitelist order.
    pub fn build(mut self) -> CorrectionMap {
        let ids: Vec<_> = self.whitelist.ids().collect();
        for id in ids {
            let seq = *self.whitelist.get(id).sequence();
            self.block(id, seq);
            for (candidate, pos) in seq.one_hamming_iter() {
                self.add_substitution(id, candidate, pos);
            }
            for (candidate, _pos) in seq.one_deletion_shift_iter() {
                self.add_deletion(id, candidate);
            }
        }
        debug!(
            "built correction map with {} entries for {} barcodes",
            self.map.len(),
            self.whitelist.len()
        );
        self.map
    }

    /// A trusted barcode always blocks its own sequence, whatever claimed it before.
    fn block(&mut self, id: BarcodeId, seq: BcSeq) {
        self.map.entries.insert(seq, CorrectionEntry::Blocked(id));
    }

    fn add_substitution(&mut self, id: BarcodeId, candidate: BcSeq, pos: usize) {
        match self.map.entries.entry(candidate) {
            Entry::Vacant(e) => {
                e.insert(CorrectionEntry::Owned(id));
            }
            Entry::Occupied(mut e) => match *e.get() {
                CorrectionEntry::Blocked(other) => {
                    self.whitelist.record_mutual_hit(id, other, pos);
                }
                CorrectionEntry::Owned(other) if other != id => {
                    e.insert(CorrectionEntry::Ambiguous);
                }
                CorrectionEntry::Owned(_) | CorrectionEntry::Ambiguous => {}
            },
        }
    }

    /// Unlike substitutions, a deletion that lands on a trusted barcode is not a hit.
    fn add_deletion(&mut self, id: BarcodeId, candidate: BcSeq) {
        match self.map.entries.entry(candidate) {
            Entry::Vacant(e) => {
                e.insert(CorrectionEntry::Owned(id));
            }
            Entry::Occupied(mut e) => {
                if let CorrectionEntry::Owned(_) = e.get() {
                    e.insert(CorrectionEntry::Ambiguous);
                }
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::whitelist::test::whitelist;
    use crate::whitelist::Hit;
    use proptest::collection::hash_set;
    use proptest::{prop_assert, prop_assert_eq, proptest};

    fn seq(s: &str) -> BcSeq {
        BcSeq::from_bytes(s.as_bytes()).unwrap()
    }

    fn build(barcodes: &[&str]) -> (Whitelist, CorrectionMap) {
        let mut wl = whitelist(barcodes);
        let map = CorrectionMapBuilder::new(&mut wl).build();
        (wl, map)
    }

    #[test]
    fn test_single_barcode() {
        let (wl, map) = build(&["ACGTACGTACGT"]);
        let id = wl.ids().next().unwrap();
        assert_eq!(map.lookup(&seq("ACGTACGTACGT")), Some(CorrectionEntry::Blocked(id)));
        assert_eq!(map.lookup(&seq("ACGTACGTACGA")), Some(CorrectionEntry::Owned(id)));
        // deletion of the first base, shifting in a T
        assert_eq!(map.lookup(&seq("CGTACGTACGTT")), Some(CorrectionEntry::Owned(id)));
        assert_eq!(map.lookup(&seq("CGTACGTACGTA")), Some(CorrectionEntry::Owned(id)));
        // shifted by two bases
        assert_eq!(map.lookup(&seq("GTACGTACGTAC")), None);
        assert_eq!(map.lookup(&seq("TTTTTTTTTTTT")), None);
        // deleting the second to last base and shifting in its successor is also a
        // substitution, and the barcode's own neighbourhoods collide there
        assert_eq!(map.lookup(&seq("ACGTACGTACTT")), Some(CorrectionEntry::Ambiguous));
        assert_eq!(
            map.summary(),
            CorrectionMapSummary {
                blocked: 1,
                owned: 12 * 3 + 11 * 4 - 2,
                ambiguous: 1
            }
        );
    }

    #[test]
    fn test_one_substitution_apart() {
        let (wl, map) = build(&["AAAAAAAAAAAA", "AAAAAAAAAAAC"]);
        let ids: Vec<_> = wl.ids().collect();
        assert_eq!(map.lookup(&seq("AAAAAAAAAAAA")), Some(CorrectionEntry::Blocked(ids[0])));
        assert_eq!(map.lookup(&seq("AAAAAAAAAAAC")), Some(CorrectionEntry::Blocked(ids[1])));
        assert_eq!(map.lookup(&seq("AAAAAAAAAAAG")), Some(CorrectionEntry::Ambiguous));
        assert_eq!(
            wl.get(ids[0]).hits().copied().collect::<Vec<_>>(),
            vec![Hit {
                partner: ids[1],
                position: 11
            }]
        );
        assert_eq!(
            wl.get(ids[1]).hits().copied().collect::<Vec<_>>(),
            vec![Hit {
                partner: ids[0],
                position: 11
            }]
        );
    }

    #[test]
    fn test_deletion_onto_trusted_is_not_a_hit() {
        // deleting the first base of the second barcode and shifting in an A gives the first
        let (wl, map) = build(&["AGTCAGTCAGTA", "CAGTCAGTCAGT"]);
        let ids: Vec<_> = wl.ids().collect();
        assert_eq!(map.lookup(&seq("AGTCAGTCAGTA")), Some(CorrectionEntry::Blocked(ids[0])));
        assert!(wl.iter().all(|(_, bc)| bc.num_hits() == 0));
    }

    #[test]
    fn test_deletion_collision_is_ambiguous() {
        // homopolymer runs produce the same shifted sequence from neighbouring positions
        let (wl, map) = build(&["AACGTACGTACG"]);
        let id = wl.ids().next().unwrap();
        assert_eq!(map.lookup(&seq("ACGTACGTACGC")), Some(CorrectionEntry::Ambiguous));
        assert_eq!(map.lookup(&seq("AAGTACGTACGC")), Some(CorrectionEntry::Owned(id)));
    }

    #[test]
    fn test_neighbourhood_collision_is_ambiguous() {
        // two barcodes at hamming distance two share two substitution neighbours
        let (wl, map) = build(&["AAAAAAAAAAAA", "AAAAAAAAAACC"]);
        let ids: Vec<_> = wl.ids().collect();
        assert_eq!(map.lookup(&seq("AAAAAAAAAAAC")), Some(CorrectionEntry::Ambiguous));
        assert_eq!(map.lookup(&seq("AAAAAAAAAACA")), Some(CorrectionEntry::Ambiguous));
        assert_eq!(map.lookup(&seq("AAAAAAAAAAGC")), Some(CorrectionEntry::Owned(ids[1])));
        assert!(wl.iter().all(|(_, bc)| bc.num_hits() == 0));
    }

    proptest! {
        #[test]
        fn prop_test_trusted_barcodes_are_blocked(
            barcodes in hash_set("[ACGT]{8}", 1..12)
        ) {
            let barcodes: Vec<&str> = barcodes.iter().map(String::as_str).collect();
            let (wl, map) = build(&barcodes);
            for (id, bc) in wl.iter() {
                prop_assert_eq!(map.lookup(bc.sequence()), Some(CorrectionEntry::Blocked(id)));
                for hit in bc.hits() {
                    let partner = wl.get(hit.partner).sequence();
                    prop_assert_eq!(bc.sequence().hamming_distance(partner), Some(1));
                    prop_assert!(bc.sequence()[hit.position] != partner[hit.position]);
                    prop_assert!(wl.get(hit.partner).hit_with(id).is_some());
                }
            }
        }

        #[test]
        fn prop_test_isolated_substitutions_are_owned(
            barcodes in hash_set("[ACGT]{8}", 1..12)
        ) {
            let barcodes: Vec<&str> = barcodes.iter().map(String::as_str).collect();
            let (wl, map) = build(&barcodes);
            for (id, bc) in wl.iter() {
                for (variant, _) in bc.sequence().one_hamming_iter() {
                    // a variant claimed by no other trusted barcode's neighbourhood
                    let claimed_elsewhere = wl.iter().any(|(other_id, other)| {
                        let other = other.sequence();
                        other_id != id
                            && (other == &variant
                                || other.one_hamming_iter().any(|(s, _)| s == variant)
                                || other.one_deletion_shift_iter().any(|(s, _)| s == variant))
                    });
                    let from_own_deletion =
                        bc.sequence().one_deletion_shift_iter().any(|(s, _)| s == variant);
                    if !claimed_elsewhere && !from_own_deletion {
                        prop_assert_eq!(map.lookup(&variant), Some(CorrectionEntry::Owned(id)));
                    }
                }
            }
        }
    }
}
