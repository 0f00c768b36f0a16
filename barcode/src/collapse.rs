//!
//! Merge trusted barcodes that are themselves one substitution apart by replacing the
//! differing position with the wildcard base.
//!
//! A barcode and its hit partners are treated as one group when every partner has as many
//! hits as the barcode itself. This does not check that all members of the group differ at
//! the same position; each member is wildcarded at the position of its own hit.
//!
use crate::io_utils::PairSink;
use crate::whitelist::{BarcodeId, Whitelist};
use crate::BcSeq;
use anyhow::Result;
use log::debug;

/// A trusted barcode and the wildcarded form it was collapsed to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CollapseRecord {
    pub id: BarcodeId,
    pub original: BcSeq,
    pub collapsed: BcSeq,
}

/// Scan the whitelist in order and collapse every coherent group of near-duplicates.
/// Each collapsed barcode is written to `sink` as `(original, collapsed)` in the order
/// it is collapsed. Hit records of collapsed barcodes are cleared, so a second scan is a no-op.
pub fn collapse_near_duplicates(
    whitelist: &mut Whitelist,
    sink: &mut impl PairSink,
) -> Result<Vec<CollapseRecord>> {
    let mut records = Vec::new();
    let ids: Vec<_> = whitelist.ids().collect();
    for id in ids {
        let barcode = whitelist.get(id);
        let Some(head) = barcode.hits().next().copied() else {
            continue;
        };
        let num_hits = barcode.num_hits();
        let partners: Vec<_> = barcode.hits().map(|hit| hit.partner).collect();
        if let Some(mismatch) = partners
            .iter()
            .find(|&&p| whitelist.get(p).num_hits() != num_hits)
        {
            debug!(
                "not collapsing {}: {} hits, but partner {} has {}",
                barcode.sequence(),
                num_hits,
                whitelist.get(*mismatch).sequence(),
                whitelist.get(*mismatch).num_hits()
            );
            continue;
        }

        records.push(collapse_one(whitelist, id, head.position, sink)?);
        for partner in partners {
            let position = whitelist
                .get(partner)
                .hit_with(id)
                .map_or(head.position, |hit| hit.position);
            records.push(collapse_one(whitelist, partner, position, sink)?);
            whitelist.get_mut(partner).clear_hits();
        }
        whitelist.get_mut(id).clear_hits();
    }
    Ok(records)
}

fn collapse_one(
    whitelist: &mut Whitelist,
    id: BarcodeId,
    position: usize,
    sink: &mut impl PairSink,
) -> Result<CollapseRecord> {
    let barcode = whitelist.get_mut(id);
    let original = *barcode.display();
    barcode.set_wildcard(position);
    let collapsed = *barcode.display();
    sink.write_pair(original.as_bytes(), collapsed.as_bytes())?;
    Ok(CollapseRecord {
        id,
        original,
        collapsed,
    })
}
