//! Anchored-pair analysis: co-occurring sites near a designated anchor TF.

use crate::types::{Site, SitePair};

/// Bases strictly between two non-intersecting sites; 0 when adjacent.
/// None when the intervals intersect (inclusive coordinates).
pub fn inter_site_distance(a: &Site, b: &Site) -> Option<u64> {
    if a.intersects(b) {
        return None;
    }
    if b.start > a.end {
        Some(b.start - a.end - 1)
    } else {
        Some(a.start - b.end - 1)
    }
}

/// For one sequence, pair every anchor site with every candidate site within
/// `max_distance` bases. Candidate sites that intersect an anchor site are
/// dropped entirely, never merged or counted.
///
/// Both inputs are expected to be resolved (non-overlapping within their own
/// stream) already. Output order follows (anchor, candidate) sorted input
/// order, so it is deterministic.
pub fn find_site_pairs(
    anchor_sites: &[Site],
    candidate_sites: &[Site],
    max_distance: u64,
) -> Vec<SitePair> {
    let mut pairs = Vec::new();
    for anchor in anchor_sites {
        for candidate in candidate_sites {
            match inter_site_distance(anchor, candidate) {
                Some(distance) if distance <= max_distance => pairs.push(SitePair {
                    anchor: anchor.clone(),
                    other: candidate.clone(),
                    distance,
                }),
                _ => {}
            }
        }
    }
    pairs
}
