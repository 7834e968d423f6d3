//! Overlap resolution for same-TF and same-cluster hit sets.
//!
//! Both modes sort by (start, end) first and compare each hit against the
//! currently retained last hit only. The tie-break is a behavioral contract:
//! on equal relative scores the earlier hit wins, and a challenger must
//! strictly outscore the retained hit to replace it.

use crate::types::{reverse_complement, Site, Strand};

fn sort_for_resolution(sites: &mut [Site]) {
    // Deterministic: never rely on upstream ordering.
    sites.sort_by(|a, b| {
        a.start
            .cmp(&b.start)
            .then(a.end.cmp(&b.end))
            .then(a.strand.as_str().cmp(b.strand.as_str()))
    });
}

/// Single-TF mode: collapse mutually overlapping hits to the best
/// representative. Output is non-overlapping and never larger than the
/// input.
pub fn resolve_single(mut sites: Vec<Site>) -> Vec<Site> {
    sort_for_resolution(&mut sites);

    let mut resolved: Vec<Site> = Vec::with_capacity(sites.len());
    for site in sites {
        match resolved.last_mut() {
            Some(last) if last.overlaps(&site) => {
                if site.rel_score > last.rel_score {
                    *last = site;
                }
            }
            _ => resolved.push(site),
        }
    }
    resolved
}

/// Cluster mode: physically merge overlapping hits into one site per
/// contiguous region.
///
/// The merged record is constructed fresh at each step: the end extends to
/// the max of the pair, whichever sequence is minus-oriented is
/// reverse-complemented so the merged record reads plus-strand, only the
/// incoming hit's non-overlapping suffix is appended, and both scores are
/// raised to the max of the pair (never lowered).
pub fn merge_cluster(mut sites: Vec<Site>) -> Vec<Site> {
    sort_for_resolution(&mut sites);

    let mut merged: Vec<Site> = Vec::with_capacity(sites.len());
    for site in sites {
        match merged.last_mut() {
            Some(last) if last.overlaps(&site) => {
                let combined = merge_pair(last, &site);
                *last = combined;
            }
            _ => merged.push(site),
        }
    }
    merged
}

/// Merge `incoming` into `retained`, returning the combined site.
/// `incoming.start >= retained.start` is guaranteed by the sort. The
/// combined record is plus-oriented: a minus-strand hit contributes the
/// reverse complement of its stored sequence.
fn merge_pair(retained: &Site, incoming: &Site) -> Site {
    let mut combined = retained.clone();
    if combined.strand == Strand::Negative {
        combined.seq = reverse_complement(&combined.seq);
        combined.strand = Strand::Positive;
    }

    if incoming.end > retained.end {
        let oriented = match incoming.strand {
            Strand::Negative => reverse_complement(&incoming.seq),
            Strand::Positive => incoming.seq.clone(),
        };
        let ext_len = (incoming.end - retained.end) as usize;
        let suffix_at = oriented.len().saturating_sub(ext_len);
        combined.seq.push_str(&oriented[suffix_at..]);
        combined.end = incoming.end;
    }

    if incoming.score > combined.score {
        combined.score = incoming.score;
    }
    if incoming.rel_score > combined.rel_score {
        combined.rel_score = incoming.rel_score;
    }

    combined
}
