//! Motif scanning: slide a PWM over a sequence and report every window at
//! or above a relative-score threshold, on both strands.
//!
//! Overlapping windows for the same motif are expected here; resolving them
//! is the overlap resolver's job, not the scanner's.

use crate::matrix::Motif;
use crate::types::{reverse_complement, Site, Strand};

/// Scan `seq` with `motif`, reporting every position on either strand whose
/// relative score meets `threshold` (a fraction in [0, 1]).
///
/// Coordinates in the returned sites are 1-based inclusive. Windows
/// containing non-ACGT bases are skipped. A sequence shorter than the motif
/// yields an empty result.
pub fn scan(seq_id: &str, seq: &str, motif: &Motif, threshold: f64) -> Vec<Site> {
    let bytes = seq.as_bytes();
    let motif_len = motif.pwm.len();
    let mut sites = Vec::new();

    if motif_len == 0 || bytes.len() < motif_len {
        return sites;
    }

    for pos in 0..=(bytes.len() - motif_len) {
        let window = &bytes[pos..pos + motif_len];

        if let Some(score) = motif.pwm.score_window(window) {
            let rel = motif.pwm.rel_score(score);
            if rel >= threshold {
                sites.push(Site {
                    tf_id: motif.id.clone(),
                    seq_id: seq_id.to_string(),
                    start: (pos + 1) as u64,
                    end: (pos + motif_len) as u64,
                    strand: Strand::Positive,
                    score,
                    rel_score: rel,
                    seq: String::from_utf8_lossy(window).to_uppercase(),
                });
            }
        }

        if let Some(score) = motif.pwm.score_window_revcomp(window) {
            let rel = motif.pwm.rel_score(score);
            if rel >= threshold {
                sites.push(Site {
                    tf_id: motif.id.clone(),
                    seq_id: seq_id.to_string(),
                    start: (pos + 1) as u64,
                    end: (pos + motif_len) as u64,
                    strand: Strand::Negative,
                    seq: reverse_complement(&String::from_utf8_lossy(window)).to_uppercase(),
                    score,
                    rel_score: rel,
                });
            }
        }
    }

    sites
}
