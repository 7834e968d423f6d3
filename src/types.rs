//! Core data structures for tfbs-enrich.
//!
//! This module contains the fundamental types shared across the scanning,
//! overlap-resolution and enrichment stages.

use std::fmt;

/// Strand orientation of a binding-site hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strand {
    Positive,
    Negative,
}

impl Strand {
    /// Parse strand from a string ('+'/'+1' or '-'/'-1').
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "+" | "+1" | "1" => Some(Strand::Positive),
            "-" | "-1" => Some(Strand::Negative),
            _ => None,
        }
    }

    /// Convert strand to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Strand::Positive => "+",
            Strand::Negative => "-",
        }
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Reverse complement of a nucleotide string. Non-ACGT bases map to 'N'.
pub fn reverse_complement(seq: &str) -> String {
    seq.chars()
        .rev()
        .map(|c| match c {
            'A' => 'T',
            'C' => 'G',
            'G' => 'C',
            'T' => 'A',
            'a' => 't',
            'c' => 'g',
            'g' => 'c',
            't' => 'a',
            _ => 'N',
        })
        .collect()
}

/// A single TFBS hit on a sequence.
///
/// Coordinates are 1-based and inclusive. For minus-strand hits `seq` holds
/// the strand-oriented (reverse-complemented) match, which is what the
/// cluster-merge re-orientation rule relies on.
#[derive(Debug, Clone, PartialEq)]
pub struct Site {
    /// TF or cluster identifier this hit belongs to.
    pub tf_id: String,
    /// Sequence (or gene) identifier the hit was found on.
    pub seq_id: String,
    pub start: u64,
    pub end: u64,
    pub strand: Strand,
    /// Raw log-odds score of the match.
    pub score: f64,
    /// Score normalized to [0, 1] against the PWM's attainable range.
    pub rel_score: f64,
    /// Matched subsequence, oriented to `strand`.
    pub seq: String,
}

impl Site {
    /// Number of bases covered by this hit (end - start + 1).
    pub fn length(&self) -> u64 {
        self.end - self.start + 1
    }

    /// Overlap test used by the resolver: each start must lie within the
    /// other's [start, end) span. Sites touching only at the shared end
    /// coordinate do not overlap under this test.
    pub fn overlaps(&self, other: &Site) -> bool {
        (self.start <= other.start && other.start < self.end)
            || (other.start <= self.start && self.start < other.end)
    }

    /// Inclusive-interval intersection test, used for anchor exclusion in
    /// anchored-pair mode.
    pub fn intersects(&self, other: &Site) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}

/// An (anchor, candidate) co-occurrence retained by the anchored-pair
/// analysis.
#[derive(Debug, Clone)]
pub struct SitePair {
    pub anchor: Site,
    pub other: Site,
    /// Bases strictly between the two intervals; 0 when adjacent.
    pub distance: u64,
}

/// A named input sequence.
#[derive(Debug, Clone)]
pub struct SeqRecord {
    pub id: String,
    pub seq: String,
}

impl SeqRecord {
    pub fn new(id: impl Into<String>, seq: impl Into<String>) -> Self {
        SeqRecord {
            id: id.into(),
            seq: seq.into(),
        }
    }

    /// Fraction of G/C bases; 0.0 for an empty sequence.
    pub fn gc_content(&self) -> f64 {
        if self.seq.is_empty() {
            return 0.0;
        }
        let gc = self
            .seq
            .chars()
            .filter(|&c| c == 'G' || c == 'C' || c == 'g' || c == 'c')
            .count();
        gc as f64 / self.seq.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site(start: u64, end: u64) -> Site {
        Site {
            tf_id: "T1".to_string(),
            seq_id: "s1".to_string(),
            start,
            end,
            strand: Strand::Positive,
            score: 1.0,
            rel_score: 0.9,
            seq: "A".repeat((end - start + 1) as usize),
        }
    }

    #[test]
    fn test_strand_parsing() {
        assert_eq!(Strand::from_str("+"), Some(Strand::Positive));
        assert_eq!(Strand::from_str("-1"), Some(Strand::Negative));
        assert_eq!(Strand::from_str("."), None);
    }

    #[test]
    fn test_reverse_complement() {
        assert_eq!(reverse_complement("ACGT"), "ACGT");
        assert_eq!(reverse_complement("AACG"), "CGTT");
        assert_eq!(reverse_complement("ANT"), "ANT");
    }

    #[test]
    fn test_site_length() {
        assert_eq!(site(100, 200).length(), 101);
        assert_eq!(site(5, 5).length(), 1);
    }

    #[test]
    fn test_overlap_test() {
        assert!(site(10, 20).overlaps(&site(15, 25)));
        assert!(site(15, 25).overlaps(&site(10, 20)));
        assert!(site(10, 20).overlaps(&site(10, 20)));
        // Touching only at the shared end coordinate is not an overlap.
        assert!(!site(10, 20).overlaps(&site(20, 30)));
        assert!(!site(10, 20).overlaps(&site(21, 30)));
    }

    #[test]
    fn test_intersects_is_inclusive() {
        assert!(site(10, 20).intersects(&site(20, 30)));
        assert!(!site(10, 20).intersects(&site(21, 30)));
    }

    #[test]
    fn test_gc_content() {
        let rec = SeqRecord::new("s1", "ACGT");
        assert!((rec.gc_content() - 0.5).abs() < 1e-12);
        assert_eq!(SeqRecord::new("s2", "").gc_content(), 0.0);
    }
}
