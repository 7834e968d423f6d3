//! Position weight matrices and motif/cluster definitions.
//!
//! A [`Pwm`] stores per-position log-odds scores over the DNA alphabet
//! (A=0, C=1, G=2, T=3) and knows its attainable score range, which is what
//! relative scores are normalized against.

use crate::error::{EnrichError, Result};
use indexmap::IndexMap;

/// Uniform background base frequencies.
pub const UNIFORM_BG: [f64; 4] = [0.25, 0.25, 0.25, 0.25];

/// Default pseudocount added to every count cell before log-odds conversion.
pub const DEFAULT_PSEUDOCOUNT: f64 = 0.01;

/// Map a nucleotide byte to its alphabet index.
pub fn base_index(base: u8) -> Option<usize> {
    match base {
        b'A' | b'a' => Some(0),
        b'C' | b'c' => Some(1),
        b'G' | b'g' => Some(2),
        b'T' | b't' => Some(3),
        _ => None,
    }
}

/// Background frequencies for a given GC fraction, AT split evenly.
pub fn background_from_gc(gc: f64) -> [f64; 4] {
    let at = (1.0 - gc) / 2.0;
    let gc = gc / 2.0;
    [at, gc, gc, at]
}

/// A position weight matrix in log-odds form.
#[derive(Debug, Clone)]
pub struct Pwm {
    /// `scores[pos][base]` log-odds values.
    scores: Vec<[f64; 4]>,
    /// Sum of per-position minima.
    min_score: f64,
    /// Sum of per-position maxima.
    max_score: f64,
}

impl Pwm {
    /// Build a PWM from a base-count matrix.
    ///
    /// Each row of `counts` is one motif position with counts for A, C, G, T.
    /// `pseudocount` is added to every cell before converting to frequencies;
    /// scores are `ln(freq / background)`.
    pub fn from_counts(
        id: &str,
        counts: &[[f64; 4]],
        pseudocount: f64,
        background: [f64; 4],
    ) -> Result<Self> {
        if counts.is_empty() {
            return Err(EnrichError::invalid_matrix(id, "matrix has no positions"));
        }
        for &bg in &background {
            if bg <= 0.0 {
                return Err(EnrichError::invalid_matrix(
                    id,
                    format!("background frequency must be positive, got {}", bg),
                ));
            }
        }

        let mut scores = Vec::with_capacity(counts.len());
        for (pos, row) in counts.iter().enumerate() {
            if row.iter().any(|&c| c < 0.0) {
                return Err(EnrichError::invalid_matrix(
                    id,
                    format!("negative count at position {}", pos),
                ));
            }
            let total: f64 = row.iter().sum::<f64>() + pseudocount * 4.0;
            if total <= 0.0 {
                return Err(EnrichError::invalid_matrix(
                    id,
                    format!("all-zero column at position {} with zero pseudocount", pos),
                ));
            }
            let mut log_odds = [0.0f64; 4];
            for base in 0..4 {
                let freq = (row[base] + pseudocount) / total;
                log_odds[base] = (freq / background[base]).ln();
            }
            scores.push(log_odds);
        }

        let min_score = scores
            .iter()
            .map(|row| row.iter().cloned().fold(f64::INFINITY, f64::min))
            .sum();
        let max_score = scores
            .iter()
            .map(|row| row.iter().cloned().fold(f64::NEG_INFINITY, f64::max))
            .sum();

        Ok(Pwm {
            scores,
            min_score,
            max_score,
        })
    }

    /// Number of positions in the motif.
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    pub fn min_score(&self) -> f64 {
        self.min_score
    }

    pub fn max_score(&self) -> f64 {
        self.max_score
    }

    /// Score one window of exactly `len()` bytes on the plus strand.
    /// Returns None if the window contains a non-ACGT base.
    pub fn score_window(&self, window: &[u8]) -> Option<f64> {
        debug_assert_eq!(window.len(), self.len());
        let mut total = 0.0;
        for (row, &base) in self.scores.iter().zip(window) {
            total += row[base_index(base)?];
        }
        Some(total)
    }

    /// Score one window against the reverse complement of this matrix.
    /// Returns None if the window contains a non-ACGT base.
    pub fn score_window_revcomp(&self, window: &[u8]) -> Option<f64> {
        debug_assert_eq!(window.len(), self.len());
        let mut total = 0.0;
        for (row, &base) in self.scores.iter().rev().zip(window) {
            // Complement: A<->T (0<->3), C<->G (1<->2).
            total += row[3 - base_index(base)?];
        }
        Some(total)
    }

    /// Normalize an absolute score to the [0, 1] attainable range.
    pub fn rel_score(&self, score: f64) -> f64 {
        let range = self.max_score - self.min_score;
        if range <= 0.0 {
            return 0.0;
        }
        (score - self.min_score) / range
    }
}

/// A transcription factor motif. Immutable once loaded.
#[derive(Debug, Clone)]
pub struct Motif {
    pub id: String,
    pub name: String,
    pub pwm: Pwm,
    pub class: Option<String>,
    pub family: Option<String>,
    pub tax_group: Option<String>,
}

impl Motif {
    pub fn new(id: impl Into<String>, name: impl Into<String>, pwm: Pwm) -> Self {
        Motif {
            id: id.into(),
            name: name.into(),
            pwm,
            class: None,
            family: None,
            tax_group: None,
        }
    }
}

/// A TFBS cluster: a named group of member TFs whose hits are pooled and
/// physically merged. Immutable once loaded.
#[derive(Debug, Clone)]
pub struct TfCluster {
    pub id: String,
    pub name: String,
    pub class: Option<String>,
    pub family: Option<String>,
    pub members: Vec<String>,
}

/// Motif collection keyed by id, preserving file order.
#[derive(Debug, Clone, Default)]
pub struct MotifSet {
    motifs: IndexMap<String, Motif>,
}

impl MotifSet {
    pub fn new() -> Self {
        MotifSet {
            motifs: IndexMap::new(),
        }
    }

    /// Insert a motif; a repeated id replaces the previous definition.
    pub fn insert(&mut self, motif: Motif) {
        self.motifs.insert(motif.id.clone(), motif);
    }

    pub fn get(&self, id: &str) -> Option<&Motif> {
        self.motifs.get(id)
    }

    pub fn len(&self) -> usize {
        self.motifs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.motifs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Motif> {
        self.motifs.values()
    }

    /// Motif ids in sorted order, for deterministic iteration.
    pub fn sorted_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.motifs.keys().cloned().collect();
        ids.sort();
        ids
    }
}

/// Normalize a threshold given as either a percentage string ("80%") or a
/// decimal fraction ("0.8") to a fraction in [0, 1].
pub fn parse_threshold(s: &str) -> Result<f64> {
    let s = s.trim();
    let value = if let Some(pct) = s.strip_suffix('%') {
        pct.trim()
            .parse::<f64>()
            .map_err(|_| EnrichError::InvalidThreshold(s.to_string()))?
            / 100.0
    } else {
        s.parse::<f64>()
            .map_err(|_| EnrichError::InvalidThreshold(s.to_string()))?
    };
    if !(0.0..=1.0).contains(&value) || value.is_nan() {
        return Err(EnrichError::InvalidThreshold(s.to_string()));
    }
    Ok(value)
}
