//! Hit-count aggregation: the per-(sequence, TF/cluster) counts table.
//!
//! Every (sequence, TF) pair of the analysis is present in the table, zero
//! counts included. Iteration order is driven by the sorted id vectors, not
//! map order, so output is deterministic.

use ahash::AHashMap;

use crate::types::Site;

/// Counts for one (sequence, TF) pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeqTfCounts {
    /// Number of resolved sites.
    pub hits: u64,
    /// Total nucleotides covered by the resolved sites.
    pub covered: u64,
}

/// Per-set counts table: sequence id -> TF/cluster id -> counts.
/// The nested layout keeps hot-path lookups on borrowed keys.
#[derive(Debug, Clone)]
pub struct CountsTable {
    seq_ids: Vec<String>,
    tf_ids: Vec<String>,
    counts: AHashMap<String, AHashMap<String, SeqTfCounts>>,
}

impl CountsTable {
    /// Create a zero-filled table over the full (sequence, TF) grid.
    /// Id vectors are sorted and deduplicated.
    pub fn new(mut seq_ids: Vec<String>, mut tf_ids: Vec<String>) -> Self {
        seq_ids.sort();
        seq_ids.dedup();
        tf_ids.sort();
        tf_ids.dedup();

        let mut counts = AHashMap::with_capacity(seq_ids.len());
        for seq_id in &seq_ids {
            let mut row = AHashMap::with_capacity(tf_ids.len());
            for tf_id in &tf_ids {
                row.insert(tf_id.clone(), SeqTfCounts::default());
            }
            counts.insert(seq_id.clone(), row);
        }

        CountsTable {
            seq_ids,
            tf_ids,
            counts,
        }
    }

    fn entry_mut(&mut self, seq_id: &str, tf_id: &str) -> Option<&mut SeqTfCounts> {
        self.counts.get_mut(seq_id).and_then(|row| row.get_mut(tf_id))
    }

    /// Record the resolved site set for one (sequence, TF) pair.
    /// Unknown ids are ignored; the grid is fixed at construction.
    pub fn add_sites(&mut self, seq_id: &str, tf_id: &str, sites: &[Site]) {
        if let Some(entry) = self.entry_mut(seq_id, tf_id) {
            entry.hits += sites.len() as u64;
            entry.covered += sites.iter().map(|s| s.length()).sum::<u64>();
        }
    }

    /// Record pre-computed counts for one (sequence, TF) pair, for analyses
    /// where hits come from a collaborator database rather than a live scan.
    pub fn add_counts(&mut self, seq_id: &str, tf_id: &str, hits: u64, covered: u64) {
        if let Some(entry) = self.entry_mut(seq_id, tf_id) {
            entry.hits += hits;
            entry.covered += covered;
        }
    }

    /// Merge another table built over the same grid into this one.
    /// Used to reduce per-worker partial tables.
    pub fn merge(&mut self, other: &CountsTable) {
        for (seq_id, row) in &other.counts {
            for (tf_id, counts) in row {
                if let Some(entry) = self.entry_mut(seq_id, tf_id) {
                    entry.hits += counts.hits;
                    entry.covered += counts.covered;
                }
            }
        }
    }

    pub fn seq_ids(&self) -> &[String] {
        &self.seq_ids
    }

    pub fn tf_ids(&self) -> &[String] {
        &self.tf_ids
    }

    pub fn num_seqs(&self) -> u64 {
        self.seq_ids.len() as u64
    }

    /// Counts for one (sequence, TF) pair; zero for pairs in the grid with
    /// no recorded sites.
    pub fn get(&self, seq_id: &str, tf_id: &str) -> SeqTfCounts {
        self.counts
            .get(seq_id)
            .and_then(|row| row.get(tf_id))
            .copied()
            .unwrap_or_default()
    }

    /// Total hit count for a TF across all sequences.
    pub fn tf_hits(&self, tf_id: &str) -> u64 {
        self.seq_ids
            .iter()
            .map(|seq_id| self.get(seq_id, tf_id).hits)
            .sum()
    }

    /// Total covered nucleotides for a TF across all sequences.
    pub fn tf_covered(&self, tf_id: &str) -> u64 {
        self.seq_ids
            .iter()
            .map(|seq_id| self.get(seq_id, tf_id).covered)
            .sum()
    }

    /// Number of sequences with at least one hit for a TF (the gene-presence
    /// tally feeding the Fisher test).
    pub fn tf_seq_hits(&self, tf_id: &str) -> u64 {
        self.seq_ids
            .iter()
            .filter(|seq_id| self.get(seq_id, tf_id).hits > 0)
            .count() as u64
    }

    /// Number of sequences with zero hits for a TF. Always equals
    /// `num_seqs() - tf_seq_hits(tf_id)`.
    pub fn tf_seq_non_hits(&self, tf_id: &str) -> u64 {
        self.num_seqs() - self.tf_seq_hits(tf_id)
    }
}
