//! Analysis configuration passed into the enrichment engine.
//!
//! All knobs travel in one explicit struct; the core holds no global state.

use crate::error::{EnrichError, Result};

/// Which analysis variant to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisMode {
    /// Individual TFs, best-hit overlap resolution.
    SingleTf,
    /// TF clusters: member hits pooled and physically merged.
    Cluster,
    /// Anchored pairs: candidate hits within `max_distance` bases of an
    /// anchor TF hit.
    Anchored {
        anchor_id: String,
        max_distance: u64,
    },
}

/// Denominator basis for the Z-score rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateBasis {
    /// Total hit count per unit length (single-TF and anchored analyses).
    Hits,
    /// Covered nucleotides per unit length (cluster analyses).
    Covered,
}

impl AnalysisMode {
    pub fn rate_basis(&self) -> RateBasis {
        match self {
            AnalysisMode::Cluster => RateBasis::Covered,
            _ => RateBasis::Hits,
        }
    }
}

/// Configuration for one analysis run.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Relative-score threshold as a fraction in [0, 1] (already
    /// normalized; see `matrix::parse_threshold`).
    pub threshold: f64,
    pub mode: AnalysisMode,
    /// Collaborator-supplied total target length (conserved-region total);
    /// defaults to the summed sequence lengths.
    pub target_length: Option<u64>,
    /// Collaborator-supplied total background length.
    pub bg_length: Option<u64>,
}

impl AnalysisConfig {
    pub fn new(threshold: f64, mode: AnalysisMode) -> Self {
        AnalysisConfig {
            threshold,
            mode,
            target_length: None,
            bg_length: None,
        }
    }

    /// Validate ranges that do not depend on the input data.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.threshold) || self.threshold.is_nan() {
            return Err(EnrichError::InvalidThreshold(self.threshold.to_string()));
        }
        Ok(())
    }
}
