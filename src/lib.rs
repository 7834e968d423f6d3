//! TFBS over-representation analysis.
//!
//! Given a target and a background sequence set plus a collection of
//! transcription factor binding profiles (or profile clusters), this crate
//! scans for binding sites, resolves overlapping hits, aggregates hit
//! counts, and scores each TF/cluster with a one-tailed Fisher exact test
//! (reported as -ln p) and a rate Z-score against the background.

pub mod config;
pub mod counts;
pub mod enrich;
pub mod error;
pub mod matrix;
pub mod output;
pub mod overlap;
pub mod pairs;
pub mod parser;
pub mod results;
pub mod scanner;
pub mod stats;
pub mod types;

pub use config::{AnalysisConfig, AnalysisMode, RateBasis};
pub use enrich::{enrich_from_counts, run_analysis, AnalysisOutput, SiteDetails};
pub use error::{EnrichError, Result};
pub use matrix::{parse_threshold, Motif, MotifSet, Pwm, TfCluster};
pub use results::{CombinedResultSet, EnrichmentResult, ResultCount, SelectionParams, SortKey};
pub use types::{SeqRecord, Site, SitePair, Strand};
