//! Parsers for the input file formats.

pub mod fasta;
pub mod jaspar;

pub use fasta::parse_fasta;
pub use jaspar::{parse_clusters, parse_jaspar};
