//! FASTA parser with gzip support.
//!
//! Reads the target and background sequence sets. Sequences are uppercased;
//! duplicate ids keep their first occurrence.

use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::types::SeqRecord;

/// Parse a FASTA file into ordered sequence records.
///
/// Supports both plain text and gzip-compressed files.
pub fn parse_fasta(path: &Path) -> Result<Vec<SeqRecord>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open FASTA file: {}", path.display()))?;

    let reader: Box<dyn BufRead> = if path.to_string_lossy().ends_with(".gz") {
        Box::new(BufReader::new(GzDecoder::new(file)))
    } else {
        Box::new(BufReader::new(file))
    };

    parse_fasta_reader(reader)
}

/// Parse FASTA data from a reader.
pub fn parse_fasta_reader<R: BufRead>(reader: R) -> Result<Vec<SeqRecord>> {
    let mut records: Vec<SeqRecord> = Vec::new();
    let mut current_id: Option<String> = None;
    let mut current_seq = String::new();

    for line_result in reader.lines() {
        let line = line_result.context("Failed to read FASTA line")?;
        let line = line.trim();

        if let Some(header) = line.strip_prefix('>') {
            if let Some(id) = current_id.take() {
                push_record(&mut records, id, &mut current_seq);
            }
            // First whitespace-delimited token is the id.
            let id = header.split_whitespace().next().unwrap_or("").to_string();
            current_id = Some(id);
        } else if !line.is_empty() && current_id.is_some() {
            current_seq.push_str(line);
        }
    }

    if let Some(id) = current_id.take() {
        push_record(&mut records, id, &mut current_seq);
    }

    Ok(records)
}

fn push_record(records: &mut Vec<SeqRecord>, id: String, seq: &mut String) {
    if id.is_empty() {
        seq.clear();
        return;
    }
    if records.iter().any(|r| r.id == id) {
        // Keep the first occurrence of a duplicated id.
        seq.clear();
        return;
    }
    records.push(SeqRecord::new(id, seq.to_uppercase()));
    seq.clear();
}
