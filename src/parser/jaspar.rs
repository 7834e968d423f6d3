//! JASPAR-format matrix parser and TF-cluster table parser.
//!
//! Matrix records look like:
//!
//! ```text
//! >MA0004.1 Arnt
//! A  [ 4 19  0  0  0  0 ]
//! C  [16  0 20  0  0  0 ]
//! G  [ 0  1  0 20  0 20 ]
//! T  [ 0  0  0  0 20  0 ]
//! ```
//!
//! Bare number rows without the base label and brackets are accepted too
//! (A, C, G, T order assumed). Cluster tables are TSV:
//! `id<TAB>name<TAB>class<TAB>family<TAB>member,member,...`.

use anyhow::{bail, Context, Result};
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::matrix::{Motif, MotifSet, Pwm, TfCluster, DEFAULT_PSEUDOCOUNT};

/// Parse a JASPAR-format matrix file into a motif set, converting each
/// count matrix to log-odds against the supplied background.
pub fn parse_jaspar(path: &Path, background: [f64; 4]) -> Result<MotifSet> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open matrix file: {}", path.display()))?;

    let reader: Box<dyn BufRead> = if path.to_string_lossy().ends_with(".gz") {
        Box::new(BufReader::new(GzDecoder::new(file)))
    } else {
        Box::new(BufReader::new(file))
    };

    parse_jaspar_reader(reader, background)
}

/// Parse JASPAR matrix data from a reader.
pub fn parse_jaspar_reader<R: BufRead>(reader: R, background: [f64; 4]) -> Result<MotifSet> {
    let mut set = MotifSet::new();
    let mut header: Option<(String, String)> = None;
    let mut rows: Vec<Vec<f64>> = Vec::new();

    for line_result in reader.lines() {
        let line = line_result.context("Failed to read matrix line")?;
        let line = line.trim();

        if line.is_empty() {
            continue;
        }

        if let Some(rest) = line.strip_prefix('>') {
            if let Some((id, name)) = header.take() {
                set.insert(build_motif(&id, &name, &rows, background)?);
            }
            rows.clear();

            let mut parts = rest.split_whitespace();
            let id = match parts.next() {
                Some(id) => id.to_string(),
                None => bail!("Matrix header with no identifier"),
            };
            let name = parts.next().unwrap_or(&id).to_string();
            header = Some((id, name));
        } else {
            if header.is_none() {
                bail!("Matrix counts before any '>' header");
            }
            rows.push(parse_count_row(line)?);
        }
    }

    if let Some((id, name)) = header.take() {
        set.insert(build_motif(&id, &name, &rows, background)?);
    }

    if set.is_empty() {
        bail!("No matrices found");
    }
    Ok(set)
}

/// One base row: optionally "A [ ... ]"-wrapped counts.
fn parse_count_row(line: &str) -> Result<Vec<f64>> {
    let stripped: String = line
        .chars()
        .map(|c| if c == '[' || c == ']' { ' ' } else { c })
        .collect();
    let mut fields = stripped.split_whitespace().peekable();

    // Drop a leading base label if present.
    if let Some(first) = fields.peek() {
        if matches!(*first, "A" | "C" | "G" | "T" | "a" | "c" | "g" | "t") {
            fields.next();
        }
    }

    let counts: Vec<f64> = fields
        .map(|f| {
            f.parse::<f64>()
                .with_context(|| format!("Invalid matrix count '{}'", f))
        })
        .collect::<Result<_>>()?;
    if counts.is_empty() {
        bail!("Matrix row with no counts: '{}'", line);
    }
    Ok(counts)
}

/// Assemble the four base rows into per-position counts and build the PWM.
fn build_motif(id: &str, name: &str, rows: &[Vec<f64>], background: [f64; 4]) -> Result<Motif> {
    if rows.len() != 4 {
        bail!("Matrix '{}' has {} base rows, expected 4", id, rows.len());
    }
    let width = rows[0].len();
    if rows.iter().any(|r| r.len() != width) {
        bail!("Matrix '{}' has ragged base rows", id);
    }

    let mut counts = Vec::with_capacity(width);
    for pos in 0..width {
        counts.push([rows[0][pos], rows[1][pos], rows[2][pos], rows[3][pos]]);
    }

    let pwm = Pwm::from_counts(id, &counts, DEFAULT_PSEUDOCOUNT, background)
        .with_context(|| format!("Matrix '{}' could not be converted", id))?;
    Ok(Motif::new(id, name, pwm))
}

/// Parse a TSV cluster table. Lines starting with '#' are skipped.
pub fn parse_clusters(path: &Path) -> Result<Vec<TfCluster>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open cluster file: {}", path.display()))?;
    parse_clusters_reader(BufReader::new(file))
}

/// Parse cluster table data from a reader.
pub fn parse_clusters_reader<R: BufRead>(reader: R) -> Result<Vec<TfCluster>> {
    let mut clusters = Vec::new();

    for line_result in reader.lines() {
        let line = line_result.context("Failed to read cluster line")?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < 5 {
            bail!("Cluster line needs 5 tab-separated fields: '{}'", line);
        }

        let members: Vec<String> = fields[4]
            .split(',')
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .collect();
        if members.is_empty() {
            bail!("Cluster '{}' has no members", fields[0]);
        }

        clusters.push(TfCluster {
            id: fields[0].to_string(),
            name: fields[1].to_string(),
            class: non_empty(fields[2]),
            family: non_empty(fields[3]),
            members,
        });
    }

    if clusters.is_empty() {
        bail!("No clusters found");
    }
    Ok(clusters)
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}
