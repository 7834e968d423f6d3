//! TSV writers for the results table and drill-down site details.
//!
//! Undefined scores are written as "N/A"; rows are never dropped here.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::enrich::SiteDetails;
use crate::results::EnrichmentResult;
use crate::types::SitePair;

const RESULT_HEADER: &str = "TF\tName\tTargetSeqHits\tTargetSeqNonHits\tBgSeqHits\t\
BgSeqNonHits\tTargetHits\tBgHits\tTargetRate\tBgRate\tZScore\tFisherScore";

fn fmt_score(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.3}", v),
        None => "N/A".to_string(),
    }
}

fn fmt_rate(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.5}", v),
        None => "N/A".to_string(),
    }
}

/// Write the ranked results table.
pub fn write_results(path: &Path, results: &[EnrichmentResult]) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create output file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "{}", RESULT_HEADER)?;
    for r in results {
        writeln!(
            writer,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            r.id,
            r.name,
            r.t_seq_hits,
            r.t_seq_non_hits,
            r.bg_seq_hits,
            r.bg_seq_non_hits,
            r.t_hits,
            r.bg_hits,
            fmt_rate(r.t_rate),
            fmt_rate(r.bg_rate),
            fmt_score(r.zscore),
            fmt_score(r.fisher_score),
        )?;
    }

    writer.flush().context("Failed to flush results file")?;
    Ok(())
}

/// Write the per-TF, per-sequence resolved sites.
pub fn write_site_details(path: &Path, details: &SiteDetails) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create details file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    writeln!(
        writer,
        "TF\tSequence\tStart\tEnd\tStrand\tScore\tRelScore\tSiteSeq"
    )?;
    for (tf_id, by_seq) in details {
        for (seq_id, sites) in by_seq {
            for site in sites {
                writeln!(
                    writer,
                    "{}\t{}\t{}\t{}\t{}\t{:.3}\t{:.3}\t{}",
                    tf_id,
                    seq_id,
                    site.start,
                    site.end,
                    site.strand,
                    site.score,
                    site.rel_score,
                    site.seq,
                )?;
            }
        }
    }

    writer.flush().context("Failed to flush details file")?;
    Ok(())
}

/// Write retained anchored-mode site pairs.
pub fn write_pair_details(path: &Path, pairs: &[SitePair]) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create pair file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    writeln!(
        writer,
        "Sequence\tAnchorTF\tAnchorStart\tAnchorEnd\tOtherTF\tOtherStart\tOtherEnd\tDistance"
    )?;
    for pair in pairs {
        writeln!(
            writer,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            pair.anchor.seq_id,
            pair.anchor.tf_id,
            pair.anchor.start,
            pair.anchor.end,
            pair.other.tf_id,
            pair.other.start,
            pair.other.end,
            pair.distance,
        )?;
    }

    writer.flush().context("Failed to flush pair file")?;
    Ok(())
}
