//! The enrichment engine: scan, resolve, aggregate, test, combine.
//!
//! One call to [`run_analysis`] takes a motif (or cluster) set plus target
//! and background sequences and produces a [`CombinedResultSet`] with one
//! row per TF/cluster, alongside per-sequence site details for drill-down
//! views. Gene-based analyses with pre-fetched counts enter through
//! [`enrich_from_counts`] and share the entire statistics path.

use std::collections::BTreeMap;

use ahash::AHashMap;
use log::{debug, warn};
use rayon::prelude::*;

use crate::config::{AnalysisConfig, AnalysisMode, RateBasis};
use crate::counts::CountsTable;
use crate::error::{EnrichError, Result};
use crate::matrix::{Motif, MotifSet, TfCluster};
use crate::overlap::{merge_cluster, resolve_single};
use crate::pairs::find_site_pairs;
use crate::results::{CombinedResultSet, EnrichmentResult};
use crate::scanner::scan;
use crate::stats::{fisher_score, z_score};
use crate::types::{SeqRecord, Site, SitePair};

/// Resolved sites per TF/cluster id, per sequence id. BTreeMap keeps
/// drill-down iteration deterministic.
pub type SiteDetails = BTreeMap<String, BTreeMap<String, Vec<Site>>>;

/// Everything one analysis run produces.
#[derive(Debug, Default)]
pub struct AnalysisOutput {
    pub results: CombinedResultSet,
    pub target_sites: SiteDetails,
    pub bg_sites: SiteDetails,
    /// Retained pairs on the target set (anchored mode only).
    pub target_pairs: Vec<SitePair>,
    /// Retained pairs on the background set (anchored mode only).
    pub bg_pairs: Vec<SitePair>,
}

/// Run a full scan-based enrichment analysis.
pub fn run_analysis(
    motifs: &MotifSet,
    clusters: &[TfCluster],
    target: &[SeqRecord],
    background: &[SeqRecord],
    config: &AnalysisConfig,
) -> Result<AnalysisOutput> {
    config.validate()?;
    if target.is_empty() {
        return Err(EnrichError::EmptySequenceSet("target".to_string()));
    }
    if background.is_empty() {
        return Err(EnrichError::EmptySequenceSet("background".to_string()));
    }
    if motifs.is_empty() {
        return Err(EnrichError::NoMotifs);
    }

    let t_total_len = total_length(target, config.target_length)?;
    let bg_total_len = total_length(background, config.bg_length)?;

    let (t_scan, bg_scan) = match &config.mode {
        AnalysisMode::SingleTf => {
            let sorted = sorted_motifs(motifs);
            (
                scan_single(target, &sorted, config.threshold),
                scan_single(background, &sorted, config.threshold),
            )
        }
        AnalysisMode::Cluster => {
            if clusters.is_empty() {
                return Err(EnrichError::NoMotifs);
            }
            let sorted = sorted_clusters(motifs, clusters)?;
            (
                scan_clusters(target, &sorted, config.threshold),
                scan_clusters(background, &sorted, config.threshold),
            )
        }
        AnalysisMode::Anchored {
            anchor_id,
            max_distance,
        } => {
            let anchor = motifs
                .get(anchor_id)
                .ok_or_else(|| EnrichError::UnknownId(anchor_id.clone()))?;
            let candidates: Vec<&Motif> = sorted_motifs(motifs)
                .into_iter()
                .filter(|m| m.id != *anchor_id)
                .collect();
            if candidates.is_empty() {
                return Err(EnrichError::NoMotifs);
            }
            (
                scan_anchored(target, anchor, &candidates, config.threshold, *max_distance),
                scan_anchored(
                    background,
                    anchor,
                    &candidates,
                    config.threshold,
                    *max_distance,
                ),
            )
        }
    };

    let names = id_names(motifs, clusters, &config.mode);
    let t_counts = build_counts(target, &t_scan);
    let bg_counts = build_counts(background, &bg_scan);

    let results = enrich_from_counts(
        &t_counts,
        &bg_counts,
        t_total_len,
        bg_total_len,
        config.mode.rate_basis(),
        &names,
    )?;

    Ok(AnalysisOutput {
        results,
        target_sites: details_from_scan(&t_scan),
        bg_sites: details_from_scan(&bg_scan),
        target_pairs: t_scan.into_iter().flat_map(|s| s.pairs).collect(),
        bg_pairs: bg_scan.into_iter().flat_map(|s| s.pairs).collect(),
    })
}

/// Compute enrichment from pre-aggregated counts tables, for gene-based
/// analyses where hits were fetched from a collaborator database instead of
/// scanned live. Both tables must cover the identical TF/cluster id set.
pub fn enrich_from_counts(
    target: &CountsTable,
    background: &CountsTable,
    t_total_len: u64,
    bg_total_len: u64,
    basis: RateBasis,
    names: &AHashMap<String, String>,
) -> Result<CombinedResultSet> {
    if t_total_len == 0 {
        return Err(EnrichError::ZeroTotalLength("target"));
    }
    if bg_total_len == 0 {
        return Err(EnrichError::ZeroTotalLength("background"));
    }
    if let Some(id) = first_id_mismatch(target.tf_ids(), background.tf_ids()) {
        return Err(EnrichError::ResultMismatch(id));
    }

    // The Fisher and Z-score passes each run over the full id set; the
    // combine step re-joins them by id and treats a gap as an error.
    let mut fisher_by_id: BTreeMap<String, Option<f64>> = BTreeMap::new();
    let mut z_by_id: BTreeMap<String, Option<f64>> = BTreeMap::new();

    for tf_id in target.tf_ids() {
        let t_seq_hits = target.tf_seq_hits(tf_id);
        let bg_seq_hits = background.tf_seq_hits(tf_id);
        fisher_by_id.insert(
            tf_id.clone(),
            fisher_score(
                t_seq_hits,
                target.tf_seq_non_hits(tf_id),
                bg_seq_hits,
                background.tf_seq_non_hits(tf_id),
            ),
        );
    }

    for tf_id in target.tf_ids() {
        let (t_obs, bg_obs) = observed(target, background, tf_id, basis);
        let z = match z_score(
            t_obs as f64,
            t_total_len as f64,
            bg_obs as f64,
            bg_total_len as f64,
        ) {
            Ok(z) => z,
            Err(e) => {
                // Lengths were validated above; anything else is a per-TF
                // pathology. Keep the row, drop the score.
                warn!("z-score computation failed for {}: {}", tf_id, e);
                None
            }
        };
        z_by_id.insert(tf_id.clone(), z);
    }

    combine_results(
        target,
        background,
        t_total_len,
        bg_total_len,
        basis,
        names,
        &fisher_by_id,
        &z_by_id,
    )
}

/// Join the Fisher and Z-score sub-results by id into one
/// [`EnrichmentResult`] per TF/cluster. An id present in only one sub-result
/// set is an error; both passes must cover the identical set.
#[allow(clippy::too_many_arguments)]
fn combine_results(
    target: &CountsTable,
    background: &CountsTable,
    t_total_len: u64,
    bg_total_len: u64,
    basis: RateBasis,
    names: &AHashMap<String, String>,
    fisher_by_id: &BTreeMap<String, Option<f64>>,
    z_by_id: &BTreeMap<String, Option<f64>>,
) -> Result<CombinedResultSet> {
    if let Some(id) = z_by_id.keys().find(|id| !fisher_by_id.contains_key(*id)) {
        return Err(EnrichError::ResultMismatch(id.clone()));
    }

    let mut rows = Vec::with_capacity(fisher_by_id.len());
    for (tf_id, fisher) in fisher_by_id {
        let zscore = z_by_id
            .get(tf_id)
            .ok_or_else(|| EnrichError::ResultMismatch(tf_id.clone()))?;

        let (t_obs, bg_obs) = observed(target, background, tf_id, basis);
        debug!(
            "{}: target {}/{} seqs, background {}/{} seqs",
            tf_id,
            target.tf_seq_hits(tf_id),
            target.num_seqs(),
            background.tf_seq_hits(tf_id),
            background.num_seqs()
        );

        rows.push(EnrichmentResult {
            id: tf_id.clone(),
            name: names.get(tf_id).cloned().unwrap_or_else(|| tf_id.clone()),
            t_seq_hits: target.tf_seq_hits(tf_id),
            t_seq_non_hits: target.tf_seq_non_hits(tf_id),
            bg_seq_hits: background.tf_seq_hits(tf_id),
            bg_seq_non_hits: background.tf_seq_non_hits(tf_id),
            t_hits: target.tf_hits(tf_id),
            bg_hits: background.tf_hits(tf_id),
            t_rate: Some(t_obs as f64 / t_total_len as f64),
            bg_rate: Some(bg_obs as f64 / bg_total_len as f64),
            zscore: *zscore,
            fisher_score: *fisher,
        });
    }

    Ok(CombinedResultSet::new(rows))
}

/// Observed quantity for the rate test: hits or covered nucleotides.
fn observed(
    target: &CountsTable,
    background: &CountsTable,
    tf_id: &str,
    basis: RateBasis,
) -> (u64, u64) {
    match basis {
        RateBasis::Hits => (target.tf_hits(tf_id), background.tf_hits(tf_id)),
        RateBasis::Covered => (target.tf_covered(tf_id), background.tf_covered(tf_id)),
    }
}

fn first_id_mismatch(a: &[String], b: &[String]) -> Option<String> {
    if a == b {
        return None;
    }
    a.iter()
        .find(|id| !b.contains(id))
        .or_else(|| b.iter().find(|id| !a.contains(id)))
        .cloned()
}

fn total_length(seqs: &[SeqRecord], supplied: Option<u64>) -> Result<u64> {
    let len = supplied.unwrap_or_else(|| seqs.iter().map(|s| s.seq.len() as u64).sum());
    if len == 0 {
        return Err(EnrichError::ZeroTotalLength("sequence set"));
    }
    Ok(len)
}

fn sorted_motifs(motifs: &MotifSet) -> Vec<&Motif> {
    let mut out: Vec<&Motif> = motifs.iter().collect();
    out.sort_by(|a, b| a.id.cmp(&b.id));
    out
}

fn sorted_clusters<'a>(
    motifs: &'a MotifSet,
    clusters: &'a [TfCluster],
) -> Result<Vec<(&'a TfCluster, Vec<&'a Motif>)>> {
    let mut out = Vec::with_capacity(clusters.len());
    for cluster in clusters {
        let mut members = Vec::with_capacity(cluster.members.len());
        for member in &cluster.members {
            let motif = motifs
                .get(member)
                .ok_or_else(|| EnrichError::UnknownId(member.clone()))?;
            members.push(motif);
        }
        out.push((cluster, members));
    }
    out.sort_by(|a, b| a.0.id.cmp(&b.0.id));
    Ok(out)
}

/// Per-sequence scan result: resolved sites per TF/cluster id, plus the
/// retained pairs in anchored mode.
struct SeqScan {
    seq_id: String,
    sites: Vec<(String, Vec<Site>)>,
    pairs: Vec<SitePair>,
}

fn scan_single(seqs: &[SeqRecord], motifs: &[&Motif], threshold: f64) -> Vec<SeqScan> {
    seqs.par_iter()
        .map(|rec| {
            let sites = motifs
                .iter()
                .map(|motif| {
                    let hits = resolve_single(scan(&rec.id, &rec.seq, motif, threshold));
                    (motif.id.clone(), hits)
                })
                .collect();
            SeqScan {
                seq_id: rec.id.clone(),
                sites,
                pairs: Vec::new(),
            }
        })
        .collect()
}

fn scan_clusters(
    seqs: &[SeqRecord],
    clusters: &[(&TfCluster, Vec<&Motif>)],
    threshold: f64,
) -> Vec<SeqScan> {
    seqs.par_iter()
        .map(|rec| {
            let sites = clusters
                .iter()
                .map(|(cluster, members)| {
                    // Union of member hits, relabeled to the cluster id, then
                    // physically merged.
                    let mut pooled: Vec<Site> = Vec::new();
                    for motif in members {
                        let mut hits = scan(&rec.id, &rec.seq, motif, threshold);
                        for hit in &mut hits {
                            hit.tf_id = cluster.id.clone();
                        }
                        pooled.extend(hits);
                    }
                    (cluster.id.clone(), merge_cluster(pooled))
                })
                .collect();
            SeqScan {
                seq_id: rec.id.clone(),
                sites,
                pairs: Vec::new(),
            }
        })
        .collect()
}

fn scan_anchored(
    seqs: &[SeqRecord],
    anchor: &Motif,
    candidates: &[&Motif],
    threshold: f64,
    max_distance: u64,
) -> Vec<SeqScan> {
    seqs.par_iter()
        .map(|rec| {
            let anchor_sites = resolve_single(scan(&rec.id, &rec.seq, anchor, threshold));
            let mut pairs = Vec::new();
            let sites = candidates
                .iter()
                .map(|candidate| {
                    let cand_sites =
                        resolve_single(scan(&rec.id, &rec.seq, candidate, threshold));
                    let retained = find_site_pairs(&anchor_sites, &cand_sites, max_distance);
                    let cand_hits: Vec<Site> =
                        retained.iter().map(|p| p.other.clone()).collect();
                    pairs.extend(retained);
                    (candidate.id.clone(), cand_hits)
                })
                .collect();
            SeqScan {
                seq_id: rec.id.clone(),
                sites,
                pairs,
            }
        })
        .collect()
}

fn build_counts(seqs: &[SeqRecord], scans: &[SeqScan]) -> CountsTable {
    let seq_ids: Vec<String> = seqs.iter().map(|s| s.id.clone()).collect();
    let tf_ids: Vec<String> = scans
        .first()
        .map(|s| s.sites.iter().map(|(id, _)| id.clone()).collect())
        .unwrap_or_default();

    let mut table = CountsTable::new(seq_ids, tf_ids);
    for seq_scan in scans {
        for (tf_id, sites) in &seq_scan.sites {
            table.add_sites(&seq_scan.seq_id, tf_id, sites);
        }
    }
    table
}

fn details_from_scan(scans: &[SeqScan]) -> SiteDetails {
    let mut details: SiteDetails = BTreeMap::new();
    for seq_scan in scans {
        for (tf_id, sites) in &seq_scan.sites {
            if sites.is_empty() {
                continue;
            }
            details
                .entry(tf_id.clone())
                .or_default()
                .insert(seq_scan.seq_id.clone(), sites.clone());
        }
    }
    details
}

fn id_names(
    motifs: &MotifSet,
    clusters: &[TfCluster],
    mode: &AnalysisMode,
) -> AHashMap<String, String> {
    let mut names = AHashMap::new();
    match mode {
        AnalysisMode::Cluster => {
            for cluster in clusters {
                names.insert(cluster.id.clone(), cluster.name.clone());
            }
        }
        _ => {
            for motif in motifs.iter() {
                names.insert(motif.id.clone(), motif.name.clone());
            }
        }
    }
    names
}
