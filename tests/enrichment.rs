//! End-to-end tests of the enrichment pipeline through the library API.

use tfbs_enrich::config::{AnalysisConfig, AnalysisMode};
use tfbs_enrich::matrix::{base_index, Motif, MotifSet, Pwm, TfCluster, DEFAULT_PSEUDOCOUNT, UNIFORM_BG};
use tfbs_enrich::results::{ResultCount, SelectionParams, SortKey};
use tfbs_enrich::run_analysis;
use tfbs_enrich::types::SeqRecord;

// -------------------------------------------------------------------------
// Helper functions
// -------------------------------------------------------------------------

fn motif(id: &str, consensus: &str) -> Motif {
    let counts: Vec<[f64; 4]> = consensus
        .bytes()
        .map(|b| {
            let mut row = [0.0; 4];
            row[base_index(b).unwrap()] = 20.0;
            row
        })
        .collect();
    Motif::new(
        id,
        id.to_lowercase(),
        Pwm::from_counts(id, &counts, DEFAULT_PSEUDOCOUNT, UNIFORM_BG).unwrap(),
    )
}

fn motif_set(motifs: Vec<Motif>) -> MotifSet {
    let mut set = MotifSet::new();
    for m in motifs {
        set.insert(m);
    }
    set
}

fn seqs(records: &[(&str, &str)]) -> Vec<SeqRecord> {
    records
        .iter()
        .map(|(id, seq)| SeqRecord::new(*id, *seq))
        .collect()
}

fn filler(n: usize) -> String {
    // Poly-T filler never matches the motifs used in these tests.
    "T".repeat(n)
}

// -------------------------------------------------------------------------
// Scenario: strong target-only signal
// -------------------------------------------------------------------------

#[test]
fn target_only_tf_ranks_first_under_both_keys() {
    // Three target sequences each carry one occurrence of TF "A"; ten
    // background sequences carry none. Two decoy TFs have no target hits.
    let motifs = motif_set(vec![
        motif("A", "ACGTAC"),
        motif("B", "GGGCCC"),
        motif("C", "AGAGAG"),
    ]);

    let with_site = |pre: usize| format!("{}ACGTAC{}", filler(pre), filler(30 - pre));
    let target = seqs(&[
        ("t1", &with_site(5)),
        ("t2", &with_site(10)),
        ("t3", &with_site(20)),
    ]);
    let bg_seq = filler(36);
    let background: Vec<SeqRecord> = (0..10)
        .map(|i| SeqRecord::new(format!("b{}", i), bg_seq.clone()))
        .collect();

    let config = AnalysisConfig::new(0.85, AnalysisMode::SingleTf);
    let out = run_analysis(&motifs, &[], &target, &background, &config).unwrap();

    let a = out.results.get("A").unwrap();
    assert_eq!(a.t_seq_hits, 3);
    assert_eq!(a.t_seq_non_hits, 0);
    assert_eq!(a.bg_seq_hits, 0);
    assert_eq!(a.bg_seq_non_hits, 10);
    let fisher = a.fisher_score.unwrap();
    let zscore = a.zscore.unwrap();
    assert!(fisher > 0.0 && fisher.is_finite());
    assert!(zscore > 0.0 && zscore.is_finite());

    for key in [SortKey::ZScore, SortKey::Fisher] {
        let params = SelectionParams {
            sort_by: key,
            ..Default::default()
        };
        let ranked = out.results.get_list(&params);
        assert_eq!(ranked[0].id, "A");
    }
}

// -------------------------------------------------------------------------
// Scenario: overlapping hits, single-TF vs. cluster resolution
// -------------------------------------------------------------------------

#[test]
fn overlapping_hits_resolved_per_mode() {
    // ACAC on ACACAC produces two overlapping windows with equal scores.
    let motifs = motif_set(vec![motif("B", "ACAC")]);
    let target = seqs(&[("t1", &format!("ACACAC{}", filler(20)))]);
    let background = seqs(&[("b1", &filler(26))]);

    // Single-TF mode: equal scores, first-encountered wins; one hit of the
    // motif width survives.
    let config = AnalysisConfig::new(0.9, AnalysisMode::SingleTf);
    let out = run_analysis(&motifs, &[], &target, &background, &config).unwrap();
    let sites = &out.target_sites["B"]["t1"];
    assert_eq!(sites.len(), 1);
    assert_eq!((sites[0].start, sites[0].end), (1, 4));

    // Cluster mode with "B" as sole member: the windows merge into one site
    // spanning the whole run.
    let clusters = vec![TfCluster {
        id: "CB".to_string(),
        name: "b-cluster".to_string(),
        class: None,
        family: None,
        members: vec!["B".to_string()],
    }];
    let config = AnalysisConfig::new(0.9, AnalysisMode::Cluster);
    let out = run_analysis(&motifs, &clusters, &target, &background, &config).unwrap();
    let sites = &out.target_sites["CB"]["t1"];
    assert_eq!(sites.len(), 1);
    assert_eq!((sites[0].start, sites[0].end), (1, 6));
    assert_eq!(sites[0].seq.len(), 6);

    let row = out.results.get("CB").unwrap();
    assert_eq!(row.t_hits, 1);
    assert_eq!(row.name, "b-cluster");
}

// -------------------------------------------------------------------------
// Scenario: anchored pairs
// -------------------------------------------------------------------------

#[test]
fn anchored_pair_distance_and_exclusion() {
    let motifs = motif_set(vec![motif("ANCH", "ACGTAC"), motif("CAND", "GGGCCC")]);

    // Anchor at [6,11], nine filler bases, candidate at [21,26].
    let seq = format!("{}ACGTAC{}GGGCCC{}", filler(5), filler(9), filler(10));
    let target = seqs(&[("t1", &seq)]);
    let background = seqs(&[("b1", &filler(36))]);

    let config = AnalysisConfig::new(
        0.85,
        AnalysisMode::Anchored {
            anchor_id: "ANCH".to_string(),
            max_distance: 15,
        },
    );
    let out = run_analysis(&motifs, &[], &target, &background, &config).unwrap();

    assert_eq!(out.target_pairs.len(), 1);
    let pair = &out.target_pairs[0];
    assert_eq!((pair.anchor.start, pair.anchor.end), (6, 11));
    assert_eq!((pair.other.start, pair.other.end), (21, 26));
    assert_eq!(pair.distance, 9);

    // The anchor itself gets no result row; the candidate does.
    assert!(out.results.get("ANCH").is_none());
    let cand = out.results.get("CAND").unwrap();
    assert_eq!(cand.t_seq_hits, 1);
    assert_eq!(cand.t_hits, 1);

    // With a tighter distance bound the pair is dropped and the candidate
    // row records zero hits.
    let config = AnalysisConfig::new(
        0.85,
        AnalysisMode::Anchored {
            anchor_id: "ANCH".to_string(),
            max_distance: 8,
        },
    );
    let out = run_analysis(&motifs, &[], &target, &background, &config).unwrap();
    assert!(out.target_pairs.is_empty());
    assert_eq!(out.results.get("CAND").unwrap().t_hits, 0);
}

#[test]
fn anchored_candidate_overlapping_anchor_excluded() {
    let motifs = motif_set(vec![motif("ANCH", "ACGTAC"), motif("CAND", "GTACGG")]);

    // CAND's match starts inside the anchor span: ACGTACGG places ANCH at
    // [6,11] and CAND at [8,13].
    let seq = format!("{}ACGTACGG{}", filler(5), filler(20));
    let target = seqs(&[("t1", &seq)]);
    let background = seqs(&[("b1", &filler(33))]);

    let config = AnalysisConfig::new(
        0.85,
        AnalysisMode::Anchored {
            anchor_id: "ANCH".to_string(),
            max_distance: 15,
        },
    );
    let out = run_analysis(&motifs, &[], &target, &background, &config).unwrap();
    // Overlapping pairs are excluded entirely, never merged.
    assert!(out.target_pairs.is_empty());
    assert_eq!(out.results.get("CAND").unwrap().t_hits, 0);
}

#[test]
fn anchored_pairs_reported_for_both_sequence_sets() {
    let motifs = motif_set(vec![motif("ANCH", "ACGTAC"), motif("CAND", "GGGCCC")]);

    // Target pair at distance 9; background pair at distance 4.
    let t_seq = format!("{}ACGTAC{}GGGCCC{}", filler(5), filler(9), filler(10));
    let b_seq = format!("{}ACGTAC{}GGGCCC{}", filler(2), filler(4), filler(18));
    let target = seqs(&[("t1", &t_seq)]);
    let background = seqs(&[("b1", &b_seq)]);

    let config = AnalysisConfig::new(
        0.85,
        AnalysisMode::Anchored {
            anchor_id: "ANCH".to_string(),
            max_distance: 15,
        },
    );
    let out = run_analysis(&motifs, &[], &target, &background, &config).unwrap();

    assert_eq!(out.target_pairs.len(), 1);
    assert_eq!(out.bg_pairs.len(), 1);
    assert_eq!(out.bg_pairs[0].distance, 4);
    assert_eq!((out.bg_pairs[0].other.start, out.bg_pairs[0].other.end), (13, 18));

    // The background pair feeds the background hit count.
    let cand = out.results.get("CAND").unwrap();
    assert_eq!(cand.t_hits, 1);
    assert_eq!(cand.bg_hits, 1);
    assert_eq!(cand.bg_seq_hits, 1);
}

// -------------------------------------------------------------------------
// Scenario: selector completeness and determinism
// -------------------------------------------------------------------------

#[test]
fn all_sentinel_returns_every_row_including_na() {
    let motifs = motif_set(vec![
        motif("A", "ACGTAC"),
        motif("B", "GGGCCC"),
        motif("C", "AGAGAG"),
    ]);
    let target = seqs(&[("t1", &format!("{}ACGTAC{}", filler(5), filler(25)))]);
    let background = seqs(&[("b1", &filler(36)), ("b2", &filler(36))]);

    let config = AnalysisConfig::new(0.85, AnalysisMode::SingleTf);
    let out = run_analysis(&motifs, &[], &target, &background, &config).unwrap();

    let params = SelectionParams {
        num_results: Some(ResultCount::All),
        ..Default::default()
    };
    let ranked = out.results.get_list(&params);
    // One row per distinct TF id, no-hit all-N/A rows included.
    assert_eq!(ranked.len(), 3);
    assert!(ranked.iter().any(|r| r.zscore.is_none()));
}

#[test]
fn repeated_runs_are_bit_identical() {
    let motifs = motif_set(vec![
        motif("A", "ACGTAC"),
        motif("B", "GGGCCC"),
        motif("C", "AGAGAG"),
    ]);
    let target = seqs(&[
        ("t1", &format!("{}ACGTAC{}GGGCCC", filler(4), filler(8))),
        ("t2", &format!("GGGCCC{}ACGTAC", filler(11))),
    ]);
    let background = seqs(&[("b1", &filler(30)), ("b2", &filler(30))]);
    let config = AnalysisConfig::new(0.85, AnalysisMode::SingleTf);

    let render = || {
        let out = run_analysis(&motifs, &[], &target, &background, &config).unwrap();
        out.results
            .get_list(&SelectionParams::default())
            .iter()
            .map(|r| {
                format!(
                    "{} {} {} {:?} {:?}",
                    r.id, r.t_hits, r.bg_hits, r.zscore, r.fisher_score
                )
            })
            .collect::<Vec<_>>()
    };

    assert_eq!(render(), render());
}

#[test]
fn zero_background_hits_never_produce_nan() {
    let motifs = motif_set(vec![motif("A", "ACGTAC")]);
    let target = seqs(&[("t1", &format!("ACGTAC{}", filler(10)))]);
    let background = seqs(&[("b1", &filler(16))]);
    let config = AnalysisConfig::new(0.85, AnalysisMode::SingleTf);

    let out = run_analysis(&motifs, &[], &target, &background, &config).unwrap();
    let row = out.results.get("A").unwrap();
    assert_eq!(row.bg_hits, 0);
    if let Some(z) = row.zscore {
        assert!(!z.is_nan());
        assert!(z > 0.0);
    }
    if let Some(f) = row.fisher_score {
        assert!(!f.is_nan());
    }
}
