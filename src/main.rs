//! CLI entry point for tfbs-enrich.
//!
//! The flags here are pure marshalling into the library's input contract:
//! sequence sets, motif/cluster definitions, a normalized threshold and the
//! selection parameters.

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::info;
use std::path::PathBuf;

use tfbs_enrich::config::{AnalysisConfig, AnalysisMode};
use tfbs_enrich::matrix::{background_from_gc, parse_threshold, UNIFORM_BG};
use tfbs_enrich::output::{write_pair_details, write_results, write_site_details};
use tfbs_enrich::parser::{parse_clusters, parse_fasta, parse_jaspar};
use tfbs_enrich::results::{ResultCount, SelectionParams, SortKey};
use tfbs_enrich::run_analysis;

/// TFBS over-representation analysis.
///
/// Tests whether target sequences are enriched for binding sites of specific
/// TFs or TF clusters relative to a background set.
#[derive(Parser, Debug)]
#[command(name = "tfbs-enrich")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Target sequence FASTA file (required)
    #[arg(short = 't', long = "target")]
    target: PathBuf,

    /// Background sequence FASTA file (required)
    #[arg(short = 'b', long = "background")]
    background: PathBuf,

    /// JASPAR-format matrix file (required)
    #[arg(short = 'm', long = "matrices")]
    matrices: PathBuf,

    /// Output results TSV file (required)
    #[arg(short = 'o', long = "output")]
    output: PathBuf,

    /// Relative score threshold: "80%" or 0.80
    #[arg(short = 'c', long = "threshold", default_value = "80%")]
    threshold: String,

    /// Analysis mode: tf, cluster, or anchored
    #[arg(long = "mode", default_value = "tf")]
    mode: String,

    /// Cluster table TSV (required for cluster mode)
    #[arg(long = "clusters")]
    clusters: Option<PathBuf>,

    /// Anchor TF id (required for anchored mode)
    #[arg(long = "anchor")]
    anchor: Option<String>,

    /// Maximum inter-site distance in bp for anchored mode
    #[arg(long = "max-distance", default_value = "100")]
    max_distance: u64,

    /// Sort key: zscore or fisher
    #[arg(short = 's', long = "sort-by", default_value = "zscore")]
    sort_by: String,

    /// Number of results to report, or "All"
    #[arg(short = 'n', long = "num-results")]
    num_results: Option<String>,

    /// Z-score cutoff (inclusive)
    #[arg(long = "zscore-cutoff")]
    zscore_cutoff: Option<f64>,

    /// Fisher score cutoff (inclusive)
    #[arg(long = "fisher-cutoff")]
    fisher_cutoff: Option<f64>,

    /// Total target length in bp (defaults to summed sequence length)
    #[arg(long = "target-length")]
    target_length: Option<u64>,

    /// Total background length in bp (defaults to summed sequence length)
    #[arg(long = "bg-length")]
    bg_length: Option<u64>,

    /// GC content for the PWM background model (0-1); uniform if omitted
    #[arg(long = "gc-content")]
    gc_content: Option<f64>,

    /// Site detail output TSV file
    #[arg(long = "site-details")]
    site_details: Option<PathBuf>,

    /// Pair detail output TSV file (anchored mode)
    #[arg(long = "pair-details")]
    pair_details: Option<PathBuf>,

    /// Number of worker threads (defaults to all cores)
    #[arg(long = "threads")]
    threads: Option<usize>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    // Validate inputs
    if !args.target.exists() {
        bail!("Target FASTA file not found: {}", args.target.display());
    }
    if !args.background.exists() {
        bail!(
            "Background FASTA file not found: {}",
            args.background.display()
        );
    }
    if !args.matrices.exists() {
        bail!("Matrix file not found: {}", args.matrices.display());
    }

    let threshold = parse_threshold(&args.threshold)
        .context("Threshold must be a percentage like \"80%\" or a fraction like 0.8")?;

    let mode = match args.mode.to_lowercase().as_str() {
        "tf" => AnalysisMode::SingleTf,
        "cluster" => {
            if args.clusters.is_none() {
                bail!("Cluster mode requires --clusters");
            }
            AnalysisMode::Cluster
        }
        "anchored" => match &args.anchor {
            Some(anchor_id) => AnalysisMode::Anchored {
                anchor_id: anchor_id.clone(),
                max_distance: args.max_distance,
            },
            None => bail!("Anchored mode requires --anchor"),
        },
        other => bail!(
            "Mode can only be one of the following: tf, cluster or anchored (got '{}')",
            other
        ),
    };

    let sort_by = SortKey::from_str(&args.sort_by)
        .context("Sort key can only be one of the following: zscore or fisher")?;

    let num_results = match &args.num_results {
        Some(s) => Some(
            ResultCount::from_str(s)
                .with_context(|| format!("Invalid number of results: '{}'", s))?,
        ),
        None => None,
    };
    if num_results.is_some() && (args.zscore_cutoff.is_some() || args.fisher_cutoff.is_some()) {
        bail!("Use either --num-results or score cutoffs, not both");
    }

    let background_freqs = match args.gc_content {
        Some(gc) => {
            if !(0.0..=1.0).contains(&gc) {
                bail!("GC content should range between 0 and 1.");
            }
            background_from_gc(gc)
        }
        None => UNIFORM_BG,
    };

    if let Some(threads) = args.threads {
        let threads = if threads == 0 {
            num_cpus::get()
        } else {
            threads
        };
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("Failed to configure thread pool")?;
    }

    // Load inputs
    info!("Parsing matrix file: {}", args.matrices.display());
    let motifs = parse_jaspar(&args.matrices, background_freqs)?;

    let clusters = match &args.clusters {
        Some(path) => {
            info!("Parsing cluster file: {}", path.display());
            parse_clusters(path)?
        }
        None => Vec::new(),
    };

    info!("Parsing target FASTA: {}", args.target.display());
    let target = parse_fasta(&args.target)?;
    info!("Parsing background FASTA: {}", args.background.display());
    let background = parse_fasta(&args.background)?;

    let mut config = AnalysisConfig::new(threshold, mode);
    config.target_length = args.target_length;
    config.bg_length = args.bg_length;

    // Run the analysis
    info!(
        "Running enrichment analysis: {} motifs, {} target / {} background sequences",
        motifs.len(),
        target.len(),
        background.len()
    );
    let output = run_analysis(&motifs, &clusters, &target, &background, &config)?;

    let params = SelectionParams {
        num_results: num_results.or({
            if args.zscore_cutoff.is_none() && args.fisher_cutoff.is_none() {
                Some(ResultCount::All)
            } else {
                None
            }
        }),
        zscore_cutoff: args.zscore_cutoff,
        fisher_cutoff: args.fisher_cutoff,
        sort_by,
        reverse: true,
    };
    let ranked = output.results.get_list(&params);

    info!("Writing results to: {}", args.output.display());
    write_results(&args.output, &ranked)?;

    if let Some(path) = &args.site_details {
        info!("Writing site details to: {}", path.display());
        write_site_details(path, &output.target_sites)?;
    }
    if let Some(path) = &args.pair_details {
        info!("Writing pair details to: {}", path.display());
        write_pair_details(path, &output.target_pairs)?;
    }

    info!("Done: {} results reported", ranked.len());
    Ok(())
}
