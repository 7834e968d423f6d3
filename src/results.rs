//! Combined enrichment results and the result selector.

use std::cmp::Ordering;

/// Sort key for the combined result list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    ZScore,
    Fisher,
}

impl SortKey {
    /// Parse sort key from a string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "zscore" | "z-score" | "z" => Some(SortKey::ZScore),
            "fisher" | "fisher_score" | "f" => Some(SortKey::Fisher),
            _ => None,
        }
    }
}

/// How many rows the selector returns: all of them, or the top N of the
/// sorted list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultCount {
    All,
    Top(usize),
}

impl ResultCount {
    /// Parse a count, accepting the literal sentinel "All".
    pub fn from_str(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("all") {
            return Some(ResultCount::All);
        }
        s.parse::<usize>().ok().map(ResultCount::Top)
    }
}

/// Selection parameters for [`CombinedResultSet::get_list`].
///
/// Exactly one of `num_results` / the cutoff pair applies per call; callers
/// enforce this by construction.
#[derive(Debug, Clone)]
pub struct SelectionParams {
    pub num_results: Option<ResultCount>,
    pub zscore_cutoff: Option<f64>,
    pub fisher_cutoff: Option<f64>,
    pub sort_by: SortKey,
    /// Descending when true. Both scores are defined so that larger is more
    /// significant, so callers always pass true.
    pub reverse: bool,
}

impl Default for SelectionParams {
    fn default() -> Self {
        SelectionParams {
            num_results: Some(ResultCount::All),
            zscore_cutoff: None,
            fisher_cutoff: None,
            sort_by: SortKey::ZScore,
            reverse: true,
        }
    }
}

/// Per-TF/cluster enrichment outcome. `None` scores render as "N/A"; rows
/// are never dropped for being undefined.
#[derive(Debug, Clone)]
pub struct EnrichmentResult {
    pub id: String,
    pub name: String,
    /// Target sequences with at least one hit.
    pub t_seq_hits: u64,
    /// Target sequences with no hit.
    pub t_seq_non_hits: u64,
    pub bg_seq_hits: u64,
    pub bg_seq_non_hits: u64,
    /// Total TFBS hits in the target set.
    pub t_hits: u64,
    pub bg_hits: u64,
    /// Hits (or covered nucleotides, cluster mode) per unit length.
    pub t_rate: Option<f64>,
    pub bg_rate: Option<f64>,
    pub zscore: Option<f64>,
    pub fisher_score: Option<f64>,
}

impl EnrichmentResult {
    fn sort_value(&self, key: SortKey) -> Option<f64> {
        match key {
            SortKey::ZScore => self.zscore,
            SortKey::Fisher => self.fisher_score,
        }
    }
}

/// The ordered collection of per-TF results produced by one analysis run.
#[derive(Debug, Clone, Default)]
pub struct CombinedResultSet {
    results: Vec<EnrichmentResult>,
}

impl CombinedResultSet {
    pub fn new(results: Vec<EnrichmentResult>) -> Self {
        CombinedResultSet { results }
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EnrichmentResult> {
        self.results.iter()
    }

    pub fn get(&self, id: &str) -> Option<&EnrichmentResult> {
        self.results.iter().find(|r| r.id == id)
    }

    /// Filter and sort the result list.
    ///
    /// Cutoff filters are inclusive (>=); a row whose filtered score is
    /// undefined cannot satisfy a cutoff. Sorting is stable; rows whose sort
    /// key is undefined order after all defined rows. `ResultCount::All`
    /// never truncates.
    pub fn get_list(&self, params: &SelectionParams) -> Vec<EnrichmentResult> {
        let mut selected: Vec<EnrichmentResult> = self
            .results
            .iter()
            .filter(|r| {
                if let Some(cutoff) = params.zscore_cutoff {
                    if !r.zscore.map_or(false, |z| z >= cutoff) {
                        return false;
                    }
                }
                if let Some(cutoff) = params.fisher_cutoff {
                    if !r.fisher_score.map_or(false, |f| f >= cutoff) {
                        return false;
                    }
                }
                true
            })
            .cloned()
            .collect();

        selected.sort_by(|a, b| {
            let ord = cmp_optional(a.sort_value(params.sort_by), b.sort_value(params.sort_by));
            if params.reverse {
                ord.reverse()
            } else {
                ord
            }
        });

        if let Some(ResultCount::Top(n)) = params.num_results {
            selected.truncate(n);
        }

        selected
    }
}

/// Order Option scores with None below every defined value, so undefined
/// rows land at the end of a descending sort.
fn cmp_optional(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => Ordering::Equal,
    }
}
