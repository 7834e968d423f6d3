//! Enrichment statistics: one-tailed Fisher exact test and rate Z-score.
//!
//! The Fisher p-value is computed entirely in log space (hypergeometric tail
//! via ln-binomials and log-sum-exp) and reported as -ln(p), so larger is
//! always more significant and near-zero p-values do not saturate.

use statrs::function::factorial::ln_factorial;

use crate::error::{EnrichError, Result};

/// ln C(n, k); -inf when k > n (an impossible draw).
fn ln_binomial(n: u64, k: u64) -> f64 {
    if k > n {
        return f64::NEG_INFINITY;
    }
    ln_factorial(n) - ln_factorial(k) - ln_factorial(n - k)
}

/// ln of the hypergeometric pmf: drawing `k` successes in `n` draws from a
/// population of `total` containing `successes`.
fn ln_hypergeom_pmf(k: u64, n: u64, successes: u64, total: u64) -> f64 {
    ln_binomial(successes, k) + ln_binomial(total - successes, n - k) - ln_binomial(total, n)
}

/// Numerically stable ln(sum(exp(terms))). -inf terms contribute nothing.
fn log_sum_exp(terms: &[f64]) -> f64 {
    let max = terms.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    if !max.is_finite() {
        return max;
    }
    max + terms.iter().map(|&t| (t - max).exp()).sum::<f64>().ln()
}

/// One-tailed Fisher exact test for enrichment on the 2x2 table
/// {target, background} x {>=1 hit, 0 hits}, returned as -ln(p).
///
/// Returns None only for an empty universe (all four cells zero); a TF with
/// zero hits in both sets over a non-empty universe gets p = 1, score 0.
pub fn fisher_score(t_hits: u64, t_non_hits: u64, b_hits: u64, b_non_hits: u64) -> Option<f64> {
    let total = t_hits + t_non_hits + b_hits + b_non_hits;
    if total == 0 {
        return None;
    }
    let draws = t_hits + t_non_hits;
    let successes = t_hits + b_hits;
    let k_max = draws.min(successes);

    // P[X >= t_hits]; the observed table itself is always a valid term.
    let terms: Vec<f64> = (t_hits..=k_max)
        .map(|k| ln_hypergeom_pmf(k, draws, successes, total))
        .collect();
    let ln_p = log_sum_exp(&terms);

    // Guard against floating error pushing p marginally above 1.
    Some((-ln_p).max(0.0))
}

/// Rate Z-score: pooled two-proportion z-test with a 0.5 continuity
/// correction on the count scale.
///
/// `t_hits`/`b_hits` are total hits (or covered nucleotides in cluster
/// mode); `t_len`/`b_len` the corresponding total sequence or
/// conserved-region lengths. Zero background hits with nonzero target hits
/// is a legitimate finite result; an all-zero pair is undefined (None);
/// zero lengths are a precondition failure.
pub fn z_score(t_hits: f64, t_len: f64, b_hits: f64, b_len: f64) -> Result<Option<f64>> {
    if t_len <= 0.0 {
        return Err(EnrichError::ZeroTotalLength("target"));
    }
    if b_len <= 0.0 {
        return Err(EnrichError::ZeroTotalLength("background"));
    }

    let bg_rate = b_hits / b_len;
    let pooled = (t_hits + b_hits) / (t_len + b_len);
    if pooled <= 0.0 || pooled >= 1.0 {
        return Ok(None);
    }

    let sd = (t_len * pooled * (1.0 - pooled)).sqrt();
    let expected = bg_rate * t_len;
    let z = (t_hits - expected - 0.5) / sd;
    if z.is_finite() {
        Ok(Some(z))
    } else {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fisher_known_value() {
        // N=10, K=5, n=5, P[X >= 5] = 1/C(10,5) = 1/252.
        let score = fisher_score(5, 0, 0, 5).unwrap();
        assert!((score - 252.0f64.ln()).abs() < 1e-9);
    }

    #[test]
    fn test_fisher_depleted_table_scores_zero() {
        // All successes in the background: P[X >= 0] = 1.
        let score = fisher_score(0, 5, 5, 0).unwrap();
        assert_eq!(score, 0.0);
    }

    #[test]
    fn test_fisher_no_hits_anywhere() {
        // Defined (p = 1), not N/A, over a non-empty universe.
        assert_eq!(fisher_score(0, 3, 0, 10), Some(0.0));
        // Empty universe is undefined.
        assert_eq!(fisher_score(0, 0, 0, 0), None);
    }

    #[test]
    fn test_fisher_monotone_in_enrichment() {
        // Totals fixed (13 target-side, 13 background-side sequences);
        // shifting hits from background to target never lowers the score.
        let s1 = fisher_score(1, 12, 5, 8).unwrap();
        let s2 = fisher_score(3, 10, 3, 10).unwrap();
        let s3 = fisher_score(5, 8, 1, 12).unwrap();
        assert!(s1 <= s2);
        assert!(s2 <= s3);
    }

    #[test]
    fn test_fisher_target_only_hits_positive() {
        let score = fisher_score(3, 0, 0, 10).unwrap();
        assert!(score > 0.0);
        assert!(score.is_finite());
    }

    #[test]
    fn test_fisher_extreme_counts_stay_finite() {
        // Large counts underflow a naive p-value; the log-space score must
        // stay finite.
        let score = fisher_score(500, 10, 10, 500).unwrap();
        assert!(score.is_finite());
        assert!(score > 100.0);
    }

    #[test]
    fn test_z_score_pinned_value() {
        // x=3 over 300 bp target, 0 over 1000 bp background:
        // pooled = 3/1300, sd = sqrt(300*p*(1-p)), z = (3 - 0 - 0.5)/sd.
        let z = z_score(3.0, 300.0, 0.0, 1000.0).unwrap().unwrap();
        assert!((z - 3.00811).abs() < 1e-4);
    }

    #[test]
    fn test_z_score_zero_background_is_finite_positive() {
        let z = z_score(5.0, 500.0, 0.0, 500.0).unwrap();
        let z = z.expect("zero background hits must still yield a value");
        assert!(z.is_finite());
        assert!(z > 0.0);
    }

    #[test]
    fn test_z_score_all_zero_is_undefined() {
        assert_eq!(z_score(0.0, 500.0, 0.0, 500.0).unwrap(), None);
    }

    #[test]
    fn test_z_score_zero_length_is_fatal() {
        assert!(z_score(1.0, 0.0, 1.0, 500.0).is_err());
        assert!(z_score(1.0, 500.0, 1.0, 0.0).is_err());
    }

    #[test]
    fn test_z_score_never_nan() {
        for &(x, lt, y, lb) in &[
            (0.0, 10.0, 0.0, 10.0),
            (10.0, 10.0, 10.0, 10.0),
            (1.0, 1e9, 0.0, 1e9),
            (1e6, 1e7, 1e6, 1e7),
        ] {
            match z_score(x, lt, y, lb).unwrap() {
                Some(z) => assert!(!z.is_nan()),
                None => {}
            }
        }
    }

    #[test]
    fn test_z_score_enrichment_sign() {
        let enriched = z_score(50.0, 1000.0, 10.0, 1000.0).unwrap().unwrap();
        let depleted = z_score(10.0, 1000.0, 50.0, 1000.0).unwrap().unwrap();
        assert!(enriched > 0.0);
        assert!(depleted < 0.0);
    }
}
