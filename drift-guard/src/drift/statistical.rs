//! Two-sample Kolmogorov–Smirnov test.
//!
//! The statistic is computed in integer lattice units: after sorting both
//! samples, `D * n1 * n2 = max |i * n2 - j * n1|` over the distinct values,
//! where `i` and `j` count the observations of each sample at or below the
//! value. Keeping it integral makes the exact p-value recursion free of
//! rounding on the boundary.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Largest sample size for which [`KsMethod::Auto`] uses the exact distribution.
pub const EXACT_MAX_SAMPLE: usize = 10_000;

/// How the p-value is derived from the statistic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KsMethod {
    /// Exact for samples up to [`EXACT_MAX_SAMPLE`], asymptotic above.
    #[default]
    Auto,
    Exact,
    Asymptotic,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KsTestResult {
    /// Maximum distance between the two empirical CDFs, in `[0, 1]`.
    pub statistic: f64,
    pub p_value: f64,
    /// Method actually used (never `Auto`).
    pub method: KsMethod,
}

/// Degenerate inputs the test cannot handle.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KsError {
    #[error("{which} sample is empty")]
    EmptySample { which: &'static str },

    #[error("column type {data_type} is not numeric")]
    NonNumeric { data_type: String },
}

/// Runs the two-sided two-sample KS test.
///
/// NaN values must be removed by the caller.
pub fn ks_2samp(a: &[f64], b: &[f64], method: KsMethod) -> Result<KsTestResult, KsError> {
    if a.is_empty() {
        return Err(KsError::EmptySample { which: "base" });
    }
    if b.is_empty() {
        return Err(KsError::EmptySample { which: "current" });
    }

    let mut x = a.to_vec();
    let mut y = b.to_vec();
    x.sort_by(f64::total_cmp);
    y.sort_by(f64::total_cmp);

    let (n1, n2) = (x.len(), y.len());
    let gap = max_lattice_gap(&x, &y);
    let statistic = gap as f64 / (n1 as f64 * n2 as f64);

    let method = match method {
        KsMethod::Auto if n1.max(n2) <= EXACT_MAX_SAMPLE => KsMethod::Exact,
        KsMethod::Auto => KsMethod::Asymptotic,
        other => other,
    };
    let p_value = match method {
        KsMethod::Exact => exact_p_value(n1, n2, gap),
        _ => asymptotic_p_value(n1, n2, statistic),
    };

    Ok(KsTestResult {
        statistic,
        p_value,
        method,
    })
}

/// `max |i * n2 - j * n1|` over the distinct values of two sorted samples.
fn max_lattice_gap(x: &[f64], y: &[f64]) -> u128 {
    let (n1, n2) = (x.len() as i128, y.len() as i128);
    let (mut i, mut j) = (0usize, 0usize);
    let mut best: u128 = 0;

    // Once either sample is exhausted the gap only shrinks.
    while i < x.len() && j < y.len() {
        let v = if x[i] <= y[j] { x[i] } else { y[j] };
        while i < x.len() && x[i] <= v {
            i += 1;
        }
        while j < y.len() && y[j] <= v {
            j += 1;
        }
        let gap = (i as i128 * n2 - j as i128 * n1).unsigned_abs();
        best = best.max(gap);
    }
    best
}

/// Exact two-sided p-value: the probability that a uniformly random
/// monotone lattice path from `(0, 0)` to `(n1, n2)` reaches a point with
/// `|i * n2 - j * n1| >= gap`.
///
/// The recursion tracks the probability of reaching each point while
/// staying strictly inside the band, so no binomial coefficients are formed
/// and large grids do not overflow.
fn exact_p_value(n1: usize, n2: usize, gap: u128) -> f64 {
    if gap == 0 {
        return 1.0;
    }
    let inside = |i: usize, j: usize| -> bool {
        ((i as i128) * (n2 as i128) - (j as i128) * (n1 as i128)).unsigned_abs() < gap
    };

    // row[j] holds P(reach (i, j) inside the band) for the current i.
    let mut row = vec![0.0f64; n2 + 1];
    row[0] = 1.0;
    for j in 1..=n2 {
        row[j] = if inside(0, j) {
            let remaining = (n1 + n2 - j + 1) as f64;
            row[j - 1] * (n2 - j + 1) as f64 / remaining
        } else {
            0.0
        };
    }

    for i in 1..=n1 {
        let from_left = |prev: f64, j: usize| -> f64 {
            let remaining = (n1 - i + 1 + n2 - j) as f64;
            prev * (n1 - i + 1) as f64 / remaining
        };
        row[0] = if inside(i, 0) { from_left(row[0], 0) } else { 0.0 };
        for j in 1..=n2 {
            row[j] = if inside(i, j) {
                let below = row[j - 1] * (n2 - j + 1) as f64 / (n1 - i + n2 - j + 1) as f64;
                from_left(row[j], j) + below
            } else {
                0.0
            };
        }
    }

    (1.0 - row[n2]).clamp(0.0, 1.0)
}

/// Asymptotic two-sided p-value from the Kolmogorov distribution, with
/// Stephens' finite-sample correction to the scaled statistic.
fn asymptotic_p_value(n1: usize, n2: usize, statistic: f64) -> f64 {
    let en = ((n1 as f64 * n2 as f64) / (n1 + n2) as f64).sqrt();
    let lambda = (en + 0.12 + 0.11 / en) * statistic;
    kolmogorov_survival(lambda)
}

/// `P(K > lambda)` for the Kolmogorov distribution.
pub fn kolmogorov_survival(lambda: f64) -> f64 {
    if lambda <= 0.0 {
        return 1.0;
    }
    if lambda < 1.18 {
        // Jacobi theta form converges fast for small lambda.
        let y = (-std::f64::consts::PI.powi(2) / (8.0 * lambda * lambda)).exp();
        let cdf = (2.0 * std::f64::consts::PI).sqrt() / lambda
            * (y + y.powi(9) + y.powi(25) + y.powi(49));
        (1.0 - cdf).clamp(0.0, 1.0)
    } else {
        let x = (-2.0 * lambda * lambda).exp();
        (2.0 * (x - x.powi(4) + x.powi(9) - x.powi(16))).clamp(0.0, 1.0)
    }
}
