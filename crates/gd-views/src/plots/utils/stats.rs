//! Statistical utilities for plots

use statrs::statistics::Statistics;

/// Pearson correlation of two equally long samples.
///
/// `None` when the coefficient is undefined: fewer than two pairs or a
/// sample without variance. Rounding can push the ratio slightly past ±1,
/// so the result is clamped.
pub fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }

    let sx = x.std_dev();
    let sy = y.std_dev();
    if !(sx > 0.0 && sy > 0.0) {
        return None;
    }

    let r = x.covariance(y) / (sx * sy);
    r.is_finite().then(|| r.clamp(-1.0, 1.0))
}

/// Keep only positions where both samples have a value
pub fn pairwise_complete(x: &[Option<f64>], y: &[Option<f64>]) -> (Vec<f64>, Vec<f64>) {
    x.iter()
        .zip(y)
        .filter_map(|(a, b)| match (a, b) {
            (Some(a), Some(b)) if a.is_finite() && b.is_finite() => Some((*a, *b)),
            _ => None,
        })
        .unzip()
}

/// Smallest and largest finite value
pub fn finite_range(values: impl IntoIterator<Item = f64>) -> Option<(f64, f64)> {
    values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold(None, |range, v| match range {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}
