//! Time-lag cross-covariance search

use contracts::CrossCovarianceCurve;

use crate::stats::covariance;

/// Align `w'` and `c'` at `lag` samples
///
/// A positive lag drops the first `lag` values of `w'` and the last `lag`
/// values of `c'`; a negative lag mirrors that.
pub fn align<'a>(w: &'a [f64], c: &'a [f64], lag: i64) -> (&'a [f64], &'a [f64]) {
    let n = w.len().min(c.len());
    let shift = (lag.unsigned_abs() as usize).min(n);
    if lag > 0 {
        (&w[shift..n], &c[..n - shift])
    } else if lag < 0 {
        (&w[..n - shift], &c[shift..n])
    } else {
        (&w[..n], &c[..n])
    }
}

/// Covariance of `w'` and `c'` for every lag in `-half_width..=half_width`, times `conversion`
pub fn cross_covariance_curve(
    w: &[f64],
    c: &[f64],
    half_width: usize,
    conversion: f64,
) -> CrossCovarianceCurve {
    let n = half_width as i64;
    let covariances = (-n..=n)
        .map(|lag| {
            let (w, c) = align(w, c, lag);
            covariance(w, c) * conversion
        })
        .collect();
    // 2N + 1 values by construction
    CrossCovarianceCurve::new(half_width, covariances)
        .unwrap_or_else(|| unreachable!("lag range always yields 2N + 1 points"))
}
