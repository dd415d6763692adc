//! Series statistics

/// Arithmetic mean; NaN for an empty slice
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample covariance with an `n - 1` denominator
///
/// Both slices must have the same length. NaN below two samples.
pub fn covariance(a: &[f64], b: &[f64]) -> f64 {
    let n = a.len().min(b.len());
    if n < 2 {
        return f64::NAN;
    }
    let (a, b) = (&a[..n], &b[..n]);
    let mean_a = mean(a);
    let mean_b = mean(b);
    let sum: f64 = a
        .iter()
        .zip(b)
        .map(|(x, y)| (x - mean_a) * (y - mean_b))
        .sum();
    sum / (n - 1) as f64
}

/// Sample variance with an `n - 1` denominator
pub fn variance(values: &[f64]) -> f64 {
    covariance(values, values)
}

/// Subtract the mean
pub fn detrend(values: &[f64]) -> Vec<f64> {
    let m = mean(values);
    values.iter().map(|v| v - m).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_covariance_matches_sample_definition() {
        let a = [1.0, 2.0, 3.0, 4.0];
        let b = [2.0, 4.0, 6.0, 8.0];
        // var(a) = 5/3, cov(a, 2a) = 10/3
        assert!((variance(&a) - 5.0 / 3.0).abs() < 1e-12);
        assert!((covariance(&a, &b) - 10.0 / 3.0).abs() < 1e-12);
        assert!(covariance(&[1.0], &[1.0]).is_nan());
    }

    #[test]
    fn test_detrend_zero_mean() {
        let d = detrend(&[3.0, 5.0, 10.0]);
        assert!(mean(&d).abs() < 1e-12);
        assert_eq!(d[0], -3.0);
    }
}
