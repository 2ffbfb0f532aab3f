//! Statistical utility functions shared by the metric calculators.
//!
//! The estimators are deliberately explicit about their denominator: rolling
//! CAGR dispersion uses the population form, monthly-return volatility and
//! covariance use the sample (N-1) form.

/// Minimum threshold for a standard deviation or variance to be treated as non-zero.
pub const MIN_STD_THRESHOLD: f64 = 1e-12;

/// Arithmetic mean, `None` for an empty slice.
///
/// # Examples
///
/// ```
/// use navrank_traits::stats::mean;
///
/// assert_eq!(mean(&[1.0, 2.0, 3.0]), Some(2.0));
/// assert_eq!(mean(&[]), None);
/// ```
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population standard deviation (N denominator), `None` for an empty slice.
pub fn population_std(values: &[f64]) -> Option<f64> {
    let m = mean(values)?;
    let variance = values.iter().map(|x| (x - m).powi(2)).sum::<f64>() / values.len() as f64;
    Some(variance.sqrt())
}

/// Sample standard deviation (N-1 denominator), `None` with fewer than two values.
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let variance = values.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    Some(variance.sqrt())
}

/// Sample covariance and the sample variance of `y` for paired observations.
///
/// Returns `(cov(x, y), var(y))`, or `None` with fewer than two pairs.
pub fn sample_covariance(pairs: &[(f64, f64)]) -> Option<(f64, f64)> {
    if pairs.len() < 2 {
        return None;
    }
    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;

    let (mut cov, mut var_y) = (0.0, 0.0);
    for (x, y) in pairs {
        cov += (x - mean_x) * (y - mean_y);
        var_y += (y - mean_y).powi(2);
    }
    Some((cov / (n - 1.0), var_y / (n - 1.0)))
}

/// Annualize a return realised over `elapsed_days` calendar days.
///
/// Uses a 365.25-day year. Callers must ensure `elapsed_days > 0` and a
/// positive `start` price.
pub fn annualized_return(start: f64, end: f64, elapsed_days: i64) -> f64 {
    (end / start).powf(365.25 / elapsed_days as f64) - 1.0
}
