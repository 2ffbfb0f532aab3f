//! Min-max normalization of metric columns.

use ndarray::Array1;

/// Value assigned to every element of a degenerate column.
pub const NEUTRAL_SCORE: f64 = 0.5;

/// One metric column of a scoring batch.
#[derive(Debug, Clone)]
pub struct MetricColumn {
    /// Metric name (for debugging)
    pub name: &'static str,

    /// Raw values, one per fund, in batch order
    pub values: Array1<f64>,

    /// Whether a lower raw value is better
    pub invert: bool,
}

impl MetricColumn {
    /// Normalize this column to [0, 1].
    pub fn normalized(&self) -> Array1<f64> {
        normalize(&self.values, self.invert)
    }
}

/// Min-max scale `column` to [0, 1], flipping the scale when `invert` is set.
///
/// When max equals min (a single fund, or all values equal) every element maps
/// to [`NEUTRAL_SCORE`]. Non-finite entries are ignored for the bounds and also
/// map to the neutral score.
///
/// # Examples
///
/// ```rust
/// use navrank_combine::normalize;
/// use ndarray::array;
///
/// let scaled = normalize(&array![1.0, 2.0, 3.0], false);
/// assert_eq!(scaled, array![0.0, 0.5, 1.0]);
///
/// let inverted = normalize(&array![1.0, 2.0, 3.0], true);
/// assert_eq!(inverted, array![1.0, 0.5, 0.0]);
/// ```
pub fn normalize(column: &Array1<f64>, invert: bool) -> Array1<f64> {
    let finite = column.iter().copied().filter(|v| v.is_finite());
    let (min, max) = finite.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });

    if max <= min {
        return Array1::from_elem(column.len(), NEUTRAL_SCORE);
    }

    let range = max - min;
    column.mapv(|v| {
        if !v.is_finite() {
            return NEUTRAL_SCORE;
        }
        let scaled = (v - min) / range;
        if invert { 1.0 - scaled } else { scaled }
    })
}
