//! Arithmetic and geometric means over scalar observations.
//!
//! Both reducers return `None` for an empty input so callers can tell
//! "no data" apart from a legitimate zero-valued mean.

/// A geometric mean was requested over a value that is zero or negative.
#[derive(Debug, Clone, Copy, PartialEq, derive_more::Display, derive_more::Error)]
#[display("geometric mean requires strictly positive values, found {value} at index {index}")]
pub struct NonPositiveValue {
    /// Index of the offending value among the values being reduced.
    pub index: usize,
    /// The offending value.
    pub value: f64,
}

/// Computes the arithmetic mean of `values`.
///
/// # Returns
///
/// * `Some(mean)` - if `values` is not empty
/// * `None` - if `values` is empty
///
/// # Examples
///
/// ```
/// # use benchagg_stats::mean::mean;
/// assert_eq!(mean(&[2.0, 4.0, 9.0]), Some(5.0));
/// assert_eq!(mean(&[]), None);
/// ```
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Computes the geometric mean of `values`.
///
/// The mean is computed in log space (`exp(mean(ln x))`), which avoids
/// overflowing the running product for long inputs.
///
/// # Returns
///
/// * `Ok(Some(mean))` - if `values` is not empty and strictly positive
/// * `Ok(None)` - if `values` is empty
///
/// # Errors
///
/// Returns [`NonPositiveValue`] for the first value that is `<= 0`.
///
/// # Examples
///
/// ```
/// # use benchagg_stats::mean::geometric_mean;
/// let g = geometric_mean(&[2.0, 8.0]).unwrap().unwrap();
/// assert!((g - 4.0).abs() < 1e-12);
/// assert_eq!(geometric_mean(&[]).unwrap(), None);
/// ```
pub fn geometric_mean(values: &[f64]) -> Result<Option<f64>, NonPositiveValue> {
    ensure_positive(values)?;
    let logs = values.iter().map(|v| v.ln()).collect::<Vec<_>>();
    Ok(mean(&logs).map(f64::exp))
}

pub(crate) fn ensure_positive(values: &[f64]) -> Result<(), NonPositiveValue> {
    // `!(v > 0.0)` also rejects NaN
    match values.iter().position(|v| !(*v > 0.0)) {
        Some(index) => Err(NonPositiveValue {
            index,
            value: values[index],
        }),
        None => Ok(()),
    }
}
