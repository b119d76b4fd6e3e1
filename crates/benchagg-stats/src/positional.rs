//! Positional means over ragged sequences.
//!
//! Inputs are variable-length sequences, such as the per-checkpoint
//! timestamps of repeated runs. The `i`-th output element is the mean of the
//! `i`-th element of every input sequence that has at least `i + 1`
//! elements. Sequences are aligned on their first element; a shorter sequence
//! simply stops contributing past its own length.
//!
//! ```text
//! [1, 2, 3]
//! [4, 5]
//! ---------
//! [2.5, 3.5, 3.0]
//! ```

use crate::mean::{NonPositiveValue, geometric_mean, mean};

/// Collects the `i`-th element of every sequence into bucket `i`.
///
/// The number of buckets equals the length of the longest sequence, and
/// every bucket holds at least one value.
///
/// # Examples
///
/// ```
/// # use benchagg_stats::positional::bucket_by_position;
/// let buckets = bucket_by_position(&[vec![1.0, 2.0], vec![3.0]]);
/// assert_eq!(buckets, vec![vec![1.0, 3.0], vec![2.0]]);
/// ```
#[must_use]
pub fn bucket_by_position<S>(sequences: &[S]) -> Vec<Vec<f64>>
where
    S: AsRef<[f64]>,
{
    let max_len = sequences
        .iter()
        .map(|s| s.as_ref().len())
        .max()
        .unwrap_or(0);
    let mut buckets = vec![Vec::with_capacity(sequences.len()); max_len];
    for sequence in sequences {
        for (bucket, value) in buckets.iter_mut().zip(sequence.as_ref()) {
            bucket.push(*value);
        }
    }
    buckets
}

/// Computes the per-position arithmetic mean of ragged sequences.
///
/// # Returns
///
/// * `Some(means)` - if at least one sequence is given
/// * `None` - if `sequences` is empty
///
/// # Examples
///
/// ```
/// # use benchagg_stats::positional::positional_mean;
/// assert_eq!(
///     positional_mean(&[vec![1.0, 2.0, 3.0], vec![4.0, 5.0]]),
///     Some(vec![2.5, 3.5, 3.0])
/// );
/// assert_eq!(positional_mean::<Vec<f64>>(&[]), None);
/// ```
#[must_use]
pub fn positional_mean<S>(sequences: &[S]) -> Option<Vec<f64>>
where
    S: AsRef<[f64]>,
{
    if sequences.is_empty() {
        return None;
    }
    let means = bucket_by_position(sequences)
        .iter()
        .filter_map(|bucket| mean(bucket))
        .collect();
    Some(means)
}

/// Computes the per-position geometric mean of ragged sequences.
///
/// # Errors
///
/// Returns [`NonPositiveValue`] if any value at any position is `<= 0`.
/// The reported index is the value's index within its position bucket.
pub fn positional_geometric_mean<S>(sequences: &[S]) -> Result<Option<Vec<f64>>, NonPositiveValue>
where
    S: AsRef<[f64]>,
{
    if sequences.is_empty() {
        return Ok(None);
    }
    let mut means = vec![];
    for bucket in bucket_by_position(sequences) {
        if let Some(m) = geometric_mean(&bucket)? {
            means.push(m);
        }
    }
    Ok(Some(means))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_all_close(actual: &[f64], expected: &[f64]) {
        assert_eq!(actual.len(), expected.len(), "{actual:?} vs {expected:?}");
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 1e-9, "{actual:?} vs {expected:?}");
        }
    }

    #[test]
    fn test_ragged_positional_mean() {
        let means = positional_mean(&[vec![1.0, 2.0, 3.0], vec![4.0, 5.0]]).unwrap();
        assert_all_close(&means, &[2.5, 3.5, 3.0]);
    }

    #[test]
    fn test_shorter_sequence_first() {
        let means = positional_mean(&[vec![10.0], vec![20.0, 40.0]]).unwrap();
        assert_all_close(&means, &[15.0, 40.0]);
    }

    #[test]
    fn test_empty_input_is_unavailable() {
        assert_eq!(positional_mean::<Vec<f64>>(&[]), None);
        assert_eq!(positional_geometric_mean::<Vec<f64>>(&[]), Ok(None));
    }

    #[test]
    fn test_all_sequences_empty() {
        let sequences: [Vec<f64>; 2] = [vec![], vec![]];
        assert_eq!(positional_mean(&sequences), Some(vec![]));
    }

    #[test]
    fn test_positional_geometric_mean() {
        let means = positional_geometric_mean(&[vec![1.0, 2.0], vec![4.0, 8.0], vec![16.0]])
            .unwrap()
            .unwrap();
        assert_all_close(&means, &[4.0, 4.0]);
    }

    #[test]
    fn test_positional_geometric_mean_rejects_zero() {
        let err = positional_geometric_mean(&[vec![1.0, 2.0], vec![3.0, 0.0]]).unwrap_err();
        assert_eq!(err.index, 1);
        assert_eq!(err.value, 0.0);
    }

    #[test]
    fn test_bucket_sizes_follow_raggedness() {
        let buckets = bucket_by_position(&[vec![1.0, 2.0, 3.0], vec![4.0], vec![5.0, 6.0]]);
        let sizes = buckets.iter().map(Vec::len).collect::<Vec<_>>();
        assert_eq!(sizes, vec![3, 2, 1]);
    }
}
