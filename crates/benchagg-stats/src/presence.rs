//! Counting non-missing observations.
//!
//! Used for error accounting: the `error` field of a run is present only when
//! the run failed, so counting present entries counts failures.

/// Counts the entries of `observations` that are `Some`.
///
/// # Examples
///
/// ```
/// # use benchagg_stats::presence::count_present;
/// assert_eq!(count_present(&[Some(1), None, Some(3)]), 2);
/// ```
#[must_use]
pub fn count_present<T>(observations: &[Option<T>]) -> usize {
    observations.iter().filter(|o| o.is_some()).count()
}

/// Computes the fraction of entries of `observations` that are `Some`.
///
/// # Returns
///
/// * `Some(fraction)` - in `0.0..=1.0`, if `observations` is not empty
/// * `None` - if `observations` is empty
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn proportion_present<T>(observations: &[Option<T>]) -> Option<f64> {
    if observations.is_empty() {
        return None;
    }
    Some(count_present(observations) as f64 / observations.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_none_only() {
        assert_eq!(count_present::<u8>(&[None, None]), 0);
        assert_eq!(proportion_present::<u8>(&[None, None]), Some(0.0));
    }

    #[test]
    fn test_count_all_present() {
        assert_eq!(count_present(&[Some('a'), Some('b')]), 2);
        assert_eq!(proportion_present(&[Some('a'), Some('b')]), Some(1.0));
    }

    #[test]
    fn test_proportion_of_empty_is_unavailable() {
        assert_eq!(proportion_present::<u8>(&[]), None);
        assert_eq!(count_present::<u8>(&[]), 0);
    }

    #[test]
    fn test_proportion_mixed() {
        let obs = [Some(0), None, None, Some(0)];
        assert_eq!(proportion_present(&obs), Some(0.5));
    }
}
