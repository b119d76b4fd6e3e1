//! Cross-file consistency filtering
//!
//! When the same benchmark sequence is run under several configurations
//! (one results file each), a run may fail in one configuration and succeed
//! in another. Comparing mean times over each file's own successful runs
//! would then compare different sets of runs.
//!
//! This module aligns runs across files by (template, position within the
//! template group):
//!
//! 1. [`error_mask`] records, per file, which positions errored.
//! 2. [`merge_error_masks`] ORs the per-file masks together.
//! 3. [`MaskExclusion`] wraps the merged mask as an exclusion predicate, so a
//!    second aggregation pass only uses runs that succeeded in every file.
//!
//! ```text
//! file A   q1: [0, 1, 0]
//! file B   q1: [0, 0, 1]
//! merged   q1: [0, 1, 1]   -> only run 0 of q1 is compared
//! ```

use crate::{
    error::AnalysisError,
    group::{GroupKey, GroupMap},
    record::{FieldPath, Record},
};

/// Per group, per position: whether the run at that position errored.
pub type ErrorMask = GroupMap<Vec<bool>>;

/// Builds the error mask of one file's template groups.
#[must_use]
pub fn error_mask(groups: &GroupMap<Vec<Record>>) -> ErrorMask {
    groups.map_values(|_, members| members.iter().map(Record::has_error).collect())
}

/// Merges error masks with a positional logical OR.
///
/// The result flags a position if any input mask flags it. Merging is
/// idempotent and commutative; an empty slice merges to an empty mask.
///
/// # Errors
///
/// Returns [`AnalysisError::MaskMismatch`] if the masks do not share the
/// same key set, or if the lists of one key differ in length.
pub fn merge_error_masks(masks: &[ErrorMask]) -> Result<ErrorMask, AnalysisError> {
    let Some((first, rest)) = masks.split_first() else {
        return Ok(ErrorMask::new());
    };
    rest.iter()
        .enumerate()
        .try_fold(first.clone(), |merged, (i, mask)| {
            merge_pair(&merged, mask, i + 1)
        })
}

fn merge_pair(
    merged: &ErrorMask,
    mask: &ErrorMask,
    mask_index: usize,
) -> Result<ErrorMask, AnalysisError> {
    if merged.len() != mask.len() {
        return Err(AnalysisError::MaskMismatch {
            reason: format!(
                "mask #{mask_index} has {} groups, expected {}",
                mask.len(),
                merged.len()
            ),
        });
    }
    merged.try_map_values(|key, flags| {
        let other = mask.get(key).ok_or_else(|| AnalysisError::MaskMismatch {
            reason: format!("group '{key}' is missing from mask #{mask_index}"),
        })?;
        if other.len() != flags.len() {
            return Err(AnalysisError::MaskMismatch {
                reason: format!(
                    "group '{key}' has {} runs in mask #{mask_index}, expected {}",
                    other.len(),
                    flags.len()
                ),
            });
        }
        Ok(flags.iter().zip(other).map(|(a, b)| *a || *b).collect())
    })
}

/// Excludes the runs flagged by a (merged) error mask.
#[derive(Debug, Clone, PartialEq)]
pub struct MaskExclusion {
    key_path: FieldPath,
    mask: ErrorMask,
}

impl MaskExclusion {
    /// `key_path` must be the path the masked groups were keyed by.
    #[must_use]
    pub fn new(key_path: FieldPath, mask: ErrorMask) -> Self {
        Self { key_path, mask }
    }

    #[must_use]
    pub fn mask(&self) -> &ErrorMask {
        &self.mask
    }

    /// Whether the run at `position` of the record's group is flagged.
    ///
    /// # Errors
    ///
    /// Fails if the record's key cannot be resolved, or if the key or the
    /// position is not covered by the mask.
    pub fn excludes(&self, record: &Record, position: usize) -> Result<bool, AnalysisError> {
        let key = GroupKey::from_record(record, &self.key_path)?;
        let flags = self
            .mask
            .get(&key)
            .ok_or_else(|| AnalysisError::MaskMismatch {
                reason: format!("group '{key}' is not covered by the mask"),
            })?;
        flags
            .get(position)
            .copied()
            .ok_or_else(|| AnalysisError::MaskMismatch {
                reason: format!(
                    "run #{position} of group '{key}' is beyond the {} masked runs",
                    flags.len()
                ),
            })
    }
}
