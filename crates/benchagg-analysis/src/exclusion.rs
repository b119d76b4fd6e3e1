//! Per-run exclusion predicates
//!
//! An [`Exclusion`] decides, for each member of a group, whether it takes
//! part in a reduction. It is evaluated on the whole record and its position
//! within the group, before the target field is extracted.
//!
//! | Variant          | Excludes                                      |
//! |------------------|-----------------------------------------------|
//! | `KeepAll`        | nothing                                       |
//! | `NonRefinement`  | runs with empty refinement metadata           |
//! | `Refinement`     | runs with non-empty refinement metadata       |
//! | `ErrorRuns`      | runs carrying an error marker                 |
//! | `Masked`         | runs flagged by a cross-file error mask       |
//!
//! `NonRefinement` and `Refinement` carry an `exclude_errors` flag: when set,
//! an errored run is excluded regardless of its refinement metadata.

use crate::{consistency::MaskExclusion, error::AnalysisError, record::Record};

#[derive(Debug, Clone, Default, PartialEq)]
pub enum Exclusion {
    #[default]
    KeepAll,
    /// Keeps only refinement runs.
    NonRefinement { exclude_errors: bool },
    /// Keeps only non-refinement runs.
    Refinement { exclude_errors: bool },
    /// Keeps only successful runs.
    ErrorRuns,
    /// Keeps only runs that succeeded in every compared file.
    Masked(MaskExclusion),
}

impl Exclusion {
    /// Whether the record at `position` of its group is dropped.
    ///
    /// # Errors
    ///
    /// Fails if the record lacks the fields the predicate inspects.
    pub fn exclude(&self, record: &Record, position: usize) -> Result<bool, AnalysisError> {
        match self {
            Exclusion::KeepAll => Ok(false),
            Exclusion::NonRefinement { exclude_errors } => {
                if *exclude_errors && record.has_error() {
                    return Ok(true);
                }
                Ok(record.refinement_metadata()?.is_empty())
            }
            Exclusion::Refinement { exclude_errors } => {
                if *exclude_errors && record.has_error() {
                    return Ok(true);
                }
                Ok(!record.refinement_metadata()?.is_empty())
            }
            Exclusion::ErrorRuns => Ok(record.has_error()),
            Exclusion::Masked(mask) => mask.excludes(record, position),
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use serde_json::{Value, json};

    use super::*;

    fn run(metadata: Value, error: bool) -> Record {
        let mut value = json!({
            "sequenceElement": {"template": "q", "refinementMetadata": metadata},
            "time": 10.0,
        });
        if error {
            value["error"] = json!("timeout");
        }
        Record::try_from(value).unwrap()
    }

    #[test]
    fn test_keep_all() {
        assert!(!Exclusion::KeepAll.exclude(&run(json!({}), true), 0).unwrap());
        assert_eq!(Exclusion::default(), Exclusion::KeepAll);
    }

    #[test]
    fn test_refinement_predicates() {
        let plain = run(json!({}), false);
        let refined = run(json!({"pattern": "p"}), false);

        let non_refinement = Exclusion::NonRefinement {
            exclude_errors: false,
        };
        let refinement = Exclusion::Refinement {
            exclude_errors: false,
        };
        assert!(non_refinement.exclude(&plain, 0).unwrap());
        assert!(!non_refinement.exclude(&refined, 0).unwrap());
        assert!(!refinement.exclude(&plain, 0).unwrap());
        assert!(refinement.exclude(&refined, 0).unwrap());
    }

    #[test]
    fn test_exclude_errors_short_circuits() {
        let errored_refined = run(json!({"pattern": "p"}), true);
        let errored_plain = run(json!({}), true);
        let keep_refined = Exclusion::NonRefinement {
            exclude_errors: true,
        };
        let keep_plain = Exclusion::Refinement {
            exclude_errors: true,
        };
        assert!(keep_refined.exclude(&errored_refined, 0).unwrap());
        assert!(keep_plain.exclude(&errored_plain, 0).unwrap());

        // without the flag the error marker is ignored
        let keep_refined = Exclusion::NonRefinement {
            exclude_errors: false,
        };
        assert!(!keep_refined.exclude(&errored_refined, 0).unwrap());
    }

    #[test]
    fn test_short_circuit_skips_metadata_lookup() {
        let record = Record::try_from(json!({"error": "boom"})).unwrap();
        let exclusion = Exclusion::Refinement {
            exclude_errors: true,
        };
        assert!(exclusion.exclude(&record, 0).unwrap());
    }

    #[test]
    fn test_error_runs() {
        assert!(Exclusion::ErrorRuns.exclude(&run(json!({}), true), 3).unwrap());
        assert!(!Exclusion::ErrorRuns.exclude(&run(json!({}), false), 3).unwrap());
    }

    #[test]
    fn test_missing_metadata_is_an_error() {
        let record = Record::try_from(json!({"sequenceElement": {"template": "q"}})).unwrap();
        let exclusion = Exclusion::NonRefinement {
            exclude_errors: false,
        };
        assert!(matches!(
            exclusion.exclude(&record, 0),
            Err(AnalysisError::KeyNotFound { .. })
        ));
    }

    proptest! {
        #[test]
        fn prop_refinement_predicates_are_complementary(
            keys in proptest::collection::vec("[a-z]{1,6}", 0..4),
            error in any::<bool>(),
            position in 0usize..32,
        ) {
            let metadata = keys
                .into_iter()
                .map(|k| (k, json!(1)))
                .collect::<serde_json::Map<_, _>>();
            let record = run(Value::Object(metadata), error);
            let refinement = Exclusion::Refinement { exclude_errors: false };
            let non_refinement = Exclusion::NonRefinement { exclude_errors: false };
            prop_assert_ne!(
                refinement.exclude(&record, position).unwrap(),
                non_refinement.exclude(&record, position).unwrap()
            );
        }
    }
}
