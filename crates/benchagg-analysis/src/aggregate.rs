//! The aggregation driver
//!
//! Grouping, exclusion and reduction are kept independent: [`aggregate`]
//! takes any combination of target field, [`Reducer`] and [`Exclusion`] and
//! applies it to every group. Each analysis variant (refinement-only mean
//! time, error count without refinement runs, ...) is one call with a
//! different triple, see [`report`](crate::report).

use crate::{
    error::AnalysisError,
    exclusion::Exclusion,
    group::GroupMap,
    reducer::{Reducer, Summary},
    record::Record,
};

/// Reduces `field` over every group, skipping excluded members.
///
/// For each group, members are visited in order with their position. A
/// member excluded by `exclusion` contributes nothing; a retained member
/// contributes the value of `field` (top-level lookup), or `None` if the
/// field is absent.
///
/// # Errors
///
/// The first error raised by the exclusion or the reducer aborts the whole
/// call.
///
/// # Examples
///
/// ```
/// use benchagg_analysis::{
///     aggregate::aggregate,
///     exclusion::Exclusion,
///     group::{GroupKey, group_records},
///     reducer::{Reducer, Summary},
///     record::{FieldPath, Record},
/// };
/// use serde_json::json;
///
/// let records = [
///     json!({"t": "q1", "time": 10}),
///     json!({"t": "q1", "time": 30, "error": "late"}),
///     json!({"t": "q2"}),
/// ]
/// .into_iter()
/// .map(Record::try_from)
/// .collect::<Result<Vec<_>, _>>()
/// .unwrap();
/// let groups = group_records(&records, &FieldPath::new(["t"])).unwrap();
///
/// let all = aggregate(&groups, "time", Reducer::Mean, &Exclusion::KeepAll).unwrap();
/// assert_eq!(all.get(&GroupKey::from("q1")), Some(&Summary::Scalar(Some(20.0))));
/// assert_eq!(all.get(&GroupKey::from("q2")), Some(&Summary::Scalar(None)));
///
/// let ok = aggregate(&groups, "time", Reducer::Mean, &Exclusion::ErrorRuns).unwrap();
/// assert_eq!(ok.get(&GroupKey::from("q1")), Some(&Summary::Scalar(Some(10.0))));
/// ```
pub fn aggregate(
    groups: &GroupMap<Vec<Record>>,
    field: &str,
    reducer: Reducer,
    exclusion: &Exclusion,
) -> Result<GroupMap<Summary>, AnalysisError> {
    let summaries = groups.try_map_values(|_, members| {
        let mut selected = Vec::with_capacity(members.len());
        for (position, record) in members.iter().enumerate() {
            if exclusion.exclude(record, position)? {
                continue;
            }
            selected.push(record.get(field));
        }
        reducer.reduce(&selected, field)
    })?;
    tracing::trace!(field, ?reducer, groups = summaries.len(), "aggregated");
    Ok(summaries)
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;
    use crate::{
        consistency::MaskExclusion,
        group::{GroupKey, group_records},
        record::FieldPath,
    };

    fn groups(values: Vec<Value>) -> GroupMap<Vec<Record>> {
        let records = values
            .into_iter()
            .map(|v| Record::try_from(v).unwrap())
            .collect::<Vec<_>>();
        group_records(&records, &FieldPath::template()).unwrap()
    }

    fn run(template: &str, refined: bool, fields: Value) -> Value {
        let metadata = if refined {
            json!({"pattern": "p"})
        } else {
            json!({})
        };
        let mut value = json!({
            "sequenceElement": {"template": template, "refinementMetadata": metadata},
        });
        for (k, v) in fields.as_object().unwrap() {
            value[k] = v.clone();
        }
        value
    }

    fn scalar(map: &GroupMap<Summary>, key: &str) -> Option<f64> {
        map.get(&GroupKey::from(key)).and_then(Summary::value)
    }

    #[test]
    fn test_keep_all_uses_every_record() {
        let g = groups(
            (0..5)
                .map(|i| run("q", i % 2 == 0, json!({"error": i})))
                .collect(),
        );
        let counts = aggregate(&g, "error", Reducer::CountPresent, &Exclusion::KeepAll).unwrap();
        assert_eq!(counts.get(&"q".into()), Some(&Summary::Count(5)));
    }

    #[test]
    fn test_refinement_split() {
        let g = groups(vec![
            run("q", true, json!({"time": 10})),
            run("q", false, json!({"time": 20})),
            run("q", true, json!({"time": 30})),
        ]);
        let refinement_only = aggregate(
            &g,
            "time",
            Reducer::Mean,
            &Exclusion::NonRefinement {
                exclude_errors: false,
            },
        )
        .unwrap();
        let no_refinement = aggregate(
            &g,
            "time",
            Reducer::Mean,
            &Exclusion::Refinement {
                exclude_errors: false,
            },
        )
        .unwrap();
        assert_eq!(scalar(&refinement_only, "q"), Some(20.0));
        assert_eq!(scalar(&no_refinement, "q"), Some(20.0));

        let g = groups(vec![
            run("q", true, json!({"time": 10})),
            run("q", false, json!({"time": 40})),
        ]);
        let no_refinement = aggregate(
            &g,
            "time",
            Reducer::Mean,
            &Exclusion::Refinement {
                exclude_errors: false,
            },
        )
        .unwrap();
        assert_eq!(scalar(&no_refinement, "q"), Some(40.0));
    }

    #[test]
    fn test_fully_excluded_group_is_unavailable() {
        let g = groups(vec![run("q", false, json!({"time": 1, "error": "x"}))]);
        let means = aggregate(&g, "time", Reducer::Mean, &Exclusion::ErrorRuns).unwrap();
        assert_eq!(means.get(&"q".into()), Some(&Summary::Scalar(None)));
        assert_eq!(means.get(&"q".into()).unwrap().value_or_sentinel(), -1.0);
    }

    #[test]
    fn test_excluded_records_never_reach_the_reducer() {
        // the errored run's "time" is not numeric and would fail the reducer
        let g = groups(vec![
            run("q", false, json!({"time": 5})),
            run("q", false, json!({"time": "n/a", "error": "x"})),
        ]);
        let means = aggregate(&g, "time", Reducer::GeometricMean, &Exclusion::ErrorRuns).unwrap();
        // computed in log space
        let geomean = scalar(&means, "q").unwrap();
        assert!((geomean - 5.0).abs() < 1e-9, "{geomean}");
        assert!(aggregate(&g, "time", Reducer::Mean, &Exclusion::KeepAll).is_err());
    }

    #[test]
    fn test_missing_field_is_passed_as_none() {
        let g = groups(vec![
            run("q", false, json!({"error": "x"})),
            run("q", false, json!({})),
            run("q", false, json!({})),
            run("q", false, json!({})),
        ]);
        let proportion =
            aggregate(&g, "error", Reducer::ProportionPresent, &Exclusion::KeepAll).unwrap();
        assert_eq!(scalar(&proportion, "q"), Some(0.25));
    }

    #[test]
    fn test_positional_timestamps() {
        let g = groups(vec![
            run("q", false, json!({"timestamps": [1, 2, 3]})),
            run("q", false, json!({"timestamps": [4, 5]})),
        ]);
        let means = aggregate(&g, "timestamps", Reducer::PositionalMean, &Exclusion::KeepAll).unwrap();
        assert_eq!(
            means.get(&"q".into()).unwrap().positions(),
            Some(&[2.5, 3.5, 3.0][..])
        );
    }

    #[test]
    fn test_mask_uses_position_within_group() {
        let g = groups(vec![
            run("a", false, json!({"time": 1})),
            run("b", false, json!({"time": 100})),
            run("a", false, json!({"time": 3})),
        ]);
        let mask = [
            (GroupKey::from("a"), vec![true, false]),
            (GroupKey::from("b"), vec![false]),
        ]
        .into_iter()
        .collect();
        let exclusion = Exclusion::Masked(MaskExclusion::new(FieldPath::template(), mask));
        let means = aggregate(&g, "time", Reducer::Mean, &exclusion).unwrap();
        assert_eq!(scalar(&means, "a"), Some(3.0));
        assert_eq!(scalar(&means, "b"), Some(100.0));
    }

    #[test]
    fn test_geometric_failure_aborts_the_call() {
        let g = groups(vec![
            run("a", false, json!({"time": 1})),
            run("b", false, json!({"time": 0})),
        ]);
        assert!(matches!(
            aggregate(&g, "time", Reducer::GeometricMean, &Exclusion::KeepAll),
            Err(AnalysisError::NonPositiveValue(_))
        ));
    }
}
