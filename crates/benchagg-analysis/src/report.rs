//! Analysis variants of one or several results files
//!
//! Every summary here is one [`aggregate`] call; this module only names the
//! (field, reducer, exclusion) combinations a report needs and bundles the
//! results.
//!
//! # Refinement Split
//!
//! Most statistics are computed three times:
//!
//! - **all**: every run
//! - **refinement only**: runs with refinement metadata
//! - **no refinement**: runs without refinement metadata
//!
//! # Cross-File Comparison
//!
//! [`completed_run_means`] compares mean times across files using only the
//! runs that succeeded in every file (see [`consistency`](crate::consistency)).

use serde::Serialize;

use crate::{
    aggregate::aggregate,
    consistency::{MaskExclusion, error_mask, merge_error_masks},
    deviation::{Deviation, deviation_from_mean},
    error::AnalysisError,
    exclusion::Exclusion,
    group::{GroupMap, group_records},
    record::{FieldPath, Record, fields},
    reducer::{Reducer, Summary},
};

/// Where the grouping keys are found in a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keys {
    pub template: FieldPath,
    pub sequence: FieldPath,
}

impl Default for Keys {
    fn default() -> Self {
        Self {
            template: FieldPath::template(),
            sequence: FieldPath::sequence_name(),
        }
    }
}

/// A statistic computed over all runs and over each side of the refinement split.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RefinementSplit<T> {
    pub all: T,
    pub refinement_only: T,
    pub no_refinement: T,
}

impl<T> RefinementSplit<T> {
    fn try_compute<F>(exclude_errors: bool, mut f: F) -> Result<Self, AnalysisError>
    where
        F: FnMut(&Exclusion) -> Result<T, AnalysisError>,
    {
        let all = if exclude_errors {
            Exclusion::ErrorRuns
        } else {
            Exclusion::KeepAll
        };
        Ok(Self {
            all: f(&all)?,
            refinement_only: f(&Exclusion::NonRefinement { exclude_errors })?,
            no_refinement: f(&Exclusion::Refinement { exclude_errors })?,
        })
    }
}

/// Per-template summaries of the total time and of the timestamp checkpoints.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimingSummary {
    pub time: GroupMap<Summary>,
    pub timestamps: GroupMap<Summary>,
}

impl TimingSummary {
    fn compute(
        groups: &GroupMap<Vec<Record>>,
        scalar: Reducer,
        positional: Reducer,
        exclusion: &Exclusion,
    ) -> Result<Self, AnalysisError> {
        Ok(Self {
            time: aggregate(groups, fields::TIME, scalar, exclusion)?,
            timestamps: aggregate(groups, fields::TIMESTAMPS, positional, exclusion)?,
        })
    }
}

/// Error counts and rates per template.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorCounts {
    pub count: GroupMap<Summary>,
    pub proportion: GroupMap<Summary>,
    pub count_no_refinement: GroupMap<Summary>,
    pub proportion_no_refinement: GroupMap<Summary>,
}

/// Arithmetic means of `time` and `timestamps`, split by refinement.
pub fn mean_timings(
    groups: &GroupMap<Vec<Record>>,
) -> Result<RefinementSplit<TimingSummary>, AnalysisError> {
    RefinementSplit::try_compute(false, |exclusion| {
        TimingSummary::compute(groups, Reducer::Mean, Reducer::PositionalMean, exclusion)
    })
}

/// Geometric means of `time` and `timestamps`, split by refinement.
///
/// With `exclude_errors`, failed runs are left out of every variant.
pub fn geometric_mean_timings(
    groups: &GroupMap<Vec<Record>>,
    exclude_errors: bool,
) -> Result<RefinementSplit<TimingSummary>, AnalysisError> {
    RefinementSplit::try_compute(exclude_errors, |exclusion| {
        TimingSummary::compute(
            groups,
            Reducer::GeometricMean,
            Reducer::PositionalGeometricMean,
            exclusion,
        )
    })
}

/// Number and fraction of failed runs, overall and without refinement runs.
pub fn error_counts(groups: &GroupMap<Vec<Record>>) -> Result<ErrorCounts, AnalysisError> {
    let no_refinement = Exclusion::Refinement {
        exclude_errors: false,
    };
    Ok(ErrorCounts {
        count: aggregate(groups, fields::ERROR, Reducer::CountPresent, &Exclusion::KeepAll)?,
        proportion: aggregate(
            groups,
            fields::ERROR,
            Reducer::ProportionPresent,
            &Exclusion::KeepAll,
        )?,
        count_no_refinement: aggregate(groups, fields::ERROR, Reducer::CountPresent, &no_refinement)?,
        proportion_no_refinement: aggregate(
            groups,
            fields::ERROR,
            Reducer::ProportionPresent,
            &no_refinement,
        )?,
    })
}

/// Mean result-set size, split by refinement.
pub fn result_counts(
    groups: &GroupMap<Vec<Record>>,
) -> Result<RefinementSplit<GroupMap<Summary>>, AnalysisError> {
    RefinementSplit::try_compute(false, |exclusion| {
        aggregate(groups, fields::RESULTS, Reducer::Mean, exclusion)
    })
}

/// Mean `time` and mean `results` per template over every run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverallMeans {
    pub time: GroupMap<Summary>,
    pub results: GroupMap<Summary>,
}

/// Mean time and result count of every run, ignoring refinement metadata.
///
/// Unlike [`mean_timings`] and [`result_counts`] this works on runs that
/// carry no `refinementMetadata` at all.
pub fn overall_means(groups: &GroupMap<Vec<Record>>) -> Result<OverallMeans, AnalysisError> {
    Ok(OverallMeans {
        time: aggregate(groups, fields::TIME, Reducer::Mean, &Exclusion::KeepAll)?,
        results: aggregate(groups, fields::RESULTS, Reducer::Mean, &Exclusion::KeepAll)?,
    })
}

/// Which optional analyses [`ExperimentReport::analyze`] runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportOptions {
    pub keys: Keys,
    /// Compute geometric means (fails on zero or negative timings).
    pub geometric_means: bool,
    /// Leave failed runs out of the geometric means.
    pub geometric_exclude_errors: bool,
    /// Compute the positional deviation (fails on runs without a `time`).
    pub deviation: bool,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            keys: Keys::default(),
            geometric_means: true,
            geometric_exclude_errors: false,
            deviation: true,
        }
    }
}

/// Every per-template analysis of one results file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExperimentReport {
    pub runs: usize,
    pub templates: usize,
    pub sequences: usize,
    pub errors: ErrorCounts,
    pub means: RefinementSplit<TimingSummary>,
    pub geometric_means: Option<RefinementSplit<TimingSummary>>,
    pub results: RefinementSplit<GroupMap<Summary>>,
    /// Deviation of run times from the overall template mean, by position in the sequence.
    pub deviation: Option<Deviation>,
}

impl ExperimentReport {
    /// Groups `records` by template and by sequence and runs every analysis.
    pub fn analyze(records: &[Record], options: &ReportOptions) -> Result<Self, AnalysisError> {
        let by_template = group_records(records, &options.keys.template)?;
        let by_sequence = group_records(records, &options.keys.sequence)?;

        let errors = error_counts(&by_template)?;
        let means = mean_timings(&by_template)?;
        let geometric_means = if options.geometric_means {
            Some(geometric_mean_timings(
                &by_template,
                options.geometric_exclude_errors,
            )?)
        } else {
            None
        };
        let results = result_counts(&by_template)?;
        let deviation = if options.deviation {
            Some(deviation_from_mean(
                &by_sequence,
                &means.all.time,
                &options.keys.template,
            )?)
        } else {
            None
        };

        tracing::debug!(
            runs = records.len(),
            templates = by_template.len(),
            sequences = by_sequence.len(),
            "experiment analyzed"
        );

        Ok(Self {
            runs: records.len(),
            templates: by_template.len(),
            sequences: by_sequence.len(),
            errors,
            means,
            geometric_means,
            results,
            deviation,
        })
    }
}

/// Mean times restricted to runs that succeeded in every file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletedRunComparison {
    /// Positions that errored in at least one file.
    pub mask: GroupMap<Vec<bool>>,
    /// Per file: mean time over the runs not flagged by `mask`.
    pub mean_time: Vec<GroupMap<Summary>>,
    /// Per file: number of failed runs.
    pub error_count: Vec<GroupMap<Summary>>,
}

/// Compares mean times across files over the runs that succeeded everywhere.
///
/// `experiments` holds the records of each file, in file order.
///
/// # Errors
///
/// Fails if grouping fails for a file, or if the files do not contain the
/// same templates with the same number of runs each.
pub fn completed_run_means(
    experiments: &[Vec<Record>],
    template_path: &FieldPath,
) -> Result<CompletedRunComparison, AnalysisError> {
    let groups = experiments
        .iter()
        .map(|records| group_records(records, template_path))
        .collect::<Result<Vec<_>, _>>()?;
    let masks = groups.iter().map(error_mask).collect::<Vec<_>>();
    let mask = merge_error_masks(&masks)?;

    let exclusion = Exclusion::Masked(MaskExclusion::new(template_path.clone(), mask.clone()));
    let mut mean_time = Vec::with_capacity(groups.len());
    let mut error_count = Vec::with_capacity(groups.len());
    for file_groups in &groups {
        mean_time.push(aggregate(file_groups, fields::TIME, Reducer::Mean, &exclusion)?);
        error_count.push(aggregate(
            file_groups,
            fields::ERROR,
            Reducer::CountPresent,
            &Exclusion::KeepAll,
        )?);
    }

    let excluded = mask.values().flatten().filter(|e| **e).count();
    tracing::debug!(files = experiments.len(), excluded, "compared completed runs");

    Ok(CompletedRunComparison {
        mask,
        mean_time,
        error_count,
    })
}
