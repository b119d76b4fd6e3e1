//! Positional deviation from the template mean
//!
//! A sequence repeats templates over time. If caching or warm-up matters,
//! the run at a given position of every sequence is systematically faster
//! (or slower) than its template's overall mean. This module measures each
//! run's time as a ratio to its template mean, buckets the ratios by position
//! within the sequence, and averages each bucket.
//!
//! ```text
//! sequence s1: q1 (10ms), q1 (20ms)       template mean q1 = 10ms
//! sequence s2: q1 (10ms), q1 (10ms)
//!
//! position 0: [1.0, 1.0] -> 1.0
//! position 1: [2.0, 1.0] -> 1.5
//! ```

use benchagg_stats::{mean::mean, positional::bucket_by_position};
use serde::Serialize;

use crate::{
    error::AnalysisError,
    group::{GroupKey, GroupMap},
    record::{FieldPath, Record, fields},
    reducer::Summary,
};

/// Deviation ratios bucketed by position within a sequence.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Deviation {
    /// `by_position[i]` holds the ratio of every run found at position `i`.
    pub by_position: Vec<Vec<f64>>,
    /// Arithmetic mean of each position's ratios.
    pub mean_by_position: Vec<f64>,
}

impl Deviation {
    /// Number of positions, i.e. the length of the longest sequence.
    #[must_use]
    pub fn len(&self) -> usize {
        self.mean_by_position.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mean_by_position.is_empty()
    }
}

/// Computes the positional deviation of run times from their template means.
///
/// # Arguments
///
/// * `sequence_groups` - Runs grouped by sequence, in execution order
/// * `template_means` - Mean time per template
/// * `template_path` - Where the template of a run is found
///
/// # Errors
///
/// Fails if a run's template has no mean (`MeanNotFound`), an unavailable
/// mean (`MeanUnavailable`) or a zero mean (`ZeroMean`), or if a run has no
/// numeric `time`.
pub fn deviation_from_mean(
    sequence_groups: &GroupMap<Vec<Record>>,
    template_means: &GroupMap<Summary>,
    template_path: &FieldPath,
) -> Result<Deviation, AnalysisError> {
    let mut ratios = Vec::with_capacity(sequence_groups.len());
    for runs in sequence_groups.values() {
        let sequence_ratios = runs
            .iter()
            .map(|run| deviation_ratio(run, template_means, template_path))
            .collect::<Result<Vec<_>, _>>()?;
        ratios.push(sequence_ratios);
    }

    let by_position = bucket_by_position(&ratios);
    let mean_by_position = by_position.iter().filter_map(|b| mean(b)).collect();
    Ok(Deviation {
        by_position,
        mean_by_position,
    })
}

fn deviation_ratio(
    run: &Record,
    template_means: &GroupMap<Summary>,
    template_path: &FieldPath,
) -> Result<f64, AnalysisError> {
    let template = GroupKey::from_record(run, template_path)?;
    let template_mean = template_means
        .get(&template)
        .ok_or_else(|| AnalysisError::MeanNotFound {
            template: template.clone(),
        })?
        .value()
        .ok_or_else(|| AnalysisError::MeanUnavailable {
            template: template.clone(),
        })?;
    if template_mean == 0.0 {
        return Err(AnalysisError::ZeroMean { template });
    }

    let time = run.get(fields::TIME).ok_or_else(|| AnalysisError::KeyNotFound {
        path: fields::TIME.to_owned(),
        segment: fields::TIME.to_owned(),
    })?;
    let time = time
        .as_f64()
        .ok_or_else(|| AnalysisError::unexpected_type(fields::TIME, "number", time))?;
    Ok(time / template_mean)
}
