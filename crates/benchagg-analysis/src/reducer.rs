//! Reducing the values extracted from a group to one summary
//!
//! A [`Reducer`] receives the target field of every retained group member,
//! in group order, with `None` standing for a missing value. It produces a
//! [`Summary`]:
//!
//! | Reducer                   | Input              | Summary              |
//! |---------------------------|--------------------|----------------------|
//! | `Mean`                    | numbers            | `Scalar`             |
//! | `GeometricMean`           | positive numbers   | `Scalar`             |
//! | `PositionalMean`          | arrays of numbers  | `Positional`         |
//! | `PositionalGeometricMean` | arrays of positive | `Positional`         |
//! | `CountPresent`            | anything           | `Count`              |
//! | `ProportionPresent`       | anything           | `Scalar`             |
//!
//! Numeric reducers skip missing values. A reducer left with nothing to
//! reduce reports the summary as unavailable rather than zero; at the output
//! boundary unavailability is written as [`UNAVAILABLE`] (`-1`).

use benchagg_stats::{
    mean::{geometric_mean, mean},
    positional::{positional_geometric_mean, positional_mean},
    presence::{count_present, proportion_present},
};
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::error::AnalysisError;

/// Value written in place of an unavailable summary ("no data" or timed out).
pub const UNAVAILABLE: f64 = -1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reducer {
    Mean,
    GeometricMean,
    PositionalMean,
    PositionalGeometricMean,
    CountPresent,
    ProportionPresent,
}

/// The reduced value of one group.
#[derive(Debug, Clone, PartialEq)]
pub enum Summary {
    /// A scalar statistic; `None` when there was nothing to reduce.
    Scalar(Option<f64>),
    /// One statistic per position; `None` when there was nothing to reduce.
    Positional(Option<Vec<f64>>),
    /// A count of observations.
    Count(usize),
}

impl Summary {
    /// The scalar value, if this is an available scalar or a count.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn value(&self) -> Option<f64> {
        match self {
            Summary::Scalar(v) => *v,
            Summary::Count(n) => Some(*n as f64),
            Summary::Positional(_) => None,
        }
    }

    /// The per-position values, if this is an available positional summary.
    #[must_use]
    pub fn positions(&self) -> Option<&[f64]> {
        match self {
            Summary::Positional(Some(v)) => Some(v),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_available(&self) -> bool {
        match self {
            Summary::Scalar(v) => v.is_some(),
            Summary::Positional(v) => v.is_some(),
            Summary::Count(_) => true,
        }
    }

    /// The scalar value with [`UNAVAILABLE`] substituted for missing data.
    #[must_use]
    pub fn value_or_sentinel(&self) -> f64 {
        self.value().unwrap_or(UNAVAILABLE)
    }
}

impl Serialize for Summary {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Summary::Scalar(v) => serializer.serialize_f64(v.unwrap_or(UNAVAILABLE)),
            Summary::Positional(Some(v)) => v.serialize(serializer),
            Summary::Positional(None) => [UNAVAILABLE].serialize(serializer),
            Summary::Count(n) => serializer.serialize_u64(*n as u64),
        }
    }
}

impl Reducer {
    /// Reduces the values of `field` gathered from one group.
    ///
    /// # Errors
    ///
    /// Fails if a numeric reducer is given a non-numeric value, or a
    /// geometric reducer a value `<= 0`.
    pub fn reduce(self, values: &[Option<&Value>], field: &str) -> Result<Summary, AnalysisError> {
        let summary = match self {
            Reducer::Mean => Summary::Scalar(mean(&numbers(values, field)?)),
            Reducer::GeometricMean => Summary::Scalar(geometric_mean(&numbers(values, field)?)?),
            Reducer::PositionalMean => Summary::Positional(positional_mean(&series(values, field)?)),
            Reducer::PositionalGeometricMean => {
                Summary::Positional(positional_geometric_mean(&series(values, field)?)?)
            }
            Reducer::CountPresent => Summary::Count(count_present(values)),
            Reducer::ProportionPresent => Summary::Scalar(proportion_present(values)),
        };
        Ok(summary)
    }
}

fn number(value: &Value, path: &str) -> Result<f64, AnalysisError> {
    value
        .as_f64()
        .ok_or_else(|| AnalysisError::unexpected_type(path, "number", value))
}

fn numbers(values: &[Option<&Value>], field: &str) -> Result<Vec<f64>, AnalysisError> {
    values.iter().flatten().map(|v| number(v, field)).collect()
}

fn series(values: &[Option<&Value>], field: &str) -> Result<Vec<Vec<f64>>, AnalysisError> {
    values
        .iter()
        .flatten()
        .map(|v| -> Result<Vec<f64>, AnalysisError> {
            v.as_array()
                .ok_or_else(|| AnalysisError::unexpected_type(field, "array", v))?
                .iter()
                .map(|item| number(item, field))
                .collect()
        })
        .collect()
}
