//! Benchmark run records and nested field lookup
//!
//! A [`Record`] is one benchmark run exactly as it appears in the results
//! file: an arbitrarily nested JSON object. The analysis only relies on a
//! handful of logical fields (see [`fields`]), everything else is carried
//! along untouched.
//!
//! # Record Layout
//!
//! ```json
//! {
//!   "name": "sequence-17",
//!   "sequenceElement": {
//!     "template": "interactive-short-3",
//!     "refinementMetadata": { "pattern": "..." }
//!   },
//!   "time": 812.4,
//!   "timestamps": [120.0, 530.2, 812.4],
//!   "results": 42,
//!   "error": "timeout"
//! }
//! ```
//!
//! `error` is only present on failed runs; `time` may be absent when the run
//! timed out.
//!
//! # Field Paths
//!
//! Nested values are addressed with a [`FieldPath`], written dotted with
//! optional index segments:
//!
//! ```
//! use benchagg_analysis::record::{FieldPath, Record};
//! use serde_json::json;
//!
//! let record = Record::try_from(json!({
//!     "sequenceElement": { "template": "interactive-short-3" },
//!     "timestamps": [120.0, 530.2],
//! }))
//! .unwrap();
//!
//! let template: FieldPath = "sequenceElement.template".parse().unwrap();
//! assert_eq!(*record.resolve(template.segments()).unwrap(), "interactive-short-3");
//!
//! let second: FieldPath = "timestamps[1]".parse().unwrap();
//! assert_eq!(record.resolve(second.segments()).unwrap(), 530.2);
//! ```

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::AnalysisError;

/// Locations of the fields the analysis reads.
pub mod fields {
    /// Query template of the sequence element; the primary grouping key.
    pub const TEMPLATE: &[&str] = &["sequenceElement", "template"];
    /// Refinement metadata; an empty mapping marks a non-refinement run.
    pub const REFINEMENT_METADATA: &[&str] = &["sequenceElement", "refinementMetadata"];
    /// Name of the sequence a run belongs to.
    pub const SEQUENCE_NAME: &[&str] = &["name"];
    /// Execution duration of the run.
    pub const TIME: &str = "time";
    /// Ordered execution checkpoints of the run.
    pub const TIMESTAMPS: &str = "timestamps";
    /// Error marker, present only on failed runs.
    pub const ERROR: &str = "error";
    /// Size of the result set.
    pub const RESULTS: &str = "results";
}

/// One benchmark run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    #[must_use]
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Direct lookup of a top-level field.
    ///
    /// A JSON `null` is reported as missing, the same as an absent field.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field).filter(|v| !v.is_null())
    }

    /// Whether the run carries an error marker.
    #[must_use]
    pub fn has_error(&self) -> bool {
        self.0.contains_key(fields::ERROR)
    }

    /// Resolves a nested field, applying each path segment in order.
    ///
    /// Object values are indexed by key and array values by a numeric
    /// segment.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::KeyNotFound`] if a segment is absent or the
    /// value it is applied to is a scalar.
    pub fn resolve<S>(&self, path: &[S]) -> Result<&Value, AnalysisError>
    where
        S: AsRef<str>,
    {
        let Some((first, rest)) = path.split_first() else {
            return Err(AnalysisError::KeyNotFound {
                path: String::new(),
                segment: String::new(),
            });
        };
        let mut value = self
            .0
            .get(first.as_ref())
            .ok_or_else(|| key_not_found(path, first))?;
        for segment in rest {
            value = lookup(value, segment.as_ref()).ok_or_else(|| key_not_found(path, segment))?;
        }
        Ok(value)
    }

    /// The refinement metadata mapping of the run's sequence element.
    ///
    /// # Errors
    ///
    /// Fails if the metadata is absent or not a mapping.
    pub fn refinement_metadata(&self) -> Result<&Map<String, Value>, AnalysisError> {
        let value = self.resolve(fields::REFINEMENT_METADATA)?;
        value.as_object().ok_or_else(|| {
            AnalysisError::unexpected_type(join(fields::REFINEMENT_METADATA), "object", value)
        })
    }
}

impl From<Map<String, Value>> for Record {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

impl TryFrom<Value> for Record {
    type Error = AnalysisError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(fields) => Ok(Self(fields)),
            other => Err(AnalysisError::unexpected_type("<record>", "object", &other)),
        }
    }
}

fn lookup<'a>(value: &'a Value, segment: &str) -> Option<&'a Value> {
    match value {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}

fn key_not_found<S>(path: &[S], segment: &S) -> AnalysisError
where
    S: AsRef<str>,
{
    AnalysisError::KeyNotFound {
        path: join(path),
        segment: segment.as_ref().to_owned(),
    }
}

pub(crate) fn join<S>(path: &[S]) -> String
where
    S: AsRef<str>,
{
    path.iter().map(AsRef::as_ref).collect::<Vec<_>>().join(".")
}

/// An ordered sequence of keys addressing a nested value in a [`Record`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath {
    segments: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("invalid field path '{input}': {reason}")]
pub struct ParseFieldPathError {
    input: String,
    reason: &'static str,
}

impl FieldPath {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Path of the template field.
    #[must_use]
    pub fn template() -> Self {
        Self::new(fields::TEMPLATE.iter().copied())
    }

    /// Path of the sequence name field.
    #[must_use]
    pub fn sequence_name() -> Self {
        Self::new(fields::SEQUENCE_NAME.iter().copied())
    }
}

impl FromStr for FieldPath {
    type Err = ParseFieldPathError;

    /// Parses `a.b.0` and `a.b[0]` into `["a", "b", "0"]`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = |reason| ParseFieldPathError {
            input: s.to_owned(),
            reason,
        };
        let mut segments = vec![];
        for part in s.split('.') {
            let (name, mut indices) = match part.find('[') {
                Some(open) => part.split_at(open),
                None => (part, ""),
            };
            if name.is_empty() && indices.is_empty() {
                return Err(err("empty segment"));
            }
            if !name.is_empty() {
                segments.push(name.to_owned());
            }
            while !indices.is_empty() {
                let close = indices.find(']').ok_or_else(|| err("unclosed '['"))?;
                let index = &indices[1..close];
                if index.is_empty() || !index.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(err("index must be a non-negative integer"));
                }
                segments.push(index.to_owned());
                indices = &indices[close + 1..];
                if !indices.is_empty() && !indices.starts_with('[') {
                    return Err(err("unexpected characters after ']'"));
                }
            }
        }
        Ok(Self { segments })
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&join(&self.segments))
    }
}
