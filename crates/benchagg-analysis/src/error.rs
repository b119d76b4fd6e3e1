use benchagg_stats::mean::NonPositiveValue;
use serde_json::Value;

use crate::group::GroupKey;

/// Errors raised while grouping, filtering or reducing benchmark records.
///
/// None of these are recovered inside the crate: a malformed record aborts
/// the whole grouping or aggregation call it was found in.
#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum AnalysisError {
    #[display("key '{segment}' not found while resolving '{path}'")]
    KeyNotFound { path: String, segment: String },
    #[display("value at '{path}' cannot be used as a group key (found {found})")]
    UnhashableKey { path: String, found: &'static str },
    #[from]
    #[display("{_0}")]
    NonPositiveValue(NonPositiveValue),
    #[display("expected {expected} at '{path}', found {found}")]
    UnexpectedType {
        path: String,
        expected: &'static str,
        found: &'static str,
    },
    #[display("error masks are not aligned: {reason}")]
    MaskMismatch { reason: String },
    #[display("no mean execution time for template '{template}'")]
    MeanNotFound { template: GroupKey },
    #[display("mean execution time of template '{template}' is zero")]
    ZeroMean { template: GroupKey },
    #[display("mean execution time of template '{template}' is unavailable")]
    MeanUnavailable { template: GroupKey },
}

impl AnalysisError {
    pub(crate) fn unexpected_type(path: impl Into<String>, expected: &'static str, found: &Value) -> Self {
        Self::UnexpectedType {
            path: path.into(),
            expected,
            found: value_kind(found),
        }
    }
}

/// Short name of a JSON value's type, for error messages.
#[must_use]
pub fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
