//! Aggregation engine for benchmark run results
//!
//! This crate groups benchmark runs (query executions with timings, error
//! markers and result counts) and reduces each group to summary statistics
//! under configurable inclusion rules.
//!
//! # Overview
//!
//! The engine is factored into three independent pieces:
//!
//! 1. **Grouping** ([`group`]): partition runs by a key such as the query
//!    template or the sequence name, keeping first-seen order
//! 2. **Exclusion** ([`exclusion::Exclusion`]): decide per run, and per
//!    position within its group, whether it takes part in a reduction
//! 3. **Reduction** ([`reducer::Reducer`]): arithmetic/geometric means,
//!    positional means, counts and proportions
//!
//! [`aggregate::aggregate`] combines one of each. Every analysis variant is a
//! different (field, reducer, exclusion) triple rather than a bespoke
//! function; [`report`] names the variants a results report needs.
//!
//! Two analyses build on top of aggregated data:
//!
//! - **Cross-file consistency** ([`consistency`]): restrict a comparison of
//!   several results files to runs that succeeded in all of them
//! - **Deviation from mean** ([`deviation`]): detect warm-up or caching
//!   effects by position within repeated sequences
//!
//! # Examples
//!
//! ## Mean time per template, refinement runs only
//!
//! ```
//! use benchagg_analysis::{
//!     aggregate::aggregate,
//!     exclusion::Exclusion,
//!     group::{GroupKey, group_records},
//!     reducer::Reducer,
//!     record::{FieldPath, Record},
//! };
//! use serde_json::json;
//!
//! let records: Vec<Record> = serde_json::from_value(json!([
//!     {"sequenceElement": {"template": "q1", "refinementMetadata": {"p": 1}}, "time": 12.0},
//!     {"sequenceElement": {"template": "q1", "refinementMetadata": {}}, "time": 50.0},
//!     {"sequenceElement": {"template": "q1", "refinementMetadata": {"p": 2}}, "time": 8.0},
//! ]))
//! .unwrap();
//!
//! let by_template = group_records(&records, &FieldPath::template()).unwrap();
//! let refinement_only = aggregate(
//!     &by_template,
//!     "time",
//!     Reducer::Mean,
//!     &Exclusion::NonRefinement { exclude_errors: false },
//! )
//! .unwrap();
//!
//! assert_eq!(refinement_only.get(&GroupKey::from("q1")).unwrap().value(), Some(10.0));
//! ```
//!
//! ## Comparing files over runs that succeeded everywhere
//!
//! ```
//! use benchagg_analysis::{record::{FieldPath, Record}, report::completed_run_means};
//! use serde_json::json;
//!
//! let load = |v| serde_json::from_value::<Vec<Record>>(v).unwrap();
//! let baseline = load(json!([
//!     {"sequenceElement": {"template": "q1"}, "time": 10.0},
//!     {"sequenceElement": {"template": "q1"}, "time": 20.0, "error": "timeout"},
//! ]));
//! let candidate = load(json!([
//!     {"sequenceElement": {"template": "q1"}, "time": 4.0},
//!     {"sequenceElement": {"template": "q1"}, "time": 6.0},
//! ]));
//!
//! let comparison = completed_run_means(&[baseline, candidate], &FieldPath::template()).unwrap();
//! // run #1 failed in the baseline, so only run #0 is compared
//! let candidate_means = &comparison.mean_time[1];
//! assert_eq!(candidate_means.values().next().unwrap().value(), Some(4.0));
//! ```

pub mod aggregate;
pub mod consistency;
pub mod deviation;
pub mod error;
pub mod exclusion;
pub mod group;
pub mod record;
pub mod reducer;
pub mod report;

pub use self::error::AnalysisError;
