//! Numeric reducers for benchmark timing analysis.
//!
//! This crate provides the statistical kernels used to summarize groups of
//! benchmark observations:
//!
//! - **Means**: Arithmetic and geometric means over scalar observations
//! - **Positional means**: Per-position means across ragged sequences (e.g. timestamp checkpoints)
//! - **Presence**: Count and fraction of non-missing observations
//! - **Descriptive statistics**: Min, max, median, and spread of a dataset
//!
//! Every reducer has an explicit empty-input policy: an empty input yields
//! `None` ("no data") instead of a fabricated zero.
//!
//! # Modules
//!
//! - [`mean`]: Arithmetic and geometric means
//! - [`positional`]: Ragged, left-justified positional means
//! - [`presence`]: Counting non-missing observations
//! - [`descriptive`]: Descriptive statistics for summarizing datasets
//!
//! # Examples
//!
//! ## Arithmetic and geometric means
//!
//! ```
//! use benchagg_stats::mean::{geometric_mean, mean};
//!
//! assert_eq!(mean(&[1.0, 2.0, 3.0]), Some(2.0));
//! assert_eq!(mean(&[]), None);
//!
//! let g = geometric_mean(&[1.0, 4.0]).unwrap().unwrap();
//! assert!((g - 2.0).abs() < 1e-12);
//! assert!(geometric_mean(&[1.0, 0.0]).is_err());
//! ```
//!
//! ## Positional means over ragged sequences
//!
//! ```
//! use benchagg_stats::positional::positional_mean;
//!
//! let means = positional_mean(&[vec![1.0, 2.0, 3.0], vec![4.0, 5.0]]);
//! assert_eq!(means, Some(vec![2.5, 3.5, 3.0]));
//! ```
//!
//! ## Counting present observations
//!
//! ```
//! use benchagg_stats::presence::{count_present, proportion_present};
//!
//! let errors = [None, Some("timeout"), None, Some("oom")];
//! assert_eq!(count_present(&errors), 2);
//! assert_eq!(proportion_present(&errors), Some(0.5));
//! ```

pub mod descriptive;
pub mod mean;
pub mod positional;
pub mod presence;
