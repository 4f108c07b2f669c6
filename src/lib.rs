//! grt_core: the numeric and data substrate of a gesture recognition toolkit.
//!
//! Dense row-major matrices, a reproducible random number generator and
//! labelled datasets that know how to partition themselves for training and
//! evaluation.
//!
//! # Features
//!
//! - Generic row-major matrices with amortised row appends and column statistics.
//! - A seeded combined generator with uniform, Gaussian and weighted sampling.
//! - Classification and regression datasets with percentage splits, stratified
//!   k-fold cross validation and bootstrap resampling.
//! - Binary dataset snapshots validated before they are rebuilt.
//!
//! # Modules
//!
//! - [`matrix`]: the `Matrix<T>` container and the `matrix!` literal.
//! - [`vector`]: `Vec` aliases and the helpers used on feature vectors.
//! - [`ops`]: matrix arithmetic on `f64` matrices.
//! - [`stats`]: column statistics, transposition and min-max scaling.
//! - [`random`]: the deterministic generator and weighted sampling tables.
//! - [`data`]: `ClassificationData`, `RegressionData` and `ClassTracker`.
//! - [`config`]: training and scaling settings built on top of the datasets.
//! - [`serialize`]: binary dump and restore.
//! - [`approx`]: graded floating point comparison.
//! - [`error`] / [`report`]: the error type and its log reporting.
//!
//! # Example
//!
//! ```rust
//! use grt_core::matrix;
//! use grt_core::data::ClassificationData;
//! use grt_core::random::Random;
//!
//! let m = matrix![[1.0, 2.0], [3.0, 4.0]];
//! assert_eq!(m.mean(), vec![2.0, 3.0]);
//!
//! let mut data = ClassificationData::new(2);
//! data.add_sample(1, &[0.0, 1.0]).unwrap();
//! data.add_sample(2, &[1.0, 0.0]).unwrap();
//! let boot = data.bootstrap(10, false, &mut Random::new(3)).unwrap();
//! assert_eq!(boot.num_samples(), 10);
//! ```

pub mod approx;
pub mod config;
pub mod data;
pub mod error;
pub mod matrix;
pub mod ops;
pub mod random;
pub mod report;
pub mod serialize;
pub mod stats;
pub mod vector;

pub use error::{GrtError, Result};
