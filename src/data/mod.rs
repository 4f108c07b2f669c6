//! # Labelled Datasets
//!
//! Containers for labelled samples and the partitioning algorithms that turn
//! one dataset into training and test sets.
//!
//! - [`ClassificationData`]: `(label, features)` samples plus one
//!   [`ClassTracker`] per label, kept sorted by label
//! - [`RegressionData`]: `(input, target)` samples
//!
//! Both support percentage splits, k-fold cross validation and bootstrap
//! resampling. Randomness always comes from a caller-supplied
//! [`Random`](crate::random::Random), so a fixed seed reproduces a partition.
//!
//! ## Cross validation
//!
//! `setup_k_folds` moves a dataset into [`FoldState::Ready`]. Every mutation
//! (adding, removing, relabelling, merging, scaling, splitting) moves it back
//! to [`FoldState::NotSetup`], and fold retrieval in that state fails with
//! [`GrtError::NotReady`](crate::error::GrtError::NotReady).
//!
//! ## Example
//! ```rust
//! use grt_core::data::ClassificationData;
//! use grt_core::random::Random;
//!
//! let mut data = ClassificationData::new(2);
//! for i in 0..20 {
//!     data.add_sample(1 + i % 2, &[i as f64, 0.5]).unwrap();
//! }
//! let mut rng = Random::new(7);
//! data.setup_k_folds(4, true, &mut rng).unwrap();
//! let test = data.test_fold(0).unwrap();
//! let train = data.training_fold(0).unwrap();
//! assert_eq!(test.num_samples() + train.num_samples(), 20);
//! ```

mod classification;
mod partition;
mod regression;
mod tracker;

pub use classification::{ClassificationData, ClassificationSample};
pub use partition::FoldState;
pub use regression::{RegressionData, RegressionSample};
pub use tracker::ClassTracker;

use crate::error::{GrtError, Result};
use crate::report::fail;

/// Label reserved for the null (rejection) class.
pub const DEFAULT_NULL_CLASS_LABEL: u32 = 0;

/// Name given to datasets and classes that were never named.
pub const DEFAULT_NAME: &str = "NOT_SET";

/// Dataset names are opaque tags: non-empty and free of whitespace.
pub(crate) fn check_dataset_name(name: &str) -> Result<()> {
    if name.is_empty() || name.chars().any(char::is_whitespace) {
        return Err(fail(GrtError::validation(format!(
            "set_name: the dataset name {name:?} can not be empty or contain whitespace"
        ))));
    }
    Ok(())
}

/// Reserves room for `additional` more items, mapping failure to an allocation error.
pub(crate) fn try_reserve<T>(buf: &mut Vec<T>, additional: usize, cols: usize) -> Result<()> {
    buf.try_reserve(additional).map_err(|_| {
        fail(GrtError::Allocation {
            rows: buf.len() + additional,
            cols,
        })
    })
}
