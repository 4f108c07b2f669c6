//! Index-level partitioning shared by both dataset types.
//!
//! Everything here works on sample indices only. The datasets turn the
//! resulting index buffers back into samples.

use crate::error::{GrtError, Result};
use crate::random::Random;
use crate::report::fail;

/// Cross-validation readiness of a dataset.
///
/// Any mutation of the owning dataset drops it back to [`FoldState::NotSetup`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FoldState {
    #[default]
    NotSetup,
    Ready { k: usize, folds: Vec<Vec<usize>> },
}

impl FoldState {
    pub fn is_ready(&self) -> bool {
        matches!(self, FoldState::Ready { .. })
    }

    /// Number of folds, if set up.
    pub fn num_folds(&self) -> Option<usize> {
        match self {
            FoldState::Ready { k, .. } => Some(*k),
            FoldState::NotSetup => None,
        }
    }

    /// Index buffers of each fold, empty when not set up.
    pub fn folds(&self) -> &[Vec<usize>] {
        match self {
            FoldState::Ready { folds, .. } => folds,
            FoldState::NotSetup => &[],
        }
    }

    pub(crate) fn invalidate(&mut self) {
        *self = FoldState::NotSetup;
    }

    /// Returns every fold buffer after checking that `fold` can be retrieved.
    pub(crate) fn checked(&self, fold: usize, op: &str) -> Result<&[Vec<usize>]> {
        match self {
            FoldState::NotSetup => Err(fail(GrtError::not_ready(format!(
                "{op}: cross validation has not been set up, call setup_k_folds first"
            )))),
            FoldState::Ready { k, .. } if fold >= *k => Err(fail(GrtError::validation(format!(
                "{op}: fold index {fold} is out of range for {k} folds"
            )))),
            FoldState::Ready { folds, .. } => Ok(folds),
        }
    }
}

/// Rejects `k == 0` and `k > total`.
pub(crate) fn check_k(k: usize, total: usize) -> Result<()> {
    if k == 0 {
        return Err(fail(GrtError::validation("setup_k_folds: K can not be zero")));
    }
    if k > total {
        return Err(fail(GrtError::validation(format!(
            "setup_k_folds: K ({k}) can not be larger than the number of samples ({total})"
        ))));
    }
    Ok(())
}

/// Rejects percentages above 100.
pub(crate) fn check_percentage(percent: u32) -> Result<()> {
    if percent > 100 {
        return Err(fail(GrtError::validation(format!(
            "split: the training size must be a percentage in 0..=100, got {percent}"
        ))));
    }
    Ok(())
}

/// `floor(count / 100 * percent)`, computed in integers so 100% keeps everything.
pub(crate) fn split_point(count: usize, percent: u32) -> usize {
    count * percent as usize / 100
}

/// `0..total` in random order.
pub(crate) fn shuffled_indices(total: usize, rng: &mut Random) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..total).collect();
    rng.shuffle(&mut indices);
    indices
}

/// Shuffles all indices once and hands out `floor(total / k)` per fold; the
/// last fold also takes the remainder.
pub(crate) fn unstratified_folds(total: usize, k: usize, rng: &mut Random) -> Vec<Vec<usize>> {
    let per_fold = total / k;
    let indices = shuffled_indices(total, rng);
    let mut folds = vec![Vec::with_capacity(per_fold); k];
    let mut fold = 0;
    let mut counter = 0;
    for index in indices {
        folds[fold].push(index);
        counter += 1;
        if counter == per_fold && fold < k - 1 {
            fold += 1;
            counter = 0;
        }
    }
    folds
}

/// Shuffles each class group and deals its indices round-robin over the folds.
pub(crate) fn stratified_folds(
    mut groups: Vec<Vec<usize>>,
    k: usize,
    rng: &mut Random,
) -> Vec<Vec<usize>> {
    let mut folds = vec![Vec::new(); k];
    for group in &mut groups {
        rng.shuffle(group);
        for (i, &index) in group.iter().enumerate() {
            folds[i % k].push(index);
        }
    }
    folds
}

/// Indices of every fold except `fold`, in fold order.
pub(crate) fn training_indices(folds: &[Vec<usize>], fold: usize) -> impl Iterator<Item = usize> + '_ {
    folds
        .iter()
        .enumerate()
        .filter(move |(k, _)| *k != fold)
        .flat_map(|(_, indices)| indices.iter().copied())
}
