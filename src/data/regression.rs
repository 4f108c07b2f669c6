use core::fmt;
use core::ops::Index;

use super::partition::{self, FoldState};
use super::{DEFAULT_NAME, check_dataset_name, try_reserve};
use crate::error::{GrtError, Result};
use crate::random::Random;
use crate::report::{fail, warn};
use crate::stats::{self, MinMax};

/// An input vector paired with its target vector.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RegressionSample {
    input: Vec<f64>,
    target: Vec<f64>,
}

impl RegressionSample {
    pub fn new(input: Vec<f64>, target: Vec<f64>) -> Self {
        Self { input, target }
    }

    pub fn input(&self) -> &[f64] {
        &self.input
    }

    pub fn target(&self) -> &[f64] {
        &self.target
    }

    pub fn num_input_dimensions(&self) -> usize {
        self.input.len()
    }

    pub fn num_target_dimensions(&self) -> usize {
        self.target.len()
    }
}

/// A dataset of `(input, target)` samples with fixed input and target widths.
#[derive(Debug, Clone, PartialEq)]
pub struct RegressionData {
    name: String,
    info: String,
    num_input_dimensions: usize,
    num_target_dimensions: usize,
    samples: Vec<RegressionSample>,
    external_input_ranges: Vec<MinMax>,
    external_target_ranges: Vec<MinMax>,
    use_external_ranges: bool,
    folds: FoldState,
}

impl Default for RegressionData {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

impl RegressionData {
    /// Creates an empty dataset. With both widths 0 the first sample defines them.
    pub fn new(num_input_dimensions: usize, num_target_dimensions: usize) -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            info: String::new(),
            num_input_dimensions,
            num_target_dimensions,
            samples: Vec::new(),
            external_input_ranges: Vec::new(),
            external_target_ranges: Vec::new(),
            use_external_ranges: false,
            folds: FoldState::NotSetup,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn info(&self) -> &str {
        &self.info
    }

    pub fn num_input_dimensions(&self) -> usize {
        self.num_input_dimensions
    }

    pub fn num_target_dimensions(&self) -> usize {
        self.num_target_dimensions
    }

    pub fn num_samples(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[RegressionSample] {
        &self.samples
    }

    pub fn fold_state(&self) -> &FoldState {
        &self.folds
    }

    pub fn uses_external_ranges(&self) -> bool {
        self.use_external_ranges
    }

    pub fn external_input_ranges(&self) -> &[MinMax] {
        &self.external_input_ranges
    }

    pub fn external_target_ranges(&self) -> &[MinMax] {
        &self.external_target_ranges
    }

    pub fn set_name(&mut self, name: &str) -> Result<()> {
        check_dataset_name(name)?;
        self.name = name.to_string();
        Ok(())
    }

    pub fn set_info(&mut self, info: impl Into<String>) {
        self.info = info.into();
    }

    /// Sets both widths, dropping every sample and external range.
    pub fn set_input_and_target_dimensions(&mut self, inputs: usize, targets: usize) -> Result<()> {
        if inputs == 0 || targets == 0 {
            return Err(fail(GrtError::validation(format!(
                "set_input_and_target_dimensions: both widths must be greater than zero (inputs: {inputs} targets: {targets})"
            ))));
        }
        self.clear();
        self.num_input_dimensions = inputs;
        self.num_target_dimensions = targets;
        self.use_external_ranges = false;
        self.external_input_ranges.clear();
        self.external_target_ranges.clear();
        Ok(())
    }

    pub fn clear(&mut self) {
        self.samples.clear();
        self.folds.invalidate();
    }

    pub fn reserve(&mut self, capacity: usize) -> Result<()> {
        let additional = capacity.saturating_sub(self.samples.len());
        self.grow(additional)
    }

    /// Appends copies of `input` and `target`.
    pub fn add_sample(&mut self, input: &[f64], target: &[f64]) -> Result<()> {
        let unset = self.num_input_dimensions == 0 && self.num_target_dimensions == 0;
        if unset && self.samples.is_empty() && !input.is_empty() && !target.is_empty() {
            self.num_input_dimensions = input.len();
            self.num_target_dimensions = target.len();
        }
        if input.len() != self.num_input_dimensions || target.len() != self.num_target_dimensions {
            return Err(fail(GrtError::validation(format!(
                "add_sample: a {}/{} sample does not match the {}/{} input/target dimensions of the dataset",
                input.len(),
                target.len(),
                self.num_input_dimensions,
                self.num_target_dimensions
            ))));
        }
        self.grow(1)?;
        self.folds.invalidate();
        self.samples
            .push(RegressionSample::new(input.to_vec(), target.to_vec()));
        Ok(())
    }

    pub fn remove_last_sample(&mut self) -> Result<()> {
        if self.samples.pop().is_none() {
            let msg = "remove_last_sample: failed to remove sample, the dataset is empty";
            warn(msg);
            return Err(GrtError::validation(msg));
        }
        self.folds.invalidate();
        Ok(())
    }

    /// Installs external input and target ranges.
    pub fn set_external_ranges(
        &mut self,
        input: Vec<MinMax>,
        target: Vec<MinMax>,
        use_external: bool,
    ) -> Result<()> {
        if input.len() != self.num_input_dimensions || target.len() != self.num_target_dimensions {
            return Err(fail(GrtError::validation(format!(
                "set_external_ranges: {}/{} ranges do not match {}/{} dimensions",
                input.len(),
                target.len(),
                self.num_input_dimensions,
                self.num_target_dimensions
            ))));
        }
        self.external_input_ranges = input;
        self.external_target_ranges = target;
        self.use_external_ranges = use_external;
        Ok(())
    }

    pub fn enable_external_range_scaling(&mut self, enable: bool) -> Result<()> {
        if self.external_input_ranges.len() != self.num_input_dimensions
            || self.external_target_ranges.len() != self.num_target_dimensions
        {
            return Err(fail(GrtError::validation(
                "enable_external_range_scaling: no external ranges have been set",
            )));
        }
        self.use_external_ranges = enable;
        Ok(())
    }

    pub fn input_ranges(&self) -> Vec<MinMax> {
        if self.use_external_ranges {
            return self.external_input_ranges.clone();
        }
        column_ranges(self.samples.iter().map(|s| s.input.as_slice()), self.num_input_dimensions)
    }

    pub fn target_ranges(&self) -> Vec<MinMax> {
        if self.use_external_ranges {
            return self.external_target_ranges.clone();
        }
        column_ranges(self.samples.iter().map(|s| s.target.as_slice()), self.num_target_dimensions)
    }

    /// Scales inputs and targets from their own ranges into `[min_target, max_target]`.
    pub fn scale(&mut self, min_target: f64, max_target: f64) -> Result<()> {
        let input = self.input_ranges();
        let target = self.target_ranges();
        self.scale_with_ranges(&input, &target, min_target, max_target)
    }

    pub fn scale_with_ranges(
        &mut self,
        input: &[MinMax],
        target: &[MinMax],
        min_target: f64,
        max_target: f64,
    ) -> Result<()> {
        if input.len() != self.num_input_dimensions || target.len() != self.num_target_dimensions {
            return Err(fail(GrtError::validation(format!(
                "scale: {}/{} ranges do not match {}/{} dimensions",
                input.len(),
                target.len(),
                self.num_input_dimensions,
                self.num_target_dimensions
            ))));
        }
        self.folds.invalidate();
        for sample in &mut self.samples {
            scale_row(&mut sample.input, input, min_target, max_target);
            scale_row(&mut sample.target, target, min_target, max_target);
        }
        Ok(())
    }

    /// Appends every sample of `other`.
    pub fn merge(&mut self, other: &RegressionData) -> Result<()> {
        if other.num_input_dimensions != self.num_input_dimensions
            || other.num_target_dimensions != self.num_target_dimensions
        {
            return Err(fail(GrtError::validation(format!(
                "merge: the other dataset is {}/{} but this dataset is {}/{}",
                other.num_input_dimensions,
                other.num_target_dimensions,
                self.num_input_dimensions,
                self.num_target_dimensions
            ))));
        }
        self.grow(other.samples.len())?;
        self.folds.invalidate();
        self.samples.extend(other.samples.iter().cloned());
        Ok(())
    }

    /// Keeps a random `percent`% of the samples in `self` and returns the rest.
    pub fn split(&mut self, percent: u32, rng: &mut Random) -> Result<RegressionData> {
        partition::check_percentage(percent)?;
        if self.samples.is_empty() {
            return Err(fail(GrtError::validation("split: the dataset is empty")));
        }
        let indices = partition::shuffled_indices(self.samples.len(), rng);
        let cut = partition::split_point(indices.len(), percent);
        let mut train = self.empty_like();
        let mut test = self.empty_like();
        train.grow(cut)?;
        test.grow(indices.len() - cut)?;
        train.extend_from(self, &indices[..cut]);
        test.extend_from(self, &indices[cut..]);
        *self = train;
        Ok(test)
    }

    /// Partitions the samples into `k` random folds.
    pub fn setup_k_folds(&mut self, k: usize, rng: &mut Random) -> Result<()> {
        partition::check_k(k, self.samples.len())?;
        let folds = partition::unstratified_folds(self.samples.len(), k, rng);
        self.folds = FoldState::Ready { k, folds };
        Ok(())
    }

    pub fn training_fold(&self, fold: usize) -> Result<RegressionData> {
        let folds = self.folds.checked(fold, "training_fold")?;
        let mut out = self.empty_like();
        let indices: Vec<usize> = partition::training_indices(folds, fold).collect();
        out.grow(indices.len())?;
        out.extend_from(self, &indices);
        Ok(out)
    }

    pub fn test_fold(&self, fold: usize) -> Result<RegressionData> {
        let folds = self.folds.checked(fold, "test_fold")?;
        let mut out = self.empty_like();
        out.grow(folds[fold].len())?;
        out.extend_from(self, &folds[fold]);
        Ok(out)
    }

    /// Draws `n` samples with replacement; `n == 0` draws [`num_samples`](Self::num_samples).
    pub fn bootstrap(&self, n: usize, rng: &mut Random) -> Result<RegressionData> {
        if self.samples.is_empty() {
            return Err(fail(GrtError::validation(
                "bootstrap: can not resample an empty dataset",
            )));
        }
        let n = if n == 0 { self.samples.len() } else { n };
        let mut out = self.empty_like();
        out.grow(n)?;
        for _ in 0..n {
            let i = rng.index(self.samples.len());
            out.samples.push(self.samples[i].clone());
        }
        Ok(out)
    }

    fn empty_like(&self) -> Self {
        Self {
            name: self.name.clone(),
            info: self.info.clone(),
            num_input_dimensions: self.num_input_dimensions,
            num_target_dimensions: self.num_target_dimensions,
            samples: Vec::new(),
            external_input_ranges: self.external_input_ranges.clone(),
            external_target_ranges: self.external_target_ranges.clone(),
            use_external_ranges: self.use_external_ranges,
            folds: FoldState::NotSetup,
        }
    }

    fn extend_from(&mut self, source: &RegressionData, indices: &[usize]) {
        self.samples
            .extend(indices.iter().map(|&i| source.samples[i].clone()));
    }

    fn grow(&mut self, additional: usize) -> Result<()> {
        let cols = self.num_input_dimensions + self.num_target_dimensions;
        if let Err(err) = try_reserve(&mut self.samples, additional, cols) {
            self.clear();
            return Err(err);
        }
        Ok(())
    }
}

fn column_ranges<'a>(mut rows: impl Iterator<Item = &'a [f64]>, width: usize) -> Vec<MinMax> {
    let Some(first) = rows.next() else {
        return vec![MinMax::default(); width];
    };
    let mut ranges: Vec<MinMax> = first.iter().map(|&x| MinMax::new(x, x)).collect();
    for row in rows {
        for (range, &x) in ranges.iter_mut().zip(row) {
            range.update(x);
        }
    }
    ranges
}

fn scale_row(row: &mut [f64], ranges: &[MinMax], min_target: f64, max_target: f64) {
    for (x, range) in row.iter_mut().zip(ranges) {
        *x = stats::scale(*x, range.min, range.max, min_target, max_target, false);
    }
}

impl Index<usize> for RegressionData {
    type Output = RegressionSample;

    fn index(&self, i: usize) -> &RegressionSample {
        &self.samples[i]
    }
}

impl fmt::Display for RegressionData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "DatasetName:\t{}", self.name)?;
        writeln!(f, "DatasetInfo:\t{}", self.info)?;
        writeln!(f, "Number of Input Dimensions:\t{}", self.num_input_dimensions)?;
        writeln!(f, "Number of Target Dimensions:\t{}", self.num_target_dimensions)?;
        writeln!(f, "Number of Samples:\t{}", self.samples.len())?;
        writeln!(f, "Input Ranges:")?;
        for (j, r) in self.input_ranges().iter().enumerate() {
            writeln!(f, "[{}] Min:\t{}\tMax: {}", j + 1, r.min, r.max)?;
        }
        writeln!(f, "Target Ranges:")?;
        for (j, r) in self.target_ranges().iter().enumerate() {
            writeln!(f, "[{}] Min:\t{}\tMax: {}", j + 1, r.min, r.max)?;
        }
        Ok(())
    }
}
