use core::fmt;
use core::ops::Index;

use super::partition::{self, FoldState};
use super::{
    ClassTracker, DEFAULT_NAME, DEFAULT_NULL_CLASS_LABEL, check_dataset_name, try_reserve,
};
use crate::error::{GrtError, Result};
use crate::matrix::MatrixFloat;
use crate::random::Random;
use crate::report::{fail, warn};
use crate::stats::{self, MinMax};

/// One labelled feature vector.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClassificationSample {
    label: u32,
    features: Vec<f64>,
}

impl ClassificationSample {
    pub fn new(label: u32, features: Vec<f64>) -> Self {
        Self { label, features }
    }

    #[inline]
    pub fn label(&self) -> u32 {
        self.label
    }

    #[inline]
    pub fn features(&self) -> &[f64] {
        &self.features
    }

    #[inline]
    pub fn num_dimensions(&self) -> usize {
        self.features.len()
    }
}

impl Index<usize> for ClassificationSample {
    type Output = f64;

    fn index(&self, j: usize) -> &f64 {
        &self.features[j]
    }
}

/// A labelled classification dataset.
///
/// The sum of the tracker counters always equals [`num_samples`], and the
/// trackers stay sorted by ascending label. A label's tracker survives when
/// its last sample is removed; only [`remove_class`] drops it.
///
/// [`num_samples`]: ClassificationData::num_samples
/// [`remove_class`]: ClassificationData::remove_class
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationData {
    name: String,
    info: String,
    num_dimensions: usize,
    allow_null_class: bool,
    samples: Vec<ClassificationSample>,
    trackers: Vec<ClassTracker>,
    external_ranges: Vec<MinMax>,
    use_external_ranges: bool,
    folds: FoldState,
}

impl Default for ClassificationData {
    fn default() -> Self {
        Self::new(0)
    }
}

impl ClassificationData {
    /// Creates an empty dataset. `num_dimensions` may be 0, in which case the
    /// first sample defines it.
    pub fn new(num_dimensions: usize) -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            info: String::new(),
            num_dimensions,
            allow_null_class: true,
            samples: Vec::new(),
            trackers: Vec::new(),
            external_ranges: Vec::new(),
            use_external_ranges: false,
            folds: FoldState::NotSetup,
        }
    }

    /// Creates an empty, named dataset.
    pub fn with_name(num_dimensions: usize, name: &str, info: impl Into<String>) -> Result<Self> {
        check_dataset_name(name)?;
        let mut data = Self::new(num_dimensions);
        data.name = name.to_string();
        data.info = info.into();
        Ok(data)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn info(&self) -> &str {
        &self.info
    }

    #[inline]
    pub fn num_dimensions(&self) -> usize {
        self.num_dimensions
    }

    #[inline]
    pub fn num_samples(&self) -> usize {
        self.samples.len()
    }

    #[inline]
    pub fn num_classes(&self) -> usize {
        self.trackers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[ClassificationSample] {
        &self.samples
    }

    pub fn sample(&self, index: usize) -> Option<&ClassificationSample> {
        self.samples.get(index)
    }

    /// Class trackers in ascending label order.
    pub fn trackers(&self) -> &[ClassTracker] {
        &self.trackers
    }

    pub fn class_labels(&self) -> Vec<u32> {
        self.trackers.iter().map(|t| t.label).collect()
    }

    pub fn allow_null_class(&self) -> bool {
        self.allow_null_class
    }

    pub fn fold_state(&self) -> &FoldState {
        &self.folds
    }

    pub fn external_ranges(&self) -> &[MinMax] {
        &self.external_ranges
    }

    pub fn uses_external_ranges(&self) -> bool {
        self.use_external_ranges
    }

    pub fn set_name(&mut self, name: &str) -> Result<()> {
        check_dataset_name(name)?;
        self.name = name.to_string();
        Ok(())
    }

    pub fn set_info(&mut self, info: impl Into<String>) {
        self.info = info.into();
    }

    /// Controls whether samples may carry [`DEFAULT_NULL_CLASS_LABEL`].
    pub fn set_allow_null_class(&mut self, allow: bool) {
        self.allow_null_class = allow;
    }

    /// Sets the dimensionality, dropping every sample, class and external range.
    pub fn set_num_dimensions(&mut self, num_dimensions: usize) -> Result<()> {
        if num_dimensions == 0 {
            return Err(fail(GrtError::validation(
                "set_num_dimensions: the number of dimensions must be greater than zero",
            )));
        }
        self.clear();
        self.num_dimensions = num_dimensions;
        self.use_external_ranges = false;
        self.external_ranges.clear();
        Ok(())
    }

    pub fn set_class_name(&mut self, label: u32, name: impl Into<String>) -> Result<()> {
        let Some(i) = self.class_label_index(label) else {
            return Err(fail(GrtError::validation(format!(
                "set_class_name: there is no class with label {label}"
            ))));
        };
        self.trackers[i].name = name.into();
        Ok(())
    }

    /// Drops every sample and class. Metadata and dimensionality are kept.
    pub fn clear(&mut self) {
        self.samples.clear();
        self.trackers.clear();
        self.folds.invalidate();
    }

    /// Reserves room for `capacity` samples in total.
    pub fn reserve(&mut self, capacity: usize) -> Result<()> {
        let additional = capacity.saturating_sub(self.samples.len());
        self.grow(additional)
    }

    /// Appends a copy of `features` labelled `label`.
    ///
    /// The first sample of an empty dataset may redefine its dimensionality;
    /// afterwards every sample must match it.
    pub fn add_sample(&mut self, label: u32, features: &[f64]) -> Result<()> {
        if features.is_empty() {
            return Err(fail(GrtError::validation(
                "add_sample: a sample needs at least one dimension",
            )));
        }
        if label == DEFAULT_NULL_CLASS_LABEL && !self.allow_null_class {
            return Err(fail(GrtError::validation(format!(
                "add_sample: the class label can not be {DEFAULT_NULL_CLASS_LABEL} while the null class is disabled"
            ))));
        }
        if features.len() != self.num_dimensions {
            if !self.samples.is_empty() {
                return Err(fail(GrtError::validation(format!(
                    "add_sample: the size of the new sample ({}) does not match the number of dimensions of the dataset ({})",
                    features.len(),
                    self.num_dimensions
                ))));
            }
            if self.num_dimensions != 0 {
                warn(format!(
                    "add_sample: the size of the new sample ({}) does not match the number of dimensions of the dataset ({}), setting dimensionality to {}",
                    features.len(),
                    self.num_dimensions,
                    features.len()
                ));
            }
            self.num_dimensions = features.len();
            self.external_ranges.clear();
            self.use_external_ranges = false;
        }

        self.grow(1)?;
        self.push_sample(ClassificationSample::new(label, features.to_vec()));
        Ok(())
    }

    /// Removes the sample at `index`. Its class tracker stays, one count lower.
    pub fn remove_sample(&mut self, index: usize) -> Result<()> {
        if self.samples.is_empty() {
            let msg = "remove_sample: failed to remove sample, the dataset is empty";
            warn(msg);
            return Err(GrtError::validation(msg));
        }
        if index >= self.samples.len() {
            return Err(fail(GrtError::validation(format!(
                "remove_sample: index {index} is out of bounds for {} samples",
                self.samples.len()
            ))));
        }
        self.folds.invalidate();
        let removed = self.samples.remove(index);
        if let Some(i) = self.class_label_index(removed.label) {
            self.trackers[i].counter -= 1;
        }
        Ok(())
    }

    pub fn remove_last_sample(&mut self) -> Result<()> {
        match self.samples.len() {
            0 => {
                let msg = "remove_last_sample: failed to remove sample, the dataset is empty";
                warn(msg);
                Err(GrtError::validation(msg))
            }
            n => self.remove_sample(n - 1),
        }
    }

    /// Registers `label` with no samples.
    pub fn add_class(&mut self, label: u32, name: impl Into<String>) -> Result<()> {
        match self.trackers.binary_search_by_key(&label, |t| t.label) {
            Ok(_) => Err(fail(GrtError::validation(format!(
                "add_class: failed to add class, it already exists! Class label: {label}"
            )))),
            Err(i) => {
                self.folds.invalidate();
                self.trackers.insert(i, ClassTracker::new(label, 0, name));
                Ok(())
            }
        }
    }

    /// Drops `label` and all of its samples. Returns the number of samples removed.
    pub fn remove_class(&mut self, label: u32) -> usize {
        self.folds.invalidate();
        let Some(i) = self.class_label_index(label) else {
            warn(format!("remove_class: there is no class with label {label}"));
            return 0;
        };
        self.trackers.remove(i);
        let before = self.samples.len();
        self.samples.retain(|s| s.label != label);
        before - self.samples.len()
    }

    /// Moves every sample of `old` to `new`.
    ///
    /// An existing `new` tracker absorbs the count; otherwise the old tracker
    /// is carried over under the new label, name included.
    pub fn relabel(&mut self, old: u32, new: u32) -> Result<()> {
        let Some(old_index) = self.class_label_index(old) else {
            return Err(fail(GrtError::validation(format!(
                "relabel: there is no class with label {old}"
            ))));
        };
        if old == new {
            return Ok(());
        }
        if new == DEFAULT_NULL_CLASS_LABEL && !self.allow_null_class {
            return Err(fail(GrtError::validation(
                "relabel: can not relabel into the null class while it is disabled",
            )));
        }

        self.folds.invalidate();
        for sample in self.samples.iter_mut().filter(|s| s.label == old) {
            sample.label = new;
        }
        let moved = self.trackers.remove(old_index);
        match self.trackers.binary_search_by_key(&new, |t| t.label) {
            Ok(i) => self.trackers[i].counter += moved.counter,
            Err(i) => self
                .trackers
                .insert(i, ClassTracker::new(new, moved.counter, moved.name)),
        }
        Ok(())
    }

    /// Appends every sample of `other` and takes over its class names.
    pub fn merge(&mut self, other: &ClassificationData) -> Result<()> {
        if other.num_dimensions != self.num_dimensions {
            return Err(fail(GrtError::validation(format!(
                "merge: the dimensionality of the other dataset ({}) does not match this dataset ({})",
                other.num_dimensions, self.num_dimensions
            ))));
        }
        if !self.allow_null_class
            && other.samples.iter().any(|s| s.label == DEFAULT_NULL_CLASS_LABEL)
        {
            return Err(fail(GrtError::validation(
                "merge: the other dataset holds null class samples but the null class is disabled",
            )));
        }

        self.grow(other.samples.len())?;
        self.folds.invalidate();
        for sample in &other.samples {
            self.push_sample(sample.clone());
        }
        for tracker in &other.trackers {
            match self.trackers.binary_search_by_key(&tracker.label, |t| t.label) {
                Ok(i) => self.trackers[i].name.clone_from(&tracker.name),
                Err(i) => self
                    .trackers
                    .insert(i, ClassTracker::new(tracker.label, 0, tracker.name.clone())),
            }
        }
        Ok(())
    }

    /// Copies out every sample labelled `label`.
    pub fn class_data(&self, label: u32) -> Result<ClassificationData> {
        let Some(i) = self.class_label_index(label) else {
            return Err(fail(GrtError::validation(format!(
                "class_data: there is no class with label {label}"
            ))));
        };
        let mut out = self.empty_like();
        out.grow(self.trackers[i].counter)?;
        for sample in self.samples.iter().filter(|s| s.label == label) {
            out.push_sample(sample.clone());
        }
        if let Some(j) = out.class_label_index(label) {
            out.trackers[j].name.clone_from(&self.trackers[i].name);
        }
        Ok(out)
    }

    /// Position of `label` in [`trackers`](Self::trackers).
    pub fn class_label_index(&self, label: u32) -> Option<usize> {
        self.trackers
            .binary_search_by_key(&label, |t| t.label)
            .ok()
    }

    /// Installs external per-dimension ranges used by [`ranges`](Self::ranges).
    pub fn set_external_ranges(&mut self, ranges: Vec<MinMax>, use_external: bool) -> Result<()> {
        if ranges.len() != self.num_dimensions {
            return Err(fail(GrtError::validation(format!(
                "set_external_ranges: {} ranges do not match {} dimensions",
                ranges.len(),
                self.num_dimensions
            ))));
        }
        self.external_ranges = ranges;
        self.use_external_ranges = use_external;
        Ok(())
    }

    pub fn enable_external_range_scaling(&mut self, enable: bool) -> Result<()> {
        if self.external_ranges.len() != self.num_dimensions {
            return Err(fail(GrtError::validation(
                "enable_external_range_scaling: no external ranges have been set",
            )));
        }
        self.use_external_ranges = enable;
        Ok(())
    }

    /// Per-dimension `(min, max)`, or the external ranges when enabled.
    ///
    /// An empty dataset yields one zeroed range per dimension.
    pub fn ranges(&self) -> Vec<MinMax> {
        if self.use_external_ranges {
            return self.external_ranges.clone();
        }
        let Some((first, rest)) = self.samples.split_first() else {
            return vec![MinMax::default(); self.num_dimensions];
        };
        let mut ranges: Vec<MinMax> = first.features.iter().map(|&x| MinMax::new(x, x)).collect();
        for sample in rest {
            for (range, &x) in ranges.iter_mut().zip(&sample.features) {
                range.update(x);
            }
        }
        ranges
    }

    /// Scales every dimension from [`ranges`](Self::ranges) into `[min_target, max_target]`.
    pub fn scale(&mut self, min_target: f64, max_target: f64) -> Result<()> {
        let ranges = self.ranges();
        self.scale_with_ranges(&ranges, min_target, max_target)
    }

    pub fn scale_with_ranges(
        &mut self,
        ranges: &[MinMax],
        min_target: f64,
        max_target: f64,
    ) -> Result<()> {
        if ranges.len() != self.num_dimensions {
            return Err(fail(GrtError::validation(format!(
                "scale: {} ranges do not match {} dimensions",
                ranges.len(),
                self.num_dimensions
            ))));
        }
        self.folds.invalidate();
        for sample in &mut self.samples {
            for (x, range) in sample.features.iter_mut().zip(ranges) {
                *x = stats::scale(*x, range.min, range.max, min_target, max_target, false);
            }
        }
        Ok(())
    }

    /// Copies the features into a `samples x dimensions` matrix.
    pub fn to_matrix(&self) -> Result<MatrixFloat> {
        if self.samples.is_empty() {
            return Ok(MatrixFloat::new());
        }
        let mut m = MatrixFloat::with_size(self.samples.len(), self.num_dimensions)?;
        for (i, sample) in self.samples.iter().enumerate() {
            m.set_row_vector(&sample.features, i)?;
        }
        Ok(m)
    }

    /// Keeps `percent`% of the samples in `self` and returns the rest.
    ///
    /// With `stratified` every class is split on its own, so each class keeps
    /// its proportion in both halves. Both halves keep the full class list,
    /// even for classes that end up with no samples on one side.
    pub fn split(
        &mut self,
        percent: u32,
        stratified: bool,
        rng: &mut Random,
    ) -> Result<ClassificationData> {
        partition::check_percentage(percent)?;
        if self.samples.is_empty() {
            return Err(fail(GrtError::validation("split: the dataset is empty")));
        }

        let mut train = self.with_all_classes();
        let mut test = self.with_all_classes();

        if stratified {
            let mut groups = self.class_groups();
            for group in &mut groups {
                rng.shuffle(group);
            }
            let train_size = groups
                .iter()
                .map(|g| partition::split_point(g.len(), percent))
                .sum::<usize>();
            train.grow(train_size)?;
            test.grow(self.samples.len() - train_size)?;
            for group in &groups {
                let cut = partition::split_point(group.len(), percent);
                train.extend_from(self, &group[..cut]);
                test.extend_from(self, &group[cut..]);
            }
        } else {
            let indices = partition::shuffled_indices(self.samples.len(), rng);
            let cut = partition::split_point(indices.len(), percent);
            train.grow(cut)?;
            test.grow(indices.len() - cut)?;
            train.extend_from(self, &indices[..cut]);
            test.extend_from(self, &indices[cut..]);
        }

        *self = train;
        Ok(test)
    }

    /// Partitions the sample indices into `k` folds for cross validation.
    ///
    /// Stratified folds deal each class round-robin across the folds and need
    /// at least `k` samples in every class, including classes registered with
    /// [`add_class`](Self::add_class) that hold none yet. On failure the previous
    /// fold state is kept.
    pub fn setup_k_folds(&mut self, k: usize, stratified: bool, rng: &mut Random) -> Result<()> {
        partition::check_k(k, self.samples.len())?;
        let folds = if stratified {
            if let Some(t) = self.trackers.iter().find(|t| k > t.counter) {
                return Err(fail(GrtError::validation(format!(
                    "setup_k_folds: K ({k}) can not be larger than the number of samples in class {} ({})",
                    t.label, t.counter
                ))));
            }
            partition::stratified_folds(self.class_groups(), k, rng)
        } else {
            partition::unstratified_folds(self.samples.len(), k, rng)
        };
        self.folds = FoldState::Ready { k, folds };
        Ok(())
    }

    /// Every fold except `fold`.
    pub fn training_fold(&self, fold: usize) -> Result<ClassificationData> {
        let folds = self.folds.checked(fold, "training_fold")?;
        let mut out = self.with_all_classes();
        let size = folds.iter().map(Vec::len).sum::<usize>() - folds[fold].len();
        out.grow(size)?;
        for index in partition::training_indices(folds, fold) {
            out.push_sample(self.samples[index].clone());
        }
        Ok(out)
    }

    /// Fold `fold` alone.
    pub fn test_fold(&self, fold: usize) -> Result<ClassificationData> {
        let folds = self.folds.checked(fold, "test_fold")?;
        let mut out = self.with_all_classes();
        out.grow(folds[fold].len())?;
        out.extend_from(self, &folds[fold]);
        Ok(out)
    }

    /// Draws `n` samples with replacement; `n == 0` draws [`num_samples`](Self::num_samples).
    ///
    /// `balanced` cycles through the non-empty classes, drawing
    /// `max(1, n / classes)` samples from each before moving on, so the result
    /// is close to evenly split whatever the source balance.
    pub fn bootstrap(&self, n: usize, balanced: bool, rng: &mut Random) -> Result<ClassificationData> {
        if self.samples.is_empty() {
            return Err(fail(GrtError::validation(
                "bootstrap: can not resample an empty dataset",
            )));
        }
        let n = if n == 0 { self.samples.len() } else { n };
        let mut out = self.with_all_classes();
        out.grow(n)?;

        if balanced {
            let groups: Vec<Vec<usize>> = self
                .class_groups()
                .into_iter()
                .filter(|g| !g.is_empty())
                .collect();
            let per_class = (n / groups.len()).max(1);
            let mut class = 0;
            let mut drawn = 0;
            for _ in 0..n {
                let group = &groups[class];
                let index = group[rng.index(group.len())];
                out.push_sample(self.samples[index].clone());
                drawn += 1;
                if drawn == per_class {
                    drawn = 0;
                    class = (class + 1) % groups.len();
                }
            }
        } else {
            for _ in 0..n {
                let index = rng.index(self.samples.len());
                out.push_sample(self.samples[index].clone());
            }
        }
        Ok(out)
    }

    /// Sample indices grouped by class, in tracker order.
    fn class_groups(&self) -> Vec<Vec<usize>> {
        let mut groups: Vec<Vec<usize>> = self
            .trackers
            .iter()
            .map(|t| Vec::with_capacity(t.counter))
            .collect();
        for (i, sample) in self.samples.iter().enumerate() {
            if let Some(k) = self.class_label_index(sample.label) {
                groups[k].push(i);
            }
        }
        groups
    }

    /// An empty dataset with the same settings and metadata.
    fn empty_like(&self) -> Self {
        Self {
            name: self.name.clone(),
            info: self.info.clone(),
            num_dimensions: self.num_dimensions,
            allow_null_class: self.allow_null_class,
            samples: Vec::new(),
            trackers: Vec::new(),
            external_ranges: self.external_ranges.clone(),
            use_external_ranges: self.use_external_ranges,
            folds: FoldState::NotSetup,
        }
    }

    /// [`empty_like`](Self::empty_like) plus every class of `self` with a zero count.
    fn with_all_classes(&self) -> Self {
        let mut out = self.empty_like();
        out.trackers = self
            .trackers
            .iter()
            .map(|t| ClassTracker::new(t.label, 0, t.name.clone()))
            .collect();
        out
    }

    fn extend_from(&mut self, source: &ClassificationData, indices: &[usize]) {
        for &i in indices {
            self.push_sample(source.samples[i].clone());
        }
    }

    /// Appends an already validated sample and counts it.
    fn push_sample(&mut self, sample: ClassificationSample) {
        self.folds.invalidate();
        match self.trackers.binary_search_by_key(&sample.label, |t| t.label) {
            Ok(i) => self.trackers[i].counter += 1,
            Err(i) => self.trackers.insert(i, ClassTracker::first_sample(sample.label)),
        }
        self.samples.push(sample);
    }

    /// Reserves sample slots; on failure the dataset is cleared.
    fn grow(&mut self, additional: usize) -> Result<()> {
        if let Err(err) = try_reserve(&mut self.samples, additional, self.num_dimensions) {
            self.clear();
            return Err(err);
        }
        Ok(())
    }
}

impl Index<usize> for ClassificationData {
    type Output = ClassificationSample;

    fn index(&self, i: usize) -> &ClassificationSample {
        &self.samples[i]
    }
}

impl fmt::Display for ClassificationData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "DatasetName:\t{}", self.name)?;
        writeln!(f, "DatasetInfo:\t{}", self.info)?;
        writeln!(f, "Number of Dimensions:\t{}", self.num_dimensions)?;
        writeln!(f, "Number of Samples:\t{}", self.samples.len())?;
        writeln!(f, "Number of Classes:\t{}", self.trackers.len())?;
        writeln!(f, "ClassStats:")?;
        for t in &self.trackers {
            writeln!(
                f,
                "ClassLabel:\t{}\tNumber of Samples:\t{}\tClassName:\t{}",
                t.label, t.counter, t.name
            )?;
        }
        writeln!(f, "Dataset Ranges:")?;
        for (j, range) in self.ranges().iter().enumerate() {
            writeln!(f, "[{}] Min:\t{}\tMax: {}", j + 1, range.min, range.max)?;
        }
        Ok(())
    }
}
