//! Settings shared by anything that trains on the datasets in this crate.
//!
//! Nothing here is read from the environment or from files; callers build
//! the structs directly, usually starting from `Default`.

use crate::data::ClassificationData;
use crate::error::{GrtError, Result};
use crate::random::Random;
use crate::report::fail;
use crate::stats::MinMax;

/// What kind of component a configuration belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BaseType {
    #[default]
    NotSet,
    Classifier,
    Regressifier,
    Clusterer,
    PreProcessing,
    PostProcessing,
    FeatureExtraction,
    Context,
}

/// Min-max scaling applied to training data before it is used.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScalingConfig {
    pub use_scaling: bool,
    pub min_target: f64,
    pub max_target: f64,
}

impl Default for ScalingConfig {
    fn default() -> Self {
        Self {
            use_scaling: false,
            min_target: 0.0,
            max_target: 1.0,
        }
    }
}

impl ScalingConfig {
    pub fn validate(&self) -> Result<()> {
        if self.min_target.partial_cmp(&self.max_target) != Some(core::cmp::Ordering::Less) {
            return Err(fail(GrtError::validation(format!(
                "scaling: min_target ({}) must be smaller than max_target ({})",
                self.min_target, self.max_target
            ))));
        }
        Ok(())
    }

    /// Scales `data` when scaling is enabled and returns the source ranges, so
    /// later inputs can be mapped the same way. Returns `None` when disabled.
    pub fn apply(&self, data: &mut ClassificationData) -> Result<Option<Vec<MinMax>>> {
        if !self.use_scaling {
            return Ok(None);
        }
        self.validate()?;
        let ranges = data.ranges();
        data.scale_with_ranges(&ranges, self.min_target, self.max_target)?;
        Ok(Some(ranges))
    }
}

/// Training-loop settings.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingConfig {
    pub base_type: BaseType,
    pub scaling: ScalingConfig,
    pub min_num_epochs: u32,
    pub max_num_epochs: u32,
    pub batch_size: u32,
    pub learning_rate: f64,
    pub min_change: f64,
    pub use_validation_set: bool,
    /// Share of the training data held out for validation, in percent.
    pub validation_set_size: u32,
    pub randomise_training_order: bool,
    pub num_restarts: u32,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            base_type: BaseType::NotSet,
            scaling: ScalingConfig::default(),
            min_num_epochs: 0,
            max_num_epochs: 100,
            batch_size: 1,
            learning_rate: 0.1,
            min_change: 1.0e-5,
            use_validation_set: false,
            validation_set_size: 20,
            randomise_training_order: true,
            num_restarts: 1,
        }
    }
}

impl TrainingConfig {
    pub fn validate(&self) -> Result<()> {
        let problem = if self.max_num_epochs == 0 {
            Some("max_num_epochs must be greater than zero".to_string())
        } else if self.min_num_epochs > self.max_num_epochs {
            Some(format!(
                "min_num_epochs ({}) can not exceed max_num_epochs ({})",
                self.min_num_epochs, self.max_num_epochs
            ))
        } else if self.batch_size == 0 {
            Some("batch_size must be greater than zero".to_string())
        } else if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            Some(format!("learning_rate ({}) must be positive", self.learning_rate))
        } else if !(self.min_change.is_finite() && self.min_change >= 0.0) {
            Some(format!("min_change ({}) can not be negative", self.min_change))
        } else if self.use_validation_set && !(1..100).contains(&self.validation_set_size) {
            Some(format!(
                "validation_set_size ({}) must be a percentage in 1..100",
                self.validation_set_size
            ))
        } else {
            None
        };
        if let Some(problem) = problem {
            return Err(fail(GrtError::validation(format!("training config: {problem}"))));
        }
        if self.scaling.use_scaling {
            self.scaling.validate()?;
        }
        Ok(())
    }

    /// Carves the validation set off `data` when one is configured.
    ///
    /// `data` keeps `100 - validation_set_size` percent of its samples and
    /// the held-out part is returned.
    pub fn split_validation_set(
        &self,
        data: &mut ClassificationData,
        stratified: bool,
        rng: &mut Random,
    ) -> Result<Option<ClassificationData>> {
        if !self.use_validation_set {
            return Ok(None);
        }
        self.validate()?;
        data.split(100 - self.validation_set_size, stratified, rng)
            .map(Some)
    }
}
