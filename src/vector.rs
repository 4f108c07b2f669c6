//! 1-D containers.
//!
//! A `Vector<T>` is a plain `Vec<T>`: ordered, resizable, owning its buffer.
//! The extension traits add the fill/shuffle helpers every container needs
//! and the statistics and scaling used on feature vectors.

use crate::error::{GrtError, Result};
use crate::random::Random;
use crate::report::fail;
use crate::stats::{self, MinMax};

pub type Vector<T> = Vec<T>;

/// A vector of `f64` features.
pub type VectorFloat = Vector<f64>;

/// Fill and shuffle helpers for any vector.
pub trait VectorExt<T> {
    /// Sets every element to `value`. Fails on an empty vector.
    fn set_all(&mut self, value: T) -> Result<()>;

    /// Fisher-Yates shuffle driven by `rng`.
    fn shuffle_with(&mut self, rng: &mut Random);

    /// Shuffles with a fresh generator seeded from `seed` (0 seeds from the clock).
    fn shuffle_seeded(&mut self, seed: u64);
}

impl<T: Clone> VectorExt<T> for Vec<T> {
    fn set_all(&mut self, value: T) -> Result<()> {
        if self.is_empty() {
            return Err(fail(GrtError::validation("set_all: the vector is empty")));
        }
        self.fill(value);
        Ok(())
    }

    fn shuffle_with(&mut self, rng: &mut Random) {
        rng.shuffle(self);
    }

    fn shuffle_seeded(&mut self, seed: u64) {
        Random::new(seed).shuffle(self);
    }
}

/// Statistics and linear scaling over a feature vector.
pub trait VectorFloatExt {
    /// Smallest element, `+inf` when empty.
    fn min_value(&self) -> f64;

    /// Largest element, `-inf` when empty.
    fn max_value(&self) -> f64;

    /// Arithmetic mean, `NaN` when empty.
    fn mean(&self) -> f64;

    /// Sample standard deviation with the `n - 1` divisor, `0` when empty.
    fn std_dev(&self) -> f64;

    /// Range of the values, `None` when empty.
    fn min_max(&self) -> Option<MinMax>;

    /// Maps the vector from its own range into `[min_target, max_target]`.
    fn scale(&mut self, min_target: f64, max_target: f64, constrain: bool) -> Result<()>;

    /// Maps every element from `[min_source, max_source]` into `[min_target, max_target]`.
    fn scale_from(
        &mut self,
        min_source: f64,
        max_source: f64,
        min_target: f64,
        max_target: f64,
        constrain: bool,
    ) -> Result<()>;
}

impl VectorFloatExt for [f64] {
    fn min_value(&self) -> f64 {
        self.iter().copied().fold(f64::INFINITY, f64::min)
    }

    fn max_value(&self) -> f64 {
        self.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    fn mean(&self) -> f64 {
        self.iter().sum::<f64>() / self.len() as f64
    }

    fn std_dev(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        let mean = self.mean();
        let ss: f64 = self.iter().map(|x| (x - mean) * (x - mean)).sum();
        (ss / (self.len() as f64 - 1.0)).sqrt()
    }

    fn min_max(&self) -> Option<MinMax> {
        let (first, rest) = self.split_first()?;
        let mut range = MinMax::new(*first, *first);
        for &x in rest {
            range.update(x);
        }
        Some(range)
    }

    fn scale(&mut self, min_target: f64, max_target: f64, constrain: bool) -> Result<()> {
        let Some(range) = self.min_max() else {
            return Err(fail(GrtError::validation("scale: the vector is empty")));
        };
        self.scale_from(range.min, range.max, min_target, max_target, constrain)
    }

    fn scale_from(
        &mut self,
        min_source: f64,
        max_source: f64,
        min_target: f64,
        max_target: f64,
        constrain: bool,
    ) -> Result<()> {
        if self.is_empty() {
            return Err(fail(GrtError::validation("scale: the vector is empty")));
        }
        for x in self.iter_mut() {
            *x = stats::scale(*x, min_source, max_source, min_target, max_target, constrain);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn set_all_rejects_empty() {
        let mut v: Vector<u32> = Vec::new();
        assert!(v.set_all(3).is_err());
        let mut v = vec![1, 2, 3];
        v.set_all(9).unwrap();
        assert_eq!(v, vec![9, 9, 9]);
    }

    #[test]
    fn summary_statistics() {
        let v: VectorFloat = vec![2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_eq!(v.min_value(), 2.0);
        assert_eq!(v.max_value(), 9.0);
        assert_abs_diff_eq!(v.mean(), 5.0);
        assert_abs_diff_eq!(v.std_dev(), (32.0f64 / 7.0).sqrt(), epsilon = 1e-12);
        assert_eq!(v.min_max(), Some(MinMax::new(2.0, 9.0)));
        assert_eq!(Vec::<f64>::new().min_max(), None);
    }

    #[test]
    fn scale_maps_own_range_onto_target() {
        let mut v: VectorFloat = vec![0.0, 5.0, 10.0];
        v.scale(-1.0, 1.0, true).unwrap();
        assert_eq!(v, vec![-1.0, 0.0, 1.0]);
    }

    #[test]
    fn seeded_shuffle_is_reproducible() {
        let mut a: Vector<usize> = (0..50).collect();
        let mut b = a.clone();
        a.shuffle_seeded(11);
        b.shuffle_seeded(11);
        assert_eq!(a, b);
        a.sort_unstable();
        assert_eq!(a, (0..50).collect::<Vec<_>>());
    }
}
