//! Statistics and min-max scaling.
//!
//! Every scaling routine in the crate, for vectors, matrices and datasets,
//! funnels through the scalar [`scale`] so that the clamping and
//! degenerate-range rules are identical everywhere.
//!
//! Column statistics on [`MatrixFloat`] follow the usual conventions:
//! standard deviation and covariance use the unbiased `n - 1` divisor, which
//! makes them `NaN` for a single-row matrix.

use crate::error::{GrtError, Result};
use crate::matrix::MatrixFloat;
use crate::report::fail;

/// A `(min, max)` pair that only ever widens.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MinMax {
    pub min: f64,
    pub max: f64,
}

impl MinMax {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Widens the range to include `x`. Returns `true` if the range changed.
    ///
    /// Start from the first observed value, otherwise the initial bounds leak
    /// into the result.
    pub fn update(&mut self, x: f64) -> bool {
        if x < self.min {
            self.min = x;
            return true;
        }
        if x > self.max {
            self.max = x;
            return true;
        }
        false
    }
}

/// Maps `x` from `[min_source, max_source]` onto `[min_target, max_target]`.
///
/// With `constrain`, values outside the source range snap to the matching
/// target bound. A degenerate source range maps everything to `min_target`.
///
/// ```
/// use grt_core::stats::scale;
/// assert_eq!(scale(50.0, 0.0, 100.0, -1.0, 1.0, true), 0.0);
/// assert_eq!(scale(150.0, 0.0, 100.0, -1.0, 1.0, true), 1.0);
/// assert_eq!(scale(150.0, 0.0, 100.0, -1.0, 1.0, false), 2.0);
/// ```
#[inline]
pub fn scale(
    x: f64,
    min_source: f64,
    max_source: f64,
    min_target: f64,
    max_target: f64,
    constrain: bool,
) -> f64 {
    if constrain {
        if x <= min_source {
            return min_target;
        }
        if x >= max_source {
            return max_target;
        }
    }
    if min_source == max_source {
        return min_target;
    }
    (x - min_source) * (max_target - min_target) / (max_source - min_source) + min_target
}

impl MatrixFloat {
    /// Smallest element of the whole buffer, `+inf` when empty.
    pub fn min_value(&self) -> f64 {
        self.data().iter().copied().fold(f64::INFINITY, f64::min)
    }

    /// Largest element of the whole buffer, `-inf` when empty.
    pub fn max_value(&self) -> f64 {
        self.data().iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    /// Mean of each column.
    pub fn mean(&self) -> Vec<f64> {
        let (rows, cols) = (self.num_rows(), self.num_cols());
        let mut mean = vec![0.0; cols];
        for row in self.rows_iter() {
            for (m, x) in mean.iter_mut().zip(row) {
                *m += x;
            }
        }
        mean.iter_mut().for_each(|m| *m /= rows as f64);
        mean
    }

    /// Sample standard deviation of each column.
    pub fn std_dev(&self) -> Vec<f64> {
        let mean = self.mean();
        let mut std_dev = vec![0.0; self.num_cols()];
        for row in self.rows_iter() {
            for ((s, x), m) in std_dev.iter_mut().zip(row).zip(&mean) {
                *s += (x - m) * (x - m);
            }
        }
        let denom = self.num_rows() as f64 - 1.0;
        std_dev.iter_mut().for_each(|s| *s = (*s / denom).sqrt());
        std_dev
    }

    /// Symmetric `cols x cols` sample covariance matrix.
    pub fn covariance_matrix(&self) -> Result<MatrixFloat> {
        let cols = self.num_cols();
        if cols == 0 {
            return Err(fail(GrtError::validation(
                "covariance_matrix: the matrix is empty",
            )));
        }
        let mean = self.mean();
        let denom = self.num_rows() as f64 - 1.0;
        let mut cov = MatrixFloat::with_size(cols, cols)?;
        for j in 0..cols {
            for k in j..cols {
                let sum: f64 = self
                    .rows_iter()
                    .map(|row| (row[j] - mean[j]) * (row[k] - mean[k]))
                    .sum();
                cov[(j, k)] = sum / denom;
                cov[(k, j)] = sum / denom;
            }
        }
        Ok(cov)
    }

    /// Per-column `(min, max)`; empty when the matrix has no rows.
    pub fn ranges(&self) -> Vec<MinMax> {
        let mut rows = self.rows_iter();
        let Some(first) = rows.next() else {
            return Vec::new();
        };
        let mut ranges: Vec<MinMax> = first.iter().map(|&x| MinMax::new(x, x)).collect();
        for row in rows {
            for (range, &x) in ranges.iter_mut().zip(row) {
                range.update(x);
            }
        }
        ranges
    }

    /// Sum of the first `min(rows, cols)` diagonal entries.
    pub fn trace(&self) -> f64 {
        let k = self.num_rows().min(self.num_cols());
        (0..k).map(|i| self[(i, i)]).sum()
    }

    /// Replaces the matrix with its `cols x rows` transpose.
    pub fn transpose(&mut self) -> Result<()> {
        if self.is_empty() {
            return Err(fail(GrtError::validation("transpose: the matrix is empty")));
        }
        let (rows, cols) = (self.num_rows(), self.num_cols());
        let mut temp = MatrixFloat::with_size(cols, rows)?;
        for i in 0..rows {
            for j in 0..cols {
                temp[(j, i)] = self[(i, j)];
            }
        }
        self.copy_from(&temp)
    }

    /// Normalizes each row to zero mean and unit variance.
    ///
    /// Rows are divided by `sqrt(variance + alpha)`, so `alpha` keeps
    /// near-constant rows finite.
    pub fn znorm(&mut self, alpha: f64) -> Result<()> {
        if self.is_empty() {
            return Err(fail(GrtError::validation("znorm: the matrix is empty")));
        }
        let cols = self.num_cols();
        for row in self.data_mut().chunks_exact_mut(cols) {
            let mean = row.iter().sum::<f64>() / cols as f64;
            let var = row.iter().map(|x| (x - mean) * (x - mean)).sum::<f64>() / cols as f64;
            let std = (var + alpha).sqrt();
            row.iter_mut().for_each(|x| *x = (*x - mean) / std);
        }
        Ok(())
    }

    /// Scales every column from its own range into `[min_target, max_target]`.
    pub fn scale(&mut self, min_target: f64, max_target: f64) -> Result<()> {
        if self.is_empty() {
            return Err(fail(GrtError::validation("scale: the matrix is empty")));
        }
        let ranges = self.ranges();
        self.scale_with_ranges(&ranges, min_target, max_target)
    }

    /// Scales column `j` from `ranges[j]` into `[min_target, max_target]`.
    pub fn scale_with_ranges(
        &mut self,
        ranges: &[MinMax],
        min_target: f64,
        max_target: f64,
    ) -> Result<()> {
        if self.is_empty() || ranges.len() != self.num_cols() {
            return Err(fail(GrtError::validation(format!(
                "scale: {} ranges do not match {} columns",
                ranges.len(),
                self.num_cols()
            ))));
        }
        let cols = self.num_cols();
        for row in self.data_mut().chunks_exact_mut(cols) {
            for (x, range) in row.iter_mut().zip(ranges) {
                *x = scale(*x, range.min, range.max, min_target, max_target, false);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix;
    use approx::assert_abs_diff_eq;

    #[test]
    fn scale_clamps_and_extrapolates() {
        assert_eq!(scale(50.0, 0.0, 100.0, -1.0, 1.0, true), 0.0);
        assert_eq!(scale(150.0, 0.0, 100.0, -1.0, 1.0, true), 1.0);
        assert_eq!(scale(-10.0, 0.0, 100.0, -1.0, 1.0, true), -1.0);
        assert_eq!(scale(150.0, 0.0, 100.0, -1.0, 1.0, false), 2.0);
        assert_eq!(scale(3.0, 5.0, 5.0, 10.0, 20.0, false), 10.0);
    }

    #[test]
    fn min_max_only_widens() {
        let mut r = MinMax::new(1.0, 1.0);
        assert!(r.update(3.0));
        assert!(r.update(-2.0));
        assert!(!r.update(0.5));
        assert_eq!(r, MinMax::new(-2.0, 3.0));
    }

    #[test]
    fn column_statistics() {
        let m = matrix![[1.0, 2.0], [3.0, 6.0], [5.0, 10.0]];
        assert_eq!(m.mean(), vec![3.0, 6.0]);
        let sd = m.std_dev();
        assert_abs_diff_eq!(sd[0], 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(sd[1], 4.0, epsilon = 1e-12);
        assert_eq!(m.min_value(), 1.0);
        assert_eq!(m.max_value(), 10.0);
        assert_eq!(m.ranges(), vec![MinMax::new(1.0, 5.0), MinMax::new(2.0, 10.0)]);
    }

    #[test]
    fn covariance_is_symmetric_with_variances_on_the_diagonal() {
        let m = matrix![[1.0, 2.0, 0.0], [3.0, 6.0, 1.0], [5.0, 10.0, -1.0]];
        let cov = m.covariance_matrix().unwrap();
        assert_eq!((cov.num_rows(), cov.num_cols()), (3, 3));
        let sd = m.std_dev();
        for j in 0..3 {
            assert_abs_diff_eq!(cov[(j, j)], sd[j] * sd[j], epsilon = 1e-12);
            for k in 0..3 {
                assert_eq!(cov[(j, k)], cov[(k, j)]);
            }
        }
        assert_abs_diff_eq!(cov[(0, 1)], 8.0, epsilon = 1e-12);
    }

    #[test]
    fn trace_uses_the_short_diagonal() {
        let m = matrix![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]];
        assert_eq!(m.trace(), 6.0);
    }

    #[test]
    fn transpose_swaps_shape() {
        let mut m = matrix![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]];
        m.transpose().unwrap();
        assert_eq!(m, matrix![[1.0, 4.0], [2.0, 5.0], [3.0, 6.0]]);
    }

    #[test]
    fn znorm_centres_rows() {
        let mut m = matrix![[1.0, 2.0, 3.0], [10.0, 10.0, 10.0]];
        m.znorm(1e-9).unwrap();
        let row0 = m.row(0);
        assert_abs_diff_eq!(row0.iter().sum::<f64>(), 0.0, epsilon = 1e-12);
        assert_eq!(m.row(1), vec![0.0, 0.0, 0.0]);
        let mut flat = matrix![[4.0, 4.0]];
        flat.znorm(0.001).unwrap();
        assert_eq!(flat.row(0), vec![0.0, 0.0]);
    }

    #[test]
    fn scale_maps_each_column_independently() {
        let mut m = matrix![[0.0, 10.0], [5.0, 20.0], [10.0, 30.0]];
        m.scale(0.0, 1.0).unwrap();
        assert_eq!(m.col(0), vec![0.0, 0.5, 1.0]);
        assert_eq!(m.col(1), vec![0.0, 0.5, 1.0]);
        assert!(m.scale_with_ranges(&[MinMax::new(0.0, 1.0)], 0.0, 1.0).is_err());
    }
}
