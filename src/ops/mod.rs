//! # Matrix Arithmetic
//!
//! Checked arithmetic on [`MatrixFloat`]. Every entry point validates shapes
//! first and only then touches memory, so a mismatch never leaves a
//! half-written result behind.
//!
//! ## Operations
//!
//! - [`MatrixFloat::multiply_scalar`]: `d = this * value`
//! - [`MatrixFloat::multiply_vector`]: `y = this * x`
//! - [`MatrixFloat::multiply`]: `c = this * b`
//! - [`MatrixFloat::multiply_into`]: `this = a * b` or `this = a' * b`
//! - [`MatrixFloat::add`] / [`MatrixFloat::subtract`]: in place
//! - [`MatrixFloat::add_into`] / [`MatrixFloat::subtract_into`]: `this = a ± b`
//!
//! The raw kernels are in [`cpu`].
//!
//! ## Example
//! ```rust
//! use grt_core::matrix;
//! let a = matrix![[1.0, 2.0], [3.0, 4.0]];
//! let b = matrix![[0.0, 1.0], [1.0, 0.0]];
//! let c = a.multiply(&b).unwrap();
//! assert_eq!(c, matrix![[2.0, 1.0], [4.0, 3.0]]);
//! ```

pub mod cpu;

use crate::error::{GrtError, Result};
use crate::matrix::MatrixFloat;
use crate::report::fail;

fn shape(m: &MatrixFloat) -> (usize, usize) {
    (m.num_rows(), m.num_cols())
}

impl MatrixFloat {
    /// Returns a new matrix with every element multiplied by `value`.
    pub fn multiply_scalar(&self, value: f64) -> MatrixFloat {
        let mut out = self.clone();
        out.data_mut().iter_mut().for_each(|x| *x *= value);
        out
    }

    /// Multiplies this `m x n` matrix by a vector of length `n`.
    pub fn multiply_vector(&self, x: &[f64]) -> Result<Vec<f64>> {
        if self.is_empty() || x.len() != self.num_cols() {
            return Err(fail(GrtError::validation(format!(
                "multiply_vector: a vector of length {} does not conform to a {}x{} matrix",
                x.len(),
                self.num_rows(),
                self.num_cols()
            ))));
        }
        Ok(cpu::matvec(self.data(), x, self.num_cols()))
    }

    /// Returns `self * b`.
    pub fn multiply(&self, b: &MatrixFloat) -> Result<MatrixFloat> {
        let (m, n) = shape(self);
        let (k, l) = shape(b);
        if n != k || self.is_empty() || b.is_empty() {
            return Err(fail(GrtError::validation(format!(
                "multiply: the number of rows in b ({k}) does not match the number of columns in this matrix ({n})"
            ))));
        }
        let mut c = MatrixFloat::with_size(m, l)?;
        cpu::matmul(self.data(), b.data(), c.data_mut(), m, n, l);
        Ok(c)
    }

    /// Stores `a * b`, or `a' * b` when `a_transpose` is set, in `self`.
    pub fn multiply_into(
        &mut self,
        a: &MatrixFloat,
        b: &MatrixFloat,
        a_transpose: bool,
    ) -> Result<()> {
        let (m, n) = if a_transpose {
            (a.num_cols(), a.num_rows())
        } else {
            shape(a)
        };
        let (k, l) = shape(b);
        if n != k || a.is_empty() || b.is_empty() {
            return Err(fail(GrtError::validation(format!(
                "multiply_into: the inner dimensions of a ({n}) and b ({k}) do not match"
            ))));
        }
        self.resize(m, l)?;
        if a_transpose {
            cpu::matmul_transposed(a.data(), b.data(), self.data_mut(), m, n, l);
        } else {
            cpu::matmul(a.data(), b.data(), self.data_mut(), m, n, l);
        }
        Ok(())
    }

    /// `self += b`.
    pub fn add(&mut self, b: &MatrixFloat) -> Result<()> {
        self.check_same_shape(b, "add")?;
        cpu::zip_in_place(self.data_mut(), b.data(), |x, y| x + y);
        Ok(())
    }

    /// `self = a + b`.
    pub fn add_into(&mut self, a: &MatrixFloat, b: &MatrixFloat) -> Result<()> {
        a.check_same_shape(b, "add_into")?;
        self.resize(a.num_rows(), a.num_cols())?;
        cpu::zip_into(a.data(), b.data(), self.data_mut(), |x, y| x + y);
        Ok(())
    }

    /// `self -= b`.
    pub fn subtract(&mut self, b: &MatrixFloat) -> Result<()> {
        self.check_same_shape(b, "subtract")?;
        cpu::zip_in_place(self.data_mut(), b.data(), |x, y| x - y);
        Ok(())
    }

    /// `self = a - b`.
    pub fn subtract_into(&mut self, a: &MatrixFloat, b: &MatrixFloat) -> Result<()> {
        a.check_same_shape(b, "subtract_into")?;
        self.resize(a.num_rows(), a.num_cols())?;
        cpu::zip_into(a.data(), b.data(), self.data_mut(), |x, y| x - y);
        Ok(())
    }

    fn check_same_shape(&self, other: &MatrixFloat, op: &str) -> Result<()> {
        if self.is_empty() || shape(self) != shape(other) {
            return Err(fail(GrtError::validation(format!(
                "{op}: a {}x{} matrix does not conform to a {}x{} matrix",
                self.num_rows(),
                self.num_cols(),
                other.num_rows(),
                other.num_cols()
            ))));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::matrix;
    use crate::matrix::MatrixFloat;

    #[test]
    fn multiply_rejects_mismatched_shapes() {
        let a = matrix![[1.0, 2.0, 3.0]];
        let b = matrix![[1.0, 2.0]];
        assert!(a.multiply(&b).is_err());
    }

    #[test]
    fn multiply_into_with_transpose() {
        let a = matrix![[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]];
        let b = matrix![[1.0], [1.0], [1.0]];
        let mut c = MatrixFloat::new();
        c.multiply_into(&a, &b, true).unwrap();
        assert_eq!(c, matrix![[9.0], [12.0]]);
    }

    #[test]
    fn multiply_into_leaves_target_alone_on_mismatch() {
        let a = matrix![[1.0, 2.0]];
        let b = matrix![[1.0, 2.0]];
        let mut c = matrix![[7.0]];
        assert!(c.multiply_into(&a, &b, false).is_err());
        assert_eq!(c, matrix![[7.0]]);
    }

    #[test]
    fn add_and_subtract_in_place() {
        let mut a = matrix![[1.0, 2.0], [3.0, 4.0]];
        let b = matrix![[1.0, 1.0], [1.0, 1.0]];
        a.add(&b).unwrap();
        assert_eq!(a, matrix![[2.0, 3.0], [4.0, 5.0]]);
        a.subtract(&b).unwrap();
        a.subtract(&b).unwrap();
        assert_eq!(a, matrix![[0.0, 1.0], [2.0, 3.0]]);
        assert!(a.add(&matrix![[1.0, 1.0]]).is_err());
        assert_eq!(a, matrix![[0.0, 1.0], [2.0, 3.0]]);
    }

    #[test]
    fn into_variants_resize_the_target() {
        let a = matrix![[1.0, 2.0, 3.0]];
        let b = matrix![[3.0, 2.0, 1.0]];
        let mut c = MatrixFloat::new();
        c.add_into(&a, &b).unwrap();
        assert_eq!(c, matrix![[4.0, 4.0, 4.0]]);
        c.subtract_into(&a, &b).unwrap();
        assert_eq!(c, matrix![[-2.0, 0.0, 2.0]]);
    }

    #[test]
    fn scalar_and_vector_products() {
        let a = matrix![[1.0, 2.0], [3.0, 4.0]];
        assert_eq!(a.multiply_scalar(2.0), matrix![[2.0, 4.0], [6.0, 8.0]]);
        assert_eq!(a.multiply_vector(&[1.0, -1.0]).unwrap(), vec![-1.0, -1.0]);
        assert!(a.multiply_vector(&[1.0]).is_err());
    }
}
