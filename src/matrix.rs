//! Dense row-major matrix container.
//!
//! # Storage
//!
//! A [`Matrix<T>`] keeps `rows * cols` elements in one contiguous buffer,
//! element `(r, c)` living at `r * cols + c`. Alongside the shape it tracks a
//! row `capacity`: the number of rows the buffer has room for.
//!
//! ## Growth
//! - [`Matrix::push_back`] writes into spare rows while `rows < capacity`
//! - once full, the buffer is reallocated with room for exactly one more row
//! - [`Matrix::reserve`] preallocates rows up front for bulk appends
//!
//! ## Failure model
//! - shape and size mismatches return [`GrtError::Validation`] and leave the
//!   matrix untouched
//! - allocation failures reset the matrix to the empty state and return
//!   [`GrtError::Allocation`]
//!
//! ## Example
//!
//! ```rust
//! use grt_core::matrix::Matrix;
//! let mut m: Matrix<f64> = Matrix::with_size(2, 3).unwrap();
//! m[(1, 2)] = 4.0;
//! assert_eq!(m.num_rows(), 2);
//! assert_eq!(m.row(1), vec![0.0, 0.0, 4.0]);
//! ```

use crate::error::{GrtError, Result};
use crate::report::fail;
use core::ops::{Index, IndexMut};

/// A resizable 2-D buffer stored row-major.
#[derive(Debug)]
pub struct Matrix<T> {
    rows: usize,
    cols: usize,
    capacity: usize,
    data: Vec<T>,
}

/// The matrix type every numeric routine works on.
pub type MatrixFloat = Matrix<f64>;

/// Reserves room for exactly `len` elements, reporting failure as an allocation error.
fn allocate<T>(len: usize, rows: usize, cols: usize) -> Result<Vec<T>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|_| GrtError::Allocation { rows, cols })?;
    Ok(buf)
}

impl<T> Matrix<T> {
    /// Creates an empty matrix with no rows, columns or reserved storage.
    pub const fn new() -> Self {
        Self {
            rows: 0,
            cols: 0,
            capacity: 0,
            data: Vec::new(),
        }
    }

    #[inline]
    pub fn num_rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn num_cols(&self) -> usize {
        self.cols
    }

    /// Number of stored elements, always `rows * cols`.
    #[inline]
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Number of rows the buffer can hold before the next reallocation.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Row-major view of the whole buffer.
    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Releases the buffer and resets the shape to `0 x 0`.
    pub fn clear(&mut self) {
        self.rows = 0;
        self.cols = 0;
        self.capacity = 0;
        self.data = Vec::new();
    }

    /// Iterates over the rows as slices.
    pub fn rows_iter(&self) -> impl Iterator<Item = &[T]> {
        // chunks_exact panics on a zero chunk size
        self.data.chunks_exact(self.cols.max(1))
    }
}

impl<T: Clone + Default> Matrix<T> {
    /// Creates a `rows x cols` matrix filled with `T::default()`.
    pub fn with_size(rows: usize, cols: usize) -> Result<Self> {
        let mut m = Self::new();
        m.resize(rows, cols)?;
        Ok(m)
    }

    /// Creates a `rows x cols` matrix with every element set to `value`.
    pub fn filled(rows: usize, cols: usize, value: T) -> Result<Self> {
        let mut m = Self::new();
        m.resize_with_value(rows, cols, value)?;
        Ok(m)
    }

    /// Builds a matrix from a list of equally sized rows.
    ///
    /// An empty list gives an empty matrix; ragged or zero-width rows are rejected.
    pub fn from_rows(rows: &[Vec<T>]) -> Result<Self> {
        let Some(first) = rows.first() else {
            return Ok(Self::new());
        };
        let cols = first.len();
        if cols == 0 {
            return Err(fail(GrtError::validation(
                "from_rows: rows must contain at least one column",
            )));
        }
        if let Some(bad) = rows.iter().position(|r| r.len() != cols) {
            return Err(fail(GrtError::validation(format!(
                "from_rows: row {bad} has {} columns, expected {cols}",
                rows[bad].len()
            ))));
        }

        let mut m = Self::new();
        m.data = allocate(rows.len() * cols, rows.len(), cols)?;
        for r in rows {
            m.data.extend_from_slice(r);
        }
        m.rows = rows.len();
        m.cols = cols;
        m.capacity = rows.len();
        Ok(m)
    }

    /// Resizes to `rows x cols`, discarding every previous value.
    ///
    /// Keeping the current shape is a no-op. A zero dimension is rejected
    /// without touching the matrix. If the new buffer cannot be allocated the
    /// matrix is left empty and [`GrtError::Allocation`] is returned.
    pub fn resize(&mut self, rows: usize, cols: usize) -> Result<()> {
        if rows == 0 || cols == 0 {
            return Err(fail(GrtError::validation(format!(
                "resize: rows and cols must be greater than zero (rows: {rows} cols: {cols})"
            ))));
        }
        if rows == self.rows && cols == self.cols {
            return Ok(());
        }

        self.clear();
        let len = rows
            .checked_mul(cols)
            .ok_or(GrtError::Allocation { rows, cols })
            .map_err(fail)?;
        let mut buf = allocate(len, rows, cols).map_err(fail)?;
        buf.resize(len, T::default());

        self.data = buf;
        self.rows = rows;
        self.cols = cols;
        self.capacity = rows;
        Ok(())
    }

    /// Resizes to `rows x cols` and sets every element to `value`.
    pub fn resize_with_value(&mut self, rows: usize, cols: usize, value: T) -> Result<()> {
        self.resize(rows, cols)?;
        self.set_all(value)
    }

    /// Deep-copies `other` into `self`, reallocating only when the sizes differ.
    pub fn copy_from(&mut self, other: &Matrix<T>) -> Result<()> {
        if other.is_empty() {
            self.clear();
            return Ok(());
        }
        if self.size() != other.size() {
            self.resize(other.rows, other.cols)?;
        }
        self.rows = other.rows;
        self.cols = other.cols;
        // same element count, new shape: the buffer holds exactly `rows` rows
        self.capacity = other.rows;
        self.data.clone_from_slice(&other.data);
        Ok(())
    }

    /// Sets every element to `value`. Fails on an empty matrix.
    pub fn set_all(&mut self, value: T) -> Result<()> {
        if self.is_empty() {
            return Err(fail(GrtError::validation("set_all: the matrix is empty")));
        }
        self.data.fill(value);
        Ok(())
    }

    /// Overwrites row `index` with `row`.
    pub fn set_row_vector(&mut self, row: &[T], index: usize) -> Result<()> {
        if self.is_empty() || row.len() != self.cols || index >= self.rows {
            return Err(fail(GrtError::validation(format!(
                "set_row_vector: a row of length {} at index {index} does not fit a {}x{} matrix",
                row.len(),
                self.rows,
                self.cols
            ))));
        }
        let start = index * self.cols;
        self.data[start..start + self.cols].clone_from_slice(row);
        Ok(())
    }

    /// Overwrites column `index` with `col`.
    pub fn set_col_vector(&mut self, col: &[T], index: usize) -> Result<()> {
        if self.is_empty() || col.len() != self.rows || index >= self.cols {
            return Err(fail(GrtError::validation(format!(
                "set_col_vector: a column of length {} at index {index} does not fit a {}x{} matrix",
                col.len(),
                self.rows,
                self.cols
            ))));
        }
        for (r, v) in col.iter().enumerate() {
            self.data[r * self.cols + index] = v.clone();
        }
        Ok(())
    }

    /// Appends `row` as a new last row.
    ///
    /// On an empty matrix the first row defines the column count. When every
    /// reserved row is in use the buffer grows by exactly one row.
    pub fn push_back(&mut self, row: &[T]) -> Result<()> {
        if self.cols == 0 {
            if row.is_empty() {
                return Err(fail(GrtError::validation(
                    "push_back: can not define a matrix from an empty row",
                )));
            }
            let mut buf = allocate(row.len(), 1, row.len()).map_err(fail)?;
            buf.extend_from_slice(row);
            self.data = buf;
            self.rows = 1;
            self.cols = row.len();
            self.capacity = 1;
            return Ok(());
        }

        if row.len() != self.cols {
            return Err(fail(GrtError::validation(format!(
                "push_back: row length {} does not match the number of columns {}",
                row.len(),
                self.cols
            ))));
        }

        if self.rows < self.capacity {
            self.data.extend_from_slice(row);
        } else {
            let (rows, cols) = (self.rows + 1, self.cols);
            let mut buf = match allocate(rows * cols, rows, cols) {
                Ok(buf) => buf,
                Err(err) => {
                    self.clear();
                    return Err(fail(err));
                }
            };
            buf.extend_from_slice(&self.data);
            buf.extend_from_slice(row);
            self.data = buf;
            self.capacity += 1;
        }
        self.rows += 1;
        Ok(())
    }

    /// Reserves storage for `capacity` rows of the current width.
    ///
    /// Needs a known column count and must not drop existing rows.
    pub fn reserve(&mut self, capacity: usize) -> Result<()> {
        if self.cols == 0 {
            return Err(fail(GrtError::validation(
                "reserve: the number of columns has not been set",
            )));
        }
        if capacity < self.rows {
            return Err(fail(GrtError::validation(format!(
                "reserve: capacity {capacity} is smaller than the current {} rows",
                self.rows
            ))));
        }

        let cols = self.cols;
        let mut buf = match allocate(capacity * cols, capacity, cols) {
            Ok(buf) => buf,
            Err(err) => {
                self.clear();
                return Err(fail(err));
            }
        };
        buf.extend_from_slice(&self.data);
        self.data = buf;
        self.capacity = capacity;
        Ok(())
    }

    /// Copies row `r` out of the matrix.
    ///
    /// # Panics
    /// Panics if `r >= rows`.
    pub fn row(&self, r: usize) -> Vec<T> {
        let start = r * self.cols;
        self.data[start..start + self.cols].to_vec()
    }

    /// Copies column `c` out of the matrix.
    ///
    /// # Panics
    /// Panics if `c >= cols` on a non-empty matrix.
    pub fn col(&self, c: usize) -> Vec<T> {
        assert!(self.rows == 0 || c < self.cols, "column {c} out of range");
        (0..self.rows)
            .map(|r| self.data[r * self.cols + c].clone())
            .collect()
    }

    /// Flattens the matrix row by row, or column by column when `by_row` is false.
    pub fn concatenated(&self, by_row: bool) -> Vec<T> {
        if by_row {
            return self.data.clone();
        }
        let mut out = Vec::with_capacity(self.size());
        for c in 0..self.cols {
            out.extend((0..self.rows).map(|r| self.data[r * self.cols + c].clone()));
        }
        out
    }
}

impl<T> Default for Matrix<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Clone for Matrix<T> {
    fn clone(&self) -> Self {
        Self {
            rows: self.rows,
            cols: self.cols,
            capacity: self.rows,
            data: self.data.clone(),
        }
    }
}

impl<T: PartialEq> PartialEq for Matrix<T> {
    fn eq(&self, other: &Self) -> bool {
        self.rows == other.rows && self.cols == other.cols && self.data == other.data
    }
}

impl<T> Index<(usize, usize)> for Matrix<T> {
    type Output = T;

    /// Element `(r, c)`; the caller keeps `r` and `c` in range.
    #[inline]
    fn index(&self, (r, c): (usize, usize)) -> &T {
        &self.data[r * self.cols + c]
    }
}

impl<T> IndexMut<(usize, usize)> for Matrix<T> {
    #[inline]
    fn index_mut(&mut self, (r, c): (usize, usize)) -> &mut T {
        &mut self.data[r * self.cols + c]
    }
}

/// Builds a [`Matrix`] from nested row literals.
///
/// # Example
/// ```
/// use grt_core::matrix;
/// let m = matrix![[1.0, 2.0], [3.0, 4.0]];
/// assert_eq!(m.num_rows(), 2);
/// assert_eq!(m[(1, 0)], 3.0);
/// ```
///
/// # Panics
/// Panics on ragged rows.
#[macro_export]
macro_rules! matrix {
    ($( [ $( $x:expr ),+ $(,)? ] ),+ $(,)?) => {
        $crate::matrix::Matrix::from_rows(&[ $( vec![ $( $x ),+ ] ),+ ])
            .expect("ragged matrix literal (rows have mismatched lengths)")
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matrix_is_empty() {
        let m: Matrix<f64> = Matrix::new();
        assert_eq!(m.size(), 0);
        assert_eq!(m.num_rows(), 0);
        assert_eq!(m.num_cols(), 0);
        assert_eq!(m.capacity(), 0);
    }

    #[test]
    fn resize_rejects_zero_dimensions_without_mutating() {
        let mut m: Matrix<f64> = Matrix::filled(2, 2, 7.0).unwrap();
        assert!(m.resize(0, 0).is_err());
        assert!(m.resize(3, 0).is_err());
        assert_eq!(m.num_rows(), 2);
        assert_eq!(m.data(), &[7.0; 4]);
    }

    #[test]
    fn resize_to_same_shape_keeps_values() {
        let mut m: Matrix<i32> = Matrix::filled(3, 2, 5).unwrap();
        m.resize(3, 2).unwrap();
        assert!(m.data().iter().all(|&v| v == 5));
    }

    #[test]
    fn resize_down_then_up_leaves_no_stale_values() {
        let mut m: Matrix<f64> = Matrix::filled(4, 4, 9.0).unwrap();
        m.resize(1, 1).unwrap();
        m.resize(4, 4).unwrap();
        assert!(m.data().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn push_back_grows_capacity_by_one_row() {
        let mut m: Matrix<f64> = Matrix::new();
        m.push_back(&[1.0, 2.0]).unwrap();
        assert_eq!((m.num_rows(), m.num_cols(), m.capacity()), (1, 2, 1));
        m.push_back(&[3.0, 4.0]).unwrap();
        assert_eq!(m.capacity(), 2);
        m.push_back(&[5.0, 6.0]).unwrap();
        assert_eq!(m.capacity(), 3);
        assert_eq!(m.data(), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn push_back_uses_reserved_rows() {
        let mut m: Matrix<f64> = Matrix::new();
        m.push_back(&[0.0, 0.0, 0.0]).unwrap();
        m.reserve(10).unwrap();
        for i in 1..10 {
            m.push_back(&[i as f64; 3]).unwrap();
        }
        assert_eq!(m.num_rows(), 10);
        assert_eq!(m.capacity(), 10);
        m.push_back(&[10.0; 3]).unwrap();
        assert_eq!(m.capacity(), 11);
        assert_eq!(m.row(10), vec![10.0; 3]);
    }

    #[test]
    fn push_back_rejects_wrong_width() {
        let mut m = matrix![[1.0, 2.0]];
        assert!(m.push_back(&[1.0]).is_err());
        assert_eq!(m.num_rows(), 1);
    }

    #[test]
    fn reserve_needs_known_columns() {
        let mut m: Matrix<f64> = Matrix::new();
        assert!(m.reserve(4).is_err());
    }

    #[test]
    fn set_col_vector_only_touches_that_column() {
        let mut m: Matrix<f64> = Matrix::filled(5, 4, 0.0).unwrap();
        m.set_col_vector(&[3.0; 5], 2).unwrap();
        for r in 0..5 {
            for c in 0..4 {
                assert_eq!(m[(r, c)], if c == 2 { 3.0 } else { 0.0 });
            }
        }
        assert!(m.set_col_vector(&[1.0; 4], 0).is_err());
        assert!(m.set_col_vector(&[1.0; 5], 4).is_err());
    }

    #[test]
    fn concatenated_by_column() {
        let m = matrix![[1, 2, 3], [4, 5, 6]];
        assert_eq!(m.concatenated(true), vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(m.concatenated(false), vec![1, 4, 2, 5, 3, 6]);
    }

    #[test]
    fn from_rows_rejects_ragged_input() {
        assert!(Matrix::from_rows(&[vec![1.0, 2.0], vec![3.0]]).is_err());
        assert!(Matrix::<f64>::from_rows(&[]).unwrap().is_empty());
    }

    #[test]
    fn copy_from_is_independent() {
        let mut a = matrix![[1.0, 2.0], [3.0, 4.0]];
        let mut b: Matrix<f64> = Matrix::new();
        b.copy_from(&a).unwrap();
        a[(0, 0)] = 100.0;
        assert_eq!(b[(0, 0)], 1.0);
        assert_eq!(b.num_rows(), 2);
    }

    #[test]
    fn reshaping_copies_keep_capacity_at_least_rows() {
        let mut m: Matrix<f64> = Matrix::filled(2, 3, 1.0).unwrap();
        m.transpose().unwrap();
        assert_eq!((m.num_rows(), m.num_cols()), (3, 2));
        assert!(m.capacity() >= m.num_rows());
        m.push_back(&[2.0, 2.0]).unwrap();
        assert_eq!(m.num_rows(), 4);
        assert!(m.capacity() >= m.num_rows());

        let a: Matrix<f64> = Matrix::filled(6, 1, 5.0).unwrap();
        let mut b: Matrix<f64> = Matrix::filled(1, 6, 0.0).unwrap();
        b.copy_from(&a).unwrap();
        assert_eq!((b.num_rows(), b.num_cols()), (6, 1));
        assert!(b.capacity() >= b.num_rows());
        assert_eq!(b, a);
    }
}
