//! Graded floating point comparison.
//!
//! Scaling and normalisation produce values that are equal only up to
//! rounding. [`Closeness`] grades the absolute difference between two values
//! so callers can pick how strict to be; containers take the worst grade of
//! their elements.

use crate::matrix::MatrixFloat;
use crate::stats::MinMax;

/// Differences below this are [`Closeness::Precise`].
pub const F64_MIN_ERROR: f64 = 1e-13;

/// Differences below this are [`Closeness::Partial`].
pub const F64_AVG_ERROR: f64 = 1e-6;

/// Differences below this are [`Closeness::Relative`].
pub const F64_MAX_ERROR: f64 = 1e-3;

/// How close two values are, best first.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Closeness {
    /// Equal up to rounding.
    Precise = 0,
    /// Within [`F64_AVG_ERROR`].
    Partial = 1,
    /// Within [`F64_MAX_ERROR`].
    Relative = 2,
    /// Not close, or not comparable.
    Scarce = 3,
}

impl Closeness {
    /// Grades an absolute difference. `NaN` is never close.
    pub fn of(dif: f64) -> Self {
        if dif < F64_MIN_ERROR {
            Closeness::Precise
        } else if dif < F64_AVG_ERROR {
            Closeness::Partial
        } else if dif < F64_MAX_ERROR {
            Closeness::Relative
        } else {
            Closeness::Scarce
        }
    }
}

/// Grades how close `self` is to `rhs`.
pub trait ApproxEq<Rhs: ?Sized = Self> {
    fn closeness(&self, rhs: &Rhs) -> Closeness;
}

impl ApproxEq for f64 {
    fn closeness(&self, rhs: &f64) -> Closeness {
        if self == rhs {
            // covers matching infinities
            return Closeness::Precise;
        }
        Closeness::of((self - rhs).abs())
    }
}

impl ApproxEq for [f64] {
    /// Slices of different lengths are [`Closeness::Scarce`].
    fn closeness(&self, rhs: &[f64]) -> Closeness {
        if self.len() != rhs.len() {
            return Closeness::Scarce;
        }
        let mut worst = Closeness::Precise;
        for (a, b) in self.iter().zip(rhs) {
            worst = worst.max(a.closeness(b));
            if worst == Closeness::Scarce {
                break;
            }
        }
        worst
    }
}

impl ApproxEq for Vec<f64> {
    fn closeness(&self, rhs: &Vec<f64>) -> Closeness {
        self.as_slice().closeness(rhs.as_slice())
    }
}

impl ApproxEq for MatrixFloat {
    /// Matrices of different shapes are [`Closeness::Scarce`].
    fn closeness(&self, rhs: &MatrixFloat) -> Closeness {
        if self.num_rows() != rhs.num_rows() || self.num_cols() != rhs.num_cols() {
            return Closeness::Scarce;
        }
        self.data().closeness(rhs.data())
    }
}

impl ApproxEq for MinMax {
    fn closeness(&self, rhs: &MinMax) -> Closeness {
        self.min.closeness(&rhs.min).max(self.max.closeness(&rhs.max))
    }
}

/// `true` when `a` and `b` are equal up to rounding.
pub fn approx_eq<A: ApproxEq<B> + ?Sized, B: ?Sized>(a: &A, b: &B) -> bool {
    a.closeness(b) == Closeness::Precise
}

/// `true` when `a` and `b` are within `grade` of each other.
pub fn within<A: ApproxEq<B> + ?Sized, B: ?Sized>(a: &A, b: &B, grade: Closeness) -> bool {
    a.closeness(b) <= grade
}
