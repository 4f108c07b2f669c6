//! Row-major kernels behind the matrix arithmetic.
//!
//! These work on raw slices and trust the caller for shapes; the checked
//! entry points live on [`Matrix`](crate::matrix::Matrix) in the parent
//! module. Everything runs on the calling thread.

/// `out = a * b` with `a: m x k`, `b: k x n`, `out: m x n`.
pub fn matmul(a: &[f64], b: &[f64], out: &mut [f64], m: usize, k: usize, n: usize) {
    debug_assert_eq!(a.len(), m * k);
    debug_assert_eq!(b.len(), k * n);
    debug_assert_eq!(out.len(), m * n);

    for (i, row) in out.chunks_exact_mut(n).enumerate() {
        for (j, cell) in row.iter_mut().enumerate() {
            let mut sum = 0.0;
            for l in 0..k {
                sum += a[i * k + l] * b[l * n + j];
            }
            *cell = sum;
        }
    }
}

/// `out = a' * b` with `a: k x m`, `b: k x n`, `out: m x n`.
pub fn matmul_transposed(a: &[f64], b: &[f64], out: &mut [f64], m: usize, k: usize, n: usize) {
    debug_assert_eq!(a.len(), k * m);
    debug_assert_eq!(b.len(), k * n);
    debug_assert_eq!(out.len(), m * n);

    for (i, row) in out.chunks_exact_mut(n).enumerate() {
        for (j, cell) in row.iter_mut().enumerate() {
            let mut sum = 0.0;
            for l in 0..k {
                sum += a[l * m + i] * b[l * n + j];
            }
            *cell = sum;
        }
    }
}

/// `a * x` for `a: m x n` and `x` of length `n`.
pub fn matvec(a: &[f64], x: &[f64], n: usize) -> Vec<f64> {
    a.chunks_exact(n)
        .map(|row| row.iter().zip(x).map(|(a, x)| a * x).sum())
        .collect()
}

/// Element-wise `out[i] = f(a[i], b[i])`.
pub fn zip_into(a: &[f64], b: &[f64], out: &mut [f64], f: impl Fn(f64, f64) -> f64) {
    for ((o, &x), &y) in out.iter_mut().zip(a).zip(b) {
        *o = f(x, y);
    }
}

/// Element-wise `a[i] = f(a[i], b[i])`.
pub fn zip_in_place(a: &mut [f64], b: &[f64], f: impl Fn(f64, f64) -> f64) {
    for (x, &y) in a.iter_mut().zip(b) {
        *x = f(*x, y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matmul_produces_correct_values() {
        let a = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0]; // 2x3
        let b = [7.0, 8.0, 9.0, 10.0, 11.0, 12.0]; // 3x2
        let mut out = [0.0; 4];
        matmul(&a, &b, &mut out, 2, 3, 2);
        let expected = [
            1.0 * 7.0 + 2.0 * 9.0 + 3.0 * 11.0,
            1.0 * 8.0 + 2.0 * 10.0 + 3.0 * 12.0,
            4.0 * 7.0 + 5.0 * 9.0 + 6.0 * 11.0,
            4.0 * 8.0 + 5.0 * 10.0 + 6.0 * 12.0,
        ];
        assert_eq!(out, expected);
    }

    #[test]
    fn transposed_matmul_matches_explicit_transpose() {
        let a = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0]; // 3x2, so a' is 2x3
        let a_t = [1.0, 3.0, 5.0, 2.0, 4.0, 6.0];
        let b = [1.0, 0.0, 0.0, 1.0, 1.0, 1.0]; // 3x2
        let mut lhs = [0.0; 4];
        let mut rhs = [0.0; 4];
        matmul_transposed(&a, &b, &mut lhs, 2, 3, 2);
        matmul(&a_t, &b, &mut rhs, 2, 3, 2);
        assert_eq!(lhs, rhs);
    }

    #[test]
    fn matvec_sums_rows() {
        let a = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(matvec(&a, &[1.0, 1.0], 2), vec![3.0, 7.0]);
    }
}
