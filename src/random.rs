//! # Deterministic Random Numbers
//!
//! [`Random`] is a combined 64-bit generator: a linear congruential word, a
//! xorshift word and a multiply-with-carry word mixed into one output. For a
//! given non-zero seed the output stream is fully reproducible, which is what
//! makes dataset partitions repeatable.
//!
//! Seed `0` means "pick one for me": the generator seeds itself from the
//! system clock.
//!
//! ## Sampling
//! - [`Random::uniform`]: `[min, max)` with 53 bits of resolution
//! - [`Random::random_int`]: `floor(uniform(min, max))`
//! - [`Random::gaussian`]: polar Box-Muller with a cached spare value
//! - [`Random::weighted_discrete`] / [`WeightedTable`]: inverse-CDF draws
//! - [`Random::shuffle`]: in-place Fisher-Yates
//!
//! ## Example
//! ```rust
//! use grt_core::random::Random;
//! let mut a = Random::new(42);
//! let mut b = Random::new(42);
//! assert_eq!(a.int64(), b.int64());
//! ```

use crate::error::{GrtError, Result};
use crate::report::fail;
use core::cmp::Ordering;
use std::time::{SystemTime, UNIX_EPOCH};

const V_INIT: u64 = 4_101_842_887_655_102_017;
const LCG_MUL: u64 = 2_862_933_555_777_941_757;
const LCG_INC: u64 = 7_046_029_254_386_353_087;
const MWC_MUL: u64 = 4_294_957_665;

/// 2^-53
const DOUBLE_UNIT: f64 = 1.0 / 9_007_199_254_740_992.0;

/// Seeded pseudo-random generator.
///
/// Not thread-safe by itself; give each thread its own instance.
#[derive(Debug, Clone)]
pub struct Random {
    u: u64,
    v: u64,
    w: u64,
    stored: Option<f64>,
}

impl Random {
    /// Creates a generator. A zero seed is replaced by one derived from the clock.
    pub fn new(seed: u64) -> Self {
        let mut rng = Self {
            u: 0,
            v: V_INIT,
            w: 1,
            stored: None,
        };
        rng.set_seed(seed);
        rng
    }

    /// Resets the generator state. Reusing a non-zero seed replays the same stream.
    pub fn set_seed(&mut self, seed: u64) {
        let seed = if seed == 0 { clock_seed() } else { seed };
        self.v = V_INIT;
        self.w = 1;
        self.stored = None;
        self.u = seed ^ self.v;
        self.int64();
        self.v = self.u;
        self.int64();
        self.w = self.v;
        self.int64();
    }

    /// Next raw 64-bit output.
    #[inline]
    pub fn int64(&mut self) -> u64 {
        self.u = self.u.wrapping_mul(LCG_MUL).wrapping_add(LCG_INC);
        self.v ^= self.v >> 17;
        self.v ^= self.v << 31;
        self.v ^= self.v >> 8;
        self.w = MWC_MUL
            .wrapping_mul(self.w & 0xffff_ffff)
            .wrapping_add(self.w >> 32);
        let mut x = self.u ^ (self.u << 21);
        x ^= x >> 35;
        x ^= x << 4;
        x.wrapping_add(self.v) ^ self.w
    }

    /// Uniform double in `[0, 1)`.
    #[inline]
    pub fn doub(&mut self) -> f64 {
        (self.int64() >> 11) as f64 * DOUBLE_UNIT
    }

    /// Uniform double in `[min, max)`.
    pub fn uniform(&mut self, min: f64, max: f64) -> f64 {
        self.doub() * (max - min) + min
    }

    /// Uniform integer in `[min, max)`. Returns `min` when the range is empty.
    pub fn random_int(&mut self, min: i64, max: i64) -> i64 {
        if max <= min {
            return min;
        }
        let x = self.uniform(min as f64, max as f64).floor() as i64;
        // float rounding can land exactly on max for very wide ranges
        x.min(max - 1)
    }

    /// Uniform index in `[0, n)`; `n` must be non-zero.
    pub(crate) fn index(&mut self, n: usize) -> usize {
        debug_assert!(n > 0);
        ((self.doub() * n as f64) as usize).min(n - 1)
    }

    /// Draws from `N(mu, sigma^2)`.
    pub fn gaussian(&mut self, mu: f64, sigma: f64) -> f64 {
        if let Some(spare) = self.stored.take() {
            return mu + sigma * spare;
        }
        loop {
            let v1 = 2.0 * self.doub() - 1.0;
            let v2 = 2.0 * self.doub() - 1.0;
            let rsq = v1 * v1 + v2 * v2;
            if rsq < 1.0 && rsq != 0.0 {
                let fac = (-2.0 * rsq.ln() / rsq).sqrt();
                self.stored = Some(v1 * fac);
                return mu + sigma * v2 * fac;
            }
        }
    }

    /// `n` uniform draws in `[min, max)`.
    pub fn uniform_vector(&mut self, n: usize, min: f64, max: f64) -> Vec<f64> {
        (0..n).map(|_| self.uniform(min, max)).collect()
    }

    /// `n` Gaussian draws.
    pub fn gaussian_vector(&mut self, n: usize, mu: f64, sigma: f64) -> Vec<f64> {
        (0..n).map(|_| self.gaussian(mu, sigma)).collect()
    }

    /// `size` distinct values picked from `start..end`.
    pub fn random_subset(&mut self, start: usize, end: usize, size: usize) -> Result<Vec<usize>> {
        if end <= start || size > end - start {
            return Err(fail(GrtError::validation(format!(
                "random_subset: can not pick {size} values from {start}..{end}"
            ))));
        }
        let mut range: Vec<usize> = (start..end).collect();
        self.shuffle(&mut range);
        range.truncate(size);
        Ok(range)
    }

    /// Fisher-Yates shuffle in place.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.index(i + 1);
            items.swap(i, j);
        }
    }

    /// Picks one of `values` with probability proportional to the matching weight.
    ///
    /// Weights need not sum to one, but they must be non-negative with a
    /// positive total.
    pub fn weighted_discrete(&mut self, values: &[usize], weights: &[f64]) -> Result<usize> {
        if values.len() != weights.len() {
            return Err(fail(GrtError::validation(format!(
                "weighted_discrete: {} values but {} weights",
                values.len(),
                weights.len()
            ))));
        }
        let pairs = values
            .iter()
            .zip(weights)
            .map(|(&index, &value)| IndexedDouble::new(index, value))
            .collect();
        Ok(self.weighted(&WeightedTable::new(pairs)?))
    }

    /// Draws from a prepared [`WeightedTable`].
    pub fn weighted(&mut self, table: &WeightedTable) -> usize {
        let draw = self.uniform(0.0, table.total());
        let i = table.cumsum.partition_point(|&c| c <= draw);
        table.entries[i.min(table.entries.len() - 1)].index
    }
}

impl Default for Random {
    /// A clock-seeded generator.
    fn default() -> Self {
        Self::new(0)
    }
}

/// Shuffles `items` with a fresh generator seeded from `seed`.
pub fn shuffle_with_seed<T>(items: &mut [T], seed: u64) {
    Random::new(seed).shuffle(items);
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(V_INIT)
        | 1
}

/// An `(index, value)` pair, sortable by either field.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct IndexedDouble {
    pub index: usize,
    pub value: f64,
}

impl IndexedDouble {
    pub const fn new(index: usize, value: f64) -> Self {
        Self { index, value }
    }

    pub fn by_index_ascending(a: &Self, b: &Self) -> Ordering {
        a.index.cmp(&b.index)
    }

    pub fn by_index_descending(a: &Self, b: &Self) -> Ordering {
        b.index.cmp(&a.index)
    }

    pub fn by_value_ascending(a: &Self, b: &Self) -> Ordering {
        a.value.total_cmp(&b.value)
    }

    pub fn by_value_descending(a: &Self, b: &Self) -> Ordering {
        b.value.total_cmp(&a.value)
    }
}

/// A weight table sorted ascending with its cumulative sums, for repeated draws.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedTable {
    entries: Vec<IndexedDouble>,
    cumsum: Vec<f64>,
}

impl WeightedTable {
    /// Sorts `entries` by weight and builds the cumulative-sum lookup.
    pub fn new(mut entries: Vec<IndexedDouble>) -> Result<Self> {
        if entries.is_empty() {
            return Err(fail(GrtError::validation(
                "weighted table: there are no entries to draw from",
            )));
        }
        if let Some(bad) = entries.iter().find(|e| !(e.value.is_finite() && e.value >= 0.0)) {
            return Err(fail(GrtError::validation(format!(
                "weighted table: entry {} has an invalid weight {}",
                bad.index, bad.value
            ))));
        }
        entries.sort_by(IndexedDouble::by_value_ascending);
        let cumsum: Vec<f64> = entries
            .iter()
            .scan(0.0, |acc, e| {
                *acc += e.value;
                Some(*acc)
            })
            .collect();
        if cumsum.last().is_none_or(|&total| total <= 0.0) {
            return Err(fail(GrtError::validation(
                "weighted table: the weights sum to zero",
            )));
        }
        Ok(Self { entries, cumsum })
    }

    /// Entries in ascending weight order.
    pub fn entries(&self) -> &[IndexedDouble] {
        &self.entries
    }

    pub fn cumulative(&self) -> &[f64] {
        &self.cumsum
    }

    pub fn total(&self) -> f64 {
        self.cumsum.last().copied().unwrap_or(0.0)
    }
}
