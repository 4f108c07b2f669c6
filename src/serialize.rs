//! In-memory byte dumps of vectors, matrices and datasets.
//!
//! The core never touches files. [`Dump::dump`] produces a self-describing
//! byte buffer and [`Dump::restore`] rebuilds the container from one; where
//! the bytes end up is the caller's business.
//!
//! # Layout
//!
//! Every buffer starts with a 4-byte magic tag naming the container, then its
//! dimensions, then the payload. All integers are `u64` (`u32` for class
//! labels), floats are `f64`, strings are a `u64` byte length followed by
//! UTF-8, and everything is little-endian.
//!
//! ```text
//! ┌──────────┬─────────────────────────────┬──────────────────────────────┐
//! │ "gvec"   │ len                         │ [f64; len]                   │
//! │ "gmat"   │ rows, cols                  │ [f64; rows * cols] row-major │
//! │ "gcls"   │ dims, name, info, flags     │ trackers, ranges, samples    │
//! │ "greg"   │ inputs, targets, name, info │ ranges, samples              │
//! └──────────┴─────────────────────────────┴──────────────────────────────┘
//! ```
//!
//! Restoring checks the decoded payload with briny's [`Validate`] before
//! anything is built, so a buffer whose counts disagree with its payload is
//! rejected as [`GrtError::Integrity`] instead of producing a broken container.
//!
//! # Example
//!
//! ```rust
//! use grt_core::matrix;
//! use grt_core::matrix::MatrixFloat;
//! use grt_core::serialize::Dump;
//!
//! let m = matrix![[1.0, 2.0], [3.0, 4.0]];
//! let bytes = m.dump();
//! assert_eq!(MatrixFloat::restore(&bytes).unwrap(), m);
//! ```

use briny::prelude::{TrustedData, Validate, ValidationError};

use crate::data::{ClassTracker, ClassificationData, RegressionData};
use crate::error::{GrtError, Result};
use crate::matrix::{Matrix, MatrixFloat};
use crate::report::fail;
use crate::stats::MinMax;

const VECTOR_MAGIC: &[u8; 4] = b"gvec";
const MATRIX_MAGIC: &[u8; 4] = b"gmat";
const CLASSIFICATION_MAGIC: &[u8; 4] = b"gcls";
const REGRESSION_MAGIC: &[u8; 4] = b"greg";

/// Conversion to and from a flat byte buffer.
pub trait Dump: Sized {
    fn dump(&self) -> Vec<u8>;

    fn restore(bytes: &[u8]) -> Result<Self>;
}

impl Dump for Vec<f64> {
    fn dump(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(12 + self.len() * 8);
        out.extend_from_slice(VECTOR_MAGIC);
        put_u64(&mut out, self.len());
        put_f64s(&mut out, self);
        out
    }

    fn restore(bytes: &[u8]) -> Result<Self> {
        let mut r = Reader::new(bytes);
        r.magic(VECTOR_MAGIC)?;
        let len = r.len(8)?;
        let data = r.f64s(len)?;
        r.finish()?;
        Ok(data)
    }
}

struct PackedMatrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Validate for PackedMatrix {
    fn validate(&self) -> core::result::Result<(), ValidationError> {
        let expected = self.rows.checked_mul(self.cols).ok_or(ValidationError)?;
        if self.data.len() != expected || (self.rows == 0) != (self.cols == 0) {
            return Err(ValidationError);
        }
        Ok(())
    }
}

impl Dump for MatrixFloat {
    fn dump(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(20 + self.size() * 8);
        out.extend_from_slice(MATRIX_MAGIC);
        put_u64(&mut out, self.num_rows());
        put_u64(&mut out, self.num_cols());
        put_f64s(&mut out, self.data());
        out
    }

    fn restore(bytes: &[u8]) -> Result<Self> {
        let mut r = Reader::new(bytes);
        r.magic(MATRIX_MAGIC)?;
        let rows = r.u64()?;
        let cols = r.u64()?;
        let len = rows
            .checked_mul(cols)
            .ok_or_else(|| corrupt("matrix dimensions overflow"))?;
        let data = r.f64s(len)?;
        r.finish()?;

        let packed = TrustedData::new(PackedMatrix { rows, cols, data })
            .map_err(|e| fail(e.into()))?
            .into_inner();
        if packed.rows == 0 {
            return Ok(Matrix::new());
        }
        let rows: Vec<Vec<f64>> = packed
            .data
            .chunks_exact(packed.cols)
            .map(<[f64]>::to_vec)
            .collect();
        Matrix::from_rows(&rows)
    }
}

struct PackedClassification {
    dims: usize,
    name: String,
    info: String,
    allow_null_class: bool,
    use_external_ranges: bool,
    trackers: Vec<ClassTracker>,
    ranges: Vec<MinMax>,
    samples: Vec<(u32, Vec<f64>)>,
}

impl Validate for PackedClassification {
    fn validate(&self) -> core::result::Result<(), ValidationError> {
        let sorted = self.trackers.windows(2).all(|w| w[0].label < w[1].label);
        let dims_ok = self.samples.iter().all(|(_, f)| f.len() == self.dims && !f.is_empty());
        let ranges_ok = self.ranges.is_empty() || self.ranges.len() == self.dims;
        if !sorted || !dims_ok || !ranges_ok || (self.use_external_ranges && self.ranges.len() != self.dims) {
            return Err(ValidationError);
        }
        for tracker in &self.trackers {
            let count = self.samples.iter().filter(|(l, _)| *l == tracker.label).count();
            if count != tracker.counter {
                return Err(ValidationError);
            }
        }
        if self.trackers.iter().map(|t| t.counter).sum::<usize>() != self.samples.len() {
            return Err(ValidationError);
        }
        if !self.allow_null_class && self.samples.iter().any(|(l, _)| *l == 0) {
            return Err(ValidationError);
        }
        if self.name.is_empty() || self.name.chars().any(char::is_whitespace) {
            return Err(ValidationError);
        }
        Ok(())
    }
}

impl Dump for ClassificationData {
    fn dump(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(CLASSIFICATION_MAGIC);
        put_u64(&mut out, self.num_dimensions());
        put_str(&mut out, self.name());
        put_str(&mut out, self.info());
        out.push(self.allow_null_class() as u8);
        out.push(self.uses_external_ranges() as u8);

        put_u64(&mut out, self.num_classes());
        for t in self.trackers() {
            out.extend_from_slice(&t.label.to_le_bytes());
            put_u64(&mut out, t.counter);
            put_str(&mut out, &t.name);
        }
        put_ranges(&mut out, self.external_ranges());

        put_u64(&mut out, self.num_samples());
        for s in self.samples() {
            out.extend_from_slice(&s.label().to_le_bytes());
            put_f64s(&mut out, s.features());
        }
        out
    }

    fn restore(bytes: &[u8]) -> Result<Self> {
        let mut r = Reader::new(bytes);
        r.magic(CLASSIFICATION_MAGIC)?;
        let dims = r.u64()?;
        let name = r.string()?;
        let info = r.string()?;
        let allow_null_class = r.flag()?;
        let use_external_ranges = r.flag()?;

        let num_classes = r.len(20)?;
        let mut trackers = Vec::with_capacity(num_classes);
        for _ in 0..num_classes {
            let label = r.u32()?;
            let counter = r.u64()?;
            let name = r.string()?;
            trackers.push(ClassTracker::new(label, counter, name));
        }
        let ranges = r.ranges()?;

        let num_samples = r.len(dims.saturating_mul(8).saturating_add(4))?;
        let mut samples = Vec::with_capacity(num_samples);
        for _ in 0..num_samples {
            let label = r.u32()?;
            samples.push((label, r.f64s(dims)?));
        }
        r.finish()?;

        let packed = TrustedData::new(PackedClassification {
            dims,
            name,
            info,
            allow_null_class,
            use_external_ranges,
            trackers,
            ranges,
            samples,
        })
        .map_err(|e| fail(e.into()))?
        .into_inner();

        let mut data = ClassificationData::with_name(packed.dims, &packed.name, packed.info)?;
        data.reserve(packed.samples.len())?;
        for t in packed.trackers {
            data.add_class(t.label, t.name)?;
        }
        for (label, features) in &packed.samples {
            data.add_sample(*label, features)?;
        }
        data.set_allow_null_class(packed.allow_null_class);
        if !packed.ranges.is_empty() {
            data.set_external_ranges(packed.ranges, packed.use_external_ranges)?;
        }
        Ok(data)
    }
}

struct PackedRegression {
    inputs: usize,
    targets: usize,
    name: String,
    use_external_ranges: bool,
    input_ranges: Vec<MinMax>,
    target_ranges: Vec<MinMax>,
    samples: Vec<(Vec<f64>, Vec<f64>)>,
}

impl Validate for PackedRegression {
    fn validate(&self) -> core::result::Result<(), ValidationError> {
        let widths_ok = (self.inputs == 0) == (self.targets == 0);
        let samples_ok = self.samples.is_empty() || self.inputs > 0;
        let ranges_ok = (self.input_ranges.is_empty() && self.target_ranges.is_empty())
            || (self.input_ranges.len() == self.inputs && self.target_ranges.len() == self.targets);
        let external_ok = !self.use_external_ranges || !self.input_ranges.is_empty();
        let name_ok = !self.name.is_empty() && !self.name.chars().any(char::is_whitespace);
        if widths_ok && samples_ok && ranges_ok && external_ok && name_ok {
            Ok(())
        } else {
            Err(ValidationError)
        }
    }
}

impl Dump for RegressionData {
    fn dump(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(REGRESSION_MAGIC);
        put_u64(&mut out, self.num_input_dimensions());
        put_u64(&mut out, self.num_target_dimensions());
        put_str(&mut out, self.name());
        put_str(&mut out, self.info());
        out.push(self.uses_external_ranges() as u8);
        put_ranges(&mut out, self.external_input_ranges());
        put_ranges(&mut out, self.external_target_ranges());
        put_u64(&mut out, self.num_samples());
        for s in self.samples() {
            put_f64s(&mut out, s.input());
            put_f64s(&mut out, s.target());
        }
        out
    }

    fn restore(bytes: &[u8]) -> Result<Self> {
        let mut r = Reader::new(bytes);
        r.magic(REGRESSION_MAGIC)?;
        let inputs = r.u64()?;
        let targets = r.u64()?;
        let name = r.string()?;
        let info = r.string()?;
        let use_external_ranges = r.flag()?;
        let input_ranges = r.ranges()?;
        let target_ranges = r.ranges()?;
        let width = inputs.saturating_add(targets).saturating_mul(8).max(1);
        let num_samples = r.len(width)?;
        let mut samples = Vec::with_capacity(num_samples);
        for _ in 0..num_samples {
            let input = r.f64s(inputs)?;
            let target = r.f64s(targets)?;
            samples.push((input, target));
        }
        r.finish()?;

        let packed = TrustedData::new(PackedRegression {
            inputs,
            targets,
            name,
            use_external_ranges,
            input_ranges,
            target_ranges,
            samples,
        })
        .map_err(|e| fail(e.into()))?
        .into_inner();

        let mut data = RegressionData::new(packed.inputs, packed.targets);
        data.set_name(&packed.name)?;
        data.set_info(info);
        data.reserve(packed.samples.len())?;
        for (input, target) in &packed.samples {
            data.add_sample(input, target)?;
        }
        if !packed.input_ranges.is_empty() {
            data.set_external_ranges(
                packed.input_ranges,
                packed.target_ranges,
                packed.use_external_ranges,
            )?;
        }
        Ok(data)
    }
}

fn put_u64(out: &mut Vec<u8>, v: usize) {
    out.extend_from_slice(&(v as u64).to_le_bytes());
}

fn put_f64s(out: &mut Vec<u8>, values: &[f64]) {
    for v in values {
        out.extend_from_slice(&v.to_le_bytes());
    }
}

fn put_str(out: &mut Vec<u8>, s: &str) {
    put_u64(out, s.len());
    out.extend_from_slice(s.as_bytes());
}

fn put_ranges(out: &mut Vec<u8>, ranges: &[MinMax]) {
    put_u64(out, ranges.len());
    for r in ranges {
        out.extend_from_slice(&r.min.to_le_bytes());
        out.extend_from_slice(&r.max.to_le_bytes());
    }
}

fn corrupt(msg: impl Into<String>) -> GrtError {
    fail(GrtError::Corrupt(msg.into()))
}

/// Cursor over a dump buffer. Every read is bounds-checked.
struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|&end| end <= self.buf.len())
            .ok_or_else(|| corrupt(format!("unexpected end of stream at byte {}", self.pos)))?;
        let bytes = &self.buf[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    fn magic(&mut self, expected: &[u8; 4]) -> Result<()> {
        if &self.array::<4>()? != expected {
            return Err(corrupt(format!(
                "invalid magic header, expected {:?}",
                String::from_utf8_lossy(expected)
            )));
        }
        Ok(())
    }

    fn u32(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.array()?))
    }

    fn u64(&mut self) -> Result<usize> {
        usize::try_from(u64::from_le_bytes(self.array()?))
            .map_err(|_| corrupt("length does not fit in memory"))
    }

    /// A count of items that are each at least `item_size` bytes long.
    fn len(&mut self, item_size: usize) -> Result<usize> {
        let n = self.u64()?;
        let remaining = self.buf.len() - self.pos;
        if n.saturating_mul(item_size) > remaining {
            return Err(corrupt(format!(
                "{n} items can not fit in the remaining {remaining} bytes"
            )));
        }
        Ok(n)
    }

    fn flag(&mut self) -> Result<bool> {
        match self.array::<1>()?[0] {
            0 => Ok(false),
            1 => Ok(true),
            b => Err(corrupt(format!("invalid flag byte {b}"))),
        }
    }

    fn f64s(&mut self, n: usize) -> Result<Vec<f64>> {
        let bytes = self.take(n.checked_mul(8).ok_or_else(|| corrupt("payload overflow"))?)?;
        Ok(bytes
            .chunks_exact(8)
            .map(|c| {
                let mut b = [0u8; 8];
                b.copy_from_slice(c);
                f64::from_le_bytes(b)
            })
            .collect())
    }

    fn string(&mut self) -> Result<String> {
        let n = self.len(1)?;
        let bytes = self.take(n)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| corrupt("string is not valid UTF-8"))
    }

    fn ranges(&mut self) -> Result<Vec<MinMax>> {
        let n = self.len(16)?;
        let values = self.f64s(n * 2)?;
        Ok(values
            .chunks_exact(2)
            .map(|p| MinMax::new(p[0], p[1]))
            .collect())
    }

    fn finish(&self) -> Result<()> {
        if self.pos != self.buf.len() {
            return Err(corrupt(format!(
                "{} trailing bytes after the payload",
                self.buf.len() - self.pos
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix;

    #[test]
    fn vector_layout_is_magic_length_payload() {
        let bytes = vec![1.5f64, -2.0].dump();
        assert_eq!(&bytes[..4], b"gvec");
        assert_eq!(u64::from_le_bytes(bytes[4..12].try_into().unwrap()), 2);
        assert_eq!(f64::from_le_bytes(bytes[12..20].try_into().unwrap()), 1.5);
        assert_eq!(Vec::<f64>::restore(&bytes).unwrap(), vec![1.5, -2.0]);
    }

    #[test]
    fn matrix_survives_a_dump() {
        let m = matrix![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]];
        assert_eq!(MatrixFloat::restore(&m.dump()).unwrap(), m);
        assert!(MatrixFloat::restore(&MatrixFloat::new().dump()).unwrap().is_empty());
    }

    #[test]
    fn truncated_and_mislabelled_buffers_are_corrupt() {
        let bytes = matrix![[1.0, 2.0]].dump();
        assert!(matches!(
            MatrixFloat::restore(&bytes[..bytes.len() - 1]),
            Err(GrtError::Corrupt(_))
        ));
        assert!(matches!(Vec::<f64>::restore(&bytes), Err(GrtError::Corrupt(_))));
        let mut long = bytes.clone();
        long.push(0);
        assert!(matches!(MatrixFloat::restore(&long), Err(GrtError::Corrupt(_))));
    }

    #[test]
    fn matrix_with_one_zero_dimension_fails_integrity() {
        let mut bytes = MATRIX_MAGIC.to_vec();
        put_u64(&mut bytes, 3);
        put_u64(&mut bytes, 0);
        assert!(matches!(MatrixFloat::restore(&bytes), Err(GrtError::Integrity(_))));
    }

    #[test]
    fn classification_data_keeps_classes_and_metadata() {
        let mut data = ClassificationData::with_name(2, "gestures", "two swipes").unwrap();
        data.add_sample(1, &[0.0, 1.0]).unwrap();
        data.add_sample(2, &[2.0, 3.0]).unwrap();
        data.add_sample(2, &[4.0, 5.0]).unwrap();
        data.add_class(7, "idle").unwrap();
        data.set_class_name(1, "left").unwrap();
        data.set_external_ranges(vec![MinMax::new(0.0, 9.0); 2], true)
            .unwrap();

        let restored = ClassificationData::restore(&data.dump()).unwrap();
        assert_eq!(restored, data);
    }

    #[test]
    fn tampered_tracker_counts_fail_integrity() {
        let mut data = ClassificationData::new(1);
        data.add_sample(3, &[1.0]).unwrap();
        let mut bytes = data.dump();
        // dims, "NOT_SET", "", two flags, class count, then the first label
        let counter_at = 4 + 8 + (8 + 7) + 8 + 2 + 8 + 4;
        bytes[counter_at] = 2;
        assert!(matches!(
            ClassificationData::restore(&bytes),
            Err(GrtError::Integrity(_))
        ));
    }

    #[test]
    fn regression_data_round_trip() {
        let mut data = RegressionData::new(2, 1);
        data.set_name("sensor").unwrap();
        data.add_sample(&[1.0, 2.0], &[3.0]).unwrap();
        data.add_sample(&[4.0, 5.0], &[6.0]).unwrap();
        let restored = RegressionData::restore(&data.dump()).unwrap();
        assert_eq!(restored, data);
    }
}
