use core::cmp::Ordering;

use super::DEFAULT_NAME;

/// Per-label sample counter carried alongside a classification dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassTracker {
    pub label: u32,
    pub counter: usize,
    pub name: String,
}

impl ClassTracker {
    pub fn new(label: u32, counter: usize, name: impl Into<String>) -> Self {
        Self {
            label,
            counter,
            name: name.into(),
        }
    }

    /// An unnamed tracker for `label` with one sample.
    pub(crate) fn first_sample(label: u32) -> Self {
        Self::new(label, 1, DEFAULT_NAME)
    }

    pub fn by_label_ascending(a: &Self, b: &Self) -> Ordering {
        a.label.cmp(&b.label)
    }

    pub fn by_label_descending(a: &Self, b: &Self) -> Ordering {
        b.label.cmp(&a.label)
    }
}

impl Default for ClassTracker {
    fn default() -> Self {
        Self::new(0, 0, DEFAULT_NAME)
    }
}
