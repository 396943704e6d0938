//! Utility functions for the crate.

use core::cmp::Ordering;

/// Return the index and value of the maximum value in the given slice of values.
///
/// NAN values are ordered as smaller than all other values. Among equal
/// values the first is returned.
///
/// This will return `None` if the given slice is empty.
pub fn arg_max<T: PartialOrd + Copy>(values: &[T]) -> Option<(usize, T)> {
    let is_nan = |v: &T| v.partial_cmp(v).is_none();
    values.iter().enumerate().fold(None, |best, (i, &v)| match best {
        Some((_, b)) if is_nan(&b) && !is_nan(&v) => Some((i, v)),
        Some((_, b)) if v.partial_cmp(&b) != Some(Ordering::Greater) => best,
        _ => Some((i, v)),
    })
}

/// The number of unordered pairs of `n` items.
#[must_use]
pub const fn n_pairs(n: usize) -> usize {
    n * n.saturating_sub(1) / 2
}

/// All pairs `(i, j)` with `i < j < n`, in row-major order.
#[must_use]
pub fn pairs(n: usize) -> Vec<(usize, usize)> {
    (0..n).flat_map(|i| ((i + 1)..n).map(move |j| (i, j))).collect()
}

/// The position of the pair `(i, j)`, `i < j < n`, in the order of [`pairs`].
#[must_use]
pub const fn pair_index(n: usize, i: usize, j: usize) -> usize {
    i * n - i * (i + 1) / 2 + (j - i - 1)
}

/// The arithmetic mean of the given values, or `None` if there are none.
#[must_use]
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}
