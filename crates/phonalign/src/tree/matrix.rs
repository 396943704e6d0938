//! Validated distance matrices.

use ndarray::Array2;

use crate::{pairwise::PairwiseAligner, scoring::ScoringModel, AlignError, Result};

/// Entries closer than this are treated as equal when checking symmetry and
/// the zero diagonal.
pub const TOLERANCE: f64 = 1e-9;

/// A symmetric matrix of non-negative distances with a zero diagonal.
#[derive(Clone, Debug, PartialEq)]
#[must_use]
pub struct DistanceMatrix {
    /// The distances.
    values: Array2<f64>,
}

impl DistanceMatrix {
    /// Wrap a square array of distances.
    ///
    /// # Errors
    ///
    /// * `DegenerateDistanceMatrix` if the array is empty, not square, holds a
    ///   negative or non-finite entry, has a non-zero diagonal entry, or is
    ///   not symmetric.
    pub fn new(values: Array2<f64>) -> Result<Self> {
        let (rows, cols) = values.dim();
        if rows == 0 {
            return Err(AlignError::degenerate("the matrix is empty"));
        }
        if rows != cols {
            return Err(AlignError::degenerate(format!("the matrix is {rows} x {cols}")));
        }
        if let Some(((i, j), d)) = values.indexed_iter().find(|(_, d)| !d.is_finite() || **d < 0.0) {
            return Err(AlignError::degenerate(format!("entry ({i}, {j}) is {d}")));
        }
        if let Some(i) = (0..rows).find(|&i| values[[i, i]] > TOLERANCE) {
            return Err(AlignError::degenerate(format!(
                "diagonal entry {i} is {}",
                values[[i, i]]
            )));
        }
        for i in 0..rows {
            for j in (i + 1)..rows {
                if (values[[i, j]] - values[[j, i]]).abs() > TOLERANCE {
                    return Err(AlignError::degenerate(format!(
                        "entries ({i}, {j}) and ({j}, {i}) differ: {} vs {}",
                        values[[i, j]],
                        values[[j, i]]
                    )));
                }
            }
        }
        Ok(Self { values })
    }

    /// Build a matrix from nested rows.
    ///
    /// # Errors
    ///
    /// * `DegenerateDistanceMatrix` if a row has the wrong length, or for any
    ///   reason listed in [`DistanceMatrix::new`].
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        let n = rows.len();
        if let Some((i, row)) = rows.iter().enumerate().find(|(_, row)| row.len() != n) {
            return Err(AlignError::degenerate(format!(
                "row {i} has {} entries, expected {n}",
                row.len()
            )));
        }
        let flat = rows.iter().flatten().copied().collect();
        let values = Array2::from_shape_vec((n, n), flat)
            .unwrap_or_else(|e| unreachable!("Rows were checked to be square: {e}"));
        Self::new(values)
    }

    /// The distances between all pairs of sequences under an aligner.
    ///
    /// # Errors
    ///
    /// * See [`PairwiseAligner::align_all_pairs`].
    /// * `DegenerateDistanceMatrix` if `seqs` is empty.
    pub fn from_sequences<M, S>(aligner: &PairwiseAligner<'_, M>, seqs: &[Vec<S>]) -> Result<Self>
    where
        M: ScoringModel + ?Sized,
        S: AsRef<str>,
    {
        aligner
            .align_all_pairs(seqs)?
            .distances(aligner.config().normalization)
    }

    /// Parallel version of [`DistanceMatrix::from_sequences`].
    ///
    /// # Errors
    ///
    /// See [`DistanceMatrix::from_sequences`].
    pub fn par_from_sequences<M, S>(aligner: &PairwiseAligner<'_, M>, seqs: &[Vec<S>]) -> Result<Self>
    where
        M: ScoringModel + Sync + ?Sized,
        S: AsRef<str> + Sync,
    {
        aligner
            .par_align_all_pairs(seqs)?
            .distances(aligner.config().normalization)
    }

    /// The number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.nrows()
    }

    /// Whether the matrix has no items. Never true for a validated matrix.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The distance between items `i` and `j`, read from the upper triangle.
    #[must_use]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        if i == j {
            0.0
        } else {
            self.values[[i.min(j), i.max(j)]]
        }
    }

    /// The underlying array.
    #[must_use]
    pub const fn values(&self) -> &Array2<f64> {
        &self.values
    }
}
