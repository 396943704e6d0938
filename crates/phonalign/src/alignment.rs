//! Pairwise and multiple alignments of token sequences.

use core::ops::{Index, Range};

use crate::{diagnostics, scoring::ScoringModel, AlignError, Result};

/// An alignment of token sequences.
///
/// Every row has the same width. Removing the gap tokens from row `i`
/// yields the tokens of input sequence `i` over `spans()[i]`, which is the
/// whole sequence for every mode except local alignment.
#[derive(Clone, Debug, PartialEq)]
#[must_use]
pub struct Alignment {
    /// The aligned rows.
    rows: Vec<Vec<String>>,
    /// The part of each input sequence covered by its row.
    spans: Vec<Range<usize>>,
    /// The gap token.
    gap: String,
    /// The score of the alignment.
    score: f64,
}

impl Alignment {
    /// Assemble an alignment from parts the engine has already checked.
    pub(crate) fn from_parts(rows: Vec<Vec<String>>, spans: Vec<Range<usize>>, gap: String, score: f64) -> Self {
        Self {
            rows,
            spans,
            gap,
            score,
        }
    }

    /// Create an alignment from rows that span whole sequences.
    ///
    /// The score is zero until set with [`Alignment::with_score`].
    ///
    /// # Errors
    ///
    /// * `InconsistentProfileWidth` if the rows differ in width.
    pub fn from_rows<S: Into<String>>(rows: Vec<Vec<S>>, gap: S) -> Result<Self> {
        let gap = gap.into();
        let rows = rows
            .into_iter()
            .map(|row| row.into_iter().map(Into::into).collect::<Vec<String>>())
            .collect::<Vec<_>>();

        let expected = rows.first().map_or(0, Vec::len);
        if let Some(row) = rows.iter().find(|row| row.len() != expected) {
            return Err(AlignError::InconsistentProfileWidth {
                expected,
                found: row.len(),
            });
        }

        let spans = rows
            .iter()
            .map(|row| 0..row.iter().filter(|t| **t != gap).count())
            .collect();

        Ok(Self {
            rows,
            spans,
            gap,
            score: 0.0,
        })
    }

    /// Replace the score.
    pub const fn with_score(mut self, score: f64) -> Self {
        self.score = score;
        self
    }

    /// The rows of the alignment.
    #[must_use]
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// The part of each input sequence that its row covers.
    #[must_use]
    pub fn spans(&self) -> &[Range<usize>] {
        &self.spans
    }

    /// The gap token.
    #[must_use]
    pub fn gap(&self) -> &str {
        &self.gap
    }

    /// The score of the alignment.
    #[must_use]
    pub const fn score(&self) -> f64 {
        self.score
    }

    /// The number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the alignment has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The number of columns.
    #[must_use]
    pub fn width(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    /// Whether `token` is the gap token.
    #[must_use]
    pub fn is_gap(&self, token: &str) -> bool {
        token == self.gap
    }

    /// The entries of column `c`, top to bottom. Gaps are `None`.
    #[must_use]
    pub fn column(&self, c: usize) -> Vec<Option<&str>> {
        self.rows
            .iter()
            .map(|row| Some(row[c].as_str()).filter(|t| !self.is_gap(t)))
            .collect()
    }

    /// The tokens of row `i` with the gaps removed.
    #[must_use]
    pub fn ungapped(&self, i: usize) -> Vec<&str> {
        self.rows[i]
            .iter()
            .map(String::as_str)
            .filter(|t| !self.is_gap(t))
            .collect()
    }

    /// Rows `i` and `j` with the columns where both are gaps removed.
    ///
    /// Gaps are `None`.
    #[must_use]
    pub fn project(&self, i: usize, j: usize) -> Vec<(Option<&str>, Option<&str>)> {
        self.rows[i]
            .iter()
            .zip(self.rows[j].iter())
            .map(|(a, b)| {
                (
                    Some(a.as_str()).filter(|t| !self.is_gap(t)),
                    Some(b.as_str()).filter(|t| !self.is_gap(t)),
                )
            })
            .filter(|(a, b)| a.is_some() || b.is_some())
            .collect()
    }

    /// Recompute the score from the columns under `model`.
    ///
    /// This is the sum-of-pairs score, which for two rows is the global
    /// score with affine gaps.
    ///
    /// # Errors
    ///
    /// * `IncompatibleModel` if the model cannot score a pair of tokens.
    pub fn rescore<M: ScoringModel + ?Sized>(&self, model: &M) -> Result<f64> {
        diagnostics::sum_of_pairs(self, model)
    }

    /// The rows joined into strings with the given separator.
    #[must_use]
    pub fn strings(&self, sep: &str) -> Vec<String> {
        self.rows.iter().map(|row| row.join(sep)).collect()
    }
}

impl Index<usize> for Alignment {
    type Output = [String];

    fn index(&self, index: usize) -> &Self::Output {
        &self.rows[index]
    }
}
