//! Profiles: partial multiple alignments merged column by column.
//!
//! A profile stores, for every column, the position of each member's token
//! in its input sequence, or `None` for a gap. Tokens are never copied into
//! a profile, so merging two profiles only rearranges positions, and every
//! member's tokens can always be read back in their original order.

mod aligner;

pub use aligner::ProfileAligner;

use crate::{alignment::Alignment, AlignError, Result};

/// A partial multiple alignment over a subset of the input sequences.
#[derive(Clone, Debug, Eq, PartialEq)]
#[must_use]
pub struct Profile {
    /// The input index of the sequence in each row.
    members: Vec<usize>,
    /// For each column, the token position of each row, or `None` for a gap.
    columns: Vec<Vec<Option<usize>>>,
}

impl Profile {
    /// The profile of a single sequence of `len` tokens.
    pub fn leaf(index: usize, len: usize) -> Self {
        Self {
            members: vec![index],
            columns: (0..len).map(|p| vec![Some(p)]).collect(),
        }
    }

    /// Create a profile from its columns.
    ///
    /// # Errors
    ///
    /// * `InconsistentProfileWidth` if a column does not have one entry per
    ///   member.
    pub fn from_columns(members: Vec<usize>, columns: Vec<Vec<Option<usize>>>) -> Result<Self> {
        if let Some(col) = columns.iter().find(|col| col.len() != members.len()) {
            return Err(AlignError::InconsistentProfileWidth {
                expected: members.len(),
                found: col.len(),
            });
        }
        Ok(Self { members, columns })
    }

    /// The number of columns.
    #[must_use]
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// The number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the profile has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// The input index of the sequence in each row.
    #[must_use]
    pub fn members(&self) -> &[usize] {
        &self.members
    }

    /// The columns.
    #[must_use]
    pub fn columns(&self) -> &[Vec<Option<usize>>] {
        &self.columns
    }

    /// The number of tokens (non-gap entries) in column `c`.
    #[must_use]
    pub fn weight(&self, c: usize) -> usize {
        self.columns[c].iter().flatten().count()
    }

    /// The token positions of row `r`, with gaps removed.
    #[must_use]
    pub fn positions(&self, r: usize) -> Vec<usize> {
        self.columns.iter().filter_map(|col| col[r]).collect()
    }

    /// Column `c` of `self` stacked over column `d` of `other`, with gaps
    /// standing in for a missing side.
    fn joined(&self, c: Option<usize>, other: &Self, d: Option<usize>) -> Vec<Option<usize>> {
        let mut col = c.map_or_else(|| vec![None; self.len()], |c| self.columns[c].clone());
        col.extend(d.map_or_else(|| vec![None; other.len()], |d| other.columns[d].clone()));
        col
    }

    /// Turn the profile into an alignment, one row per member in increasing
    /// order of input index.
    pub fn to_alignment<S: AsRef<str>>(&self, seqs: &[Vec<S>], gap: &str, score: f64) -> Alignment {
        let mut order = (0..self.len()).collect::<Vec<_>>();
        order.sort_by_key(|&r| self.members[r]);

        let rows = order
            .iter()
            .map(|&r| {
                let seq = &seqs[self.members[r]];
                self.columns
                    .iter()
                    .map(|col| col[r].map_or_else(|| gap.to_string(), |p| seq[p].as_ref().to_string()))
                    .collect()
            })
            .collect();
        let spans = order.iter().map(|&r| 0..seqs[self.members[r]].len()).collect();

        Alignment::from_parts(rows, spans, gap.to_string(), score)
    }
}
