//! The consistency library.
//!
//! Every pairwise alignment votes for the token pairs it aligns, with the
//! share of its aligned columns whose sound classes agree as its weight.
//! A pair of positions is further supported by every third sequence that
//! aligns both positions to the same token, by the weaker of the two votes
//! involved. The summed support, averaged over the other sequences and
//! scaled by the tokens' self scores, replaces the substitution score during
//! progressive alignment.

use crate::{pairwise::AllPairs, scoring::ScoringModel, utils, Result};

/// Library scores for every pair of token positions across sequences.
#[derive(Clone, Debug, PartialEq)]
#[must_use]
pub struct Library {
    /// The number of sequences.
    n: usize,
    /// For each pair `i < j`, the score of position `p` of `i` against
    /// position `q` of `j` at `[p][q]`.
    scores: Vec<Vec<Vec<f64>>>,
}

/// The position in `j` aligned with each position of `i`, for one pair.
type PositionMap = Vec<Option<usize>>;

impl Library {
    /// Build the library from the alignments of all pairs.
    ///
    /// `seqs` must be the checked tokens the alignments were computed from.
    ///
    /// # Errors
    ///
    /// * `IncompatibleModel` if the model cannot score a token against itself.
    pub fn build<M: ScoringModel + ?Sized>(all_pairs: &AllPairs, seqs: &[Vec<&str>], model: &M) -> Result<Self> {
        let n = all_pairs.len();
        let mut maps = vec![vec![PositionMap::new(); n]; n];
        let mut weights = vec![vec![0.0; n]; n];

        for ((i, j), aln) in all_pairs.iter() {
            let (mut p, mut q) = (aln.spans()[0].start, aln.spans()[1].start);
            let mut i_to_j = vec![None; seqs[i].len()];
            let mut j_to_i = vec![None; seqs[j].len()];
            let (mut aligned, mut agree) = (0_usize, 0_usize);

            for (a, b) in aln[0].iter().zip(aln[1].iter()) {
                match (aln.is_gap(a), aln.is_gap(b)) {
                    (false, false) => {
                        i_to_j[p] = Some(q);
                        j_to_i[q] = Some(p);
                        aligned += 1;
                        if model.class_or(a, a) == model.class_or(b, b) {
                            agree += 1;
                        }
                        p += 1;
                        q += 1;
                    }
                    (false, true) => p += 1,
                    (true, false) => q += 1,
                    (true, true) => (),
                }
            }

            let w = if aligned == 0 { 0.0 } else { agree as f64 / aligned as f64 };
            weights[i][j] = w;
            weights[j][i] = w;
            maps[i][j] = i_to_j;
            maps[j][i] = j_to_i;
        }

        let self_scores = seqs
            .iter()
            .map(|s| s.iter().map(|t| model.score(t, t)).collect::<Result<Vec<_>>>())
            .collect::<Result<Vec<_>>>()?;

        let scale = (n.max(2) - 1) as f64;
        let scores = utils::pairs(n)
            .into_iter()
            .map(|(i, j)| {
                let mut support = vec![vec![0.0; seqs[j].len()]; seqs[i].len()];
                for (p, row) in support.iter_mut().enumerate() {
                    if let Some(q) = maps[i][j][p] {
                        row[q] += weights[i][j];
                    }
                    for k in (0..n).filter(|&k| k != i && k != j) {
                        if let Some(q) = maps[i][k][p].and_then(|r| maps[k][j][r]) {
                            row[q] += weights[i][k].min(weights[k][j]);
                        }
                    }
                }
                for (p, row) in support.iter_mut().enumerate() {
                    for (q, s) in row.iter_mut().enumerate() {
                        *s *= (self_scores[i][p] + self_scores[j][q]) / 2.0 / scale;
                    }
                }
                support
            })
            .collect::<Vec<_>>();

        ftlog::debug!(
            "Built a consistency library over {n} sequences with {} supported position pairs",
            scores.iter().flatten().flatten().filter(|&&s| s != 0.0).count()
        );

        Ok(Self { n, scores })
    }

    /// The number of sequences.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.n
    }

    /// Whether the library covers no sequences.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// The library score of position `p` of sequence `i` against position
    /// `q` of sequence `j`. Zero for positions of the same sequence.
    #[must_use]
    pub fn score(&self, i: usize, p: usize, j: usize, q: usize) -> f64 {
        match i.cmp(&j) {
            core::cmp::Ordering::Less => self.scores[utils::pair_index(self.n, i, j)][p][q],
            core::cmp::Ordering::Greater => self.scores[utils::pair_index(self.n, j, i)][q][p],
            core::cmp::Ordering::Equal => 0.0,
        }
    }
}
