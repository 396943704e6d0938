//! Pairwise alignment of token sequences.

pub(crate) mod dialign;
pub mod ops;
pub(crate) mod table;

pub use ops::{Direction, Path};

use rayon::prelude::*;

use crate::{
    alignment::Alignment,
    config::{AlignConfig, Mode, Normalization},
    scoring::{GapContext, GapOverride, ScoringModel},
    tree::DistanceMatrix,
    utils, AlignError, Result,
};

use table::{Costs, Ends};

/// Check that a sequence is non-empty and free of empty and gap tokens.
///
/// # Errors
///
/// * `EmptySequence` if the sequence has no tokens.
/// * `InvalidToken` if a token is empty or equal to the gap token.
pub(crate) fn tokens<'s, S: AsRef<str>>(seq: &'s [S], index: usize, gap: &str) -> Result<Vec<&'s str>> {
    if seq.is_empty() {
        return Err(AlignError::EmptySequence { index });
    }
    seq.iter()
        .map(AsRef::as_ref)
        .map(|t| {
            if t.is_empty() || t == gap {
                Err(AlignError::InvalidToken {
                    index,
                    token: t.to_string(),
                })
            } else {
                Ok(t)
            }
        })
        .collect()
}

/// Turn a similarity score into a distance in `[0, 1]`.
///
/// `self_scores` are the scores of each sequence against itself and
/// `lengths` their numbers of tokens.
pub(crate) fn normalize(normalization: Normalization, score: f64, self_scores: [f64; 2], lengths: [usize; 2]) -> f64 {
    let denominator = match normalization {
        Normalization::SelfSimilarity => (self_scores[0] + self_scores[1]) / 2.0,
        Normalization::Length { max_token_score } => max_token_score * lengths[0].max(lengths[1]) as f64,
    };
    if denominator <= 0.0 {
        1.0
    } else {
        (1.0 - score / denominator).clamp(0.0, 1.0)
    }
}

/// Aligns pairs of token sequences under a scoring model.
///
/// The model is borrowed for the life of the aligner. Gap costs set in the
/// config replace the model's.
#[derive(Clone, Debug)]
#[must_use]
pub struct PairwiseAligner<'a, M: ?Sized> {
    /// The model, with the config's gap overrides applied.
    model: GapOverride<'a, M>,
    /// The options.
    config: AlignConfig,
}

impl<'a, M: ScoringModel + ?Sized> PairwiseAligner<'a, M> {
    /// Create a new aligner.
    pub fn new(model: &'a M, config: AlignConfig) -> Self {
        let model = GapOverride::new(model, config.gap_open, config.gap_extend);
        Self { model, config }
    }

    /// The options of the aligner.
    #[must_use]
    pub const fn config(&self) -> &AlignConfig {
        &self.config
    }

    /// Substitution scores and gap costs for two checked sequences.
    pub(crate) fn costs(&self, x: &[&str], y: &[&str]) -> Result<Costs> {
        let sub = x
            .iter()
            .map(|a| y.iter().map(|b| self.model.score(a, b)).collect::<Result<Vec<_>>>())
            .collect::<Result<Vec<_>>>()?;
        let gaps = |s: &[&str]| {
            s.iter()
                .map(|t| {
                    [
                        self.model.gap_cost(GapContext::open(t)),
                        self.model.gap_cost(GapContext::extend(t)),
                    ]
                })
                .collect()
        };
        Ok(Costs {
            sub,
            x_gaps: gaps(x),
            y_gaps: gaps(y),
        })
    }

    /// The best path through the DP table of two checked sequences.
    pub(crate) fn path(&self, x: &[&str], y: &[&str]) -> Result<Path> {
        let costs = self.costs(x, y)?;
        let path = match self.config.mode {
            Mode::Global => table::best_path(&costs, Ends::Closed),
            Mode::Local => table::best_path(&costs, Ends::Local),
            Mode::SemiGlobal if x.len() <= y.len() => table::best_path(&costs, Ends::FreeY),
            Mode::SemiGlobal => table::best_path(&costs, Ends::FreeX),
            Mode::Dialign => dialign::best_path(&costs, self.config.fragment_tie_break),
        };
        Ok(path)
    }

    /// Align two checked sequences.
    fn align_tokens(&self, x: &[&str], y: &[&str]) -> Result<Alignment> {
        let path = self.path(x, y)?;
        Ok(render(x, y, &path, &self.config.gap))
    }

    /// Align two sequences in the configured mode.
    ///
    /// # Errors
    ///
    /// * `EmptySequence` if either sequence is empty. The index is 0 for `x`
    ///   and 1 for `y`.
    /// * `InvalidToken` if a token is empty or is the gap token.
    /// * `IncompatibleModel` if the model cannot score a pair of tokens.
    pub fn align<S: AsRef<str>>(&self, x: &[S], y: &[S]) -> Result<Alignment> {
        let (x, y) = (tokens(x, 0, &self.config.gap)?, tokens(y, 1, &self.config.gap)?);
        self.align_tokens(&x, &y)
    }

    /// The score of the best alignment of two sequences.
    ///
    /// # Errors
    ///
    /// See [`PairwiseAligner::align`].
    pub fn score<S: AsRef<str>>(&self, x: &[S], y: &[S]) -> Result<f64> {
        let (x, y) = (tokens(x, 0, &self.config.gap)?, tokens(y, 1, &self.config.gap)?);
        Ok(self.path(&x, &y)?.score)
    }

    /// The distance between two sequences, normalized as configured.
    ///
    /// # Errors
    ///
    /// See [`PairwiseAligner::align`].
    pub fn distance<S: AsRef<str>>(&self, x: &[S], y: &[S]) -> Result<f64> {
        let (x, y) = (tokens(x, 0, &self.config.gap)?, tokens(y, 1, &self.config.gap)?);
        let s_xy = self.path(&x, &y)?.score;
        let (s_xx, s_yy) = (self.path(&x, &x)?.score, self.path(&y, &y)?.score);
        Ok(normalize(self.config.normalization, s_xy, [s_xx, s_yy], [x.len(), y.len()]))
    }

    /// Align many unrelated pairs of sequences.
    ///
    /// # Errors
    ///
    /// The first error of any pair, as in [`PairwiseAligner::align`].
    pub fn align_pairs<S: AsRef<str>>(&self, pairs: &[(&[S], &[S])]) -> Result<Vec<Alignment>> {
        pairs.iter().map(|(x, y)| self.align(x, y)).collect()
    }

    /// Align every pair of sequences in a set.
    ///
    /// # Errors
    ///
    /// * `EmptySequence` or `InvalidToken` with the index of the offending
    ///   sequence.
    /// * `IncompatibleModel` if the model cannot score a pair of tokens.
    pub fn align_all_pairs<S: AsRef<str>>(&self, seqs: &[Vec<S>]) -> Result<AllPairs> {
        let seqs = self.check_all(seqs)?;
        ftlog::debug!("Aligning {} pairs of {} sequences", utils::n_pairs(seqs.len()), seqs.len());

        let self_scores = seqs
            .iter()
            .map(|s| self.path(s, s).map(|p| p.score))
            .collect::<Result<Vec<_>>>()?;
        let alignments = utils::pairs(seqs.len())
            .into_iter()
            .map(|(i, j)| self.align_tokens(&seqs[i], &seqs[j]))
            .collect::<Result<Vec<_>>>()?;

        Ok(AllPairs {
            alignments,
            self_scores,
            lengths: seqs.iter().map(Vec::len).collect(),
        })
    }

    /// Check every sequence of a set.
    fn check_all<'s, S: AsRef<str>>(&self, seqs: &'s [Vec<S>]) -> Result<Vec<Vec<&'s str>>> {
        seqs.iter()
            .enumerate()
            .map(|(i, s)| tokens(s, i, &self.config.gap))
            .collect()
    }
}

impl<M: ScoringModel + Sync + ?Sized> PairwiseAligner<'_, M> {
    /// Parallel version of [`PairwiseAligner::align_pairs`].
    ///
    /// Falls back to the sequential version for at most `par_threshold`
    /// pairs.
    ///
    /// # Errors
    ///
    /// See [`PairwiseAligner::align_pairs`].
    pub fn par_align_pairs<S: AsRef<str> + Sync>(&self, pairs: &[(&[S], &[S])]) -> Result<Vec<Alignment>> {
        if pairs.len() <= self.config.par_threshold {
            return self.align_pairs(pairs);
        }
        pairs.par_iter().map(|(x, y)| self.align(x, y)).collect()
    }

    /// Parallel version of [`PairwiseAligner::align_all_pairs`].
    ///
    /// Falls back to the sequential version for at most `par_threshold`
    /// pairs. Each pair owns its DP table and results are gathered by index.
    ///
    /// # Errors
    ///
    /// See [`PairwiseAligner::align_all_pairs`].
    pub fn par_align_all_pairs<S: AsRef<str> + Sync>(&self, seqs: &[Vec<S>]) -> Result<AllPairs> {
        if utils::n_pairs(seqs.len()) <= self.config.par_threshold {
            return self.align_all_pairs(seqs);
        }
        let seqs = self.check_all(seqs)?;
        ftlog::debug!(
            "Aligning {} pairs of {} sequences in parallel",
            utils::n_pairs(seqs.len()),
            seqs.len()
        );

        let self_scores = seqs
            .par_iter()
            .map(|s| self.path(s, s).map(|p| p.score))
            .collect::<Result<Vec<_>>>()?;
        let alignments = utils::pairs(seqs.len())
            .into_par_iter()
            .map(|(i, j)| self.align_tokens(&seqs[i], &seqs[j]))
            .collect::<Result<Vec<_>>>()?;

        Ok(AllPairs {
            alignments,
            self_scores,
            lengths: seqs.iter().map(Vec::len).collect(),
        })
    }
}

/// Build the two rows of an alignment from a path.
fn render(x: &[&str], y: &[&str], path: &Path, gap: &str) -> Alignment {
    let (mut i, mut j) = path.start;
    let mut top = Vec::with_capacity(path.steps.len());
    let mut bottom = Vec::with_capacity(path.steps.len());
    for d in &path.steps {
        match d {
            Direction::Diagonal => {
                top.push(x[i].to_string());
                bottom.push(y[j].to_string());
                i += 1;
                j += 1;
            }
            Direction::Up => {
                top.push(x[i].to_string());
                bottom.push(gap.to_string());
                i += 1;
            }
            Direction::Left => {
                top.push(gap.to_string());
                bottom.push(y[j].to_string());
                j += 1;
            }
        }
    }
    Alignment::from_parts(
        vec![top, bottom],
        vec![path.start.0..i, path.start.1..j],
        gap.to_string(),
        path.score,
    )
}

/// The alignments of every pair in a set of sequences.
#[derive(Clone, Debug)]
#[must_use]
pub struct AllPairs {
    /// The alignment of each pair `i < j`, in row-major order.
    alignments: Vec<Alignment>,
    /// The score of each sequence against itself.
    self_scores: Vec<f64>,
    /// The number of tokens in each sequence.
    lengths: Vec<usize>,
}

impl AllPairs {
    /// The number of sequences.
    #[must_use]
    pub fn len(&self) -> usize {
        self.self_scores.len()
    }

    /// Whether the set has no sequences.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.self_scores.is_empty()
    }

    /// The alignment of sequences `i < j`, with `i` in the first row.
    #[must_use]
    pub fn get(&self, i: usize, j: usize) -> Option<&Alignment> {
        if i < j && j < self.len() {
            Some(&self.alignments[utils::pair_index(self.len(), i, j)])
        } else {
            None
        }
    }

    /// The pairs `(i, j)`, `i < j`, with their alignments.
    pub fn iter(&self) -> impl Iterator<Item = ((usize, usize), &Alignment)> {
        utils::pairs(self.len()).into_iter().zip(self.alignments.iter())
    }

    /// The score of sequence `i` aligned with itself.
    #[must_use]
    pub fn self_score(&self, i: usize) -> f64 {
        self.self_scores[i]
    }

    /// The distance matrix of the set.
    ///
    /// # Errors
    ///
    /// * `DegenerateDistanceMatrix` if the set is empty.
    pub fn distances(&self, normalization: Normalization) -> Result<DistanceMatrix> {
        let n = self.len();
        let mut values = vec![vec![0.0; n]; n];
        for ((i, j), aln) in self.iter() {
            let d = normalize(
                normalization,
                aln.score(),
                [self.self_scores[i], self.self_scores[j]],
                [self.lengths[i], self.lengths[j]],
            );
            values[i][j] = d;
            values[j][i] = d;
        }
        DistanceMatrix::from_rows(&values)
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        config::{AlignConfig, Mode, Normalization},
        scoring::{GapPolicy, SoundClassModel},
        AlignError,
    };

    use super::{normalize, PairwiseAligner};

    fn model() -> SoundClassModel {
        SoundClassModel::new(GapPolicy::Constant(2.0))
            .with_identity_score(1.0)
            .with_default_score(-1.0)
    }

    #[test]
    fn rejects_bad_input() {
        let model = model();
        let aligner = PairwiseAligner::new(&model, AlignConfig::default());

        let empty: [&str; 0] = [];
        assert_eq!(aligner.align(&empty, &["a"]), Err(AlignError::EmptySequence { index: 0 }));
        assert_eq!(aligner.align(&["a"], &empty), Err(AlignError::EmptySequence { index: 1 }));
        assert_eq!(
            aligner.align(&["a", "-"], &["a"]),
            Err(AlignError::InvalidToken {
                index: 0,
                token: "-".into()
            })
        );
        assert_eq!(
            aligner.align(&["a"], &["a", ""]),
            Err(AlignError::InvalidToken {
                index: 1,
                token: String::new()
            })
        );

        let strict = SoundClassModel::new(GapPolicy::Constant(1.0)).with_identity_score(1.0);
        let aligner = PairwiseAligner::new(&strict, AlignConfig::default());
        assert_eq!(
            aligner.align(&["a"], &["b"]),
            Err(AlignError::IncompatibleModel {
                a: "a".into(),
                b: "b".into()
            })
        );
    }

    #[test]
    fn spans_by_mode() {
        let model = model();
        let x = ["x", "x", "a", "b", "c", "y"];
        let y = ["z", "a", "b", "c"];

        let local = PairwiseAligner::new(&model, AlignConfig::default().with_mode(Mode::Local));
        let aln = local.align(&x, &y).unwrap();
        assert_eq!(aln.spans(), &[2..5, 1..4]);
        assert_eq!(aln.ungapped(0), vec!["a", "b", "c"]);
        assert_eq!(aln.score(), 3.0);

        for mode in [Mode::Global, Mode::SemiGlobal, Mode::Dialign] {
            let aligner = PairwiseAligner::new(&model, AlignConfig::default().with_mode(mode));
            let aln = aligner.align(&x, &y).unwrap();
            assert_eq!(aln.spans(), &[0..6, 0..4], "{mode:?}");
            assert_eq!(aln.ungapped(0), x.to_vec());
            assert_eq!(aln.ungapped(1), y.to_vec());
        }
    }

    #[test]
    fn gap_overrides() {
        let model = model();
        let x = ["a", "b", "c"];
        let y = ["a", "c"];

        let aligner = PairwiseAligner::new(&model, AlignConfig::default());
        assert_eq!(aligner.score(&x, &y).unwrap(), 0.0);

        let cheap = PairwiseAligner::new(&model, AlignConfig::default().with_gap_open(0.5).with_gap_extend(0.5));
        assert_eq!(cheap.score(&x, &y).unwrap(), 1.5);
    }

    #[test]
    fn normalizations() {
        assert_eq!(normalize(Normalization::SelfSimilarity, 4.0, [4.0, 4.0], [2, 2]), 0.0);
        assert_eq!(normalize(Normalization::SelfSimilarity, 2.0, [4.0, 4.0], [2, 2]), 0.5);
        assert_eq!(normalize(Normalization::SelfSimilarity, -9.0, [4.0, 4.0], [2, 2]), 1.0);
        assert_eq!(normalize(Normalization::SelfSimilarity, 0.0, [0.0, 0.0], [2, 2]), 1.0);

        let length = Normalization::Length { max_token_score: 2.0 };
        assert_eq!(normalize(length, 3.0, [0.0, 0.0], [2, 3]), 0.5);
    }
}
