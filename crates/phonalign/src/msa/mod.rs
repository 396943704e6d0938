//! Multiple sequence alignment.
//!
//! The sequences are aligned pairwise, the pairwise distances give a guide
//! tree, and the tree orders the merges of progressive profile alignment.
//! When the config asks for it, a consistency library built from the
//! pairwise alignments replaces the substitution scores during the merges.

mod library;
mod progressive;

pub use library::Library;

use crate::{
    alignment::Alignment,
    config::{AlignConfig, TreeMethod},
    diagnostics,
    pairwise::{self, AllPairs, PairwiseAligner},
    profile::ProfileAligner,
    scoring::{GapOverride, ScoringModel},
    tree::{neighbor_joining, upgma, DistanceMatrix, GuideTree},
    AlignError, Result,
};

/// Aligns sets of token sequences.
#[derive(Clone, Debug)]
#[must_use]
pub struct MultipleAligner<'a, M: ?Sized> {
    /// The scoring model.
    model: &'a M,
    /// The options.
    config: AlignConfig,
}

impl<'a, M: ScoringModel + ?Sized> MultipleAligner<'a, M> {
    /// Create a new aligner.
    pub const fn new(model: &'a M, config: AlignConfig) -> Self {
        Self { model, config }
    }

    /// The options of the aligner.
    #[must_use]
    pub const fn config(&self) -> &AlignConfig {
        &self.config
    }

    /// The pairwise aligner used for all-pairs work.
    fn pairwise(&self) -> PairwiseAligner<'a, M> {
        PairwiseAligner::new(self.model, self.config.clone())
    }

    /// The guide tree for a distance matrix under the configured method.
    pub fn guide_tree(&self, distances: &DistanceMatrix) -> GuideTree {
        match self.config.tree {
            TreeMethod::Upgma => upgma(distances).guide_tree(),
            TreeMethod::NeighborJoining => neighbor_joining(distances).merge_order(),
        }
    }

    /// Align a set of sequences.
    ///
    /// The rows of the result are in input order and its score is the
    /// sum-of-pairs score of the final columns. An empty set gives an empty
    /// alignment and a single sequence a one-row alignment.
    ///
    /// # Errors
    ///
    /// * `EmptySequence` or `InvalidToken` with the index of the offending
    ///   sequence.
    /// * `IncompatibleModel` if the model cannot score a pair of tokens.
    pub fn align<S: AsRef<str>>(&self, seqs: &[Vec<S>]) -> Result<Alignment> {
        if seqs.len() < 2 {
            return self.trivial(seqs);
        }
        let all_pairs = self.pairwise().align_all_pairs(seqs)?;
        self.align_all(seqs, &all_pairs, None)
    }

    /// Align a set of sequences along a caller-supplied guide tree.
    ///
    /// # Errors
    ///
    /// * `InvalidGuideTree` if the tree does not have one leaf per sequence.
    /// * See [`MultipleAligner::align`].
    pub fn align_with_tree<S: AsRef<str>>(&self, seqs: &[Vec<S>], tree: &GuideTree) -> Result<Alignment> {
        check_tree(seqs.len(), tree)?;
        if seqs.len() < 2 {
            return self.trivial(seqs);
        }
        if self.config.use_library {
            let all_pairs = self.pairwise().align_all_pairs(seqs)?;
            self.align_all(seqs, &all_pairs, Some(tree))
        } else {
            self.merge(seqs, tree, None)
        }
    }

    /// Align zero or one sequences.
    fn trivial<S: AsRef<str>>(&self, seqs: &[Vec<S>]) -> Result<Alignment> {
        let rows = seqs
            .iter()
            .enumerate()
            .map(|(i, s)| pairwise::tokens(s, i, &self.config.gap))
            .collect::<Result<Vec<_>>>()?;
        Ok(Alignment::from_parts(
            rows.iter().map(|r| r.iter().map(ToString::to_string).collect()).collect(),
            rows.iter().map(|r| 0..r.len()).collect(),
            self.config.gap.clone(),
            0.0,
        ))
    }

    /// Build the tree and library as configured, then merge.
    fn align_all<S: AsRef<str>>(
        &self,
        seqs: &[Vec<S>],
        all_pairs: &AllPairs,
        tree: Option<&GuideTree>,
    ) -> Result<Alignment> {
        let tree = match tree {
            Some(tree) => tree.clone(),
            None => self.guide_tree(&all_pairs.distances(self.config.normalization)?),
        };

        if self.config.use_library {
            let tokens = seqs
                .iter()
                .enumerate()
                .map(|(i, s)| pairwise::tokens(s, i, &self.config.gap))
                .collect::<Result<Vec<_>>>()?;
            let library = Library::build(all_pairs, &tokens, self.model)?;
            self.merge(seqs, &tree, Some(&library))
        } else {
            self.merge(seqs, &tree, None)
        }
    }

    /// Progressive alignment along `tree`, scored by sum of pairs.
    fn merge<S: AsRef<str>>(&self, seqs: &[Vec<S>], tree: &GuideTree, library: Option<&Library>) -> Result<Alignment> {
        let aligner = ProfileAligner::new(self.model, &self.config, seqs)?;
        let aligner = match library {
            Some(library) => aligner.with_library(library),
            None => aligner,
        };
        let root = progressive::progressive(&aligner, tree)?;

        let alignment = root.to_alignment(seqs, &self.config.gap, 0.0);
        let model = GapOverride::new(self.model, self.config.gap_open, self.config.gap_extend);
        let score = diagnostics::sum_of_pairs(&alignment, &model)?;
        Ok(alignment.with_score(score))
    }
}

impl<M: ScoringModel + Sync + ?Sized> MultipleAligner<'_, M> {
    /// Parallel version of [`MultipleAligner::align`].
    ///
    /// The all-pairs alignments run on the rayon thread pool; the merges
    /// are sequential.
    ///
    /// # Errors
    ///
    /// See [`MultipleAligner::align`].
    pub fn par_align<S: AsRef<str> + Sync>(&self, seqs: &[Vec<S>]) -> Result<Alignment> {
        if seqs.len() < 2 {
            return self.trivial(seqs);
        }
        let all_pairs = self.pairwise().par_align_all_pairs(seqs)?;
        self.align_all(seqs, &all_pairs, None)
    }
}

/// Check that a guide tree has one leaf per sequence.
fn check_tree(n: usize, tree: &GuideTree) -> Result<()> {
    if tree.leaves() == n {
        Ok(())
    } else {
        Err(AlignError::guide_tree(format!(
            "the tree has {} leaves for {n} sequences",
            tree.leaves()
        )))
    }
}
