//! Options controlling an alignment call.

/// The traceback policy of a pairwise alignment.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Mode {
    /// Needleman-Wunsch: both sequences are aligned end to end.
    #[default]
    Global,
    /// Smith-Waterman: only the best-scoring pair of substrings is aligned.
    Local,
    /// The shorter sequence is aligned in full and end gaps on the longer
    /// one are free.
    SemiGlobal,
    /// A chain of non-crossing, gap-free diagonal fragments.
    Dialign,
}

/// How ties between dialign fragments of equal score are broken.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FragmentTieBreak {
    /// Prefer the longer fragment, i.e. the left-most start.
    #[default]
    LongestFirst,
    /// Prefer the shorter fragment.
    ShortestFirst,
}

/// The guide tree a multiple alignment follows.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TreeMethod {
    /// Average-linkage hierarchical clustering.
    #[default]
    Upgma,
    /// Neighbor-joining, rooted at its final join.
    NeighborJoining,
}

/// How a pairwise similarity score is turned into a distance.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Normalization {
    /// `1 - 2 * s(a, b) / (s(a, a) + s(b, b))`, clamped to `[0, 1]`.
    #[default]
    SelfSimilarity,
    /// `1 - s(a, b) / (max_token_score * max(|a|, |b|))`, clamped to `[0, 1]`.
    Length {
        /// The best score a single pair of tokens can reach.
        max_token_score: f64,
    },
}

/// The number of pairwise jobs above which all-pairs work is spread over
/// the rayon thread pool.
pub const PAR_THRESHOLD: usize = 64;

/// Options for one alignment call.
///
/// Gap costs left at `None` defer to the scoring model.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[must_use]
pub struct AlignConfig {
    /// The pairwise traceback policy.
    pub mode: Mode,
    /// Overrides the model's cost of opening a gap.
    pub gap_open: Option<f64>,
    /// Overrides the model's cost of extending a gap.
    pub gap_extend: Option<f64>,
    /// Whether multiple alignment should be refined with a consistency library.
    pub use_library: bool,
    /// The token used to pad rows.
    pub gap: String,
    /// Tie policy for dialign fragments.
    pub fragment_tie_break: FragmentTieBreak,
    /// The guide tree used by multiple alignment.
    pub tree: TreeMethod,
    /// How scores become distances.
    pub normalization: Normalization,
    /// See [`PAR_THRESHOLD`].
    pub par_threshold: usize,
}

impl Default for AlignConfig {
    fn default() -> Self {
        Self {
            mode: Mode::default(),
            gap_open: None,
            gap_extend: None,
            use_library: false,
            gap: "-".to_string(),
            fragment_tie_break: FragmentTieBreak::default(),
            tree: TreeMethod::default(),
            normalization: Normalization::default(),
            par_threshold: PAR_THRESHOLD,
        }
    }
}

impl AlignConfig {
    /// Set the traceback policy.
    pub const fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Override the cost of opening a gap.
    pub const fn with_gap_open(mut self, cost: f64) -> Self {
        self.gap_open = Some(cost);
        self
    }

    /// Override the cost of extending a gap.
    pub const fn with_gap_extend(mut self, cost: f64) -> Self {
        self.gap_extend = Some(cost);
        self
    }

    /// Request the consistency-library refinement for multiple alignment.
    pub const fn with_library(mut self, use_library: bool) -> Self {
        self.use_library = use_library;
        self
    }

    /// Set the gap token.
    pub fn with_gap<S: Into<String>>(mut self, gap: S) -> Self {
        self.gap = gap.into();
        self
    }

    /// Set the dialign tie policy.
    pub const fn with_fragment_tie_break(mut self, policy: FragmentTieBreak) -> Self {
        self.fragment_tie_break = policy;
        self
    }

    /// Set the guide-tree method.
    pub const fn with_tree(mut self, tree: TreeMethod) -> Self {
        self.tree = tree;
        self
    }

    /// Set the score-to-distance normalization.
    pub const fn with_normalization(mut self, normalization: Normalization) -> Self {
        self.normalization = normalization;
        self
    }

    /// Set the parallel fan-out threshold.
    pub const fn with_par_threshold(mut self, threshold: usize) -> Self {
        self.par_threshold = threshold;
        self
    }
}
