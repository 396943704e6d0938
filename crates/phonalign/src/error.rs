//! Errors raised by the alignment and clustering engine.

use thiserror::Error;

/// The ways in which a call into the engine can fail.
///
/// Every error is local to the call that produced it. Nothing is published
/// before a call succeeds, so there is never partial output to roll back.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum AlignError {
    /// One of the input sequences has no tokens.
    #[error("sequence {index} is empty")]
    EmptySequence {
        /// The position of the offending sequence among the inputs.
        index: usize,
    },
    /// A token contained the gap symbol or was the empty string.
    #[error("sequence {index} contains the invalid token {token:?}")]
    InvalidToken {
        /// The position of the offending sequence among the inputs.
        index: usize,
        /// The offending token.
        token: String,
    },
    /// A token has no sound class and the model has no fallback class.
    #[error("no sound class for symbol {symbol:?}")]
    UnknownSymbol {
        /// The unclassified token.
        symbol: String,
    },
    /// The model has no score for a pair of tokens and no fallback score.
    #[error("the scoring model has no score for {a:?} and {b:?}")]
    IncompatibleModel {
        /// The first token of the pair.
        a: String,
        /// The second token of the pair.
        b: String,
    },
    /// A distance matrix fed to a clusterer is not square, not symmetric,
    /// has a non-zero diagonal, or holds negative or non-finite entries.
    #[error("degenerate distance matrix: {reason}")]
    DegenerateDistanceMatrix {
        /// What was wrong with the matrix.
        reason: String,
    },
    /// Two profiles disagreed about their widths during a merge.
    #[error("inconsistent profile width: expected {expected}, found {found}")]
    InconsistentProfileWidth {
        /// The width the merge expected.
        expected: usize,
        /// The width it found.
        found: usize,
    },
    /// A caller-supplied guide tree does not cover every leaf exactly once.
    #[error("invalid guide tree: {reason}")]
    InvalidGuideTree {
        /// What was wrong with the tree.
        reason: String,
    },
}

impl AlignError {
    /// Convenience constructor for `DegenerateDistanceMatrix`.
    pub(crate) fn degenerate(reason: impl Into<String>) -> Self {
        Self::DegenerateDistanceMatrix { reason: reason.into() }
    }

    /// Convenience constructor for `InvalidGuideTree`.
    pub(crate) fn guide_tree(reason: impl Into<String>) -> Self {
        Self::InvalidGuideTree { reason: reason.into() }
    }
}

/// The result type used throughout the crate.
pub type Result<T> = core::result::Result<T, AlignError>;
