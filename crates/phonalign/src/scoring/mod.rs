//! Scoring models for sound-class-aware alignment.
//!
//! A model answers three questions about tokens: how similar two tokens are,
//! what it costs to align a token against a gap, and which sound class a
//! token belongs to. The engine only ever borrows a model, and every
//! alignment call receives it explicitly.

mod sound_class;

pub use sound_class::SoundClassModel;

use crate::Result;

/// The situation in which a gap cost is requested.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GapContext<'a> {
    /// The token aligned against the gap, or `None` when the cost is asked
    /// for on behalf of a whole profile column.
    pub token: Option<&'a str>,
    /// Whether the gap continues a run of gaps in the same row.
    pub extending: bool,
}

impl<'a> GapContext<'a> {
    /// A gap opened against `token`.
    #[must_use]
    pub const fn open(token: &'a str) -> Self {
        Self {
            token: Some(token),
            extending: false,
        }
    }

    /// A gap against `token` that extends a previous gap.
    #[must_use]
    pub const fn extend(token: &'a str) -> Self {
        Self {
            token: Some(token),
            extending: true,
        }
    }
}

/// How gaps are charged.
///
/// Costs are positive numbers subtracted from the similarity score.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GapPolicy {
    /// Every gap position costs the same.
    Constant(f64),
    /// The first position of a run costs `open`, later ones `extend`.
    Affine {
        /// The cost of the first gap in a run.
        open: f64,
        /// The cost of every later gap in the run.
        extend: f64,
    },
}

impl Default for GapPolicy {
    fn default() -> Self {
        Self::Constant(1.0)
    }
}

impl GapPolicy {
    /// The cost of one gap position.
    #[must_use]
    pub const fn cost(&self, extending: bool) -> f64 {
        match *self {
            Self::Constant(c) => c,
            Self::Affine { open, extend } => {
                if extending {
                    extend
                } else {
                    open
                }
            }
        }
    }
}

/// A substitution model over phonetic tokens.
pub trait ScoringModel {
    /// The similarity of two tokens. Must be symmetric.
    ///
    /// # Errors
    ///
    /// * `IncompatibleModel` if the model has no score for the pair and no
    ///   fallback score.
    fn score(&self, a: &str, b: &str) -> Result<f64>;

    /// The cost of aligning a gap in the given context.
    fn gap_cost(&self, context: GapContext<'_>) -> f64;

    /// The sound class of a token.
    ///
    /// # Errors
    ///
    /// * `UnknownSymbol` if the token has no class and the model has no
    ///   fallback class.
    fn class_of(&self, token: &str) -> Result<&str>;

    /// The sound class of a token, or `default` when it has none.
    fn class_or<'a>(&'a self, token: &str, default: &'a str) -> &'a str {
        self.class_of(token).unwrap_or(default)
    }
}

/// A model whose gap costs are replaced by fixed open and extend costs.
///
/// A missing override falls back to the wrapped model's cost for that
/// context. Scores and classes come from the wrapped model unchanged.
#[derive(Debug)]
pub struct GapOverride<'a, M: ?Sized> {
    /// The wrapped model.
    model: &'a M,
    /// The cost of opening a gap.
    open: Option<f64>,
    /// The cost of extending a gap.
    extend: Option<f64>,
}

impl<M: ?Sized> Clone for GapOverride<'_, M> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<M: ?Sized> Copy for GapOverride<'_, M> {}

impl<'a, M: ScoringModel + ?Sized> GapOverride<'a, M> {
    /// Wrap `model`, overriding the given gap costs.
    pub const fn new(model: &'a M, open: Option<f64>, extend: Option<f64>) -> Self {
        Self { model, open, extend }
    }

    /// The wrapped model.
    pub const fn inner(&self) -> &'a M {
        self.model
    }
}

impl<M: ScoringModel + ?Sized> ScoringModel for GapOverride<'_, M> {
    fn score(&self, a: &str, b: &str) -> Result<f64> {
        self.model.score(a, b)
    }

    fn gap_cost(&self, context: GapContext<'_>) -> f64 {
        let cost = if context.extending { self.extend } else { self.open };
        cost.unwrap_or_else(|| self.model.gap_cost(context))
    }

    fn class_of(&self, token: &str) -> Result<&str> {
        self.model.class_of(token)
    }
}
