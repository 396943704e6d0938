//! A table-driven sound-class scoring model.

use std::collections::HashMap;

use crate::{AlignError, Result};

use super::{GapContext, GapPolicy, ScoringModel};

/// A scoring model built from a token-to-class table and a class-to-class
/// score table.
///
/// Scores are looked up in this order:
///
/// 1. an explicit score for the token pair,
/// 2. the identity score, if the tokens are equal and one is set,
/// 3. the score of the two tokens' classes,
/// 4. the default score.
///
/// If none applies, scoring fails with `IncompatibleModel`.
#[derive(Clone, Debug, Default)]
#[must_use]
pub struct SoundClassModel {
    /// The class labels. Class ids index into this.
    labels: Vec<String>,
    /// The class id of each known token.
    classes: HashMap<String, usize>,
    /// Scores between classes, indexed by class id.
    class_scores: Vec<Vec<Option<f64>>>,
    /// Scores for specific token pairs, stored in both orders.
    pair_scores: HashMap<String, HashMap<String, f64>>,
    /// The score of a token against itself.
    identity: Option<f64>,
    /// The score of any pair without another entry.
    default_score: Option<f64>,
    /// The class of tokens missing from the table.
    fallback: Option<usize>,
    /// The gap policy for tokens of each class.
    class_gaps: Vec<Option<GapPolicy>>,
    /// The gap policy for everything else.
    gap: GapPolicy,
}

impl SoundClassModel {
    /// Create an empty model with the given gap policy.
    pub fn new(gap: GapPolicy) -> Self {
        Self {
            gap,
            ..Self::default()
        }
    }

    /// The id of a class label, registering it if needed.
    fn class_id(&mut self, label: &str) -> usize {
        if let Some(id) = self.labels.iter().position(|l| l == label) {
            return id;
        }
        self.labels.push(label.to_string());
        self.class_gaps.push(None);
        for row in &mut self.class_scores {
            row.push(None);
        }
        self.class_scores.push(vec![None; self.labels.len()]);
        self.labels.len() - 1
    }

    /// Assign a token to a sound class.
    pub fn with_class(mut self, token: &str, class: &str) -> Self {
        let id = self.class_id(class);
        self.classes.insert(token.to_string(), id);
        self
    }

    /// Assign every token in `tokens` to the same sound class.
    pub fn with_classes<I, S>(self, tokens: I, class: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        tokens
            .into_iter()
            .fold(self, |model, token| model.with_class(token.as_ref(), class))
    }

    /// Set the score between two classes, in both orders.
    pub fn with_class_score(mut self, a: &str, b: &str, score: f64) -> Self {
        let (a, b) = (self.class_id(a), self.class_id(b));
        self.class_scores[a][b] = Some(score);
        self.class_scores[b][a] = Some(score);
        self
    }

    /// Set the score between two tokens, in both orders.
    ///
    /// This takes precedence over every other score.
    pub fn with_pair_score(mut self, a: &str, b: &str, score: f64) -> Self {
        self.pair_scores
            .entry(a.to_string())
            .or_default()
            .insert(b.to_string(), score);
        self.pair_scores
            .entry(b.to_string())
            .or_default()
            .insert(a.to_string(), score);
        self
    }

    /// Set the score of any token against itself.
    pub const fn with_identity_score(mut self, score: f64) -> Self {
        self.identity = Some(score);
        self
    }

    /// Set the score used when no other entry applies.
    pub const fn with_default_score(mut self, score: f64) -> Self {
        self.default_score = Some(score);
        self
    }

    /// Put tokens missing from the class table into `class`.
    pub fn with_fallback_class(mut self, class: &str) -> Self {
        self.fallback = Some(self.class_id(class));
        self
    }

    /// Set the gap policy for tokens of one class.
    pub fn with_class_gap(mut self, class: &str, gap: GapPolicy) -> Self {
        let id = self.class_id(class);
        self.class_gaps[id] = Some(gap);
        self
    }

    /// Set the gap policy for all tokens without a class-specific one.
    pub const fn with_gap(mut self, gap: GapPolicy) -> Self {
        self.gap = gap;
        self
    }

    /// The gap policy used for tokens without a class-specific one.
    pub const fn gap_policy(&self) -> GapPolicy {
        self.gap
    }

    /// The class id of a token, using the fallback class if needed.
    fn lookup(&self, token: &str) -> Option<usize> {
        self.classes.get(token).copied().or(self.fallback)
    }
}

impl ScoringModel for SoundClassModel {
    fn score(&self, a: &str, b: &str) -> Result<f64> {
        if let Some(&s) = self.pair_scores.get(a).and_then(|row| row.get(b)) {
            return Ok(s);
        }
        if a == b {
            if let Some(s) = self.identity {
                return Ok(s);
            }
        }
        self.lookup(a)
            .zip(self.lookup(b))
            .and_then(|(x, y)| self.class_scores[x][y])
            .or(self.default_score)
            .ok_or_else(|| AlignError::IncompatibleModel {
                a: a.to_string(),
                b: b.to_string(),
            })
    }

    fn gap_cost(&self, context: GapContext<'_>) -> f64 {
        context
            .token
            .and_then(|t| self.lookup(t))
            .and_then(|id| self.class_gaps[id])
            .unwrap_or(self.gap)
            .cost(context.extending)
    }

    fn class_of(&self, token: &str) -> Result<&str> {
        self.lookup(token)
            .map(|id| self.labels[id].as_str())
            .ok_or_else(|| AlignError::UnknownSymbol {
                symbol: token.to_string(),
            })
    }
}
