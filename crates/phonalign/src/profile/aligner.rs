//! Aligning profiles against profiles and sequences.

use crate::{
    config::{AlignConfig, Mode},
    msa::Library,
    pairwise::{
        self, dialign,
        table::{self, Costs, Ends},
        Direction,
    },
    scoring::{GapContext, GapOverride, ScoringModel},
    AlignError, Result,
};

use super::Profile;

/// Aligns profiles built over a fixed set of sequences.
///
/// Two columns score the mean over all row pairs that are not both gaps:
/// the substitution score for two tokens, and minus the gap-extension cost
/// of the token for a token against a gap. Aligning a column against gaps
/// costs the model's gap cost averaged over the column's rows, with gap
/// rows contributing nothing.
///
/// Local mode has no meaning for profiles, whose every token must be kept,
/// and is treated as global.
#[derive(Debug)]
#[must_use]
pub struct ProfileAligner<'a, M: ?Sized> {
    /// The model, with the config's gap overrides applied.
    model: GapOverride<'a, M>,
    /// The options.
    config: &'a AlignConfig,
    /// The checked tokens of every sequence.
    seqs: Vec<Vec<&'a str>>,
    /// Replaces substitution scores when set.
    library: Option<&'a Library>,
}

impl<'a, M: ScoringModel + ?Sized> ProfileAligner<'a, M> {
    /// Create an aligner over a set of sequences.
    ///
    /// # Errors
    ///
    /// * `EmptySequence` or `InvalidToken` with the index of the offending
    ///   sequence.
    pub fn new<S: AsRef<str>>(model: &'a M, config: &'a AlignConfig, seqs: &'a [Vec<S>]) -> Result<Self> {
        let seqs = seqs
            .iter()
            .enumerate()
            .map(|(i, s)| pairwise::tokens(s, i, &config.gap))
            .collect::<Result<_>>()?;
        Ok(Self {
            model: GapOverride::new(model, config.gap_open, config.gap_extend),
            config,
            seqs,
            library: None,
        })
    }

    /// Score token pairs with a consistency library instead of the model.
    pub const fn with_library(mut self, library: &'a Library) -> Self {
        self.library = Some(library);
        self
    }

    /// The checked tokens of every sequence.
    #[must_use]
    pub fn sequences(&self) -> &[Vec<&'a str>] {
        &self.seqs
    }

    /// The profile of sequence `index` on its own.
    pub fn leaf(&self, index: usize) -> Profile {
        Profile::leaf(index, self.seqs[index].len())
    }

    /// The token at position `p` of sequence `i`.
    fn token(&self, i: usize, p: usize) -> &'a str {
        self.seqs[i][p]
    }

    /// The score of aligning two tokens, each given by sequence and position.
    fn token_score(&self, (i, p): (usize, usize), (j, q): (usize, usize)) -> Result<f64> {
        match self.library {
            Some(library) => Ok(library.score(i, p, j, q)),
            None => self.model.score(self.token(i, p), self.token(j, q)),
        }
    }

    /// The score of aligning column `c` of `a` with column `d` of `b`.
    fn column_score(&self, a: &Profile, c: usize, b: &Profile, d: usize) -> Result<f64> {
        let (mut total, mut count) = (0.0, 0_usize);
        for (&i, &p) in a.members.iter().zip(&a.columns[c]) {
            for (&j, &q) in b.members.iter().zip(&b.columns[d]) {
                total += match (p, q) {
                    (Some(p), Some(q)) => self.token_score((i, p), (j, q))?,
                    (Some(p), None) => -self.model.gap_cost(GapContext::extend(self.token(i, p))),
                    (None, Some(q)) => -self.model.gap_cost(GapContext::extend(self.token(j, q))),
                    (None, None) => continue,
                };
                count += 1;
            }
        }
        Ok(if count == 0 { 0.0 } else { total / count as f64 })
    }

    /// The `[open, extend]` costs of aligning each column of a profile
    /// against gaps.
    fn gap_costs(&self, profile: &Profile) -> Vec<[f64; 2]> {
        let rows = profile.len() as f64;
        profile
            .columns
            .iter()
            .map(|col| {
                let [open, extend] = profile
                    .members
                    .iter()
                    .zip(col)
                    .filter_map(|(&i, &p)| p.map(|p| self.token(i, p)))
                    .fold([0.0; 2], |[o, e], t| {
                        [
                            o + self.model.gap_cost(GapContext::open(t)),
                            e + self.model.gap_cost(GapContext::extend(t)),
                        ]
                    });
                [open / rows, extend / rows]
            })
            .collect()
    }

    /// Align two profiles over disjoint sets of sequences.
    ///
    /// Returns the merged profile, with the rows of `a` above those of `b`,
    /// and the score of the column alignment.
    ///
    /// # Errors
    ///
    /// * `IncompatibleModel` if the model cannot score a pair of tokens.
    /// * `InconsistentProfileWidth` if the alignment does not consume every
    ///   column of both profiles.
    pub fn align_profiles(&self, a: &Profile, b: &Profile) -> Result<(Profile, f64)> {
        ftlog::trace!(
            "Aligning profiles of {} x {} and {} x {}",
            a.len(),
            a.width(),
            b.len(),
            b.width()
        );

        let sub = (0..a.width())
            .map(|c| {
                (0..b.width())
                    .map(|d| self.column_score(a, c, b, d))
                    .collect::<Result<Vec<_>>>()
            })
            .collect::<Result<Vec<_>>>()?;
        let costs = Costs {
            sub,
            x_gaps: self.gap_costs(a),
            y_gaps: self.gap_costs(b),
        };

        let path = match self.config.mode {
            Mode::Global | Mode::Local => table::best_path(&costs, Ends::Closed),
            Mode::SemiGlobal if a.width() <= b.width() => table::best_path(&costs, Ends::FreeY),
            Mode::SemiGlobal => table::best_path(&costs, Ends::FreeX),
            Mode::Dialign => dialign::best_path(&costs, self.config.fragment_tie_break),
        };

        let end = path.end();
        if end.0 != a.width() {
            return Err(AlignError::InconsistentProfileWidth {
                expected: a.width(),
                found: end.0,
            });
        }
        if end.1 != b.width() {
            return Err(AlignError::InconsistentProfileWidth {
                expected: b.width(),
                found: end.1,
            });
        }

        let (mut c, mut d) = (0, 0);
        let mut columns = Vec::with_capacity(path.steps.len());
        for step in &path.steps {
            let (x, y) = match step {
                Direction::Diagonal => (Some(c), Some(d)),
                Direction::Up => (Some(c), None),
                Direction::Left => (None, Some(d)),
            };
            columns.push(a.joined(x, b, y));
            c += usize::from(x.is_some());
            d += usize::from(y.is_some());
        }

        let mut members = a.members.clone();
        members.extend_from_slice(&b.members);
        Ok((Profile::from_columns(members, columns)?, path.score))
    }

    /// Align sequence `index` to a profile that does not contain it.
    ///
    /// # Errors
    ///
    /// See [`ProfileAligner::align_profiles`].
    pub fn align_to_profile(&self, profile: &Profile, index: usize) -> Result<(Profile, f64)> {
        self.align_profiles(profile, &self.leaf(index))
    }
}
