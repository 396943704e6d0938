//! Measures over a finished alignment.
//!
//! Sound classes come from the scoring model. A token the model cannot
//! classify is its own class, so diagnostics never fail on unknown symbols.

use std::collections::BTreeMap;

use crate::{
    alignment::Alignment,
    scoring::{GapContext, ScoringModel},
    utils, Result,
};

/// The score of rows `i` and `j`, recomputed from their columns.
///
/// Columns where both rows are gaps are dropped. A token against a gap pays
/// the model's gap cost for that token, at the extension rate when the
/// previous remaining column also had a gap in the same row. This is the
/// rule the global DP scores by, so a global pairwise alignment rescores
/// to its own score.
///
/// # Errors
///
/// * `IncompatibleModel` if the model cannot score a pair of tokens.
pub fn pair_score<M: ScoringModel + ?Sized>(alignment: &Alignment, i: usize, j: usize, model: &M) -> Result<f64> {
    let mut total = 0.0;
    // Whether the previous column had a gap in row i, and in row j.
    let (mut gap_i, mut gap_j) = (false, false);
    for pair in alignment.project(i, j) {
        match pair {
            (Some(a), Some(b)) => {
                total += model.score(a, b)?;
                (gap_i, gap_j) = (false, false);
            }
            (Some(a), None) => {
                total -= model.gap_cost(GapContext {
                    token: Some(a),
                    extending: gap_j,
                });
                (gap_i, gap_j) = (false, true);
            }
            (None, Some(b)) => {
                total -= model.gap_cost(GapContext {
                    token: Some(b),
                    extending: gap_i,
                });
                (gap_i, gap_j) = (true, false);
            }
            (None, None) => unreachable!("Projection drops gap-gap columns"),
        }
    }
    Ok(total)
}

/// The sum over all pairs of rows of [`pair_score`].
///
/// # Errors
///
/// * `IncompatibleModel` if the model cannot score a pair of tokens.
pub fn sum_of_pairs<M: ScoringModel + ?Sized>(alignment: &Alignment, model: &M) -> Result<f64> {
    utils::pairs(alignment.len())
        .into_iter()
        .map(|(i, j)| pair_score(alignment, i, j, model))
        .sum()
}

/// The mean score of each column over the row pairs that are not both gaps.
///
/// A token against a gap scores minus its gap-extension cost. A column with
/// fewer than two tokens and no token/gap pair scores zero.
///
/// # Errors
///
/// * `IncompatibleModel` if the model cannot score a pair of tokens.
pub fn column_scores<M: ScoringModel + ?Sized>(alignment: &Alignment, model: &M) -> Result<Vec<f64>> {
    (0..alignment.width())
        .map(|c| {
            let column = alignment.column(c);
            let mut scores = Vec::new();
            for (i, j) in utils::pairs(column.len()) {
                scores.push(match (column[i], column[j]) {
                    (Some(a), Some(b)) => model.score(a, b)?,
                    (Some(t), None) | (None, Some(t)) => -model.gap_cost(GapContext::extend(t)),
                    (None, None) => continue,
                });
            }
            Ok(utils::mean(&scores).unwrap_or(0.0))
        })
        .collect()
}

/// The fraction of columns whose tokens all share one sound class.
///
/// Zero for an alignment without columns.
pub fn percent_identity<M: ScoringModel + ?Sized>(alignment: &Alignment, model: &M) -> f64 {
    if alignment.width() == 0 {
        return 0.0;
    }
    let identical = (0..alignment.width())
        .filter(|&c| {
            let mut classes = alignment.column(c).into_iter().flatten().map(|t| model.class_or(t, t));
            classes.next().map_or(true, |first| classes.all(|class| class == first))
        })
        .count();
    identical as f64 / alignment.width() as f64
}

/// The majority sound class of a column.
#[derive(Clone, Debug, PartialEq)]
pub struct Consensus {
    /// The most common class. Ties go to the smallest label.
    pub class: String,
    /// The share of the column's tokens in that class.
    pub support: f64,
    /// The number of the column's tokens in that class.
    pub count: usize,
}

/// The majority class among some tokens, or `None` if there are none.
fn majority<'t, M, I>(tokens: I, model: &'t M) -> Option<Consensus>
where
    M: ScoringModel + ?Sized,
    I: IntoIterator<Item = &'t str>,
{
    let mut counts = BTreeMap::new();
    let mut total = 0_usize;
    for t in tokens {
        *counts.entry(model.class_or(t, t)).or_insert(0_usize) += 1;
        total += 1;
    }
    let (labels, counts): (Vec<_>, Vec<_>) = counts.into_iter().unzip();
    utils::arg_max(&counts).map(|(k, count)| Consensus {
        class: labels[k].to_string(),
        support: count as f64 / total as f64,
        count,
    })
}

/// The majority class of every column. `None` for a column of gaps.
pub fn consensus<M: ScoringModel + ?Sized>(alignment: &Alignment, model: &M) -> Vec<Option<Consensus>> {
    (0..alignment.width())
        .map(|c| majority(alignment.column(c).into_iter().flatten(), model))
        .collect()
}

/// The columns whose majority class covers at least `min_support` of all
/// rows, gaps included.
pub fn peaks<M: ScoringModel + ?Sized>(alignment: &Alignment, model: &M, min_support: f64) -> Vec<usize> {
    let rows = alignment.len() as f64;
    consensus(alignment, model)
        .into_iter()
        .enumerate()
        .filter_map(|(c, con)| con.filter(|con| con.count as f64 / rows >= min_support).map(|_| c))
        .collect()
}

/// The result of swap detection.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SwapReport {
    /// Whether any swap was found.
    pub found: bool,
    /// The first column of each swapped triple.
    pub positions: Vec<usize>,
}

/// Find columns where two groups of rows place the same sound class on
/// opposite sides of a shared column.
///
/// Columns `c, c + 1, c + 2` form a swap when every row has a token at
/// `c + 1` and the rows split into two non-empty groups: one with tokens at
/// `c` and gaps at `c + 2`, the other with gaps at `c` and tokens at
/// `c + 2`, where the majority class of the first group at `c` is the
/// majority class of the second group at `c + 2`. Scanning resumes after
/// the triple.
pub fn detect_swaps<M: ScoringModel + ?Sized>(alignment: &Alignment, model: &M) -> SwapReport {
    let mut positions = Vec::new();
    let mut c = 0;
    while c + 2 < alignment.width() {
        if is_swap(alignment, model, c) {
            positions.push(c);
            c += 3;
        } else {
            c += 1;
        }
    }
    SwapReport {
        found: !positions.is_empty(),
        positions,
    }
}

/// Whether columns `c, c + 1, c + 2` form a swap.
fn is_swap<M: ScoringModel + ?Sized>(alignment: &Alignment, model: &M, c: usize) -> bool {
    let (first, middle, last) = (alignment.column(c), alignment.column(c + 1), alignment.column(c + 2));
    if middle.iter().any(Option::is_none) {
        return false;
    }

    let (mut before, mut after) = (Vec::new(), Vec::new());
    for (x, z) in first.into_iter().zip(last) {
        match (x, z) {
            (Some(x), None) => before.push(x),
            (None, Some(z)) => after.push(z),
            _ => return false,
        }
    }

    match (majority(before, model), majority(after, model)) {
        (Some(a), Some(b)) => a.class == b.class,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use crate::scoring::{GapPolicy, SoundClassModel};

    use super::*;

    fn model() -> SoundClassModel {
        SoundClassModel::new(GapPolicy::Affine { open: 3.0, extend: 1.0 })
            .with_classes(["a", "e"], "V")
            .with_classes(["k", "g"], "K")
            .with_classes(["t", "d"], "T")
            .with_identity_score(2.0)
            .with_class_score("V", "V", 1.0)
            .with_default_score(-1.0)
    }

    fn aln(rows: Vec<Vec<&str>>) -> Alignment {
        Alignment::from_rows(rows, "-").unwrap()
    }

    #[test]
    fn affine_rescoring() {
        let model = model();
        let a = aln(vec![vec!["a", "k", "t", "a"], vec!["a", "-", "-", "e"]]);
        assert_eq!(pair_score(&a, 0, 1, &model).unwrap(), 2.0 - 3.0 - 1.0 + 1.0);

        // A gap in the other row opens a new run.
        let b = aln(vec![vec!["a", "k", "-"], vec!["a", "-", "t"]]);
        assert_eq!(pair_score(&b, 0, 1, &model).unwrap(), 2.0 - 3.0 - 3.0);

        // Gap-gap columns are dropped, so the run continues across them.
        let c = aln(vec![
            vec!["a", "k", "-", "t"],
            vec!["a", "-", "-", "-"],
            vec!["a", "k", "g", "t"],
        ]);
        assert_eq!(pair_score(&c, 0, 1, &model).unwrap(), 2.0 - 3.0 - 1.0);
        assert_eq!(
            sum_of_pairs(&c, &model).unwrap(),
            pair_score(&c, 0, 1, &model).unwrap()
                + pair_score(&c, 0, 2, &model).unwrap()
                + pair_score(&c, 1, 2, &model).unwrap()
        );
    }

    #[test]
    fn identity_and_consensus() {
        let model = model();
        let a = aln(vec![vec!["a", "k", "t"], vec!["e", "g", "-"], vec!["a", "t", "d"]]);
        assert!((percent_identity(&a, &model) - 2.0 / 3.0).abs() < 1e-12);

        let con = consensus(&a, &model);
        assert_eq!(con[0].as_ref().map(|c| c.class.as_str()), Some("V"));
        assert_eq!(con[1].as_ref().map(|c| (c.class.as_str(), c.count)), Some(("K", 2)));
        assert_eq!(con[2].as_ref().map(|c| c.support), Some(1.0));

        assert_eq!(peaks(&a, &model, 1.0), vec![0]);
        assert_eq!(peaks(&a, &model, 0.6), vec![0, 1, 2]);
    }

    #[test]
    fn column_means() {
        let model = model();
        let a = aln(vec![vec!["a", "k"], vec!["a", "-"]]);
        assert_eq!(column_scores(&a, &model).unwrap(), vec![2.0, -1.0]);
    }

    #[test]
    fn swaps() {
        let model = model();
        let swapped = aln(vec![vec!["k", "a", "-"], vec!["-", "e", "g"]]);
        assert_eq!(
            detect_swaps(&swapped, &model),
            SwapReport {
                found: true,
                positions: vec![0]
            }
        );

        let plain = aln(vec![vec!["k", "a", "-"], vec!["-", "e", "t"]]);
        assert!(!detect_swaps(&plain, &model).found);

        let gapped_middle = aln(vec![vec!["k", "-", "-"], vec!["-", "e", "g"]]);
        assert!(!detect_swaps(&gapped_middle, &model).found);
    }
}
