//! The dynamic-programming tables behind global, semi-global and local
//! alignment.
//!
//! Affine gaps use three layers (Gotoh): the best score of a prefix pair
//! ending in a match, in a token of the first sequence against a gap, or in
//! a token of the second sequence against a gap. When every gap position
//! costs the same whether it opens or extends a run, a single layer gives
//! the same scores and the same traceback, and that cheaper table is used.

use super::ops::{Direction, Path};

/// The layer of a match move.
const DIAG: usize = 0;
/// The layer of a gap in the second sequence.
const UP: usize = 1;
/// The layer of a gap in the first sequence.
const LEFT: usize = 2;
/// The pointer of a cell where a local alignment starts.
const START: usize = 3;

/// The direction of the move into each layer.
const MOVES: [Direction; 3] = [Direction::Diagonal, Direction::Up, Direction::Left];

/// Substitution scores and gap costs for one pair of sequences.
///
/// Gap costs are stored per position as `[open, extend]` and are paid when
/// that position is aligned against a gap.
#[derive(Clone, Debug)]
pub(crate) struct Costs {
    /// `sub[i][j]` is the score of aligning position `i` of the first
    /// sequence with position `j` of the second.
    pub(crate) sub: Vec<Vec<f64>>,
    /// Gap costs for the positions of the first sequence.
    pub(crate) x_gaps: Vec<[f64; 2]>,
    /// Gap costs for the positions of the second sequence.
    pub(crate) y_gaps: Vec<[f64; 2]>,
}

impl Costs {
    /// The length of the first sequence.
    pub(crate) fn rows(&self) -> usize {
        self.x_gaps.len()
    }

    /// The length of the second sequence.
    pub(crate) fn cols(&self) -> usize {
        self.y_gaps.len()
    }

    /// Whether opening and extending a gap cost the same everywhere.
    #[allow(clippy::float_cmp)]
    fn is_linear(&self) -> bool {
        self.x_gaps.iter().chain(self.y_gaps.iter()).all(|[o, e]| o == e)
    }
}

/// Which leading and trailing positions may be left unaligned.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Ends {
    /// Both sequences are aligned end to end.
    Closed,
    /// End positions of the first sequence may face free gaps.
    FreeX,
    /// End positions of the second sequence may face free gaps.
    FreeY,
    /// Only the best-scoring pair of substrings is aligned.
    Local,
}

/// The best of three candidates, preferring the earliest on ties.
fn best(candidates: [f64; 3]) -> (f64, usize) {
    let mut k = 0;
    for i in 1..3 {
        if candidates[i] > candidates[k] {
            k = i;
        }
    }
    (candidates[k], k)
}

/// Find the best path through the table for the given end policy.
pub(crate) fn best_path(costs: &Costs, ends: Ends) -> Path {
    if ends != Ends::Local && costs.is_linear() {
        linear(costs, ends)
    } else {
        affine(costs, ends)
    }
}

/// Choose the cell where the traceback starts.
///
/// Returns the cell, its layer and its score. `cell` gives the best layer
/// and score of a cell.
fn select_end<F>(n: usize, m: usize, ends: Ends, cell: F) -> (usize, usize, usize, f64)
where
    F: Fn(usize, usize) -> (f64, usize),
{
    match ends {
        Ends::Closed | Ends::Local => {
            let (s, k) = cell(n, m);
            (n, m, k, s)
        }
        Ends::FreeX => (0..=n).rev().fold((n, m, DIAG, f64::NEG_INFINITY), |acc, i| {
            let (s, k) = cell(i, m);
            if s > acc.3 {
                (i, m, k, s)
            } else {
                acc
            }
        }),
        Ends::FreeY => (0..=m).rev().fold((n, m, DIAG, f64::NEG_INFINITY), |acc, j| {
            let (s, k) = cell(n, j);
            if s > acc.3 {
                (n, j, k, s)
            } else {
                acc
            }
        }),
    }
}

/// Append the free trailing moves of a semi-global path.
fn with_trailing(mut steps: Vec<Direction>, (i, j): (usize, usize), n: usize, m: usize) -> Vec<Direction> {
    steps.extend(core::iter::repeat(Direction::Up).take(n - i));
    steps.extend(core::iter::repeat(Direction::Left).take(m - j));
    steps
}

/// The single-layer table for linear gap costs.
fn linear(costs: &Costs, ends: Ends) -> Path {
    let (n, m) = (costs.rows(), costs.cols());
    let w = m + 1;
    let mut score = vec![f64::NEG_INFINITY; (n + 1) * w];
    let mut from = vec![DIAG; (n + 1) * w];

    score[0] = 0.0;
    for i in 1..=n {
        score[i * w] = if ends == Ends::FreeX {
            0.0
        } else {
            score[(i - 1) * w] - costs.x_gaps[i - 1][0]
        };
        from[i * w] = UP;
    }
    for j in 1..=m {
        score[j] = if ends == Ends::FreeY {
            0.0
        } else {
            score[j - 1] - costs.y_gaps[j - 1][0]
        };
        from[j] = LEFT;
    }

    for i in 1..=n {
        let x_gap = costs.x_gaps[i - 1][0];
        for j in 1..=m {
            let c = i * w + j;
            let (s, k) = best([
                score[c - w - 1] + costs.sub[i - 1][j - 1],
                score[c - w] - x_gap,
                score[c - 1] - costs.y_gaps[j - 1][0],
            ]);
            score[c] = s;
            from[c] = k;
        }
    }

    let (mut i, mut j, _, total) = select_end(n, m, ends, |i, j| (score[i * w + j], DIAG));
    let end = (i, j);

    let mut steps = Vec::with_capacity(n + m);
    while i > 0 || j > 0 {
        let k = from[i * w + j];
        steps.push(MOVES[k]);
        match k {
            DIAG => {
                i -= 1;
                j -= 1;
            }
            UP => i -= 1,
            _ => j -= 1,
        }
    }
    steps.reverse();

    Path {
        score: total,
        start: (0, 0),
        steps: with_trailing(steps, end, n, m),
    }
}

/// The three-layer table for affine gap costs and for local alignment.
#[allow(clippy::too_many_lines)]
fn affine(costs: &Costs, ends: Ends) -> Path {
    let (n, m) = (costs.rows(), costs.cols());
    let w = m + 1;
    let mut score = vec![[f64::NEG_INFINITY; 3]; (n + 1) * w];
    let mut from = vec![[START; 3]; (n + 1) * w];

    if ends != Ends::Local {
        score[0][DIAG] = 0.0;
        for i in 1..=n {
            let c = i * w;
            let prev = if i == 1 { DIAG } else { UP };
            score[c][UP] = if ends == Ends::FreeX {
                0.0
            } else if i == 1 {
                -costs.x_gaps[0][0]
            } else {
                score[c - w][UP] - costs.x_gaps[i - 1][1]
            };
            from[c][UP] = prev;
        }
        for j in 1..=m {
            let prev = if j == 1 { DIAG } else { LEFT };
            score[j][LEFT] = if ends == Ends::FreeY {
                0.0
            } else if j == 1 {
                -costs.y_gaps[0][0]
            } else {
                score[j - 1][LEFT] - costs.y_gaps[j - 1][1]
            };
            from[j][LEFT] = prev;
        }
    }

    for i in 1..=n {
        let [x_open, x_ext] = costs.x_gaps[i - 1];
        for j in 1..=m {
            let [y_open, y_ext] = costs.y_gaps[j - 1];
            let c = i * w + j;
            let (diag, up, left) = (score[c - w - 1], score[c - w], score[c - 1]);
            let sub = costs.sub[i - 1][j - 1];

            let (prev, k) = best(diag);
            (score[c][DIAG], from[c][DIAG]) = if ends == Ends::Local && prev <= 0.0 {
                (sub, START)
            } else {
                (prev + sub, k)
            };

            let (s, k) = best([up[DIAG] - x_open, up[UP] - x_ext, up[LEFT] - x_open]);
            (score[c][UP], from[c][UP]) = (s, k);

            let (s, k) = best([left[DIAG] - y_open, left[UP] - y_open, left[LEFT] - y_ext]);
            (score[c][LEFT], from[c][LEFT]) = (s, k);
        }
    }

    let (mut i, mut j, mut k, total) = if ends == Ends::Local {
        // The first maximal match cell in row-major order.
        let mut top = (0, 0, DIAG, 0.0);
        for i in 1..=n {
            for j in 1..=m {
                let s = score[i * w + j][DIAG];
                if s > top.3 {
                    top = (i, j, DIAG, s);
                }
            }
        }
        if top.3 <= 0.0 {
            return Path {
                score: 0.0,
                start: (0, 0),
                steps: Vec::new(),
            };
        }
        top
    } else {
        select_end(n, m, ends, |i, j| {
            let (s, k) = best(score[i * w + j]);
            (s, k)
        })
    };
    let end = (i, j);

    let mut steps = Vec::with_capacity(n + m);
    while ends == Ends::Local || i > 0 || j > 0 {
        let prev = from[i * w + j][k];
        steps.push(MOVES[k]);
        match k {
            DIAG => {
                i -= 1;
                j -= 1;
            }
            UP => i -= 1,
            _ => j -= 1,
        }
        if prev == START {
            break;
        }
        k = prev;
    }
    steps.reverse();

    let steps = if ends == Ends::Local {
        steps
    } else {
        with_trailing(steps, end, n, m)
    };

    Path {
        score: total,
        start: (i, j),
        steps,
    }
}
