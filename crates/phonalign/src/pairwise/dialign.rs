//! Fragment-chaining alignment.
//!
//! A fragment is a run of consecutive diagonal pairs whose substitution
//! scores sum to a positive total. The alignment is the chain of
//! non-overlapping, non-crossing fragments with the largest summed score.
//! Everything between fragments is aligned against gaps at no cost.

use crate::config::FragmentTieBreak;

use super::{
    ops::{Direction, Path},
    table::Costs,
};

/// The move that reached a cell.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Step {
    /// A fragment of the given length ends here.
    Fragment(usize),
    /// A token of the first sequence against a gap.
    Up,
    /// A token of the second sequence against a gap.
    Left,
}

/// Find the best chain of fragments.
pub(crate) fn best_path(costs: &Costs, tie_break: FragmentTieBreak) -> Path {
    let (n, m) = (costs.rows(), costs.cols());
    let w = m + 1;

    // Running sums of substitution scores along each diagonal.
    let mut diag = vec![0.0; (n + 1) * w];
    for i in 1..=n {
        for j in 1..=m {
            diag[i * w + j] = diag[(i - 1) * w + j - 1] + costs.sub[i - 1][j - 1];
        }
    }

    let mut score = vec![0.0; (n + 1) * w];
    let mut from = vec![Step::Up; (n + 1) * w];
    for j in 1..=m {
        from[j] = Step::Left;
    }

    for i in 1..=n {
        for j in 1..=m {
            let c = i * w + j;

            let mut best: Option<(f64, usize)> = None;
            for k in 1..=i.min(j) {
                let start = c - k * w - k;
                let fragment = diag[c] - diag[start];
                if fragment <= 0.0 {
                    continue;
                }
                let s = score[start] + fragment;
                let better = match best {
                    None => true,
                    Some((b, _)) if s > b => true,
                    Some((b, _)) if s < b => false,
                    Some(_) => tie_break == FragmentTieBreak::LongestFirst,
                };
                if better {
                    best = Some((s, k));
                }
            }

            let (mut s, mut step) = (score[c - w], Step::Up);
            if score[c - 1] > s {
                (s, step) = (score[c - 1], Step::Left);
            }
            if let Some((f, k)) = best {
                if f >= s {
                    (s, step) = (f, Step::Fragment(k));
                }
            }
            score[c] = s;
            from[c] = step;
        }
    }

    let (mut i, mut j) = (n, m);
    let mut steps = Vec::with_capacity(n + m);
    while i > 0 || j > 0 {
        match from[i * w + j] {
            Step::Fragment(k) => {
                steps.extend(core::iter::repeat(Direction::Diagonal).take(k));
                i -= k;
                j -= k;
            }
            Step::Up => {
                steps.push(Direction::Up);
                i -= 1;
            }
            Step::Left => {
                steps.push(Direction::Left);
                j -= 1;
            }
        }
    }
    steps.reverse();

    Path {
        score: score[n * w + m],
        start: (0, 0),
        steps,
    }
}
