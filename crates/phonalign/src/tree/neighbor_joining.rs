//! Neighbor-joining: an unrooted additive tree.

use super::{DistanceMatrix, GuideTree};

/// One join of two active nodes into a new internal node.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Join {
    /// The node id of the first joined node.
    pub left: usize,
    /// The node id of the second joined node.
    pub right: usize,
    /// The branch length from `left` to the new node.
    pub left_length: f64,
    /// The branch length from `right` to the new node.
    pub right_length: f64,
}

/// An unrooted tree built by neighbor-joining.
///
/// Leaves are the node ids `0..n`; the node created by join `k` is `n + k`.
/// The nodes still active after the last join hang off a central node.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[must_use]
pub struct NjTree {
    /// The number of leaves.
    leaves: usize,
    /// The joins, first to last.
    joins: Vec<Join>,
    /// The nodes joined at the center with their branch lengths.
    center: Vec<(usize, f64)>,
}

impl NjTree {
    /// Build the tree.
    ///
    /// Pairs are joined while more than three nodes are active. Ties in the
    /// joining criterion go to the lowest pair of slots.
    pub fn new(matrix: &DistanceMatrix) -> Self {
        let n = matrix.len();
        let mut dist = matrix.values().clone();
        let mut node = (0..n).collect::<Vec<_>>();
        let mut active = (0..n).collect::<Vec<_>>();
        let mut joins = Vec::with_capacity(n.saturating_sub(3));

        while active.len() > 3 {
            let r = active
                .iter()
                .map(|&i| active.iter().map(|&k| dist[[i, k]]).sum::<f64>() / (active.len() - 2) as f64)
                .collect::<Vec<_>>();

            let mut best: Option<(usize, usize, f64)> = None;
            for (x, &i) in active.iter().enumerate() {
                for (y, &j) in active.iter().enumerate().skip(x + 1) {
                    let q = dist[[i, j]] - r[x] - r[y];
                    if best.map_or(true, |(_, _, b)| q < b) {
                        best = Some((x, y, q));
                    }
                }
            }
            let (x, y, _) = best.unwrap_or_else(|| unreachable!("More than three nodes are active"));
            let (i, j) = (active[x], active[y]);

            let d_ij = dist[[i, j]];
            let left_length = d_ij / 2.0 + (r[x] - r[y]) / 2.0;
            let join = Join {
                left: node[i],
                right: node[j],
                left_length,
                right_length: d_ij - left_length,
            };
            ftlog::trace!(
                "Joining nodes {} and {} with branch lengths {:.6} and {:.6}",
                join.left,
                join.right,
                join.left_length,
                join.right_length
            );

            for &k in active.iter().filter(|&&k| k != i && k != j) {
                let d = (dist[[i, k]] + dist[[j, k]] - d_ij) / 2.0;
                dist[[i, k]] = d;
                dist[[k, i]] = d;
            }
            node[i] = n + joins.len();
            joins.push(join);
            active.remove(y);
        }

        let center = match active.as_slice() {
            [] => Vec::new(),
            &[a] => vec![(node[a], 0.0)],
            &[a, b] => vec![(node[a], dist[[a, b]] / 2.0), (node[b], dist[[a, b]] / 2.0)],
            &[a, b, c] => {
                let (ab, ac, bc) = (dist[[a, b]], dist[[a, c]], dist[[b, c]]);
                vec![
                    (node[a], (ab + ac - bc) / 2.0),
                    (node[b], (ab + bc - ac) / 2.0),
                    (node[c], (ac + bc - ab) / 2.0),
                ]
            }
            _ => unreachable!("At most three nodes remain active"),
        };

        Self {
            leaves: n,
            joins,
            center,
        }
    }

    /// The number of leaves.
    #[must_use]
    pub const fn leaves(&self) -> usize {
        self.leaves
    }

    /// The joins, first to last.
    #[must_use]
    pub fn joins(&self) -> &[Join] {
        &self.joins
    }

    /// The nodes joined at the center with their branch lengths.
    #[must_use]
    pub fn center(&self) -> &[(usize, f64)] {
        &self.center
    }

    /// A rooted merge order for progressive alignment.
    ///
    /// The joins come first. Of three central nodes, the pair with the
    /// shortest path through the center merges next, then the third node.
    pub fn merge_order(&self) -> GuideTree {
        let mut merges = self.joins.iter().map(|j| [j.left, j.right]).collect::<Vec<_>>();
        let next = self.leaves + merges.len();
        match self.center.as_slice() {
            [(a, _), (b, _)] => merges.push([*a, *b]),
            [(a, la), (b, lb), (c, lc)] => {
                let pairs = [(*a, *b, *c, la + lb), (*a, *c, *b, la + lc), (*b, *c, *a, lb + lc)];
                let (x, y, z, _) = pairs
                    .into_iter()
                    .fold(None, |best: Option<(usize, usize, usize, f64)>, p| match best {
                        Some(b) if b.3 <= p.3 => Some(b),
                        _ => Some(p),
                    })
                    .unwrap_or_else(|| unreachable!("Three candidate pairs"));
                merges.push([x, y]);
                merges.push([next, z]);
            }
            _ => {}
        }
        GuideTree::from_valid(self.leaves, merges)
    }
}

/// Build a neighbor-joining tree.
pub fn neighbor_joining(matrix: &DistanceMatrix) -> NjTree {
    NjTree::new(matrix)
}
