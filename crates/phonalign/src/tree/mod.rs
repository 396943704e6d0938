//! Distance matrices and the trees built from them.
//!
//! Trees serve two purposes: they order the merges of progressive multiple
//! alignment, and they can be cut into flat clusters. Both builders reduce
//! the matrix in place, tombstoning merged slots, so that every step of the
//! merge history can be traced back to the input indices.

mod hierarchical;
mod matrix;
mod neighbor_joining;

pub use hierarchical::{hierarchical, upgma, Dendrogram, Linkage, Merge};
pub use matrix::{DistanceMatrix, TOLERANCE};
pub use neighbor_joining::{neighbor_joining, Join, NjTree};

use crate::{AlignError, Result};

/// A rooted binary merge order over `n` leaves.
///
/// Leaves are the node ids `0..n`; merge `k` creates node `n + k`.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[must_use]
pub struct GuideTree {
    /// The number of leaves.
    leaves: usize,
    /// The two children of each merge.
    merges: Vec<[usize; 2]>,
}

impl GuideTree {
    /// Create a guide tree from a merge order.
    ///
    /// # Errors
    ///
    /// * `InvalidGuideTree` if there are no leaves, if the number of merges
    ///   is not `n - 1`, or if a merge names a node that does not exist yet
    ///   or was already merged.
    pub fn new(leaves: usize, merges: Vec<[usize; 2]>) -> Result<Self> {
        if leaves == 0 {
            return Err(AlignError::guide_tree("the tree has no leaves"));
        }
        if merges.len() != leaves - 1 {
            return Err(AlignError::guide_tree(format!(
                "{} merges cannot join {leaves} leaves",
                merges.len()
            )));
        }

        let mut used = vec![false; 2 * leaves - 1];
        for (k, &[a, b]) in merges.iter().enumerate() {
            for c in [a, b] {
                if c >= leaves + k {
                    return Err(AlignError::guide_tree(format!("merge {k} names unknown node {c}")));
                }
                if used[c] {
                    return Err(AlignError::guide_tree(format!("node {c} is merged twice")));
                }
                used[c] = true;
            }
            if a == b {
                return Err(AlignError::guide_tree(format!("merge {k} joins node {a} with itself")));
            }
        }

        Ok(Self { leaves, merges })
    }

    /// A tree produced by one of the builders in this module.
    pub(crate) fn from_valid(leaves: usize, merges: Vec<[usize; 2]>) -> Self {
        Self { leaves, merges }
    }

    /// The number of leaves.
    #[must_use]
    pub const fn leaves(&self) -> usize {
        self.leaves
    }

    /// The two children of each merge, first to last.
    #[must_use]
    pub fn merges(&self) -> &[[usize; 2]] {
        &self.merges
    }

    /// The leaves under each node, in node-id order.
    #[must_use]
    pub fn members(&self) -> Vec<Vec<usize>> {
        let mut members = (0..self.leaves).map(|i| vec![i]).collect::<Vec<_>>();
        for &[a, b] in &self.merges {
            let mut both = members[a].clone();
            both.extend_from_slice(&members[b]);
            both.sort_unstable();
            members.push(both);
        }
        members
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation() {
        assert!(GuideTree::new(3, vec![[0, 1], [3, 2]]).is_ok());
        assert!(GuideTree::new(1, vec![]).is_ok());

        for (leaves, merges) in [
            (0, vec![]),
            (3, vec![[0, 1]]),
            (3, vec![[0, 1], [0, 2]]),
            (3, vec![[0, 4], [3, 2]]),
            (3, vec![[0, 0], [3, 2]]),
        ] {
            assert!(matches!(
                GuideTree::new(leaves, merges),
                Err(AlignError::InvalidGuideTree { .. })
            ));
        }
    }

    #[test]
    fn members() {
        let tree = GuideTree::new(4, vec![[2, 3], [1, 4], [5, 0]]).unwrap();
        let members = tree.members();
        assert_eq!(members[4], vec![2, 3]);
        assert_eq!(members[5], vec![1, 2, 3]);
        assert_eq!(members[6], vec![0, 1, 2, 3]);
    }
}
