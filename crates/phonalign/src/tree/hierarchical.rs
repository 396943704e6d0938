//! Agglomerative clustering into a rooted binary tree.

use crate::cluster::{DisjointSet, Partition};

use super::{DistanceMatrix, GuideTree};

/// How the distance from a merged cluster to the others is computed.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Linkage {
    /// The size-weighted mean of the two merged clusters' distances (UPGMA).
    #[default]
    Average,
    /// The smaller of the two distances.
    Single,
    /// The larger of the two distances.
    Complete,
}

impl Linkage {
    /// The distance from the union of `a` and `b` to a third cluster.
    fn combine(self, (d_a, size_a): (f64, usize), (d_b, size_b): (f64, usize)) -> f64 {
        match self {
            Self::Average => (d_a * size_a as f64 + d_b * size_b as f64) / (size_a + size_b) as f64,
            Self::Single => d_a.min(d_b),
            Self::Complete => d_a.max(d_b),
        }
    }
}

/// One merge of two clusters.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Merge {
    /// The node id of the cluster holding the lower item index.
    pub left: usize,
    /// The node id of the other cluster.
    pub right: usize,
    /// The distance between the two clusters when they merged.
    pub distance: f64,
    /// Half the merge distance.
    pub height: f64,
    /// The number of items in the merged cluster.
    pub size: usize,
}

/// The merge history of agglomerative clustering.
///
/// Leaves are the node ids `0..n`; the cluster created by merge `k` is node
/// `n + k`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[must_use]
pub struct Dendrogram {
    /// The number of leaves.
    leaves: usize,
    /// The merges, first to last.
    merges: Vec<Merge>,
}

impl Dendrogram {
    /// The number of leaves.
    #[must_use]
    pub const fn leaves(&self) -> usize {
        self.leaves
    }

    /// The merges, first to last.
    #[must_use]
    pub fn merges(&self) -> &[Merge] {
        &self.merges
    }

    /// Cut the tree, keeping every merge with height at most `threshold`.
    pub fn cut(&self, threshold: f64) -> Partition {
        let mut sets = DisjointSet::new(self.leaves);
        // The lowest leaf under every node.
        let mut rep = (0..self.leaves).collect::<Vec<_>>();
        for m in &self.merges {
            let (a, b) = (rep[m.left], rep[m.right]);
            rep.push(a.min(b));
            if m.height <= threshold {
                sets.union(a, b);
            }
        }
        sets.partition()
    }

    /// The merge order as a guide tree.
    pub fn guide_tree(&self) -> GuideTree {
        GuideTree::from_valid(self.leaves, self.merges.iter().map(|m| [m.left, m.right]).collect())
    }
}

/// Agglomerative clustering with the given linkage.
///
/// At each step the two closest active clusters merge. Ties go to the pair
/// whose lower item index is smallest, then to the smallest other index.
/// Merged clusters are tombstoned in place instead of shrinking the matrix.
pub fn hierarchical(matrix: &DistanceMatrix, linkage: Linkage) -> Dendrogram {
    let n = matrix.len();
    let mut dist = matrix.values().clone();
    // Each slot holds the cluster whose lowest item is that slot's index.
    let mut node = (0..n).collect::<Vec<_>>();
    let mut size = vec![1; n];
    let mut active = vec![true; n];
    let mut merges = Vec::with_capacity(n.saturating_sub(1));

    for k in 0..n.saturating_sub(1) {
        let mut closest: Option<(usize, usize, f64)> = None;
        for i in (0..n).filter(|&i| active[i]) {
            for j in ((i + 1)..n).filter(|&j| active[j]) {
                let d = dist[[i, j]];
                if closest.map_or(true, |(_, _, c)| d < c) {
                    closest = Some((i, j, d));
                }
            }
        }
        let (a, b, d) = closest.unwrap_or_else(|| unreachable!("At least two clusters are active"));

        ftlog::trace!(
            "Merging clusters {} and {} of sizes {} and {} at distance {d:.6}",
            node[a],
            node[b],
            size[a],
            size[b]
        );

        for c in (0..n).filter(|&c| active[c] && c != a && c != b) {
            let merged = linkage.combine((dist[[a, c]], size[a]), (dist[[b, c]], size[b]));
            dist[[a, c]] = merged;
            dist[[c, a]] = merged;
        }
        merges.push(Merge {
            left: node[a],
            right: node[b],
            distance: d,
            height: d / 2.0,
            size: size[a] + size[b],
        });
        node[a] = n + k;
        size[a] += size[b];
        active[b] = false;
    }

    Dendrogram { leaves: n, merges }
}

/// UPGMA: average-linkage clustering.
pub fn upgma(matrix: &DistanceMatrix) -> Dendrogram {
    hierarchical(matrix, Linkage::Average)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(rows: &[Vec<f64>]) -> DistanceMatrix {
        DistanceMatrix::from_rows(rows).unwrap()
    }

    #[test]
    fn upgma_merges() {
        let m = matrix(&[
            vec![0.0, 2.0, 6.0, 10.0],
            vec![2.0, 0.0, 6.0, 10.0],
            vec![6.0, 6.0, 0.0, 10.0],
            vec![10.0, 10.0, 10.0, 0.0],
        ]);
        let tree = upgma(&m);
        let merges = tree.merges();
        assert_eq!(merges.len(), 3);
        assert_eq!((merges[0].left, merges[0].right, merges[0].height), (0, 1, 1.0));
        assert_eq!((merges[1].left, merges[1].right, merges[1].height), (4, 2, 3.0));
        assert_eq!((merges[2].left, merges[2].right, merges[2].height), (5, 3, 5.0));
        assert_eq!(merges[2].size, 4);
    }

    #[test]
    fn linkages_differ() {
        let m = matrix(&[
            vec![0.0, 1.0, 4.0],
            vec![1.0, 0.0, 2.0],
            vec![4.0, 2.0, 0.0],
        ]);
        let last = |linkage| hierarchical(&m, linkage).merges()[1].distance;
        assert_eq!(last(Linkage::Average), 3.0);
        assert_eq!(last(Linkage::Single), 2.0);
        assert_eq!(last(Linkage::Complete), 4.0);
    }

    #[test]
    fn ties_prefer_low_indices() {
        let m = matrix(&[
            vec![0.0, 1.0, 1.0],
            vec![1.0, 0.0, 1.0],
            vec![1.0, 1.0, 0.0],
        ]);
        let tree = upgma(&m);
        assert_eq!((tree.merges()[0].left, tree.merges()[0].right), (0, 1));
        assert_eq!((tree.merges()[1].left, tree.merges()[1].right), (3, 2));
    }

    #[test]
    fn cut_heights() {
        let m = matrix(&[
            vec![0.0, 2.0, 6.0, 10.0],
            vec![2.0, 0.0, 6.0, 10.0],
            vec![6.0, 6.0, 0.0, 10.0],
            vec![10.0, 10.0, 10.0, 0.0],
        ]);
        let tree = upgma(&m);
        assert_eq!(tree.cut(0.5).labels(), &[0, 1, 2, 3]);
        assert_eq!(tree.cut(1.0).labels(), &[0, 0, 1, 2]);
        assert_eq!(tree.cut(3.0).labels(), &[0, 0, 0, 1]);
        assert_eq!(tree.cut(5.0).labels(), &[0, 0, 0, 0]);
    }
}
