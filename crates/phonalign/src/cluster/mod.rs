//! Flat clustering of items under a distance matrix.

mod mcl;

pub use mcl::{mcl, MclParams};

use crate::tree::{hierarchical, DistanceMatrix, Linkage};

/// An assignment of every item to exactly one cluster.
///
/// Cluster ids are `0..k`, numbered in order of each cluster's lowest item,
/// so equal groupings always compare equal.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[must_use]
pub struct Partition {
    /// The cluster id of each item.
    labels: Vec<usize>,
}

impl Partition {
    /// Create a partition from arbitrary labels, renumbering them.
    pub fn from_labels<T: Eq + core::hash::Hash>(labels: &[T]) -> Self {
        let mut ids = std::collections::HashMap::new();
        let labels = labels
            .iter()
            .map(|l| {
                let next = ids.len();
                *ids.entry(l).or_insert(next)
            })
            .collect();
        Self { labels }
    }

    /// The number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Whether there are no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// The cluster id of each item.
    #[must_use]
    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    /// The cluster id of item `i`.
    #[must_use]
    pub fn label(&self, i: usize) -> usize {
        self.labels[i]
    }

    /// The number of clusters.
    #[must_use]
    pub fn num_clusters(&self) -> usize {
        self.labels.iter().max().map_or(0, |&m| m + 1)
    }

    /// The items of each cluster, in increasing order.
    #[must_use]
    pub fn clusters(&self) -> Vec<Vec<usize>> {
        let mut clusters = vec![Vec::new(); self.num_clusters()];
        for (i, &l) in self.labels.iter().enumerate() {
            clusters[l].push(i);
        }
        clusters
    }
}

/// Union-find over item indices.
#[derive(Clone, Debug)]
pub(crate) struct DisjointSet {
    /// The parent of each item. Roots are their own parents.
    parent: Vec<usize>,
}

impl DisjointSet {
    /// Every item in its own set.
    pub(crate) fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
        }
    }

    /// The root of the set holding `i`.
    pub(crate) fn find(&mut self, mut i: usize) -> usize {
        while self.parent[i] != i {
            self.parent[i] = self.parent[self.parent[i]];
            i = self.parent[i];
        }
        i
    }

    /// Join the sets holding `a` and `b`. The lower root survives.
    pub(crate) fn union(&mut self, a: usize, b: usize) {
        let (a, b) = (self.find(a), self.find(b));
        let (lo, hi) = (a.min(b), a.max(b));
        self.parent[hi] = lo;
    }

    /// The sets as a partition.
    pub(crate) fn partition(mut self) -> Partition {
        let roots = (0..self.parent.len()).map(|i| self.find(i)).collect::<Vec<_>>();
        Partition::from_labels(&roots)
    }
}

/// Cut a hierarchical clustering at a height threshold.
///
/// Merges with height (half the merge distance) at most `threshold` are
/// kept.
pub fn flat_cluster(matrix: &DistanceMatrix, linkage: Linkage, threshold: f64) -> Partition {
    hierarchical(matrix, linkage).cut(threshold)
}

/// Connected components of the graph joining items closer than `threshold`.
///
/// No tree is built.
pub fn link_clustering(matrix: &DistanceMatrix, threshold: f64) -> Partition {
    let n = matrix.len();
    let mut sets = DisjointSet::new(n);
    for i in 0..n {
        for j in (i + 1)..n {
            if matrix.get(i, j) < threshold {
                sets.union(i, j);
            }
        }
    }
    let partition = sets.partition();
    ftlog::debug!(
        "Link clustering at {threshold} found {} clusters among {n} items",
        partition.num_clusters()
    );
    partition
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix() -> DistanceMatrix {
        DistanceMatrix::from_rows(&[
            vec![0.0, 0.1, 0.9, 0.8],
            vec![0.1, 0.0, 0.9, 0.9],
            vec![0.9, 0.9, 0.0, 0.2],
            vec![0.8, 0.9, 0.2, 0.0],
        ])
        .unwrap()
    }

    #[test]
    fn canonical_labels() {
        let p = Partition::from_labels(&["x", "y", "x", "z"]);
        assert_eq!(p.labels(), &[0, 1, 0, 2]);
        assert_eq!(p, Partition::from_labels(&[7, 3, 7, 1]));
        assert_eq!(p.num_clusters(), 3);
        assert_eq!(p.clusters(), vec![vec![0, 2], vec![1], vec![3]]);
    }

    #[test]
    fn link_components() {
        let m = matrix();
        assert_eq!(link_clustering(&m, 0.05).labels(), &[0, 1, 2, 3]);
        assert_eq!(link_clustering(&m, 0.2).labels(), &[0, 0, 1, 2]);
        assert_eq!(link_clustering(&m, 0.5).labels(), &[0, 0, 1, 1]);
        assert_eq!(link_clustering(&m, 0.85).labels(), &[0, 0, 0, 0]);
    }

    #[test]
    fn flat_cuts() {
        let m = matrix();
        assert_eq!(flat_cluster(&m, Linkage::Average, 0.0).num_clusters(), 4);
        assert_eq!(flat_cluster(&m, Linkage::Average, 0.25).labels(), &[0, 0, 1, 1]);
        assert_eq!(flat_cluster(&m, Linkage::Single, 0.5).labels(), &[0, 0, 0, 0]);
    }
}
