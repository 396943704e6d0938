//! Markov clustering.

use ndarray::{Array2, Axis};

use crate::tree::DistanceMatrix;

use super::{DisjointSet, Partition};

/// The parameters of Markov clustering.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[must_use]
pub struct MclParams {
    /// The matrix power taken at each expansion step.
    pub expansion: u32,
    /// The entry-wise power taken at each inflation step.
    pub inflation: f64,
    /// The maximum number of expansion and inflation rounds.
    pub max_iter: usize,
    /// Entries below this are set to zero after inflation.
    pub prune: f64,
    /// Iteration stops once no entry changes by more than this.
    pub tolerance: f64,
}

impl Default for MclParams {
    fn default() -> Self {
        Self {
            expansion: 2,
            inflation: 2.0,
            max_iter: 100,
            prune: 1e-5,
            tolerance: 1e-9,
        }
    }
}

impl MclParams {
    /// Set the expansion power.
    pub const fn with_expansion(mut self, expansion: u32) -> Self {
        self.expansion = expansion;
        self
    }

    /// Set the inflation power.
    pub const fn with_inflation(mut self, inflation: f64) -> Self {
        self.inflation = inflation;
        self
    }

    /// Set the iteration cap.
    pub const fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Set the pruning threshold.
    pub const fn with_prune(mut self, prune: f64) -> Self {
        self.prune = prune;
        self
    }

    /// Set the convergence tolerance.
    pub const fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }
}

/// Scale every column to sum to one. Empty columns are left alone.
fn normalize_columns(m: &mut Array2<f64>) {
    let mut sums = m.sum_axis(Axis(0));
    sums.mapv_inplace(|s| if s > 0.0 { s } else { 1.0 });
    *m /= &sums;
}

/// Cluster items by simulating flow on the graph of close pairs.
///
/// Items closer than `threshold` are joined by an edge of weight
/// `1 - d / threshold`, which lies in `(0, 1]` whatever the scale of the
/// distances, and every item has a self loop of weight one. Once the flow
/// converges, items joined by any remaining flow form a cluster.
pub fn mcl(matrix: &DistanceMatrix, threshold: f64, params: MclParams) -> Partition {
    let n = matrix.len();
    let mut flow = Array2::from_shape_fn((n, n), |(i, j)| {
        let d = matrix.get(i, j);
        if i == j {
            1.0
        } else if d < threshold {
            1.0 - d / threshold
        } else {
            0.0
        }
    });
    normalize_columns(&mut flow);

    for step in 0..params.max_iter {
        let mut next = flow.clone();
        for _ in 1..params.expansion {
            next = next.dot(&flow);
        }
        next.mapv_inplace(|v| v.powf(params.inflation));
        normalize_columns(&mut next);
        next.mapv_inplace(|v| if v < params.prune { 0.0 } else { v });
        normalize_columns(&mut next);

        let change = (&next - &flow).iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
        flow = next;
        if change <= params.tolerance {
            ftlog::debug!("MCL converged after {} rounds", step + 1);
            break;
        }
    }

    // Items sharing flow after pruning belong to the same attractor system.
    let mut sets = DisjointSet::new(n);
    for ((i, j), &v) in flow.indexed_iter() {
        if v > 0.0 {
            sets.union(i, j);
        }
    }
    sets.partition()
}
