//! Tests for distance matrices and tree building.

use float_cmp::approx_eq;
use phonalign::{
    tree::{hierarchical, neighbor_joining, upgma, DistanceMatrix, GuideTree, Linkage},
    AlignConfig, AlignError, PairwiseAligner,
};
use test_case::test_case;

mod common;

use common::{data_gen, models};

fn family_matrix(seed: u64) -> DistanceMatrix {
    let model = models::linear();
    let aligner = PairwiseAligner::new(&model, AlignConfig::default());
    DistanceMatrix::from_sequences(&aligner, &data_gen::two_families(seed)).unwrap()
}

#[test]
fn single_item() {
    let m = DistanceMatrix::from_rows(&[vec![0.0]]).unwrap();
    let tree = upgma(&m);
    assert_eq!(tree.leaves(), 1);
    assert!(tree.merges().is_empty());
    assert!(tree.guide_tree().merges().is_empty());

    let nj = neighbor_joining(&m);
    assert!(nj.joins().is_empty());
    assert_eq!(nj.center(), &[(0, 0.0)]);
    assert!(nj.merge_order().merges().is_empty());
}

#[test]
fn two_items() {
    let m = DistanceMatrix::from_rows(&[vec![0.0, 0.6], vec![0.6, 0.0]]).unwrap();
    let tree = upgma(&m);
    assert_eq!(tree.merges().len(), 1);
    assert_eq!(tree.merges()[0].distance, 0.6);
    assert_eq!(tree.merges()[0].height, 0.3);
    assert_eq!(tree.guide_tree().merges(), &[[0, 1]]);

    let nj = neighbor_joining(&m);
    assert_eq!(nj.center(), &[(0, 0.3), (1, 0.3)]);
    assert_eq!(nj.merge_order().merges(), &[[0, 1]]);
}

#[test]
fn bad_matrices() {
    let asymmetric = DistanceMatrix::from_rows(&[vec![0.0, 0.5], vec![0.4, 0.0]]);
    assert!(matches!(asymmetric, Err(AlignError::DegenerateDistanceMatrix { .. })));

    let negative = DistanceMatrix::from_rows(&[vec![0.0, -0.5], vec![-0.5, 0.0]]);
    assert!(matches!(negative, Err(AlignError::DegenerateDistanceMatrix { .. })));

    let ragged = DistanceMatrix::from_rows(&[vec![0.0, 0.5], vec![0.5]]);
    assert!(matches!(ragged, Err(AlignError::DegenerateDistanceMatrix { .. })));

    let empty = DistanceMatrix::from_rows(&[]);
    assert!(matches!(empty, Err(AlignError::DegenerateDistanceMatrix { .. })));

    let diagonal = DistanceMatrix::from_rows(&[vec![0.1, 0.5], vec![0.5, 0.0]]);
    assert!(matches!(diagonal, Err(AlignError::DegenerateDistanceMatrix { .. })));
}

#[test_case(1; "seed_1")]
#[test_case(2; "seed_2")]
#[test_case(3; "seed_3")]
fn matrices_from_sequences(seed: u64) {
    let m = family_matrix(seed);
    assert_eq!(m.len(), 6);
    for i in 0..6 {
        assert_eq!(m.get(i, i), 0.0);
        for j in 0..6 {
            assert_eq!(m.get(i, j), m.get(j, i));
            let same_family = (i < 3) == (j < 3);
            if same_family {
                assert!(m.get(i, j) <= 0.25, "d({i}, {j}) = {}", m.get(i, j));
            } else {
                assert!(m.get(i, j) > 0.85, "d({i}, {j}) = {}", m.get(i, j));
            }
        }
    }

    let model = models::linear();
    let aligner = PairwiseAligner::new(&model, AlignConfig::default().with_par_threshold(0));
    let par = DistanceMatrix::par_from_sequences(&aligner, &data_gen::two_families(seed)).unwrap();
    assert_eq!(par, m);
}

#[test_case(Linkage::Average; "average")]
#[test_case(Linkage::Single; "single")]
#[test_case(Linkage::Complete; "complete")]
fn families_merge_last(linkage: Linkage) {
    let tree = hierarchical(&family_matrix(42), linkage);
    assert_eq!(tree.merges().len(), 5);

    let heights = tree.merges().iter().map(|m| m.height).collect::<Vec<_>>();
    assert!(heights.windows(2).all(|w| w[0] <= w[1]));

    let guide = tree.guide_tree();
    let members = guide.members();
    let root = guide.merges()[4];
    let mut sides = root.map(|c| members[c].clone());
    sides.sort();
    assert_eq!(sides, [vec![0, 1, 2], vec![3, 4, 5]]);
}

#[test]
fn neighbor_joining_on_families() {
    let m = family_matrix(42);
    let nj = neighbor_joining(&m);
    assert_eq!(nj.leaves(), 6);
    assert_eq!(nj.joins().len(), 3);
    assert_eq!(nj.center().len(), 3);
    for join in nj.joins() {
        assert!(join.left_length.is_finite() && join.right_length.is_finite());
    }

    let order = nj.merge_order();
    assert_eq!(order.merges().len(), 5);
    let rebuilt = GuideTree::new(order.leaves(), order.merges().to_vec()).unwrap();
    assert_eq!(rebuilt, order);
    assert_eq!(order.members()[10], vec![0, 1, 2, 3, 4, 5]);
}

#[test]
fn additive_branch_lengths() {
    // The tree ((0:1, 1:2):1, 2:3, 3:4) is recovered exactly.
    let m = DistanceMatrix::from_rows(&[
        vec![0.0, 3.0, 5.0, 6.0],
        vec![3.0, 0.0, 6.0, 7.0],
        vec![5.0, 6.0, 0.0, 7.0],
        vec![6.0, 7.0, 7.0, 0.0],
    ])
    .unwrap();
    let nj = neighbor_joining(&m);
    let join = nj.joins()[0];
    assert_eq!((join.left, join.right), (0, 1));
    assert!(approx_eq!(f64, join.left_length, 1.0, epsilon = 1e-12));
    assert!(approx_eq!(f64, join.right_length, 2.0, epsilon = 1e-12));

    let mut center = nj.center().to_vec();
    center.sort_by_key(|&(node, _)| node);
    let expected = [(2, 3.0), (3, 4.0), (4, 1.0)];
    for ((node, length), (e_node, e_length)) in center.into_iter().zip(expected) {
        assert_eq!(node, e_node);
        assert!(approx_eq!(f64, length, e_length, epsilon = 1e-12));
    }
}
