//! Tests for profile and multiple alignment.

use float_cmp::approx_eq;
use phonalign::{
    diagnostics,
    profile::ProfileAligner,
    tree::{DistanceMatrix, GuideTree},
    AlignConfig, AlignError, Mode, MultipleAligner, PairwiseAligner, TreeMethod,
};
use test_case::test_case;

mod common;

use common::{data_gen, models};

#[test_case(false; "progressive")]
#[test_case(true; "library")]
fn near_identical_sequences_stay_ungapped(use_library: bool) {
    let model = models::linear();
    let aligner = MultipleAligner::new(&model, AlignConfig::default().with_library(use_library));
    let seqs = ["waldemar", "waldemar", "waldimar"]
        .into_iter()
        .map(data_gen::tokens)
        .collect::<Vec<_>>();

    let msa = aligner.align(&seqs).unwrap();
    assert_eq!(msa.strings(""), vec!["waldemar", "waldemar", "waldimar"]);
    // Two identical pairs of 80 and two pairs with one vowel swap of 75.
    assert_eq!(msa.score(), 80.0 + 75.0 + 75.0);
}

#[test_case(TreeMethod::Upgma, false; "upgma")]
#[test_case(TreeMethod::Upgma, true; "upgma_library")]
#[test_case(TreeMethod::NeighborJoining, false; "nj")]
#[test_case(TreeMethod::NeighborJoining, true; "nj_library")]
fn rows_round_trip(tree: TreeMethod, use_library: bool) {
    let model = models::affine();
    let config = AlignConfig::default().with_tree(tree).with_library(use_library);
    let aligner = MultipleAligner::new(&model, config);

    for seed in 0..4 {
        let seqs = data_gen::gen_sequences(7, 10, seed);
        let msa = aligner.align(&seqs).unwrap();
        assert_eq!(msa.len(), seqs.len());
        for (i, seq) in seqs.iter().enumerate() {
            assert_eq!(msa[i].len(), msa.width());
            assert_eq!(&msa.ungapped(i), seq);
        }
        for c in 0..msa.width() {
            assert!(msa.column(c).iter().any(Option::is_some), "column {c} is all gaps");
        }
    }
}

#[test_case(Mode::SemiGlobal; "semi_global")]
#[test_case(Mode::Local; "local")]
#[test_case(Mode::Dialign; "dialign")]
fn other_modes_round_trip(mode: Mode) {
    let model = models::affine();
    let aligner = MultipleAligner::new(&model, AlignConfig::default().with_mode(mode));
    let seqs = data_gen::gen_sequences(6, 9, 99);

    let msa = aligner.align(&seqs).unwrap();
    for (i, seq) in seqs.iter().enumerate() {
        assert_eq!(&msa.ungapped(i), seq);
        assert_eq!(msa.spans()[i], 0..seq.len());
    }
}

#[test]
fn score_is_sum_of_pairs() {
    let model = models::affine();
    let aligner = MultipleAligner::new(&model, AlignConfig::default());
    let seqs = data_gen::gen_sequences(5, 12, 21);
    let msa = aligner.align(&seqs).unwrap();

    let mut total = 0.0;
    for i in 0..seqs.len() {
        for j in (i + 1)..seqs.len() {
            total += diagnostics::pair_score(&msa, i, j, &model).unwrap();
        }
    }
    assert!(approx_eq!(f64, msa.score(), total, epsilon = 1e-9));
    assert!(approx_eq!(f64, msa.rescore(&model).unwrap(), total, epsilon = 1e-9));
}

#[test]
fn gap_overrides_reach_the_score() {
    let model = models::affine();
    let aligner = MultipleAligner::new(&model, AlignConfig::default().with_gap_open(1.0).with_gap_extend(1.0));
    let seqs = vec![data_gen::tokens("waldemar"), data_gen::tokens("wadmar")];
    let msa = aligner.align(&seqs).unwrap();

    // Six matches and two single-token gaps.
    assert_eq!(msa.score(), 60.0 - 2.0);
}

#[test]
fn explicit_guide_trees() {
    let model = models::linear();
    let config = AlignConfig::default();
    let aligner = MultipleAligner::new(&model, config.clone());
    let seqs = data_gen::two_families(5);

    let distances = DistanceMatrix::from_sequences(&PairwiseAligner::new(&model, config), &seqs).unwrap();
    let tree = aligner.guide_tree(&distances);
    assert_eq!(aligner.align_with_tree(&seqs, &tree).unwrap(), aligner.align(&seqs).unwrap());

    // A caterpillar tree in input order still aligns every row.
    let chain = GuideTree::new(6, vec![[0, 1], [6, 2], [7, 3], [8, 4], [9, 5]]).unwrap();
    let msa = aligner.align_with_tree(&seqs, &chain).unwrap();
    for (i, seq) in seqs.iter().enumerate() {
        assert_eq!(&msa.ungapped(i), seq);
    }

    let short = GuideTree::new(2, vec![[0, 1]]).unwrap();
    assert!(matches!(
        aligner.align_with_tree(&seqs, &short),
        Err(AlignError::InvalidGuideTree { .. })
    ));
}

#[test]
fn tiny_inputs() {
    let model = models::linear();
    let aligner = MultipleAligner::new(&model, AlignConfig::default());

    let none: Vec<Vec<&str>> = Vec::new();
    let msa = aligner.align(&none).unwrap();
    assert!(msa.is_empty());
    assert_eq!(msa.width(), 0);

    let one = vec![data_gen::tokens("mar")];
    let msa = aligner.align(&one).unwrap();
    assert_eq!(msa.strings(""), vec!["mar"]);
    assert_eq!(msa.score(), 0.0);

    let bad = vec![data_gen::tokens("mar"), Vec::new(), data_gen::tokens("mer")];
    assert!(matches!(aligner.align(&bad), Err(AlignError::EmptySequence { index: 1 })));
}

#[test]
fn parallel_matches_sequential() {
    let model = models::affine();
    let aligner = MultipleAligner::new(&model, AlignConfig::default().with_library(true).with_par_threshold(0));
    let seqs = data_gen::gen_sequences(8, 10, 123);
    assert_eq!(aligner.par_align(&seqs).unwrap(), aligner.align(&seqs).unwrap());
}

#[test]
fn profiles_grow_one_sequence_at_a_time() {
    let model = models::linear();
    let config = AlignConfig::default();
    let seqs = data_gen::two_families(9);
    let aligner = ProfileAligner::new(&model, &config, &seqs).unwrap();

    let mut profile = aligner.leaf(0);
    for i in 1..seqs.len() {
        let (next, _) = aligner.align_to_profile(&profile, i).unwrap();
        assert_eq!(next.len(), i + 1);
        assert!(next.width() >= profile.width());
        profile = next;
    }

    let msa = profile.to_alignment(&seqs, "-", 0.0);
    for (i, seq) in seqs.iter().enumerate() {
        assert_eq!(&msa.ungapped(i), seq);
        assert_eq!(profile.positions(profile.members().iter().position(|&m| m == i).unwrap()).len(), seq.len());
    }
}
