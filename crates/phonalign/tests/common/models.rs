//! Scoring models shared by the tests.

use phonalign::{GapPolicy, SoundClassModel};

use super::data_gen;

/// Vowels and consonants, identity 10, vowel-vowel 5, everything else -5.
pub fn toy(gap: GapPolicy) -> SoundClassModel {
    SoundClassModel::new(gap)
        .with_classes(data_gen::VOWELS, "V")
        .with_classes(data_gen::CONSONANTS, "C")
        .with_identity_score(10.0)
        .with_class_score("V", "V", 5.0)
        .with_default_score(-5.0)
}

/// The toy model with a constant gap cost of 8.
pub fn linear() -> SoundClassModel {
    toy(GapPolicy::Constant(8.0))
}

/// The toy model with gaps opening at 8 and extending at 2.
pub fn affine() -> SoundClassModel {
    toy(GapPolicy::Affine { open: 8.0, extend: 2.0 })
}
