//! Data generation utilities for testing.

use rand::prelude::*;

pub const VOWELS: [&str; 3] = ["a", "e", "i"];
pub const CONSONANTS: [&str; 6] = ["w", "v", "l", "d", "m", "r"];

/// Split a string into one token per character.
pub fn tokens(s: &str) -> Vec<&str> {
    s.char_indices().map(|(i, c)| &s[i..i + c.len_utf8()]).collect()
}

/// `car` random sequences of between 1 and `max_len` tokens.
pub fn gen_sequences(car: usize, max_len: usize, seed: u64) -> Vec<Vec<&'static str>> {
    let alphabet = VOWELS.iter().chain(CONSONANTS.iter()).copied().collect::<Vec<_>>();
    let mut rng = StdRng::seed_from_u64(seed);
    (0..car)
        .map(|_| {
            let len = rng.gen_range(1..=max_len);
            (0..len).map(|_| alphabet[rng.gen_range(0..alphabet.len())]).collect()
        })
        .collect()
}

/// Copies of `base` with one vowel each replaced by a random vowel.
///
/// `base` must contain at least one vowel.
pub fn gen_family(base: &[&'static str], car: usize, seed: u64) -> Vec<Vec<&'static str>> {
    let slots = (0..base.len()).filter(|&i| VOWELS.contains(&base[i])).collect::<Vec<_>>();
    let mut rng = StdRng::seed_from_u64(seed);
    (0..car)
        .map(|_| {
            let mut seq = base.to_vec();
            let i = slots[rng.gen_range(0..slots.len())];
            seq[i] = VOWELS[rng.gen_range(0..VOWELS.len())];
            seq
        })
        .collect()
}

/// Three variants of `waldemar` followed by three variants of `iiii`.
///
/// Substitutions stay within the vowel class, so under the linear toy model
/// every distance within a family is at most 0.25 and every distance across
/// families is above 0.85.
pub fn two_families(seed: u64) -> Vec<Vec<&'static str>> {
    let mut seqs = gen_family(&tokens("waldemar"), 3, seed);
    seqs.extend(gen_family(&tokens("iiii"), 3, seed + 1));
    seqs
}
