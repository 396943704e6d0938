#![doc = include_str!("../README.md")]

pub mod alignment;
pub mod cluster;
pub mod config;
pub mod diagnostics;
mod error;
pub mod msa;
pub mod pairwise;
pub mod profile;
pub mod scoring;
pub mod tree;
pub mod utils;

pub use alignment::Alignment;
pub use config::{AlignConfig, FragmentTieBreak, Mode, Normalization, TreeMethod};
pub use error::{AlignError, Result};
pub use msa::MultipleAligner;
pub use pairwise::PairwiseAligner;
pub use scoring::{GapContext, GapPolicy, ScoringModel, SoundClassModel};

/// The current version of the crate.
pub const VERSION: &str = "0.1.0";
