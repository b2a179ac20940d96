//! Pipeline stages
//!
//! Each stage is a function of its textual input plus the generation service. None of
//! them touch the cache; persistence belongs to the pipeline driver.

pub mod augmentation;
pub mod extraction;
pub mod profile;
pub mod synthesis;

/// Which stage issued a generation request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Extraction,
    Augmentation,
    Synthesis,
    Profile,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Extraction => write!(f, "extraction"),
            Stage::Augmentation => write!(f, "augmentation"),
            Stage::Synthesis => write!(f, "synthesis"),
            Stage::Profile => write!(f, "profile"),
        }
    }
}

pub use augmentation::{augment, BeliefProfile};
pub use extraction::{clean_markdown, extract};
pub use profile::derive_profile;
pub use synthesis::{synthesize, Voice};
