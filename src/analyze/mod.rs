//! Tokenizing analyzer — classifies raw text into an ordered score.
//!
//! One pass over the input materializes the full instruction sequence before
//! any playback begins; analysis has no hidden state and no randomness, so
//! the same text always yields the same score.

pub mod lexicon;
pub mod pitch;
mod scanner;

pub use lexicon::Lexicon;
pub use pitch::pitch_for;

use crate::score::ScoreUnit;
use scanner::Scanner;

/// The analyzer. Owns its [`Lexicon`]; everything else is per-call state.
#[derive(Debug, Clone, Default)]
pub struct Analyzer {
    lexicon: Lexicon,
}

impl Analyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lexicon(lexicon: Lexicon) -> Self {
        Self { lexicon }
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    /// Convert text into an ordered sequence of score units.
    pub fn analyze(&self, text: &str) -> Vec<ScoreUnit> {
        Scanner::new(&self.lexicon).scan(text)
    }
}
