//! Voice and modifier definitions — the static tables the renderer resolves
//! notes against.
//!
//! Both tables are total matches over closed enums, constructed before any
//! analysis or playback begins. The numeric values are the performance's
//! sound design and are deliberately fixed.

use super::params::{Param, ParamMap};

/// A timbre a voice can select on the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timbre {
    /// Two-operator FM pair.
    Fm,
    /// Plain sawtooth.
    Saw,
}

/// A timbre category for a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Voice {
    /// Ordinary text.
    Normal,
    /// A line led by the comment marker.
    Comment,
    /// Punctuation and other non-alphabetic, non-whitespace characters.
    SpecialCharacter,
}

/// Base synthesis settings for a voice.
#[derive(Debug, Clone)]
pub struct VoiceDef {
    pub timbre: Option<Timbre>,
    pub params: ParamMap,
}

impl Voice {
    /// The voice's base definition.
    pub fn def(self) -> VoiceDef {
        match self {
            Voice::Normal => VoiceDef {
                timbre: Some(Timbre::Fm),
                params: ParamMap::from([(Param::Amp, 0.6), (Param::Attack, 0.05)]),
            },
            Voice::Comment => VoiceDef {
                timbre: Some(Timbre::Fm),
                params: ParamMap::from([
                    (Param::Divisor, 1.0),
                    (Param::Depth, 0.5),
                    (Param::AttackLevel, 0.7),
                    (Param::Attack, 0.15),
                    (Param::Amp, 0.5),
                ]),
            },
            Voice::SpecialCharacter => VoiceDef {
                timbre: Some(Timbre::Saw),
                params: ParamMap::new(),
            },
        }
    }
}

/// A named trait attached to a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modifier {
    /// The source character was an uppercase letter.
    Uppercase,
    /// The word matched the reserved-word set.
    Keyword,
    /// The source character was whitespace.
    Whitespace,
    /// The character sits inside a quote-delimited region.
    StringRegion,
    /// The word is a colon-prefixed or colon-suffixed token.
    Symbol,
}

/// A modifier's parameter delta and wait multiplier.
#[derive(Debug, Clone)]
pub struct ModifierDef {
    /// Layered onto the voice base by override-merge, not addition.
    pub params: ParamMap,
    /// Multiplies the inter-note wait. `None` contributes 1.0.
    pub wait: Option<f64>,
}

impl Modifier {
    /// The modifier's definition.
    pub fn def(self) -> ModifierDef {
        match self {
            Modifier::Uppercase => ModifierDef {
                params: ParamMap::from([
                    (Param::Attack, 0.001),
                    (Param::AttackLevel, 1.0),
                    (Param::Sustain, 0.05),
                    (Param::SustainLevel, 0.5),
                    (Param::Release, 0.001),
                    (Param::Amp, 3.0),
                ]),
                wait: None,
            },
            Modifier::Keyword => ModifierDef {
                params: ParamMap::from([(Param::Amp, 1.0)]),
                wait: None,
            },
            Modifier::Whitespace => ModifierDef {
                params: ParamMap::new(),
                wait: Some(2.0),
            },
            Modifier::StringRegion | Modifier::Symbol => ModifierDef {
                params: ParamMap::new(),
                wait: None,
            },
        }
    }
}
