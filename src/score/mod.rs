//! Score data model — the fundamental unit of sound description.
//!
//! A [`NoteSpec`] is produced for every input character and is immutable once
//! created. Specs are consumed exactly once by the renderer, in emission
//! order, either individually or bundled into a simultaneous chord.

pub mod palette;
pub mod params;

pub use palette::{Modifier, ModifierDef, Timbre, Voice, VoiceDef};
pub use params::{Param, ParamMap};

/// A persistent effect bus on the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BusKind {
    /// Long-term amplitude dynamics.
    Level,
    /// Stereo position.
    Pan,
}

/// A control update pushed to a persistent effect bus before a note plays.
///
/// Effects are continuous, cumulative control changes to a long-lived bus,
/// not one-shot notes.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectUpdate {
    pub bus: BusKind,
    pub params: ParamMap,
}

impl EffectUpdate {
    /// A level-bus amplitude update.
    pub fn level(amp: f64) -> Self {
        Self {
            bus: BusKind::Level,
            params: ParamMap::from([(Param::Amp, amp)]),
        }
    }

    /// A pan-bus position update.
    pub fn pan(pan: f64) -> Self {
        Self {
            bus: BusKind::Pan,
            params: ParamMap::from([(Param::Pan, pan)]),
        }
    }
}

/// One unit of sound description derived from one input character.
///
/// `pitch` is absent for whitespace: the note still occupies a playback slot
/// and performs its wait, but no play call is made for it.
#[derive(Debug, Clone, PartialEq)]
pub struct NoteSpec {
    pub pitch: Option<u32>,
    pub voice: Voice,
    pub modifiers: Vec<Modifier>,
    pub effects: Vec<EffectUpdate>,
}

impl NoteSpec {
    pub fn has_modifier(&self, modifier: Modifier) -> bool {
        self.modifiers.contains(&modifier)
    }
}

/// A playback unit: a single note, or a word sounded as one chord.
///
/// Chord members are dispatched back-to-back with no inter-member delay and
/// share a single wait.
#[derive(Debug, Clone, PartialEq)]
pub enum ScoreUnit {
    Note(NoteSpec),
    Chord(Vec<NoteSpec>),
}

impl ScoreUnit {
    /// All member specs of the unit, in dispatch order.
    pub fn specs(&self) -> &[NoteSpec] {
        match self {
            ScoreUnit::Note(spec) => std::slice::from_ref(spec),
            ScoreUnit::Chord(specs) => specs,
        }
    }
}
