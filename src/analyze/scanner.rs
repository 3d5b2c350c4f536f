//! The streaming character classifier.
//!
//! Walks the text line by line, word by word, character by character, and
//! emits one [`NoteSpec`] per character. Grouping state (counted delimiter
//! groups and the mutually exclusive one-of region) threads across the whole
//! line; word tags are decided once per word and shared by its characters.

use crate::score::{EffectUpdate, Modifier, NoteSpec, ScoreUnit, Voice};

use super::lexicon::Lexicon;
use super::pitch::pitch_for;

/// Attenuation per leading whitespace character on the level bus.
const INDENT_STEP: f64 = 0.05;

/// Pan contribution of one open parenthesis group.
const PAREN_PAN: f64 = -0.2;
/// Pan contribution of one open bracket group.
const BRACKET_PAN: f64 = 0.3;
/// Fixed pan offset while the pipe region is open.
const PIPE_PAN: f64 = 0.5;

/// The single active one-of region. While one is open, no other marker can
/// open a new region and counted-group tracking is suspended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Region {
    SingleQuote,
    DoubleQuote,
    Pipe,
}

impl Region {
    fn open(ch: char) -> Option<Region> {
        match ch {
            '\'' => Some(Region::SingleQuote),
            '"' => Some(Region::DoubleQuote),
            '|' => Some(Region::Pipe),
            _ => None,
        }
    }

    fn marker(self) -> char {
        match self {
            Region::SingleQuote => '\'',
            Region::DoubleQuote => '"',
            Region::Pipe => '|',
        }
    }

    fn is_quote(self) -> bool {
        !matches!(self, Region::Pipe)
    }
}

/// Grouping state threaded across one line.
#[derive(Debug, Default)]
struct GroupState {
    parens: i32,
    brackets: i32,
    region: Option<Region>,
}

impl GroupState {
    /// Feed one character through the state machine. Returns true when the
    /// character sits strictly inside a quote-class region (neither delimiter
    /// is tagged).
    fn observe(&mut self, ch: char) -> bool {
        if let Some(region) = self.region {
            if ch == region.marker() {
                self.region = None;
                return false;
            }
            return region.is_quote();
        }

        if let Some(region) = Region::open(ch) {
            self.region = Some(region);
            return false;
        }

        match ch {
            '(' => self.parens += 1,
            ')' => self.parens -= 1,
            '[' => self.brackets += 1,
            ']' => self.brackets -= 1,
            _ => {}
        }
        false
    }

    fn pan(&self) -> f64 {
        let pipe = if self.region == Some(Region::Pipe) {
            PIPE_PAN
        } else {
            0.0
        };
        PAREN_PAN * self.parens as f64 + BRACKET_PAN * self.brackets as f64 + pipe
    }
}

pub(super) struct Scanner<'a> {
    lexicon: &'a Lexicon,
    units: Vec<ScoreUnit>,
}

impl<'a> Scanner<'a> {
    pub(super) fn new(lexicon: &'a Lexicon) -> Self {
        Self {
            lexicon,
            units: Vec::new(),
        }
    }

    /// Scan the whole text and return the materialized score.
    pub(super) fn scan(mut self, text: &str) -> Vec<ScoreUnit> {
        let mut started = self.lexicon.start_marker.is_none();

        for line in text.lines() {
            if !started {
                match self.lexicon.start_marker {
                    Some(marker) if Lexicon::line_matches(line, marker) => started = true,
                    _ => continue,
                }
            }

            self.scan_line(line);

            if let Some(marker) = self.lexicon.end_marker {
                if Lexicon::line_matches(line, marker) {
                    break;
                }
            }
        }

        self.units
    }

    fn scan_line(&mut self, line: &str) {
        let indent = line.chars().take_while(|c| c.is_whitespace()).count();
        let voice = if line.trim_start().starts_with(self.lexicon.comment_marker()) {
            Voice::Comment
        } else {
            Voice::Normal
        };
        let level = EffectUpdate::level(1.0 - INDENT_STEP * indent as f64);
        let mut groups = GroupState::default();

        let words: Vec<&str> = line.split_inclusive(' ').collect();
        if words.is_empty() {
            // Blank line: only its newline sounds, as a rest.
            self.scan_word("", true, voice, &level, &mut groups);
            return;
        }

        let last = words.len() - 1;
        for (i, word) in words.iter().enumerate() {
            self.scan_word(word, i == last, voice, &level, &mut groups);
        }
    }

    /// Scan one word. The final word of a line also sounds the newline that
    /// terminated it, so every input character yields exactly one spec.
    fn scan_word(
        &mut self,
        word: &str,
        ends_line: bool,
        voice: Voice,
        level: &EffectUpdate,
        groups: &mut GroupState,
    ) {
        let trimmed = word.trim();
        let word_tag = if voice == Voice::Normal && self.lexicon.is_reserved(trimmed) {
            Some(Modifier::Keyword)
        } else if !trimmed.is_empty() && (trimmed.starts_with(':') || trimmed.ends_with(':')) {
            Some(Modifier::Symbol)
        } else {
            None
        };

        let chars = word.chars().chain(ends_line.then_some('\n'));
        let specs: Vec<NoteSpec> = chars
            .map(|ch| self.scan_char(ch, word_tag, voice, level, groups))
            .collect();

        if word_tag == Some(Modifier::Symbol) {
            self.units.push(ScoreUnit::Chord(specs));
        } else {
            self.units.extend(specs.into_iter().map(ScoreUnit::Note));
        }
    }

    fn scan_char(
        &self,
        ch: char,
        word_tag: Option<Modifier>,
        line_voice: Voice,
        level: &EffectUpdate,
        groups: &mut GroupState,
    ) -> NoteSpec {
        let mut modifiers: Vec<Modifier> = word_tag.into_iter().collect();

        // Grouping first: a delimiter's own note already sees the region it
        // opens or closes.
        if groups.observe(ch) {
            modifiers.push(Modifier::StringRegion);
        }

        let mut voice = line_voice;
        if ch.is_ascii_uppercase() {
            modifiers.push(Modifier::Uppercase);
        } else if !ch.is_ascii_alphabetic() && !ch.is_whitespace() && line_voice != Voice::Comment {
            voice = Voice::SpecialCharacter;
        } else if ch.is_whitespace() {
            modifiers.push(Modifier::Whitespace);
        }

        NoteSpec {
            pitch: pitch_for(ch),
            voice,
            modifiers,
            effects: vec![level.clone(), EffectUpdate::pan(groups.pan())],
        }
    }
}
