//! Renderer — resolves score units into backend calls.
//!
//! The renderer is stateless across units apart from the two persistent
//! effect-bus handles it holds for the span of one performance. Whitespace
//! slots skip the play call but still perform their wait, so the silence of
//! the text is part of the timing.

use crate::backend::{AudioBackend, BackendError, BusHandle};
use crate::score::{BusKind, Modifier, NoteSpec, Param, ParamMap, ScoreUnit, Voice};

/// Base gap between playback slots, in seconds.
const BASE_GAP: f64 = 0.1;

/// Slide of the level bus: indentation changes drift in over seconds.
const LEVEL_SLIDE: f64 = 4.0;

/// Resolve a note's synthesis parameters: the voice's base mapping, then
/// each modifier's delta merged override-by-key in attachment order.
pub fn resolve_params(voice: Voice, modifiers: &[Modifier]) -> ParamMap {
    let mut params = voice.def().params;
    for modifier in modifiers {
        params.merge(&modifier.def().params);
    }
    params
}

/// The wait following a playback slot: the base gap scaled by every attached
/// modifier's wait multiplier.
pub fn wait_for(modifiers: &[Modifier]) -> f64 {
    let factor: f64 = modifiers.iter().filter_map(|m| m.def().wait).product();
    BASE_GAP * factor
}

/// Estimated duration of a score: the sum of unit waits. A chord contributes
/// a single wait, computed from its first member.
pub fn score_duration(score: &[ScoreUnit]) -> f64 {
    score
        .iter()
        .map(|unit| {
            unit.specs()
                .first()
                .map_or(0.0, |spec| wait_for(&spec.modifiers))
        })
        .sum()
}

/// Drives an [`AudioBackend`] through a materialized score.
pub struct Renderer<B: AudioBackend> {
    backend: B,
}

impl<B: AudioBackend> Renderer<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn into_backend(self) -> B {
        self.backend
    }

    /// Perform the whole score, in order, with side effects only.
    ///
    /// Both effect buses are acquired up front and released when the
    /// performance ends, whether it completed or failed.
    pub fn perform(&mut self, score: &[ScoreUnit]) -> Result<(), BackendError> {
        let level = self.backend.acquire_bus(
            BusKind::Level,
            &ParamMap::from([(Param::Amp, 1.0), (Param::AmpSlide, LEVEL_SLIDE)]),
        )?;
        let pan = self
            .backend
            .acquire_bus(BusKind::Pan, &ParamMap::from([(Param::Pan, 0.0)]))?;

        let performed = self.perform_units(score, level, pan);
        let pan_released = self.backend.release_bus(pan);
        let level_released = self.backend.release_bus(level);

        performed.and(pan_released).and(level_released)
    }

    fn perform_units(
        &mut self,
        score: &[ScoreUnit],
        level: BusHandle,
        pan: BusHandle,
    ) -> Result<(), BackendError> {
        for unit in score {
            for spec in unit.specs() {
                self.sound(spec, level, pan)?;
            }
            // One wait per unit: chord members sound simultaneously.
            if let Some(first) = unit.specs().first() {
                self.backend.wait(wait_for(&first.modifiers));
            }
        }
        Ok(())
    }

    fn sound(
        &mut self,
        spec: &NoteSpec,
        level: BusHandle,
        pan: BusHandle,
    ) -> Result<(), BackendError> {
        if let Some(timbre) = spec.voice.def().timbre {
            self.backend.select_timbre(timbre);
        }

        for effect in &spec.effects {
            let handle = match effect.bus {
                BusKind::Level => level,
                BusKind::Pan => pan,
            };
            self.backend.update_bus(handle, &effect.params)?;
        }

        if let Some(pitch) = spec.pitch {
            let params = resolve_params(spec.voice, &spec.modifiers);
            self.backend.play(pitch, &params)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{BackendCall, RecordingBackend};
    use crate::score::{EffectUpdate, Timbre};
    use assert_approx_eq::assert_approx_eq;

    fn note(pitch: Option<u32>, voice: Voice, modifiers: Vec<Modifier>) -> NoteSpec {
        NoteSpec {
            pitch,
            voice,
            modifiers,
            effects: vec![EffectUpdate::level(1.0), EffectUpdate::pan(0.0)],
        }
    }

    fn perform(score: &[ScoreUnit]) -> RecordingBackend {
        let mut renderer = Renderer::new(RecordingBackend::new());
        renderer.perform(score).unwrap();
        renderer.into_backend()
    }

    #[test]
    fn resolve_starts_from_the_voice_base() {
        let params = resolve_params(Voice::Normal, &[]);
        assert_eq!(params.get(Param::Amp), Some(0.6));
        assert_eq!(params.get(Param::Attack), Some(0.05));
    }

    #[test]
    fn resolve_merges_in_attachment_order() {
        // Keyword sets amp 1, then Uppercase overrides it with 3.
        let params = resolve_params(Voice::Normal, &[Modifier::Keyword, Modifier::Uppercase]);
        assert_eq!(params.get(Param::Amp), Some(3.0));
        assert_eq!(params.get(Param::Release), Some(0.001));

        // Reversed attachment leaves Keyword's amp on top.
        let params = resolve_params(Voice::Normal, &[Modifier::Uppercase, Modifier::Keyword]);
        assert_eq!(params.get(Param::Amp), Some(1.0));
    }

    #[test]
    fn tag_modifiers_leave_params_alone() {
        let base = resolve_params(Voice::Normal, &[]);
        let tagged = resolve_params(Voice::Normal, &[Modifier::StringRegion, Modifier::Symbol]);
        assert_eq!(base, tagged);
    }

    #[test]
    fn default_wait_is_the_base_gap() {
        assert_approx_eq!(wait_for(&[]), 0.1);
        assert_approx_eq!(wait_for(&[Modifier::Keyword, Modifier::Uppercase]), 0.1);
    }

    #[test]
    fn whitespace_doubles_the_wait() {
        assert_approx_eq!(wait_for(&[Modifier::Whitespace]), 0.2);
        assert_approx_eq!(wait_for(&[Modifier::Keyword, Modifier::Whitespace]), 0.2);
    }

    #[test]
    fn buses_are_acquired_then_released() {
        let backend = perform(&[]);
        assert!(backend.open_buses().is_empty());
        let acquires = backend
            .calls()
            .iter()
            .filter(|c| matches!(c, BackendCall::AcquireBus { .. }))
            .count();
        assert_eq!(acquires, 2);
    }

    #[test]
    fn level_bus_starts_at_full_with_a_slow_slide() {
        let backend = perform(&[]);
        let initial = backend.calls().iter().find_map(|c| match c {
            BackendCall::AcquireBus { kind: BusKind::Level, initial, .. } => Some(initial.clone()),
            _ => None,
        });
        let initial = initial.unwrap();
        assert_eq!(initial.get(Param::Amp), Some(1.0));
        assert_eq!(initial.get(Param::AmpSlide), Some(4.0));
    }

    #[test]
    fn note_dispatch_order() {
        let unit = ScoreUnit::Note(note(Some(67), Voice::Normal, vec![]));
        let backend = perform(&[unit]);

        // After the two acquires: timbre, both effect updates, play, wait.
        let calls = &backend.calls()[2..];
        assert!(matches!(calls[0], BackendCall::SelectTimbre(Timbre::Fm)));
        assert!(matches!(calls[1], BackendCall::UpdateBus { .. }));
        assert!(matches!(calls[2], BackendCall::UpdateBus { .. }));
        assert!(matches!(calls[3], BackendCall::Play { pitch: 67, .. }));
        assert!(matches!(calls[4], BackendCall::Wait(_)));
    }

    #[test]
    fn special_character_selects_saw() {
        let unit = ScoreUnit::Note(note(Some(40), Voice::SpecialCharacter, vec![]));
        let backend = perform(&[unit]);
        assert!(backend
            .calls()
            .iter()
            .any(|c| matches!(c, BackendCall::SelectTimbre(Timbre::Saw))));
    }

    #[test]
    fn whitespace_skips_play_but_still_waits() {
        let unit = ScoreUnit::Note(note(None, Voice::Normal, vec![Modifier::Whitespace]));
        let backend = perform(&[unit]);

        assert_eq!(backend.plays(), 0);
        // Its effects still reach the buses.
        assert_eq!(backend.bus_updates(), 2);
        assert_approx_eq!(backend.total_wait(), 0.2);
    }

    #[test]
    fn chord_members_share_one_wait() {
        let member = |pitch| note(Some(pitch), Voice::SpecialCharacter, vec![Modifier::Symbol]);
        let unit = ScoreUnit::Chord(vec![member(58), member(64), member(73)]);
        let backend = perform(&[unit]);

        assert_eq!(backend.plays(), 3);
        let waits = backend
            .calls()
            .iter()
            .filter(|c| matches!(c, BackendCall::Wait(_)))
            .count();
        assert_eq!(waits, 1);
        assert_approx_eq!(backend.total_wait(), 0.1);

        // No wait lands between the member plays.
        let positions: Vec<usize> = backend
            .calls()
            .iter()
            .enumerate()
            .filter_map(|(i, c)| match c {
                BackendCall::Play { .. } => Some(i),
                _ => None,
            })
            .collect();
        let wait_position = backend
            .calls()
            .iter()
            .position(|c| matches!(c, BackendCall::Wait(_)))
            .unwrap();
        assert!(positions.iter().all(|&p| p < wait_position));
    }

    #[test]
    fn chord_wait_comes_from_the_first_member() {
        let silent = note(None, Voice::Normal, vec![Modifier::Symbol, Modifier::Whitespace]);
        let sounding = note(Some(64), Voice::Normal, vec![Modifier::Symbol]);
        let unit = ScoreUnit::Chord(vec![silent, sounding]);
        let backend = perform(&[unit]);
        assert_approx_eq!(backend.total_wait(), 0.2);
    }

    #[test]
    fn played_params_are_resolved() {
        let unit = ScoreUnit::Note(note(
            Some(67),
            Voice::Normal,
            vec![Modifier::Keyword, Modifier::Uppercase],
        ));
        let backend = perform(&[unit]);

        let params = backend.calls().iter().find_map(|c| match c {
            BackendCall::Play { params, .. } => Some(params.clone()),
            _ => None,
        });
        let params = params.unwrap();
        assert_eq!(params.get(Param::Amp), Some(3.0));
        assert_eq!(params.get(Param::Attack), Some(0.001));
    }

    #[test]
    fn score_duration_sums_unit_waits() {
        let score = vec![
            ScoreUnit::Note(note(Some(60), Voice::Normal, vec![])),
            ScoreUnit::Note(note(None, Voice::Normal, vec![Modifier::Whitespace])),
            ScoreUnit::Chord(vec![
                note(Some(58), Voice::Normal, vec![Modifier::Symbol]),
                note(Some(64), Voice::Normal, vec![Modifier::Symbol]),
            ]),
        ];
        assert_approx_eq!(score_duration(&score), 0.1 + 0.2 + 0.1);
    }
}
