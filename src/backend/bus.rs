//! Continuous effect-bus state.
//!
//! A bus value is a piecewise-linear function of time: each control update
//! ramps from the value at the moment of the update toward the new target
//! over the bus's slide duration. A slide of zero makes updates immediate.

use crate::score::{BusKind, Param, ParamMap};
use crate::synth::pan_gains;

use super::{BackendError, BusHandle};

/// One continuously controllable bus parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BusState {
    value: f64,
    target: f64,
    slide: f64,
    updated_at: f64,
}

impl BusState {
    pub fn new(initial: f64, slide: f64) -> Self {
        Self {
            value: initial,
            target: initial,
            slide,
            updated_at: 0.0,
        }
    }

    /// Retarget the bus at time `now`. The ramp starts from the value the
    /// bus has reached at that moment.
    pub fn update(&mut self, now: f64, target: f64) {
        self.value = self.value_at(now);
        self.updated_at = now;
        self.target = target;
    }

    /// Change the slide used by subsequent updates.
    pub fn set_slide(&mut self, slide: f64) {
        self.slide = slide.max(0.0);
    }

    /// The bus value at time `t`.
    pub fn value_at(&self, t: f64) -> f64 {
        if self.slide <= 0.0 || t >= self.updated_at + self.slide {
            return self.target;
        }
        if t <= self.updated_at {
            return self.value;
        }
        let progress = (t - self.updated_at) / self.slide;
        self.value + (self.target - self.value) * progress
    }

    pub fn target(&self) -> f64 {
        self.target
    }
}

#[derive(Debug, Clone)]
struct BusEntry {
    kind: BusKind,
    state: BusState,
}

/// Bookkeeping for the acquired buses of one performance.
///
/// Shared by the sound-producing backends: handles index into the board, and
/// the board answers "what is the level/pan right now" during note rendering.
#[derive(Debug, Clone, Default)]
pub struct BusBoard {
    buses: Vec<Option<BusEntry>>,
}

impl BusBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// The bus kind's primary parameter and its resting value.
    fn primary(kind: BusKind) -> (Param, f64) {
        match kind {
            BusKind::Level => (Param::Amp, 1.0),
            BusKind::Pan => (Param::Pan, 0.0),
        }
    }

    pub fn acquire(&mut self, kind: BusKind, initial: &ParamMap) -> BusHandle {
        let (param, resting) = Self::primary(kind);
        let state = BusState::new(
            initial.get_or(param, resting),
            initial.get_or(Param::AmpSlide, 0.0),
        );
        let handle = BusHandle(self.buses.len() as u32);
        self.buses.push(Some(BusEntry { kind, state }));
        handle
    }

    pub fn update(
        &mut self,
        handle: BusHandle,
        params: &ParamMap,
        now: f64,
    ) -> Result<(), BackendError> {
        let entry = self
            .buses
            .get_mut(handle.0 as usize)
            .and_then(Option::as_mut)
            .ok_or(BackendError::UnknownBus(handle))?;

        let (primary, _) = Self::primary(entry.kind);
        for (param, value) in params.iter() {
            if param == primary {
                entry.state.update(now, value);
            } else if param == Param::AmpSlide {
                entry.state.set_slide(value);
            }
        }
        Ok(())
    }

    pub fn release(&mut self, handle: BusHandle) -> Result<(), BackendError> {
        let slot = self
            .buses
            .get_mut(handle.0 as usize)
            .ok_or(BackendError::UnknownBus(handle))?;
        if slot.take().is_none() {
            return Err(BackendError::UnknownBus(handle));
        }
        Ok(())
    }

    /// The value of the open bus of `kind` at time `t`, or the kind's
    /// resting value when no such bus is open.
    pub fn value(&self, kind: BusKind, t: f64) -> f64 {
        self.buses
            .iter()
            .flatten()
            .find(|entry| entry.kind == kind)
            .map(|entry| entry.state.value_at(t))
            .unwrap_or(Self::primary(kind).1)
    }
}

/// Spatialize a mono voice starting at `start` seconds into interleaved
/// stereo, applying the board's level and pan frame by frame.
pub fn spatialize(mono: &[f32], start: f64, sample_rate: u32, board: &BusBoard) -> Vec<f32> {
    let mut stereo = Vec::with_capacity(mono.len() * 2);
    for (i, &sample) in mono.iter().enumerate() {
        let t = start + i as f64 / sample_rate as f64;
        let gain = board.value(BusKind::Level, t);
        let (left, right) = pan_gains(board.value(BusKind::Pan, t));
        stereo.push((sample as f64 * gain * left) as f32);
        stereo.push((sample as f64 * gain * right) as f32);
    }
    stereo
}
