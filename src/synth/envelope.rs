//! Amplitude envelope — attack to a peak level, a held sustain level, and a
//! linear release tail.

use crate::score::{Param, ParamMap};

/// Envelope shaped by the attack/sustain/release parameter family.
///
/// Time runs attack → sustain → release; the attack ramps from 0 to
/// `attack_level`, the sustain phase holds `sustain_level` for `sustain`
/// seconds, and the release ramps `sustain_level` down to 0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Envelope {
    pub attack: f64,
    pub attack_level: f64,
    pub sustain: f64,
    pub sustain_level: f64,
    pub release: f64,
}

impl Envelope {
    /// Build an envelope from resolved note parameters, with the backend's
    /// defaults for anything unset.
    pub fn from_params(params: &ParamMap) -> Self {
        Self {
            attack: params.get_or(Param::Attack, 0.0),
            attack_level: params.get_or(Param::AttackLevel, 1.0),
            sustain: params.get_or(Param::Sustain, 0.0),
            sustain_level: params.get_or(Param::SustainLevel, 1.0),
            release: params.get_or(Param::Release, 1.0),
        }
    }

    /// Total sounding duration.
    pub fn duration(&self) -> f64 {
        self.attack + self.sustain + self.release
    }

    /// Amplitude at time `t` since note start.
    pub fn amplitude(&self, t: f64) -> f64 {
        if t < 0.0 {
            return 0.0;
        }

        if t < self.attack {
            return self.attack_level * t / self.attack;
        }

        let sustain_end = self.attack + self.sustain;
        if t < sustain_end {
            return self.sustain_level;
        }

        if t < sustain_end + self.release {
            let release_t = (t - sustain_end) / self.release;
            return self.sustain_level * (1.0 - release_t);
        }

        0.0
    }
}
