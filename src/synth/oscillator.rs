//! Oscillator primitives — waveform generation for the two timbres.

use std::f64::consts::PI;

/// Plain sawtooth at the given phase. `phase` is in cycles; values outside
/// [0, 1) wrap.
pub fn saw(phase: f64) -> f64 {
    2.0 * (phase - phase.floor()) - 1.0
}

/// Two-operator FM pair: a sine carrier phase-modulated by a sine modulator.
///
/// Both phases are in cycles. `depth` is the modulation index; 0 collapses
/// to a plain sine.
pub fn fm(carrier_phase: f64, modulator_phase: f64, depth: f64) -> f64 {
    (carrier_phase * 2.0 * PI + depth * (modulator_phase * 2.0 * PI).sin()).sin()
}

/// Convert a pitch number to frequency in Hz.
///
/// Standard tuning: pitch 69 = 440 Hz, twelve steps per octave.
pub fn pitch_to_freq(pitch: u32) -> f64 {
    440.0 * 2.0f64.powf((pitch as f64 - 69.0) / 12.0)
}
