//! Voice synthesis shared by the offline and live backends.
//!
//! Renders one note at a time into a mono buffer; the owning backend
//! spatializes it against its effect buses.

pub mod envelope;
pub mod oscillator;

pub use envelope::Envelope;

use crate::score::{Param, ParamMap, Timbre};

/// FM defaults when a voice doesn't set its own pair.
const DEFAULT_DIVISOR: f64 = 2.0;
const DEFAULT_DEPTH: f64 = 1.0;

/// Render a single note as a mono f32 buffer at the given sample rate.
///
/// The buffer covers the full envelope, release tail included.
pub fn render_voice(timbre: Timbre, pitch: u32, params: &ParamMap, sample_rate: u32) -> Vec<f32> {
    let freq = oscillator::pitch_to_freq(pitch);
    let env = Envelope::from_params(params);
    let amp = params.get_or(Param::Amp, 1.0);

    let mut divisor = params.get_or(Param::Divisor, DEFAULT_DIVISOR);
    if divisor.abs() < f64::EPSILON {
        divisor = 1.0;
    }
    let depth = params.get_or(Param::Depth, DEFAULT_DEPTH);

    let frames = (env.duration() * sample_rate as f64).ceil() as usize;
    let mut output = Vec::with_capacity(frames);

    for i in 0..frames {
        let t = i as f64 / sample_rate as f64;
        let value = match timbre {
            Timbre::Fm => oscillator::fm(freq * t, freq / divisor * t, depth),
            Timbre::Saw => oscillator::saw(freq * t),
        };
        output.push((value * env.amplitude(t) * amp) as f32);
    }

    output
}

/// Equal-power stereo gains for a pan position in [-1.0, 1.0].
pub fn pan_gains(pan: f64) -> (f64, f64) {
    let pan = pan.clamp(-1.0, 1.0);
    let angle = (pan + 1.0) * std::f64::consts::FRAC_PI_4;
    (angle.cos(), angle.sin())
}
