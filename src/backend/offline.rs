//! Offline backend — performs the score into an in-memory stereo buffer.
//!
//! Waits advance a sample-time cursor instead of sleeping, so an offline
//! render of a performance takes no wall-clock time. Notes are mixed
//! additively at the cursor; release tails overlap the notes that follow,
//! exactly as they do live. The rendered buffer is inspected, not stored:
//! persisting audio is out of scope for the piece.

use crate::score::{BusKind, ParamMap, Timbre};
use crate::synth::render_voice;

use super::bus::{spatialize, BusBoard};
use super::{AudioBackend, BackendError, BusHandle};

/// Renders a performance offline at a fixed sample rate.
#[derive(Debug)]
pub struct OfflineBackend {
    sample_rate: u32,
    volume: f64,
    timbre: Timbre,
    cursor: f64,
    board: BusBoard,
    master: Vec<f32>,
}

impl OfflineBackend {
    pub fn new(sample_rate: u32, volume: f64) -> Self {
        Self {
            sample_rate,
            volume,
            timbre: Timbre::Fm,
            cursor: 0.0,
            board: BusBoard::new(),
            master: Vec::new(),
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Length of the rendered output in seconds, tails included.
    pub fn duration(&self) -> f64 {
        let rendered = self.master.len() as f64 / 2.0 / self.sample_rate as f64;
        rendered.max(self.cursor)
    }

    /// The interleaved stereo master buffer rendered so far.
    pub fn samples(&self) -> &[f32] {
        &self.master
    }

    /// Peak absolute sample value of the render, master volume applied.
    pub fn peak(&self) -> f32 {
        self.master
            .iter()
            .fold(0.0f32, |acc, &s| acc.max((s * self.volume as f32).abs()))
    }

    fn mix(&mut self, stereo: &[f32]) {
        let start = (self.cursor * self.sample_rate as f64).round() as usize * 2;
        let end = start + stereo.len();
        if self.master.len() < end {
            self.master.resize(end, 0.0);
        }
        for (slot, &sample) in self.master[start..end].iter_mut().zip(stereo) {
            *slot += sample;
        }
    }
}

impl AudioBackend for OfflineBackend {
    fn select_timbre(&mut self, timbre: Timbre) {
        self.timbre = timbre;
    }

    fn play(&mut self, pitch: u32, params: &ParamMap) -> Result<(), BackendError> {
        let mono = render_voice(self.timbre, pitch, params, self.sample_rate);
        let stereo = spatialize(&mono, self.cursor, self.sample_rate, &self.board);
        self.mix(&stereo);
        Ok(())
    }

    fn acquire_bus(
        &mut self,
        kind: BusKind,
        initial: &ParamMap,
    ) -> Result<BusHandle, BackendError> {
        Ok(self.board.acquire(kind, initial))
    }

    fn update_bus(&mut self, bus: BusHandle, params: &ParamMap) -> Result<(), BackendError> {
        self.board.update(bus, params, self.cursor)
    }

    fn release_bus(&mut self, bus: BusHandle) -> Result<(), BackendError> {
        self.board.release(bus)
    }

    fn wait(&mut self, seconds: f64) {
        self.cursor += seconds.max(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::score::Param;
    use assert_approx_eq::assert_approx_eq;

    const SAMPLE_RATE: u32 = 22050;

    fn note_params() -> ParamMap {
        ParamMap::from([(Param::Amp, 0.6), (Param::Release, 0.1)])
    }

    #[test]
    fn wait_advances_the_cursor_without_samples() {
        let mut backend = OfflineBackend::new(SAMPLE_RATE, 1.0);
        backend.wait(1.5);
        assert_approx_eq!(backend.duration(), 1.5);
        assert!(backend.samples().is_empty());
    }

    #[test]
    fn play_mixes_at_the_cursor() {
        let mut backend = OfflineBackend::new(SAMPLE_RATE, 1.0);
        backend.wait(0.5);
        backend.play(67, &note_params()).unwrap();

        let samples = backend.samples();
        let offset = (0.5 * SAMPLE_RATE as f64) as usize * 2;
        assert!(samples[..offset].iter().all(|&s| s == 0.0));
        assert!(samples[offset..].iter().any(|&s| s.abs() > 0.01));
    }

    #[test]
    fn overlapping_notes_accumulate() {
        let mut solo = OfflineBackend::new(SAMPLE_RATE, 1.0);
        solo.play(67, &note_params()).unwrap();

        let mut duo = OfflineBackend::new(SAMPLE_RATE, 1.0);
        duo.play(67, &note_params()).unwrap();
        duo.play(67, &note_params()).unwrap();

        let energy = |backend: &OfflineBackend| -> f64 {
            backend
                .samples()
                .iter()
                .map(|&s| (s as f64) * (s as f64))
                .sum()
        };
        assert!(energy(&duo) > energy(&solo) * 3.0);
    }

    #[test]
    fn level_bus_scales_playback() {
        let mut loud = OfflineBackend::new(SAMPLE_RATE, 1.0);
        let bus = loud
            .acquire_bus(BusKind::Level, &ParamMap::from([(Param::Amp, 1.0)]))
            .unwrap();
        loud.play(67, &note_params()).unwrap();
        loud.release_bus(bus).unwrap();

        let mut quiet = OfflineBackend::new(SAMPLE_RATE, 1.0);
        let bus = quiet
            .acquire_bus(BusKind::Level, &ParamMap::from([(Param::Amp, 0.5)]))
            .unwrap();
        quiet.play(67, &note_params()).unwrap();
        quiet.release_bus(bus).unwrap();

        let ratio = loud.peak() / quiet.peak();
        assert_approx_eq!(ratio as f64, 2.0, 0.05);
    }

    #[test]
    fn pan_bus_moves_the_image() {
        let mut backend = OfflineBackend::new(SAMPLE_RATE, 1.0);
        let bus = backend
            .acquire_bus(BusKind::Pan, &ParamMap::from([(Param::Pan, -1.0)]))
            .unwrap();
        backend.play(67, &note_params()).unwrap();
        backend.release_bus(bus).unwrap();

        let samples = backend.samples();
        let left_energy: f64 = samples.iter().step_by(2).map(|&s| (s as f64).powi(2)).sum();
        let right_energy: f64 = samples
            .iter()
            .skip(1)
            .step_by(2)
            .map(|&s| (s as f64).powi(2))
            .sum();
        assert!(left_energy > 0.01);
        assert!(right_energy < 1e-9);
    }

    #[test]
    fn timbre_selection_changes_the_sound() {
        let mut fm = OfflineBackend::new(SAMPLE_RATE, 1.0);
        fm.select_timbre(Timbre::Fm);
        fm.play(67, &note_params()).unwrap();

        let mut saw = OfflineBackend::new(SAMPLE_RATE, 1.0);
        saw.select_timbre(Timbre::Saw);
        saw.play(67, &note_params()).unwrap();

        assert!(fm
            .samples()
            .iter()
            .zip(saw.samples())
            .any(|(a, b)| (a - b).abs() > 0.01));
    }

    #[test]
    fn peak_reflects_master_volume() {
        let mut full = OfflineBackend::new(SAMPLE_RATE, 1.0);
        full.play(67, &note_params()).unwrap();

        let mut halved = OfflineBackend::new(SAMPLE_RATE, 0.5);
        halved.play(67, &note_params()).unwrap();

        assert_approx_eq!((full.peak() / halved.peak()) as f64, 2.0, 0.01);
    }
}
