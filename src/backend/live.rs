//! Live backend — a cpal output stream fed through a lock-free command
//! queue.
//!
//! The main thread renders each note into a finished stereo buffer and ships
//! it to the audio thread, which mixes every in-flight voice additively in
//! the callback. Waits are real sleeps, so the performance unfolds in wall
//! time while earlier notes are still ringing out.

use std::thread;
use std::time::{Duration, Instant};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use ringbuf::{
    traits::{Consumer, Producer, Split},
    HeapCons, HeapProd, HeapRb,
};

use crate::score::{BusKind, ParamMap, Timbre};
use crate::synth::render_voice;

use super::bus::{spatialize, BusBoard};
use super::{AudioBackend, BackendError, BusHandle};

/// Ring buffer capacity (number of commands).
const RING_BUFFER_CAPACITY: usize = 1024;

/// Hard ceiling applied after mixing.
const CEILING: f32 = 0.95;

/// Commands sent from the performing thread to the audio thread.
#[derive(Debug)]
enum LiveCommand {
    /// A fully rendered stereo voice to start mixing now.
    Voice(Vec<f32>),
    /// Set master volume (0.0 to 1.0).
    SetVolume(f32),
    /// Drop all in-flight voices.
    Stop,
}

/// One voice currently being mixed by the audio thread.
struct ActiveVoice {
    samples: Vec<f32>,
    pos: usize,
}

/// Mixer state owned by the audio thread. Accessed only from the callback.
struct LiveMixer {
    consumer: HeapCons<LiveCommand>,
    voices: Vec<ActiveVoice>,
    volume: f32,
}

impl LiveMixer {
    fn new(consumer: HeapCons<LiveCommand>) -> Self {
        Self {
            consumer,
            voices: Vec::new(),
            volume: 1.0,
        }
    }

    /// Fill `output` with the sum of all in-flight voices.
    fn process(&mut self, output: &mut [f32]) {
        while let Some(cmd) = self.consumer.try_pop() {
            match cmd {
                LiveCommand::Voice(samples) => {
                    self.voices.push(ActiveVoice { samples, pos: 0 });
                }
                LiveCommand::SetVolume(v) => {
                    self.volume = v.clamp(0.0, 1.0);
                }
                LiveCommand::Stop => {
                    self.voices.clear();
                }
            }
        }

        output.fill(0.0);
        for voice in &mut self.voices {
            let remaining = voice.samples.len() - voice.pos;
            let n = output.len().min(remaining);
            for (slot, &sample) in output[..n]
                .iter_mut()
                .zip(&voice.samples[voice.pos..voice.pos + n])
            {
                *slot += sample;
            }
            voice.pos += n;
        }
        self.voices.retain(|v| v.pos < v.samples.len());

        for sample in output.iter_mut() {
            *sample = (*sample * self.volume).clamp(-CEILING, CEILING);
        }
    }
}

/// Plays the performance through the default output device.
pub struct LiveBackend {
    _stream: cpal::Stream,
    producer: HeapProd<LiveCommand>,
    sample_rate: u32,
    timbre: Timbre,
    started: Instant,
    board: BusBoard,
}

impl LiveBackend {
    /// Create and start the backend on the default output device, in stereo.
    pub fn new(volume: f64) -> Result<Self, BackendError> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(BackendError::NoOutputDevice)?;

        let config = device
            .default_output_config()
            .map_err(|e| BackendError::DeviceConfig(e.to_string()))?;
        let sample_rate = config.sample_rate().0;

        let rb = HeapRb::<LiveCommand>::new(RING_BUFFER_CAPACITY);
        let (mut producer, consumer) = rb.split();
        let mut mixer = LiveMixer::new(consumer);

        let stream_config = cpal::StreamConfig {
            channels: 2,
            sample_rate: cpal::SampleRate(sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };

        let err_fn = |err: cpal::StreamError| {
            eprintln!("audio stream error: {err}");
        };

        let stream = device
            .build_output_stream(
                &stream_config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    mixer.process(data);
                },
                err_fn,
                None,
            )
            .map_err(|e| BackendError::StreamBuild(e.to_string()))?;

        stream
            .play()
            .map_err(|e| BackendError::StreamPlay(e.to_string()))?;

        let _ = producer.try_push(LiveCommand::SetVolume(volume as f32));

        Ok(Self {
            _stream: stream,
            producer,
            sample_rate,
            timbre: Timbre::Fm,
            started: Instant::now(),
            board: BusBoard::new(),
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Seconds since the stream started — the backend's performance clock.
    fn now(&self) -> f64 {
        self.started.elapsed().as_secs_f64()
    }

    /// Drop all in-flight voices.
    pub fn stop(&mut self) -> Result<(), BackendError> {
        self.producer
            .try_push(LiveCommand::Stop)
            .map_err(|_| BackendError::BufferFull)
    }
}

impl AudioBackend for LiveBackend {
    fn select_timbre(&mut self, timbre: Timbre) {
        self.timbre = timbre;
    }

    fn play(&mut self, pitch: u32, params: &ParamMap) -> Result<(), BackendError> {
        let now = self.now();
        let mono = render_voice(self.timbre, pitch, params, self.sample_rate);
        let stereo = spatialize(&mono, now, self.sample_rate, &self.board);
        self.producer
            .try_push(LiveCommand::Voice(stereo))
            .map_err(|_| BackendError::BufferFull)
    }

    fn acquire_bus(
        &mut self,
        kind: BusKind,
        initial: &ParamMap,
    ) -> Result<BusHandle, BackendError> {
        Ok(self.board.acquire(kind, initial))
    }

    fn update_bus(&mut self, bus: BusHandle, params: &ParamMap) -> Result<(), BackendError> {
        let now = self.now();
        self.board.update(bus, params, now)
    }

    fn release_bus(&mut self, bus: BusHandle) -> Result<(), BackendError> {
        self.board.release(bus)
    }

    fn wait(&mut self, seconds: f64) {
        if seconds > 0.0 {
            thread::sleep(Duration::from_secs_f64(seconds));
        }
    }
}
