//! Audio backend seam — the primitives the renderer depends on.
//!
//! The backend is an injected capability: the renderer drives whichever
//! implementation it is handed. [`RecordingBackend`] records calls for
//! tests and dry runs, [`OfflineBackend`] performs into an in-memory buffer,
//! and [`LiveBackend`] plays through the default audio device.

pub mod bus;
pub mod live;
pub mod offline;
pub mod recording;

pub use live::LiveBackend;
pub use offline::OfflineBackend;
pub use recording::{BackendCall, RecordingBackend};

use std::fmt;

use crate::score::{BusKind, ParamMap, Timbre};

/// An acquired effect bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BusHandle(pub u32);

/// Backend errors. Any dispatch failure is fatal to the performance.
#[derive(Debug)]
pub enum BackendError {
    /// No audio output device found.
    NoOutputDevice,
    /// Failed to query device configuration.
    DeviceConfig(String),
    /// Failed to build the audio stream.
    StreamBuild(String),
    /// Failed to start the audio stream.
    StreamPlay(String),
    /// Command ring buffer is full — the audio thread is not draining.
    BufferFull,
    /// A bus handle that was never acquired, or already released.
    UnknownBus(BusHandle),
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendError::NoOutputDevice => write!(f, "no audio output device found"),
            BackendError::DeviceConfig(e) => write!(f, "device config error: {e}"),
            BackendError::StreamBuild(e) => write!(f, "stream build error: {e}"),
            BackendError::StreamPlay(e) => write!(f, "stream play error: {e}"),
            BackendError::BufferFull => write!(f, "audio command ring buffer is full"),
            BackendError::UnknownBus(handle) => write!(f, "unknown effect bus {}", handle.0),
        }
    }
}

impl std::error::Error for BackendError {}

/// The synthesis primitives a performance needs.
pub trait AudioBackend {
    /// Set the timbre used by subsequent play calls.
    fn select_timbre(&mut self, timbre: Timbre);

    /// Trigger one note with fully resolved parameters.
    fn play(&mut self, pitch: u32, params: &ParamMap) -> Result<(), BackendError>;

    /// Acquire a persistent effect bus for the performance's lifetime.
    fn acquire_bus(&mut self, kind: BusKind, initial: &ParamMap)
        -> Result<BusHandle, BackendError>;

    /// Push new control values to a running bus.
    fn update_bus(&mut self, bus: BusHandle, params: &ParamMap) -> Result<(), BackendError>;

    /// Release a bus acquired by [`AudioBackend::acquire_bus`].
    fn release_bus(&mut self, bus: BusHandle) -> Result<(), BackendError>;

    /// Block for the given duration.
    fn wait(&mut self, seconds: f64);
}
