//! A backend that records every call instead of producing sound.
//!
//! Used by the renderer's tests and by `--dry-run`. Waits take no wall-clock
//! time; the accumulated total is available for duration estimates.

use crate::score::{BusKind, ParamMap, Timbre};

use super::{AudioBackend, BackendError, BusHandle};

/// One recorded backend call.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    SelectTimbre(Timbre),
    Play { pitch: u32, params: ParamMap },
    AcquireBus { handle: BusHandle, kind: BusKind, initial: ParamMap },
    UpdateBus { handle: BusHandle, params: ParamMap },
    ReleaseBus(BusHandle),
    Wait(f64),
}

/// Records calls in dispatch order.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    calls: Vec<BackendCall>,
    next_bus: u32,
    open_buses: Vec<BusHandle>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> &[BackendCall] {
        &self.calls
    }

    /// Bus handles acquired but not yet released.
    pub fn open_buses(&self) -> &[BusHandle] {
        &self.open_buses
    }

    /// Number of play calls recorded.
    pub fn plays(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, BackendCall::Play { .. }))
            .count()
    }

    /// Number of bus updates recorded.
    pub fn bus_updates(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, BackendCall::UpdateBus { .. }))
            .count()
    }

    /// Sum of all recorded waits, in seconds.
    pub fn total_wait(&self) -> f64 {
        self.calls
            .iter()
            .filter_map(|c| match c {
                BackendCall::Wait(seconds) => Some(*seconds),
                _ => None,
            })
            .sum()
    }
}

impl AudioBackend for RecordingBackend {
    fn select_timbre(&mut self, timbre: Timbre) {
        self.calls.push(BackendCall::SelectTimbre(timbre));
    }

    fn play(&mut self, pitch: u32, params: &ParamMap) -> Result<(), BackendError> {
        self.calls.push(BackendCall::Play {
            pitch,
            params: params.clone(),
        });
        Ok(())
    }

    fn acquire_bus(
        &mut self,
        kind: BusKind,
        initial: &ParamMap,
    ) -> Result<BusHandle, BackendError> {
        let handle = BusHandle(self.next_bus);
        self.next_bus += 1;
        self.open_buses.push(handle);
        self.calls.push(BackendCall::AcquireBus {
            handle,
            kind,
            initial: initial.clone(),
        });
        Ok(handle)
    }

    fn update_bus(&mut self, bus: BusHandle, params: &ParamMap) -> Result<(), BackendError> {
        if !self.open_buses.contains(&bus) {
            return Err(BackendError::UnknownBus(bus));
        }
        self.calls.push(BackendCall::UpdateBus {
            handle: bus,
            params: params.clone(),
        });
        Ok(())
    }

    fn release_bus(&mut self, bus: BusHandle) -> Result<(), BackendError> {
        let index = self
            .open_buses
            .iter()
            .position(|&h| h == bus)
            .ok_or(BackendError::UnknownBus(bus))?;
        self.open_buses.remove(index);
        self.calls.push(BackendCall::ReleaseBus(bus));
        Ok(())
    }

    fn wait(&mut self, seconds: f64) {
        self.calls.push(BackendCall::Wait(seconds));
    }
}
