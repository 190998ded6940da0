//! At-most-one-in-flight recompute discipline.

use shoal_core::{CancelToken, Error, Result};
use std::thread::{self, JoinHandle};

struct InFlight<T> {
    cancel: CancelToken,
    handle: JoinHandle<Result<T>>,
}

/// Owns the cancellable background recomputation discipline.
///
/// At most one computation is logically in flight. Triggering a new one
/// interrupts the prior worker and joins it before the new worker starts,
/// so two computations never race to write a result; a superseded result is
/// discarded, never applied. Cancellation is expected and silent; any other
/// worker failure propagates and leaves the last applied state untouched.
pub struct RecomputeCoordinator<T> {
    in_flight: Option<InFlight<T>>,
    latest: Option<T>,
}

impl<T: Send + 'static> RecomputeCoordinator<T> {
    pub fn new() -> Self {
        Self {
            in_flight: None,
            latest: None,
        }
    }

    /// Starts `job` on a fresh worker thread, interrupting and joining any
    /// computation still in flight first. The job receives a cancellation
    /// token it must poll between coarse-grained steps; the data it closes
    /// over is the snapshot handed off here; the worker never observes
    /// later caller mutation.
    pub fn trigger<F>(&mut self, job: F)
    where
        F: FnOnce(&CancelToken) -> Result<T> + Send + 'static,
    {
        self.discard_in_flight();

        let cancel = CancelToken::new();
        let worker_cancel = cancel.clone();
        let handle = thread::spawn(move || job(&worker_cancel));
        self.in_flight = Some(InFlight { cancel, handle });
    }

    /// Interrupts the in-flight computation, if any, without starting a new
    /// one. Blocks until the worker has observably stopped.
    pub fn interrupt(&mut self) {
        self.discard_in_flight();
    }

    /// Waits for the in-flight computation and applies its result.
    ///
    /// `Ok` becomes the new [`RecomputeCoordinator::latest`] state.
    /// Cancellation is swallowed: the previous state stays as it was. Any
    /// other error (a configuration error raised late, or a data
    /// inconsistency defect) propagates, also leaving the state untouched:
    /// a partial layout is never applied.
    pub fn finish(&mut self) -> Result<Option<&T>> {
        if let Some(flight) = self.in_flight.take() {
            match flight.handle.join() {
                Ok(Ok(value)) => self.latest = Some(value),
                Ok(Err(err)) if err.is_cancelled() => {}
                Ok(Err(err)) => return Err(err),
                Err(_) => return Err(Error::WorkerPanicked),
            }
        }
        Ok(self.latest.as_ref())
    }

    pub fn is_running(&self) -> bool {
        self.in_flight
            .as_ref()
            .is_some_and(|flight| !flight.handle.is_finished())
    }

    /// The most recently applied (non-superseded, non-cancelled) result.
    pub fn latest(&self) -> Option<&T> {
        self.latest.as_ref()
    }

    fn discard_in_flight(&mut self) {
        let Some(flight) = self.in_flight.take() else {
            return;
        };
        flight.cancel.cancel();
        match flight.handle.join() {
            Ok(Ok(_)) => {
                tracing::debug!("superseded layout computation finished; result discarded");
            }
            Ok(Err(err)) if err.is_cancelled() => {}
            Ok(Err(err)) => {
                tracing::warn!(error = %err, "superseded layout computation failed");
            }
            Err(_) => {
                tracing::warn!("superseded layout worker panicked");
            }
        }
    }
}

impl<T: Send + 'static> Default for RecomputeCoordinator<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for RecomputeCoordinator<T> {
    fn drop(&mut self) {
        if let Some(flight) = self.in_flight.take() {
            flight.cancel.cancel();
            let _ = flight.handle.join();
        }
    }
}
