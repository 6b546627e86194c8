use std::sync::Mutex;
use strum_macros::Display;

/// Why an episode ended. Both reasons collapse to `done = true` for the learner.
#[derive(Debug, Clone, Copy, PartialEq, Display)]
pub enum TerminationReason {
    /// An obstacle came closer than the crash threshold.
    RangeCrash { min_range: f64 },
    /// The vehicle left the flight corridor.
    BoundaryViolation { x: f64, y: f64 },
}

/// The episode's `done` flag.
///
/// Written from the sensor and pose delivery context, read by the control loop. The
/// first reason latched wins and stays until the `EpisodeResetter` clears it at the
/// start of the next episode.
#[derive(Debug, Default)]
pub struct TerminationLatch {
    reason: Mutex<Option<TerminationReason>>,
}

impl TerminationLatch {
    pub fn new() -> Self { Self::default() }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<TerminationReason>> {
        self.reason.lock().expect("[FATAL] Mutex poisoned: Failed to acquire termination latch")
    }

    /// Latches `reason` unless the episode already ended.
    ///
    /// # Returns
    /// `true` if this call ended the episode.
    pub fn latch(&self, reason: TerminationReason) -> bool {
        let mut slot = self.lock();
        if slot.is_some() {
            return false;
        }
        *slot = Some(reason);
        true
    }

    pub fn is_done(&self) -> bool { self.lock().is_some() }

    pub fn reason(&self) -> Option<TerminationReason> { *self.lock() }

    pub(crate) fn clear(&self) { *self.lock() = None; }
}
