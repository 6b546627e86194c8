use super::{image_frame::RawImage, range_scan::RangeScan};
use crate::episode::{TerminationLatch, TerminationReason};
use crate::{event, warn};
use chrono::{DateTime, TimeDelta, Utc};
use image::RgbImage;
use std::{
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};
use strum_macros::Display;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

/// A time-aligned pair of ranging scan and camera frame.
#[derive(Debug, Clone)]
pub struct Observation {
    scan: RangeScan,
    image: RgbImage,
    min_range: f64,
}

impl Observation {
    pub fn new(scan: RangeScan, image: RgbImage) -> Self {
        let min_range = scan.min_range();
        Self { scan, image, min_range }
    }

    pub fn scan(&self) -> &RangeScan { &self.scan }
    pub fn image(&self) -> &RgbImage { &self.image }
    pub fn min_range(&self) -> f64 { self.min_range }
    pub fn stamp(&self) -> DateTime<Utc> { self.scan.stamp() }
}

#[derive(Debug, Display, PartialEq, Eq)]
pub enum SyncError {
    Timeout,
    Cancelled,
}

impl std::error::Error for SyncError {}

/// Newest unmatched message per stream. Depth one, older messages are overwritten.
#[derive(Default)]
struct PendingPair {
    scan: Option<RangeScan>,
    image: Option<RawImage>,
}

/// Pairs the ranging and camera streams by approximate timestamp.
///
/// Pairs within `slop` of each other become an [`Observation`]; when the two pending
/// messages are further apart the older one is dropped. Only the freshest observation
/// is kept, in a capacity-one overwrite slot: the control loop marks it stale before
/// each actuation tick and then waits for the slot to be refilled.
pub struct SensorSynchronizer {
    slop: TimeDelta,
    crash_range: Option<f64>,
    latch: Arc<TerminationLatch>,
    pending: Mutex<PendingPair>,
    latest_tx: watch::Sender<Option<Arc<Observation>>>,
    latest_rx: tokio::sync::Mutex<watch::Receiver<Option<Arc<Observation>>>>,
    dropped: AtomicUsize,
}

impl SensorSynchronizer {
    /// Creates a new synchronizer.
    ///
    /// # Arguments
    /// * `slop` - Maximum stamp difference for two messages to be paired.
    /// * `crash_range` - Minimum range that latches a crash, `None` disables latching.
    /// * `latch` - The episode's termination latch.
    pub fn new(slop: TimeDelta, crash_range: Option<f64>, latch: Arc<TerminationLatch>) -> Self {
        let (latest_tx, latest_rx) = watch::channel(None);
        Self {
            slop,
            crash_range,
            latch,
            pending: Mutex::new(PendingPair::default()),
            latest_tx,
            latest_rx: tokio::sync::Mutex::new(latest_rx),
            dropped: AtomicUsize::new(0),
        }
    }

    fn lock_pending(&self) -> std::sync::MutexGuard<'_, PendingPair> {
        self.pending.lock().expect("[FATAL] Mutex poisoned: Failed to acquire pending sensor pair")
    }

    /// Number of messages discarded because they found no partner in time.
    pub fn dropped(&self) -> usize { self.dropped.load(Ordering::Relaxed) }

    pub fn push_scan(&self, scan: RangeScan) {
        let pair = {
            let mut pending = self.lock_pending();
            pending.scan = Some(scan);
            self.try_match(&mut pending)
        };
        if let Some((scan, image)) = pair {
            self.publish(scan, &image);
        }
    }

    pub fn push_image(&self, image: RawImage) {
        let pair = {
            let mut pending = self.lock_pending();
            pending.image = Some(image);
            self.try_match(&mut pending)
        };
        if let Some((scan, image)) = pair {
            self.publish(scan, &image);
        }
    }

    fn try_match(&self, pending: &mut PendingPair) -> Option<(RangeScan, RawImage)> {
        let (scan_t, img_t) = match (&pending.scan, &pending.image) {
            (Some(scan), Some(img)) => (scan.stamp(), img.stamp),
            _ => return None,
        };
        if (scan_t - img_t).abs() <= self.slop {
            return pending.scan.take().zip(pending.image.take());
        }
        // the older message can never be matched by a later arrival on the other stream
        if scan_t < img_t {
            pending.scan = None;
        } else {
            pending.image = None;
        }
        self.dropped.fetch_add(1, Ordering::Relaxed);
        event!("Dropped unmatched sensor message, stamps {scan_t} / {img_t}");
        None
    }

    fn publish(&self, scan: RangeScan, raw: &RawImage) {
        let image = match raw.decode() {
            Ok(img) => img,
            Err(e) => {
                warn!("Could not decode {} camera frame: {e}. Dropping pair.", raw.encoding);
                return;
            }
        };
        let obs = Observation::new(scan, image);
        if let Some(crash) = self.crash_range {
            if obs.min_range() < crash {
                let min_range = obs.min_range();
                if self.latch.latch(TerminationReason::RangeCrash { min_range }) {
                    warn!("Minimum range {min_range:.2} below crash threshold {crash}. Ending episode.");
                }
            }
        }
        self.latest_tx.send_replace(Some(Arc::new(obs)));
    }

    /// Minimum range of the newest observation, if any arrived yet.
    pub fn min_range(&self) -> Option<f64> {
        self.latest_tx.borrow().as_ref().map(|obs| obs.min_range())
    }

    /// Clears the "fresh data" flag so that the next wait only returns newer data.
    pub async fn mark_stale(&self) { self.latest_rx.lock().await.borrow_and_update(); }

    /// Waits up to `timeout` for an observation newer than the last one consumed.
    ///
    /// # Errors
    /// `SyncError::Timeout` if nothing new arrived in time.
    pub async fn await_next(&self, timeout: Duration) -> Result<Arc<Observation>, SyncError> {
        let mut rx = self.latest_rx.lock().await;
        loop {
            match tokio::time::timeout(timeout, rx.changed()).await {
                Ok(Ok(())) => {
                    let latest = rx.borrow_and_update().clone();
                    if let Some(obs) = latest {
                        return Ok(obs);
                    }
                }
                // the sender lives in `self`, so the channel cannot close while we wait
                Ok(Err(_)) | Err(_) => return Err(SyncError::Timeout),
            }
        }
    }

    /// Blocks until a fresh observation arrives, retrying timed-out waits forever.
    ///
    /// # Errors
    /// `SyncError::Cancelled` if `c_tok` fires first.
    pub async fn await_fresh(
        &self,
        per_attempt: Duration,
        c_tok: &CancellationToken,
    ) -> Result<Arc<Observation>, SyncError> {
        loop {
            tokio::select! {
                () = c_tok.cancelled() => return Err(SyncError::Cancelled),
                res = self.await_next(per_attempt) => match res {
                    Ok(obs) => return Ok(obs),
                    Err(_) => warn!("No synchronized sensor data for {per_attempt:?}. Still waiting."),
                }
            }
        }
    }
}
