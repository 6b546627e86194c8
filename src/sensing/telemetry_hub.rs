use crate::episode::{TerminationLatch, TerminationReason};
use crate::flight_control::{FlightBounds, Pose, Vec3};
use crate::warn;
use std::{collections::HashMap, sync::Arc, time::Duration};
use strum_macros::Display;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Display, PartialEq, Eq)]
pub enum TelemetryError {
    Timeout,
    Cancelled,
}

impl std::error::Error for TelemetryError {}

/// Latest pushed telemetry: relative altitude, named world entities and the vehicle pose.
///
/// Entity snapshots are kept as a name-to-pose map, so lookups do not depend on the
/// order the simulator lists its entities in.
pub struct TelemetryHub {
    altitude: watch::Sender<Option<f64>>,
    entities: watch::Sender<HashMap<String, Pose>>,
    vehicle_pose: watch::Sender<Option<Pose>>,
    bounds: Option<FlightBounds>,
    latch: Arc<TerminationLatch>,
}

impl TelemetryHub {
    pub fn new(bounds: Option<FlightBounds>, latch: Arc<TerminationLatch>) -> Self {
        Self {
            altitude: watch::channel(None).0,
            entities: watch::channel(HashMap::new()).0,
            vehicle_pose: watch::channel(None).0,
            bounds,
            latch,
        }
    }

    pub fn push_altitude(&self, alt: f64) { self.altitude.send_replace(Some(alt)); }

    pub fn push_entity_states<I>(&self, states: I)
    where I: IntoIterator<Item = (String, Pose)> {
        self.entities.send_replace(states.into_iter().collect());
    }

    /// Stores the vehicle's odometry pose and latches a boundary violation if it left
    /// the flight corridor.
    pub fn push_vehicle_pose(&self, pose: Pose) {
        self.vehicle_pose.send_replace(Some(pose));
        if let Some(bounds) = &self.bounds {
            let pos = pose.position;
            if !bounds.contains(&pos) {
                let reason = TerminationReason::BoundaryViolation { x: pos.x, y: pos.y };
                if self.latch.latch(reason) {
                    warn!("Went out of range at {pos}. Ending episode.");
                }
            }
        }
    }

    pub fn vehicle_pose(&self) -> Option<Pose> { *self.vehicle_pose.borrow() }

    pub fn vehicle_position(&self) -> Option<Vec3> { self.vehicle_pose().map(|p| p.position) }

    pub fn altitude(&self) -> Option<f64> { *self.altitude.borrow() }

    /// Waits up to `timeout` for an altitude sample; returns at once if one is known.
    ///
    /// # Errors
    /// `TelemetryError::Timeout` if no sample arrived.
    pub async fn wait_altitude(&self, timeout: Duration) -> Result<f64, TelemetryError> {
        let mut rx = self.altitude.subscribe();
        let res = tokio::time::timeout(timeout, rx.wait_for(Option::is_some)).await;
        match res {
            Ok(Ok(alt)) => (*alt).ok_or(TelemetryError::Timeout),
            _ => Err(TelemetryError::Timeout),
        }
    }

    /// Waits up to `timeout` for the *next* entity snapshot.
    ///
    /// # Errors
    /// `TelemetryError::Timeout` if the simulator did not broadcast in time.
    pub async fn next_entity_snapshot(
        &self,
        timeout: Duration,
    ) -> Result<HashMap<String, Pose>, TelemetryError> {
        let mut rx = self.entities.subscribe();
        match tokio::time::timeout(timeout, rx.changed()).await {
            Ok(Ok(())) => Ok(rx.borrow_and_update().clone()),
            _ => Err(TelemetryError::Timeout),
        }
    }

    /// Retries [`Self::wait_altitude`] until a sample arrives or `c_tok` fires.
    pub async fn await_altitude(
        &self,
        per_attempt: Duration,
        c_tok: &CancellationToken,
    ) -> Result<f64, TelemetryError> {
        loop {
            tokio::select! {
                () = c_tok.cancelled() => return Err(TelemetryError::Cancelled),
                res = self.wait_altitude(per_attempt) => match res {
                    Ok(alt) => return Ok(alt),
                    Err(_) => warn!("No altitude telemetry yet, autopilot link not live."),
                }
            }
        }
    }

    /// Retries [`Self::next_entity_snapshot`] until a snapshot arrives or `c_tok` fires.
    pub async fn await_entity_snapshot(
        &self,
        per_attempt: Duration,
        c_tok: &CancellationToken,
    ) -> Result<HashMap<String, Pose>, TelemetryError> {
        loop {
            tokio::select! {
                () = c_tok.cancelled() => return Err(TelemetryError::Cancelled),
                res = self.next_entity_snapshot(per_attempt) => match res {
                    Ok(snapshot) => return Ok(snapshot),
                    Err(_) => warn!("No entity states broadcast within {per_attempt:?}."),
                }
            }
        }
    }
}
