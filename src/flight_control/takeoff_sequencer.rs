use super::{
    flight_command::{ActuatorCommand, FlightCommand},
    flight_mode::FlightMode,
    mode_controller::FlightModeController,
};
use crate::error::EnvError;
use crate::sensing::TelemetryHub;
use crate::sim_link::{ActuatorSink, Service, ServiceError};
use crate::timing::{pause, units};
use crate::{info, log, warn};
use std::{sync::Arc, time::Duration};
use strum_macros::Display;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// States the takeoff protocol moves through.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum TakeoffState {
    AwaitingTelemetry,
    ModeSwitching,
    Arming,
    Requesting,
    VerifyingAltitude,
    Retrying,
    Succeeded,
}

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum TakeoffFailure {
    ServiceUnavailable,
    AltitudeNotReached,
    ModeChangeRejected,
    RequestRejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TakeoffOutcome {
    Pending,
    Succeeded,
    Failed(TakeoffFailure),
}

/// Summary of a completed takeoff.
#[derive(Debug, Clone, PartialEq)]
pub struct TakeoffReport {
    pub attempts: usize,
    pub stabilize_fallbacks: usize,
    pub reached_altitude: f64,
}

/// Timing knobs of the protocol, all derived from the configured time unit.
#[derive(Debug, Clone, Copy)]
pub struct TakeoffTiming {
    pub time_unit: Duration,
    pub telemetry_wait: Duration,
    pub model_state_wait: Duration,
    /// Multiplier from entity-state height to the altitude compared against the target.
    pub altitude_scale: f64,
}

/// Runs the bounded-retry takeoff protocol.
///
/// Attempts are unbounded in count. A stabilize fallback is issued at most once per
/// [`TakeoffSequencer::STABILIZE_WINDOW`] units so that a vehicle stuck in a failed
/// guided takeoff gets returned to a known mode.
pub struct TakeoffSequencer {
    modes: Arc<FlightModeController>,
    telemetry: Arc<TelemetryHub>,
    actuator: Arc<dyn ActuatorSink>,
    vehicle: String,
    timing: TakeoffTiming,
    state: TakeoffState,
    outcome: TakeoffOutcome,
}

impl TakeoffSequencer {
    /// Fraction of the target altitude the vehicle has to exceed.
    pub const ALTITUDE_TOLERANCE: f64 = 0.9;
    /// Time units between two stabilize fallbacks.
    pub const STABILIZE_WINDOW: f64 = 15.0;

    pub fn new(
        modes: Arc<FlightModeController>,
        telemetry: Arc<TelemetryHub>,
        actuator: Arc<dyn ActuatorSink>,
        vehicle: &str,
        timing: TakeoffTiming,
    ) -> Self {
        Self {
            modes,
            telemetry,
            actuator,
            vehicle: vehicle.to_string(),
            timing,
            state: TakeoffState::AwaitingTelemetry,
            outcome: TakeoffOutcome::Pending,
        }
    }

    pub fn state(&self) -> TakeoffState { self.state }
    pub fn outcome(&self) -> TakeoffOutcome { self.outcome }

    /// Acceptance rule of the altitude verification. The boundary itself is rejected.
    pub fn altitude_reached(reached: f64, target: f64) -> bool {
        reached > target * Self::ALTITUDE_TOLERANCE
    }

    fn enter(&mut self, state: TakeoffState) {
        log!("Takeoff state: {} -> {state}", self.state);
        self.state = state;
    }

    /// Why an advisory request went wrong. A refusal is kept apart from an unreachable service.
    pub fn failure_reason(err: &ServiceError) -> TakeoffFailure {
        match err {
            ServiceError::Rejected(Service::SetMode) => TakeoffFailure::ModeChangeRejected,
            ServiceError::Rejected(_) => TakeoffFailure::RequestRejected,
            _ => TakeoffFailure::ServiceUnavailable,
        }
    }

    fn unit(&self, n: f64) -> Duration { units(self.timing.time_unit, n) }

    /// Logs a failed advisory request, remembering why the attempt went wrong.
    fn note_failure(&mut self, res: Result<(), ServiceError>, what: &str) -> Result<(), EnvError> {
        match res {
            Ok(()) => Ok(()),
            Err(ServiceError::Cancelled) => Err(EnvError::Cancelled),
            Err(e) => {
                let reason = Self::failure_reason(&e);
                warn!("{what} request failed: {e}. Proceeding.");
                self.outcome = TakeoffOutcome::Failed(reason);
                Ok(())
            }
        }
    }

    /// Takes the vehicle off to `altitude` and hands it over in altitude hold.
    ///
    /// # Arguments
    /// * `altitude` - Target altitude, also the climb wait in time units.
    /// * `c_tok` - Aborts any of the otherwise unbounded waits.
    ///
    /// # Errors
    /// Only `EnvError::Cancelled`.
    pub async fn run(
        &mut self,
        altitude: f64,
        c_tok: &CancellationToken,
    ) -> Result<TakeoffReport, EnvError> {
        self.state = TakeoffState::AwaitingTelemetry;
        self.outcome = TakeoffOutcome::Pending;
        info!("Waiting for autopilot link...");
        self.telemetry
            .await_altitude(self.timing.telemetry_wait, c_tok)
            .await
            .map_err(|_| EnvError::Cancelled)?;

        let mut attempts = 0;
        let mut stabilize_fallbacks = 0;
        let mut window_start = Instant::now();
        let reached_altitude = loop {
            if window_start.elapsed() > self.unit(Self::STABILIZE_WINDOW) {
                match self.modes.set_mode(FlightMode::Stabilize).await {
                    Ok(()) => {
                        stabilize_fallbacks += 1;
                        window_start = Instant::now();
                    }
                    Err(ServiceError::Cancelled) => return Err(EnvError::Cancelled),
                    Err(e @ ServiceError::Rejected(_)) => {
                        warn!("STABILIZE fallback refused: {e}");
                        stabilize_fallbacks += 1;
                        window_start = Instant::now();
                    }
                    Err(e) => warn!("STABILIZE fallback failed: {e}"),
                }
            }
            attempts += 1;
            info!("Taking off, attempt {attempts}...");

            self.enter(TakeoffState::ModeSwitching);
            let res = self.modes.set_mode(FlightMode::Guided).await;
            self.note_failure(res, "GUIDED")?;
            pause(self.unit(1.0), c_tok).await?;

            self.enter(TakeoffState::Arming);
            let res = self.modes.arm(true).await;
            self.note_failure(res, "ARM")?;
            pause(self.unit(1.0), c_tok).await?;

            self.enter(TakeoffState::Requesting);
            let res = self.modes.takeoff(altitude).await;
            self.note_failure(res, "TAKEOFF")?;
            pause(self.unit(altitude), c_tok).await?;

            self.enter(TakeoffState::VerifyingAltitude);
            let snapshot = self
                .telemetry
                .await_entity_snapshot(self.timing.model_state_wait, c_tok)
                .await
                .map_err(|_| EnvError::Cancelled)?;
            let reached = snapshot
                .get(&self.vehicle)
                .map_or(-1.0, |pose| pose.position.z * self.timing.altitude_scale);
            if Self::altitude_reached(reached, altitude) {
                info!("Takeoff successful, reached {reached:.2} meters");
                break reached;
            }
            self.enter(TakeoffState::Retrying);
            self.outcome = TakeoffOutcome::Failed(TakeoffFailure::AltitudeNotReached);
            warn!("Takeoff failed at {reached:.2} meters, retrying...");
        };

        EnvError::advisory(self.modes.repair_gcs_owner().await, "GCS ownership repair")?;
        pause(self.unit(1.0), c_tok).await?;

        let hold = FlightCommand::neutral_hold();
        info!("Sending RC THROTTLE {}", hold.throttle());
        EnvError::advisory(self.actuator.publish(ActuatorCommand::RcOverride(hold)).await, "RC hold")?;
        pause(self.unit(1.0), c_tok).await?;

        EnvError::advisory(self.modes.set_mode(FlightMode::AltHold).await, "ALT_HOLD")?;
        self.enter(TakeoffState::Succeeded);
        self.outcome = TakeoffOutcome::Succeeded;
        Ok(TakeoffReport { attempts, stabilize_fallbacks, reached_altitude })
    }
}
