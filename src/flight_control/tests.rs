use super::{
    ActuatorCommand, FlightCommand, FlightMode, FlightModeController, Pose, RC_NEUTRAL,
    RC_NO_OVERRIDE, TakeoffFailure, TakeoffOutcome, TakeoffSequencer, TakeoffState, TakeoffTiming,
};
use crate::episode::TerminationLatch;
use crate::error::EnvError;
use crate::sensing::{SensorSynchronizer, TelemetryHub};
use crate::sim_link::mock::{MockCall, MockSim};
use crate::sim_link::{Service, ServiceError};
use chrono::TimeDelta;
use std::{sync::Arc, time::Duration};
use strum::IntoEnumIterator;
use tokio_util::sync::CancellationToken;

#[test]
fn test_altitude_acceptance_boundary() {
    for target in [0.5, 1.0, 2.0, 3.3, 10.0] {
        let boundary = target * TakeoffSequencer::ALTITUDE_TOLERANCE;
        assert!(!TakeoffSequencer::altitude_reached(boundary, target));
        assert!(!TakeoffSequencer::altitude_reached(boundary - 0.01, target));
        assert!(TakeoffSequencer::altitude_reached(boundary + 0.01, target));
        assert!(TakeoffSequencer::altitude_reached(target, target));
    }
    assert!(!TakeoffSequencer::altitude_reached(-1.0, 2.0));
}

#[test]
fn test_fresh_command_has_no_stale_channels() {
    let hold = FlightCommand::neutral_hold();
    assert_eq!(hold.channels(), &[0, 0, RC_NEUTRAL, 0, 0, 0, 0, 0]);
    let turn = FlightCommand::new().with_pitch(1450).with_yaw(1800).with_throttle(RC_NEUTRAL);
    let forward = FlightCommand::new().with_pitch(1450).with_throttle(RC_NEUTRAL);
    assert_eq!(forward.yaw(), RC_NO_OVERRIDE);
    assert_eq!(turn.yaw(), 1800);
    assert_eq!(turn.channels()[0], RC_NO_OVERRIDE);
    assert!(turn.channels()[4..].iter().all(|c| *c == RC_NO_OVERRIDE));
}

#[test]
fn test_flight_mode_names() {
    for mode in FlightMode::iter() {
        let name: &'static str = mode.into();
        assert_eq!(FlightMode::from(name), mode);
    }
    assert_eq!(<&'static str>::from(FlightMode::AltHold), "ALT_HOLD");
    assert_eq!(FlightMode::from("unknown"), FlightMode::Stabilize);
}

#[tokio::test(start_paused = true)]
async fn test_takeoff_call_order() {
    let (sim, mut seq, c_tok) = rig();
    let report = seq.run(2.0, &c_tok).await.unwrap();
    assert_eq!(report.attempts, 1);
    assert_eq!(report.stabilize_fallbacks, 0);
    assert!((report.reached_altitude - 4.0).abs() < 1e-9);
    assert_eq!(seq.state(), TakeoffState::Succeeded);
    assert_eq!(seq.outcome(), TakeoffOutcome::Succeeded);
    assert_eq!(sim.calls(), vec![
        MockCall::SetMode(FlightMode::Guided),
        MockCall::Arm(true),
        MockCall::Takeoff(2.0),
        MockCall::GetParam(FlightModeController::GCS_PARAM.to_string()),
        MockCall::SetParam(FlightModeController::GCS_PARAM.to_string(), 1),
        MockCall::Publish(ActuatorCommand::RcOverride(FlightCommand::neutral_hold())),
        MockCall::SetMode(FlightMode::AltHold),
    ]);
    c_tok.cancel();
}

#[tokio::test(start_paused = true)]
async fn test_stabilize_fallback_once_per_window() {
    let (sim, mut seq, c_tok) = rig();
    // each failed attempt takes four units, so attempts five and nine open a new window
    sim.queue_takeoff_altitudes(&[0.5; 8]);
    let report = seq.run(2.0, &c_tok).await.unwrap();
    assert_eq!(report.attempts, 9);
    assert_eq!(report.stabilize_fallbacks, 2);
    assert_eq!(sim.count(|c| *c == MockCall::SetMode(FlightMode::Stabilize)), 2);
    assert_eq!(sim.count(|c| matches!(c, MockCall::Takeoff(_))), 9);
    c_tok.cancel();
}

#[tokio::test(start_paused = true)]
async fn test_refused_stabilize_still_restarts_window() {
    let (sim, mut seq, c_tok) = rig();
    sim.reject_mode(FlightMode::Stabilize);
    sim.queue_takeoff_altitudes(&[0.5; 8]);
    let report = seq.run(2.0, &c_tok).await.unwrap();
    assert_eq!(report.attempts, 9);
    assert_eq!(report.stabilize_fallbacks, 2);
    assert_eq!(sim.count(|c| *c == MockCall::SetMode(FlightMode::Stabilize)), 2);
    c_tok.cancel();
}

#[tokio::test(start_paused = true)]
async fn test_reported_height_is_scaled() {
    let (sim, mut seq, c_tok) = rig();
    // 0.95 entity height reads as 1.9, above 90% of the 2.0 target
    sim.queue_takeoff_altitudes(&[0.95]);
    let report = seq.run(2.0, &c_tok).await.unwrap();
    assert_eq!(report.attempts, 1);
    assert!((report.reached_altitude - 1.9).abs() < 1e-9);
    c_tok.cancel();
}

#[test]
fn test_failure_reasons() {
    let reason = TakeoffSequencer::failure_reason;
    assert_eq!(reason(&ServiceError::Rejected(Service::SetMode)), TakeoffFailure::ModeChangeRejected);
    assert_eq!(reason(&ServiceError::Rejected(Service::Arming)), TakeoffFailure::RequestRejected);
    assert_eq!(reason(&ServiceError::Rejected(Service::Takeoff)), TakeoffFailure::RequestRejected);
    assert_eq!(reason(&ServiceError::Unavailable(Service::Arming)), TakeoffFailure::ServiceUnavailable);
    assert_eq!(reason(&ServiceError::Transport("bad json".into())), TakeoffFailure::ServiceUnavailable);
}

#[tokio::test(start_paused = true)]
async fn test_refused_arming_proceeds_to_takeoff() {
    let (sim, mut seq, c_tok) = rig();
    sim.reject_arming();
    let report = seq.run(2.0, &c_tok).await.unwrap();
    assert_eq!(report.attempts, 1);
    assert_eq!(sim.count(|c| *c == MockCall::Takeoff(2.0)), 1);
    assert_eq!(seq.outcome(), TakeoffOutcome::Succeeded);
    c_tok.cancel();
}

#[tokio::test(start_paused = true)]
async fn test_gcs_owner_only_repaired_when_wrong() {
    let (sim, mut seq, c_tok) = rig();
    sim.set_param_value(FlightModeController::GCS_PARAM, FlightModeController::GCS_OWNER_ID);
    seq.run(2.0, &c_tok).await.unwrap();
    assert_eq!(sim.count(|c| matches!(c, MockCall::SetParam(..))), 0);
    assert_eq!(sim.count(|c| matches!(c, MockCall::GetParam(_))), 1);
    c_tok.cancel();
}

#[tokio::test(start_paused = true)]
async fn test_rejected_guided_mode_proceeds() {
    let (sim, mut seq, c_tok) = rig();
    sim.reject_mode(FlightMode::Guided);
    sim.reject_mode(FlightMode::AltHold);
    let report = seq.run(2.0, &c_tok).await.unwrap();
    assert_eq!(report.attempts, 1);
    assert_eq!(sim.count(|c| *c == MockCall::Takeoff(2.0)), 1);
    assert_eq!(seq.outcome(), TakeoffOutcome::Succeeded);
    c_tok.cancel();
}

#[tokio::test(start_paused = true)]
async fn test_missing_vehicle_never_counts_as_reached() {
    let (sim, mut seq, c_tok) = rig();
    sim.list_vehicle(false);
    let res = tokio::time::timeout(Duration::from_secs(30), seq.run(2.0, &c_tok)).await;
    assert!(res.is_err());
    assert_eq!(seq.outcome(), TakeoffOutcome::Failed(TakeoffFailure::AltitudeNotReached));
    assert!(sim.count(|c| matches!(c, MockCall::Takeoff(_))) >= 2);
    c_tok.cancel();
}

#[tokio::test(start_paused = true)]
async fn test_takeoff_cancelled_without_telemetry() {
    let sim = Arc::new(MockSim::new("erlecopter"));
    let c_tok = CancellationToken::new();
    let hub = Arc::new(TelemetryHub::new(None, Arc::new(TerminationLatch::new())));
    let modes = Arc::new(FlightModeController::new(sim.clone(), Duration::from_secs(5), c_tok.clone()));
    let mut seq = TakeoffSequencer::new(modes, hub, sim.clone(), "erlecopter", timing());
    let cancel = async {
        tokio::time::sleep(Duration::from_secs(60)).await;
        c_tok.cancel();
    };
    let (res, ()) = tokio::join!(seq.run(2.0, &c_tok), cancel);
    assert!(matches!(res, Err(EnvError::Cancelled)));
    assert!(sim.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_rtl_altitude_repair_is_idempotent() {
    let sim = Arc::new(MockSim::new("erlecopter"));
    let modes = FlightModeController::new(sim.clone(), Duration::from_secs(5), CancellationToken::new());
    sim.set_param_value(FlightModeController::RTL_ALT_PARAM, 15);
    assert!(modes.repair_rtl_altitude().await.unwrap());
    assert_eq!(sim.param_value(FlightModeController::RTL_ALT_PARAM), Some(FlightModeController::RTL_ALT));
    assert!(!modes.repair_rtl_altitude().await.unwrap());
    assert_eq!(sim.count(|c| matches!(c, MockCall::SetParam(..))), 1);
}

#[test]
fn test_pose_convergence_ignores_height_sign() {
    let target = Pose::at(0.0, 0.0, 2.0);
    assert!(Pose::at(0.005, -0.004, -2.003).converged_to(&target, 1e-2));
    assert!(!Pose::at(0.02, 0.0, 2.0).converged_to(&target, 1e-2));
    assert!(!Pose::at(0.0, 0.0, 1.5).converged_to(&target, 1e-2));
}

fn timing() -> TakeoffTiming {
    TakeoffTiming {
        time_unit: Duration::from_secs(1),
        telemetry_wait: Duration::from_secs(5),
        model_state_wait: Duration::from_secs(10),
        altitude_scale: 2.0,
    }
}

fn rig() -> (Arc<MockSim>, TakeoffSequencer, CancellationToken) {
    let sim = Arc::new(MockSim::new("erlecopter"));
    let latch = Arc::new(TerminationLatch::new());
    let hub = Arc::new(TelemetryHub::new(None, Arc::clone(&latch)));
    let sync = Arc::new(SensorSynchronizer::new(TimeDelta::milliseconds(50), None, latch));
    let c_tok = CancellationToken::new();
    sim.spawn_feed(Arc::clone(&hub), sync, Duration::from_millis(50), c_tok.clone());
    let modes = Arc::new(FlightModeController::new(sim.clone(), Duration::from_secs(5), c_tok.clone()));
    let seq = TakeoffSequencer::new(modes, hub, sim.clone(), "erlecopter", timing());
    (sim, seq, c_tok)
}
