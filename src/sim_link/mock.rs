use super::{
    ActuatorSink, AutopilotLink, ParamValue, ReferenceFrame, Service, ServiceError, ServiceProbe,
    WorldLink,
};
use crate::flight_control::{ActuatorCommand, FlightMode, Pose};
use crate::sensing::{ImageEncoding, RangeScan, RawImage, SensorSynchronizer, TelemetryHub};
use async_trait::async_trait;
use chrono::Utc;
use std::{
    collections::{HashMap, VecDeque},
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// A request the control loop issued against the simulated collaborators.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum MockCall {
    SetMode(FlightMode),
    Arm(bool),
    Takeoff(f64),
    GetParam(String),
    SetParam(String, i64),
    SetEntityPose(String, Pose, ReferenceFrame),
    ResetWorld,
    Publish(ActuatorCommand),
}

/// In-process stand-in for the autopilot, the physics simulator and the actuator topic.
///
/// Every service is always available and answers immediately. A takeoff puts the
/// vehicle at the next queued altitude (or the requested one), relocation requests
/// move it instantly unless `ignore_relocation` is set.
pub(crate) struct MockSim {
    vehicle: String,
    calls: Mutex<Vec<MockCall>>,
    vehicle_pose: Mutex<Pose>,
    obstacles: Mutex<HashMap<String, Pose>>,
    takeoff_altitudes: Mutex<VecDeque<f64>>,
    scan_ranges: Mutex<Vec<f64>>,
    rejected_modes: Mutex<Vec<FlightMode>>,
    arming_rejected: Mutex<bool>,
    params: Mutex<HashMap<String, i64>>,
    list_vehicle: AtomicBool,
    ignore_relocation: AtomicBool,
}

impl MockSim {
    pub(crate) fn new(vehicle: &str) -> Self {
        Self {
            vehicle: vehicle.to_string(),
            calls: Mutex::new(Vec::new()),
            vehicle_pose: Mutex::new(Pose::default()),
            obstacles: Mutex::new(HashMap::new()),
            takeoff_altitudes: Mutex::new(VecDeque::new()),
            scan_ranges: Mutex::new(vec![f64::INFINITY; 10]),
            rejected_modes: Mutex::new(Vec::new()),
            arming_rejected: Mutex::new(false),
            params: Mutex::new(HashMap::new()),
            list_vehicle: AtomicBool::new(true),
            ignore_relocation: AtomicBool::new(false),
        }
    }

    pub(crate) fn calls(&self) -> Vec<MockCall> { self.calls.lock().unwrap().clone() }

    pub(crate) fn count(&self, pred: impl Fn(&MockCall) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| pred(c)).count()
    }

    pub(crate) fn clear_calls(&self) { self.calls.lock().unwrap().clear(); }

    pub(crate) fn place_vehicle(&self, pose: Pose) { *self.vehicle_pose.lock().unwrap() = pose; }

    pub(crate) fn vehicle_pose(&self) -> Pose { *self.vehicle_pose.lock().unwrap() }

    pub(crate) fn obstacle(&self, name: &str) -> Option<Pose> {
        self.obstacles.lock().unwrap().get(name).copied()
    }

    /// Altitudes the vehicle reaches on the next takeoffs, in order.
    pub(crate) fn queue_takeoff_altitudes(&self, alts: &[f64]) {
        self.takeoff_altitudes.lock().unwrap().extend(alts);
    }

    pub(crate) fn set_scan(&self, ranges: Vec<f64>) { *self.scan_ranges.lock().unwrap() = ranges; }

    pub(crate) fn reject_mode(&self, mode: FlightMode) { self.rejected_modes.lock().unwrap().push(mode); }
    pub(crate) fn reject_arming(&self) { *self.arming_rejected.lock().unwrap() = true; }

    pub(crate) fn set_param_value(&self, name: &str, val: i64) {
        self.params.lock().unwrap().insert(name.to_string(), val);
    }

    pub(crate) fn param_value(&self, name: &str) -> Option<i64> {
        self.params.lock().unwrap().get(name).copied()
    }

    /// Whether the vehicle shows up in entity-state snapshots.
    pub(crate) fn list_vehicle(&self, val: bool) { self.list_vehicle.store(val, Ordering::Relaxed); }

    pub(crate) fn ignore_relocation(&self, val: bool) {
        self.ignore_relocation.store(val, Ordering::Relaxed);
    }

    fn record(&self, call: MockCall) { self.calls.lock().unwrap().push(call); }

    fn entity_snapshot(&self) -> HashMap<String, Pose> {
        let mut entities = self.obstacles.lock().unwrap().clone();
        if self.list_vehicle.load(Ordering::Relaxed) {
            entities.insert(self.vehicle.clone(), self.vehicle_pose());
        }
        entities
    }

    /// Broadcasts altitude, entity states, vehicle pose and one scan/image pair every
    /// `period` until `c_tok` fires.
    pub(crate) fn spawn_feed(
        self: &Arc<Self>,
        telemetry: Arc<TelemetryHub>,
        sync: Arc<SensorSynchronizer>,
        period: Duration,
        c_tok: CancellationToken,
    ) -> JoinHandle<()> {
        let sim = Arc::clone(self);
        tokio::spawn(async move {
            let mut tick = tokio::time::interval(period);
            loop {
                tokio::select! {
                    () = c_tok.cancelled() => return,
                    _ = tick.tick() => {}
                }
                let pose = sim.vehicle_pose();
                telemetry.push_altitude(pose.position.z);
                telemetry.push_entity_states(sim.entity_snapshot());
                telemetry.push_vehicle_pose(pose);
                let stamp = Utc::now();
                let ranges = sim.scan_ranges.lock().unwrap().clone();
                sync.push_scan(RangeScan::new(stamp, ranges));
                sync.push_image(RawImage {
                    stamp,
                    width: 4,
                    height: 3,
                    encoding: ImageEncoding::Rgb8,
                    data: vec![128; 4 * 3 * 3],
                });
            }
        })
    }
}

#[async_trait]
impl ServiceProbe for MockSim {
    async fn service_ready(&self, _service: Service, _timeout: Duration) -> Result<(), ServiceError> {
        Ok(())
    }
}

#[async_trait]
impl AutopilotLink for MockSim {
    async fn set_mode(&self, mode: FlightMode) -> Result<(), ServiceError> {
        self.record(MockCall::SetMode(mode));
        if self.rejected_modes.lock().unwrap().contains(&mode) {
            return Err(ServiceError::Rejected(Service::SetMode));
        }
        Ok(())
    }

    async fn arm(&self, value: bool) -> Result<(), ServiceError> {
        self.record(MockCall::Arm(value));
        if *self.arming_rejected.lock().unwrap() {
            return Err(ServiceError::Rejected(Service::Arming));
        }
        Ok(())
    }

    async fn takeoff(&self, altitude: f64) -> Result<(), ServiceError> {
        self.record(MockCall::Takeoff(altitude));
        let reached = self.takeoff_altitudes.lock().unwrap().pop_front().unwrap_or(altitude);
        self.vehicle_pose.lock().unwrap().position.z = reached;
        Ok(())
    }

    async fn get_param(&self, name: &str) -> Result<ParamValue, ServiceError> {
        self.record(MockCall::GetParam(name.to_string()));
        Ok(ParamValue::integer(self.param_value(name).unwrap_or(0)))
    }

    async fn set_param(&self, name: &str, value: ParamValue) -> Result<(), ServiceError> {
        self.record(MockCall::SetParam(name.to_string(), value.integer));
        self.set_param_value(name, value.integer);
        Ok(())
    }
}

#[async_trait]
impl WorldLink for MockSim {
    async fn set_entity_pose(
        &self,
        name: &str,
        pose: Pose,
        frame: ReferenceFrame,
    ) -> Result<(), ServiceError> {
        self.record(MockCall::SetEntityPose(name.to_string(), pose, frame));
        if name == self.vehicle {
            if !self.ignore_relocation.load(Ordering::Relaxed) {
                self.place_vehicle(pose);
            }
        } else {
            self.obstacles.lock().unwrap().insert(name.to_string(), pose);
        }
        Ok(())
    }

    async fn reset_world(&self) -> Result<(), ServiceError> {
        self.record(MockCall::ResetWorld);
        Ok(())
    }
}

#[async_trait]
impl ActuatorSink for MockSim {
    async fn publish(&self, cmd: ActuatorCommand) -> Result<(), ServiceError> {
        self.record(MockCall::Publish(cmd));
        Ok(())
    }
}
