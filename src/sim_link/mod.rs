//! Narrow interfaces to the collaborators outside this crate: the autopilot's command
//! services, the simulator's world-state services and the actuator topic. The episode
//! logic only ever talks to these traits; [`http_bridge::BridgeClient`] implements
//! them over the simulator's HTTP bridge.

pub(crate) mod http_bridge;
#[cfg(test)]
pub(crate) mod mock;
pub(crate) mod topic_feed;

use crate::event;
use crate::flight_control::{ActuatorCommand, FlightMode, Pose};
use async_trait::async_trait;
use std::time::Duration;
use strum_macros::{Display, EnumIter};
use tokio_util::sync::CancellationToken;

/// Request/response services offered by the collaborators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum Service {
    SetMode,
    Arming,
    Takeoff,
    ParamGet,
    ParamSet,
    SetEntityState,
    ResetWorld,
}

impl Service {
    /// The middleware path of the service, as exposed by the bridge.
    pub fn path(self) -> &'static str {
        match self {
            Service::SetMode => "/mavros/set_mode",
            Service::Arming => "/mavros/cmd/arming",
            Service::Takeoff => "/mavros/cmd/takeoff",
            Service::ParamGet => "/mavros/param/get",
            Service::ParamSet => "/mavros/param/set",
            Service::SetEntityState => "/gazebo/set_model_state",
            Service::ResetWorld => "/gazebo/reset_world",
        }
    }
}

#[derive(Debug, Display)]
pub enum ServiceError {
    /// The service did not come up within the per-attempt wait.
    Unavailable(Service),
    /// The service answered but refused the request.
    Rejected(Service),
    /// The bridge returned something that could not be interpreted.
    Transport(String),
    /// The wait was aborted through the `CancellationToken`.
    Cancelled,
}

impl std::error::Error for ServiceError {}

/// Autopilot parameter value, carrying both representations like the autopilot does.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct ParamValue {
    pub integer: i64,
    pub real: f64,
}

impl ParamValue {
    pub const fn integer(val: i64) -> Self { Self { integer: val, real: 0.0 } }
}

/// Frame an entity pose request is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceFrame {
    World,
    /// Keep whatever frame the entity was spawned in.
    Inherit,
}

impl From<ReferenceFrame> for &'static str {
    fn from(value: ReferenceFrame) -> Self {
        match value {
            ReferenceFrame::World => "world",
            ReferenceFrame::Inherit => "",
        }
    }
}

/// Anything that can tell whether one of its services is currently reachable.
#[async_trait]
pub trait ServiceProbe: Send + Sync {
    /// Waits up to `timeout` for `service` to become available.
    async fn service_ready(&self, service: Service, timeout: Duration) -> Result<(), ServiceError>;
}

/// Command services of the flight-control firmware.
#[async_trait]
pub trait AutopilotLink: ServiceProbe {
    async fn set_mode(&self, mode: FlightMode) -> Result<(), ServiceError>;
    async fn arm(&self, value: bool) -> Result<(), ServiceError>;
    async fn takeoff(&self, altitude: f64) -> Result<(), ServiceError>;
    async fn get_param(&self, name: &str) -> Result<ParamValue, ServiceError>;
    async fn set_param(&self, name: &str, value: ParamValue) -> Result<(), ServiceError>;
}

/// World-state services of the physics simulator.
#[async_trait]
pub trait WorldLink: ServiceProbe {
    async fn set_entity_pose(
        &self,
        name: &str,
        pose: Pose,
        frame: ReferenceFrame,
    ) -> Result<(), ServiceError>;
    async fn reset_world(&self) -> Result<(), ServiceError>;
}

/// The outgoing actuator topic.
#[async_trait]
pub trait ActuatorSink: Send + Sync {
    async fn publish(&self, cmd: ActuatorCommand) -> Result<(), ServiceError>;
}

/// Blocks until `service` is available, retrying the bounded per-attempt wait forever.
///
/// # Arguments
/// * `probe` - The collaborator offering the service.
/// * `service` - The service to wait for.
/// * `per_attempt` - How long a single availability check may block.
/// * `c_tok` - Aborts the otherwise unbounded loop.
///
/// # Errors
/// Only `ServiceError::Cancelled`; every other failure is retried.
pub async fn wait_for_service<P: ServiceProbe + ?Sized>(
    probe: &P,
    service: Service,
    per_attempt: Duration,
    c_tok: &CancellationToken,
) -> Result<(), ServiceError> {
    loop {
        tokio::select! {
            () = c_tok.cancelled() => return Err(ServiceError::Cancelled),
            res = probe.service_ready(service, per_attempt) => match res {
                Ok(()) => return Ok(()),
                Err(e) => event!("Waiting for {} ({service}): {e}", service.path()),
            }
        }
    }
}
