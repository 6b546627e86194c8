use super::{ActuatorSink, AutopilotLink, ParamValue, ReferenceFrame, Service, ServiceError, ServiceProbe, WorldLink};
use crate::event;
use crate::flight_control::{ActuatorCommand, FlightMode, Pose};
use crate::http_handler::{
    common::HTTPError,
    http_client::HTTPClient,
    http_request::{
        arming_put::ArmingRequest,
        param_get::ParamGetRequest,
        param_set_put::ParamSetRequest,
        rc_override_put::RcOverrideRequest,
        request_common::{JSONBodyHTTPRequestType, NoBodyHTTPRequestType},
        reset_world_put::ResetWorldRequest,
        service_status_get::ServiceStatusRequest,
        set_mode_put::SetModeRequest,
        set_model_state_put::SetModelStateRequest,
        takeoff_post::TakeoffRequest,
        target_velocity_put::TargetVelocityRequest,
    },
};
use async_trait::async_trait;
use std::{sync::Arc, time::Duration};

/// Interval between two availability checks of the same service.
const SERVICE_POLL: Duration = Duration::from_millis(100);

/// Implements every collaborator trait on top of the simulator's HTTP bridge.
pub struct BridgeClient {
    client: Arc<HTTPClient>,
}

impl BridgeClient {
    pub(crate) fn new(client: Arc<HTTPClient>) -> Self { Self { client } }

    fn service_error(service: Service, err: &HTTPError) -> ServiceError {
        if err.is_unreachable() {
            ServiceError::Unavailable(service)
        } else {
            ServiceError::Transport(format!("{}: {err:?}", service.path()))
        }
    }

    fn accepted(service: Service, success: bool) -> Result<(), ServiceError> {
        if success { Ok(()) } else { Err(ServiceError::Rejected(service)) }
    }
}

#[async_trait]
impl ServiceProbe for BridgeClient {
    async fn service_ready(&self, service: Service, timeout: Duration) -> Result<(), ServiceError> {
        let probe = ServiceStatusRequest::new(service.path());
        let poll = async {
            loop {
                match probe.send_request(&self.client).await {
                    Ok(status) if status.available() => return,
                    Ok(_) => {}
                    Err(e) => event!("Probing {} failed: {e:?}", service.path()),
                }
                tokio::time::sleep(SERVICE_POLL).await;
            }
        };
        tokio::time::timeout(timeout, poll).await.map_err(|_| ServiceError::Unavailable(service))
    }
}

#[async_trait]
impl AutopilotLink for BridgeClient {
    async fn set_mode(&self, mode: FlightMode) -> Result<(), ServiceError> {
        let req = SetModeRequest { base_mode: 0, custom_mode: mode.into() };
        let resp = req
            .send_request(&self.client)
            .await
            .map_err(|e| Self::service_error(Service::SetMode, &e))?;
        Self::accepted(Service::SetMode, resp.mode_sent())
    }

    async fn arm(&self, value: bool) -> Result<(), ServiceError> {
        let resp = ArmingRequest { value }
            .send_request(&self.client)
            .await
            .map_err(|e| Self::service_error(Service::Arming, &e))?;
        Self::accepted(Service::Arming, resp.success())
    }

    async fn takeoff(&self, altitude: f64) -> Result<(), ServiceError> {
        let resp = TakeoffRequest::vertical(altitude)
            .send_request(&self.client)
            .await
            .map_err(|e| Self::service_error(Service::Takeoff, &e))?;
        if !resp.success() {
            event!("Takeoff refused with result code {}", resp.result());
        }
        Self::accepted(Service::Takeoff, resp.success())
    }

    async fn get_param(&self, name: &str) -> Result<ParamValue, ServiceError> {
        let resp = ParamGetRequest::new(name)
            .send_request(&self.client)
            .await
            .map_err(|e| Self::service_error(Service::ParamGet, &e))?;
        Self::accepted(Service::ParamGet, resp.success())?;
        Ok(resp.value())
    }

    async fn set_param(&self, name: &str, value: ParamValue) -> Result<(), ServiceError> {
        let req = ParamSetRequest { param_id: name.to_string(), value };
        let resp = req
            .send_request(&self.client)
            .await
            .map_err(|e| Self::service_error(Service::ParamSet, &e))?;
        Self::accepted(Service::ParamSet, resp.success())
    }
}

#[async_trait]
impl WorldLink for BridgeClient {
    async fn set_entity_pose(&self, name: &str, pose: Pose, frame: ReferenceFrame) -> Result<(), ServiceError> {
        let resp = SetModelStateRequest::at_rest(name, pose, frame.into())
            .send_request(&self.client)
            .await
            .map_err(|e| Self::service_error(Service::SetEntityState, &e))?;
        if !resp.success() {
            event!("Moving {name} refused: {}", resp.status_message());
        }
        Self::accepted(Service::SetEntityState, resp.success())
    }

    async fn reset_world(&self) -> Result<(), ServiceError> {
        ResetWorldRequest {}
            .send_request(&self.client)
            .await
            .map_err(|e| Self::service_error(Service::ResetWorld, &e))
    }
}

#[async_trait]
impl ActuatorSink for BridgeClient {
    async fn publish(&self, cmd: ActuatorCommand) -> Result<(), ServiceError> {
        let res = match cmd {
            ActuatorCommand::RcOverride(rc) => RcOverrideRequest::from(rc).send_request(&self.client).await,
            ActuatorCommand::Velocity(twist) => {
                TargetVelocityRequest { twist }.send_request(&self.client).await
            }
        };
        res.map_err(|e| ServiceError::Transport(format!("publishing {cmd}: {e:?}")))
    }
}
