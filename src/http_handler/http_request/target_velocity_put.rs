use super::ack::AckResponse;
use super::request_common::{HTTPRequestMethod, HTTPRequestType, JSONBodyHTTPRequestType};
use crate::flight_control::VelocityCommand;

/// Publishes a twist setpoint to the kinematic vehicle.
#[derive(Debug)]
pub(crate) struct TargetVelocityRequest {
    pub(crate) twist: VelocityCommand,
}

impl JSONBodyHTTPRequestType for TargetVelocityRequest {
    type Body = VelocityCommand;
    fn body(&self) -> &Self::Body { &self.twist }
}

impl HTTPRequestType for TargetVelocityRequest {
    type Response = AckResponse;
    fn endpoint(&self) -> &'static str { "/dji_sim/target_velocity" }
    fn request_method(&self) -> HTTPRequestMethod { HTTPRequestMethod::Put }
}
