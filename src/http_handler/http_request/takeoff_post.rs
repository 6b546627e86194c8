use super::request_common::{HTTPRequestMethod, HTTPRequestType, JSONBodyHTTPRequestType};
use super::service_call::ServiceCallResponse;

/// Request type for the autopilot's takeoff command.
///
/// The autopilot climbs straight up from wherever it is, so everything but the
/// altitude is sent as zero.
#[derive(serde::Serialize, Debug)]
pub(crate) struct TakeoffRequest {
    pub(crate) min_pitch: f64,
    pub(crate) yaw: f64,
    pub(crate) latitude: f64,
    pub(crate) longitude: f64,
    /// Target height above the home position in meters.
    pub(crate) altitude: f64,
}

impl TakeoffRequest {
    pub(crate) fn vertical(altitude: f64) -> Self {
        Self { min_pitch: 0.0, yaw: 0.0, latitude: 0.0, longitude: 0.0, altitude }
    }
}

impl JSONBodyHTTPRequestType for TakeoffRequest {
    type Body = TakeoffRequest;
    fn body(&self) -> &Self::Body { self }
}

impl HTTPRequestType for TakeoffRequest {
    type Response = ServiceCallResponse;
    fn endpoint(&self) -> &'static str { "/mavros/cmd/takeoff" }
    fn request_method(&self) -> HTTPRequestMethod { HTTPRequestMethod::Post }
}
