use super::ack::AckResponse;
use super::request_common::{HTTPRequestMethod, HTTPRequestType, JSONBodyHTTPRequestType};
use crate::flight_control::{FlightCommand, RC_CHANNELS};

/// Publishes one RC override frame on the autopilot's override topic.
#[derive(serde::Serialize, Debug)]
pub(crate) struct RcOverrideRequest {
    pub(crate) channels: [u16; RC_CHANNELS],
}

impl From<FlightCommand> for RcOverrideRequest {
    fn from(value: FlightCommand) -> Self { Self { channels: *value.channels() } }
}

impl JSONBodyHTTPRequestType for RcOverrideRequest {
    type Body = RcOverrideRequest;
    fn body(&self) -> &Self::Body { self }
}

impl HTTPRequestType for RcOverrideRequest {
    type Response = AckResponse;
    fn endpoint(&self) -> &'static str { "/mavros/rc/override" }
    fn request_method(&self) -> HTTPRequestMethod { HTTPRequestMethod::Put }
}
