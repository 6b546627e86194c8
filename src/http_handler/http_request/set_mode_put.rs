use super::mode::ModeResponse;
use super::request_common::{HTTPRequestMethod, HTTPRequestType, JSONBodyHTTPRequestType};

/// Request type for the autopilot's mode switch service.
#[derive(serde::Serialize, Debug)]
pub(crate) struct SetModeRequest {
    /// Always 0, the autopilot only looks at the custom mode.
    pub(crate) base_mode: u8,
    /// The desired `FlightMode` encoded as a `str`.
    pub(crate) custom_mode: &'static str,
}

impl JSONBodyHTTPRequestType for SetModeRequest {
    type Body = SetModeRequest;
    fn body(&self) -> &Self::Body { self }
}

impl HTTPRequestType for SetModeRequest {
    type Response = ModeResponse;
    fn endpoint(&self) -> &'static str { "/mavros/set_mode" }
    fn request_method(&self) -> HTTPRequestMethod { HTTPRequestMethod::Put }
}
