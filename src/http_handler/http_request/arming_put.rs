use super::request_common::{HTTPRequestMethod, HTTPRequestType, JSONBodyHTTPRequestType};
use super::service_call::ServiceCallResponse;

#[derive(serde::Serialize, Debug)]
pub(crate) struct ArmingRequest {
    pub(crate) value: bool,
}

impl JSONBodyHTTPRequestType for ArmingRequest {
    type Body = ArmingRequest;
    fn body(&self) -> &Self::Body { self }
}

impl HTTPRequestType for ArmingRequest {
    type Response = ServiceCallResponse;
    fn endpoint(&self) -> &'static str { "/mavros/cmd/arming" }
    fn request_method(&self) -> HTTPRequestMethod { HTTPRequestMethod::Put }
}
