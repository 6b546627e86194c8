use super::ack::AckResponse;
use super::request_common::{HTTPRequestMethod, HTTPRequestType, NoBodyHTTPRequestType};

#[derive(Debug)]
pub(crate) struct ResetWorldRequest {}

impl NoBodyHTTPRequestType for ResetWorldRequest {}

impl HTTPRequestType for ResetWorldRequest {
    type Response = AckResponse;
    fn endpoint(&self) -> &'static str { "/gazebo/reset_world" }
    fn request_method(&self) -> HTTPRequestMethod { HTTPRequestMethod::Put }
}
