use super::param::ParamResponse;
use super::request_common::{HTTPRequestMethod, HTTPRequestType, NoBodyHTTPRequestType};

#[derive(Debug)]
pub(crate) struct ParamGetRequest {
    endpoint: String,
}

impl ParamGetRequest {
    pub(crate) fn new(param_id: &str) -> Self {
        Self { endpoint: format!("/mavros/param/get/{param_id}") }
    }
}

impl NoBodyHTTPRequestType for ParamGetRequest {}

impl HTTPRequestType for ParamGetRequest {
    type Response = ParamResponse;
    fn endpoint(&self) -> &str { self.endpoint.as_str() }
    fn request_method(&self) -> HTTPRequestMethod { HTTPRequestMethod::Get }
}
