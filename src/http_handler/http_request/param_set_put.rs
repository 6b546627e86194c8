use super::param::ParamResponse;
use super::request_common::{HTTPRequestMethod, HTTPRequestType, JSONBodyHTTPRequestType};
use crate::sim_link::ParamValue;

#[derive(serde::Serialize, Debug)]
pub(crate) struct ParamSetRequest {
    pub(crate) param_id: String,
    pub(crate) value: ParamValue,
}

impl JSONBodyHTTPRequestType for ParamSetRequest {
    type Body = ParamSetRequest;
    fn body(&self) -> &Self::Body { self }
}

impl HTTPRequestType for ParamSetRequest {
    type Response = ParamResponse;
    fn endpoint(&self) -> &'static str { "/mavros/param/set" }
    fn request_method(&self) -> HTTPRequestMethod { HTTPRequestMethod::Put }
}
