use super::response_common::SerdeJSONBodyHTTPResponseType;
use crate::sim_link::ParamValue;

/// Response of both parameter services, carrying the value now stored.
#[derive(serde::Deserialize, Debug)]
pub(crate) struct ParamResponse {
    success: bool,
    value: ParamValue,
}

impl SerdeJSONBodyHTTPResponseType for ParamResponse {}

impl ParamResponse {
    pub(crate) fn success(&self) -> bool { self.success }
    pub(crate) fn value(&self) -> ParamValue { self.value }
}
