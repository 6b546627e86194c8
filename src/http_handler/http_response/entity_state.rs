use super::response_common::SerdeJSONBodyHTTPResponseType;

#[derive(serde::Deserialize, Debug)]
pub(crate) struct SetModelStateResponse {
    success: bool,
    #[serde(default)]
    status_message: String,
}

impl SerdeJSONBodyHTTPResponseType for SetModelStateResponse {}

impl SetModelStateResponse {
    pub(crate) fn success(&self) -> bool { self.success }
    pub(crate) fn status_message(&self) -> &str { self.status_message.as_str() }
}
