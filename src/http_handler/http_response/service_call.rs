use super::response_common::SerdeJSONBodyHTTPResponseType;

/// Response of autopilot command services (arming, takeoff).
#[derive(serde::Deserialize, Debug)]
pub(crate) struct ServiceCallResponse {
    success: bool,
    /// The autopilot's command result code, 0 on acceptance.
    #[serde(default)]
    result: u8,
}

impl SerdeJSONBodyHTTPResponseType for ServiceCallResponse {}

impl ServiceCallResponse {
    pub(crate) fn success(&self) -> bool { self.success }
    pub(crate) fn result(&self) -> u8 { self.result }
}
