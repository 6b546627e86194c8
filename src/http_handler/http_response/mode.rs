use super::response_common::SerdeJSONBodyHTTPResponseType;

/// Response of the mode switch service.
#[derive(serde::Deserialize, Debug)]
pub(crate) struct ModeResponse {
    /// Whether the autopilot accepted the mode change.
    mode_sent: bool,
}

impl SerdeJSONBodyHTTPResponseType for ModeResponse {}

impl ModeResponse {
    pub(crate) fn mode_sent(&self) -> bool { self.mode_sent }
}
