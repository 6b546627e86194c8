use super::response_common::SerdeJSONBodyHTTPResponseType;

#[derive(serde::Deserialize, Debug)]
pub(crate) struct ServiceStatusResponse {
    available: bool,
}

impl SerdeJSONBodyHTTPResponseType for ServiceStatusResponse {}

impl ServiceStatusResponse {
    pub(crate) fn available(&self) -> bool { self.available }
}
