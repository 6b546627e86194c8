use super::request_common::{HTTPRequestMethod, HTTPRequestType, NoBodyHTTPRequestType};
use super::service_status::ServiceStatusResponse;

/// Asks the bridge whether a middleware service is currently advertised.
#[derive(Debug)]
pub(crate) struct ServiceStatusRequest {
    endpoint: String,
}

impl ServiceStatusRequest {
    /// # Arguments
    /// * `service_path` – Middleware path of the service, starting with `/`.
    pub(crate) fn new(service_path: &str) -> Self {
        Self { endpoint: format!("/services{service_path}") }
    }
}

impl NoBodyHTTPRequestType for ServiceStatusRequest {}

impl HTTPRequestType for ServiceStatusRequest {
    type Response = ServiceStatusResponse;
    fn endpoint(&self) -> &str { self.endpoint.as_str() }
    fn request_method(&self) -> HTTPRequestMethod { HTTPRequestMethod::Get }
}
