use super::http_request::request_common::RequestError;
use super::http_response::response_common::ResponseError;
use strum_macros::Display;

/// Everything that can go wrong during one round trip to the bridge.
#[derive(Debug, Display)]
pub enum HTTPError {
    HTTPRequestError(RequestError),
    HTTPResponseError(ResponseError),
}

impl std::error::Error for HTTPError {}

impl From<RequestError> for HTTPError {
    fn from(value: RequestError) -> Self { HTTPError::HTTPRequestError(value) }
}

impl From<ResponseError> for HTTPError {
    fn from(value: ResponseError) -> Self { HTTPError::HTTPResponseError(value) }
}

impl HTTPError {
    /// Whether the bridge could not be reached at all, as opposed to answering badly.
    pub fn is_unreachable(&self) -> bool {
        matches!(
            self,
            HTTPError::HTTPRequestError(RequestError::NoConnection | RequestError::Timeout)
                | HTTPError::HTTPResponseError(ResponseError::NoConnection | ResponseError::Timeout)
        )
    }
}
