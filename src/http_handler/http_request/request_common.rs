use super::super::{common::HTTPError, http_client::HTTPClient};
use super::response_common::HTTPResponseType;
use strum_macros::Display;

/// HTTP verbs used by the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum HTTPRequestMethod {
    Get,
    Post,
    Put,
}

/// Common shape of every bridge request.
pub(crate) trait HTTPRequestType {
    /// Type of the expected response.
    type Response: HTTPResponseType;
    /// Path of the endpoint, relative to the bridge base URL.
    fn endpoint(&self) -> &str;
    fn request_method(&self) -> HTTPRequestMethod;
    fn header_params(&self) -> reqwest::header::HeaderMap { reqwest::header::HeaderMap::new() }

    /// Builds the request without body.
    fn get_request_base(&self, client: &HTTPClient) -> reqwest::RequestBuilder {
        let url = format!("{}{}", client.url(), self.endpoint());
        let base = match self.request_method() {
            HTTPRequestMethod::Get => client.client().get(url),
            HTTPRequestMethod::Post => client.client().post(url),
            HTTPRequestMethod::Put => client.client().put(url),
        };
        base.headers(self.header_params())
    }
}

/// Requests that carry no body.
pub(crate) trait NoBodyHTTPRequestType: HTTPRequestType {
    async fn send_request(
        &self,
        client: &HTTPClient,
    ) -> Result<<Self::Response as HTTPResponseType>::ParsedResponseType, HTTPError> {
        let response = self.get_request_base(client).send().await.map_err(RequestError::from)?;
        Ok(Self::Response::read_response(response).await?)
    }
}

/// Requests that carry a serialized JSON body.
pub(crate) trait JSONBodyHTTPRequestType: HTTPRequestType {
    /// The type of the json body.
    type Body: serde::Serialize;
    /// Returns the serializable object.
    fn body(&self) -> &Self::Body;

    async fn send_request(
        &self,
        client: &HTTPClient,
    ) -> Result<<Self::Response as HTTPResponseType>::ParsedResponseType, HTTPError> {
        let response = self
            .get_request_base(client)
            .json(self.body())
            .send()
            .await
            .map_err(RequestError::from)?;
        Ok(Self::Response::read_response(response).await?)
    }
}

#[derive(Debug, Display)]
pub enum RequestError {
    /// The bridge did not accept the connection.
    NoConnection,
    Timeout,
    /// The request could not be built or serialized.
    Malformed(String),
    Unknown(String),
}

impl std::error::Error for RequestError {}

impl From<reqwest::Error> for RequestError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_connect() {
            RequestError::NoConnection
        } else if value.is_timeout() {
            RequestError::Timeout
        } else if value.is_builder() || value.is_body() {
            RequestError::Malformed(value.to_string())
        } else {
            RequestError::Unknown(value.to_string())
        }
    }
}
