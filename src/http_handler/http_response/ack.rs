use super::response_common::{HTTPResponseType, ResponseError};

/// Response of topic publishes and services that only answer with a status code.
#[derive(Debug)]
pub(crate) struct AckResponse {}

impl HTTPResponseType for AckResponse {
    type ParsedResponseType = ();

    async fn read_response(
        response: reqwest::Response,
    ) -> Result<Self::ParsedResponseType, ResponseError> {
        Self::unwrap_return_code(response).await.map(|_| ())
    }
}
