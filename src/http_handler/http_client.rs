use std::time::Duration;

/// Request timeout of every service call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);
/// Connect timeout of the long-lived topic stream, which has no total timeout.
const STREAM_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// A thin wrapper around `reqwest::Client` with a preconfigured base URL.
///
/// Two clients are kept: one with a fixed total timeout for request/response
/// services, and one for the server-sent-event topic stream that stays open for
/// the whole run.
#[derive(Debug)]
pub(crate) struct HTTPClient {
    client: reqwest::Client,
    stream_client: reqwest::Client,
    /// Base URL of the bridge, prepended to all endpoint paths.
    base_url: String,
}

impl HTTPClient {
    /// Constructs a new `HTTPClient` for the bridge at `base_url`.
    ///
    /// # Arguments
    /// * `base_url` – The root URL for all requests (e.g. `"http://localhost:8000"`).
    ///
    /// # Errors
    /// Returns the `reqwest::Error` if the TLS backend or resolver cannot be set up.
    pub(crate) fn new(base_url: &str) -> Result<HTTPClient, reqwest::Error> {
        Ok(HTTPClient {
            client: reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?,
            stream_client: reqwest::Client::builder().connect_timeout(STREAM_CONNECT_TIMEOUT).build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub(crate) fn client(&self) -> &reqwest::Client { &self.client }
    pub(crate) fn stream_client(&self) -> &reqwest::Client { &self.stream_client }
    /// Returns the base URL that the client was initialized with.
    pub(crate) fn url(&self) -> &str { self.base_url.as_str() }
}
