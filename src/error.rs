use crate::sim_link::ServiceError;
use strum_macros::Display;

/// Errors surfaced to the driver of the environment.
///
/// Collaborator outages and telemetry timeouts never show up here: they are retried
/// inside the blocking loops. Only an external abort, a misuse of the action space or
/// an explicitly bounded reset loop giving up end a call with an error.
#[derive(Debug, Display)]
pub enum EnvError {
    /// The root `CancellationToken` fired while the call was blocked.
    Cancelled,
    /// The action index lies outside the backend's action space.
    InvalidAction(usize),
    /// The vehicle did not converge to the reset pose within the configured attempts.
    ResetDiverged(usize),
    /// The backend needs an autopilot link but none was provided.
    MissingAutopilot,
}

impl std::error::Error for EnvError {}

impl EnvError {
    /// Keeps going on advisory service failures, only a cancellation aborts the caller.
    ///
    /// # Arguments
    /// * `res` - The outcome of a single collaborator request.
    /// * `what` - Human-readable name of the request, used for the log line.
    ///
    /// # Returns
    /// `Ok(Some(value))` on success, `Ok(None)` if the request failed and was logged,
    /// `Err(EnvError::Cancelled)` if the request was aborted.
    pub fn advisory<T>(res: Result<T, ServiceError>, what: &str) -> Result<Option<T>, EnvError> {
        match res {
            Ok(val) => Ok(Some(val)),
            Err(ServiceError::Cancelled) => Err(EnvError::Cancelled),
            Err(e) => {
                crate::warn!("{what} failed: {e}. Proceeding.");
                Ok(None)
            }
        }
    }
}
