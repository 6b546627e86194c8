use crate::error::EnvError;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Scales the abstract time unit of the control loop.
///
/// # Arguments
/// * `unit` - The configured length of one time unit.
/// * `n` - The number of units, may be fractional (e.g. a takeoff altitude).
pub fn units(unit: Duration, n: f64) -> Duration { unit.mul_f64(n.max(0.0)) }

/// Sleeps for `dur` unless the token fires first.
///
/// # Errors
/// Returns `EnvError::Cancelled` if `c_tok` was cancelled before the delay elapsed.
pub async fn pause(dur: Duration, c_tok: &CancellationToken) -> Result<(), EnvError> {
    tokio::select! {
        () = c_tok.cancelled() => Err(EnvError::Cancelled),
        () = tokio::time::sleep(dur) => Ok(()),
    }
}
