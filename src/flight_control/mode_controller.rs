use super::flight_mode::FlightMode;
use crate::info;
use crate::sim_link::{AutopilotLink, ParamValue, Service, ServiceError, wait_for_service};
use std::{sync::Arc, time::Duration};
use tokio_util::sync::CancellationToken;

/// Thin wrapper around the autopilot's command services.
///
/// Every request first blocks until its service is available and is then issued
/// exactly once. Failures are handed back to the caller, retry policy lives in the
/// `TakeoffSequencer`.
pub struct FlightModeController {
    link: Arc<dyn AutopilotLink>,
    service_wait: Duration,
    c_tok: CancellationToken,
}

impl FlightModeController {
    /// Parameter holding the system id of the ground-control station allowed to command.
    pub const GCS_PARAM: &'static str = "SYSID_MYGCS";
    /// System id the bridge uses when talking to the autopilot.
    pub const GCS_OWNER_ID: i64 = 1;
    /// Parameter holding the return-to-launch altitude.
    pub const RTL_ALT_PARAM: &'static str = "RTL_ALT";
    /// Return-to-launch altitude kept low so a failsafe stays inside the obstacle field.
    pub const RTL_ALT: i64 = 2;

    pub fn new(link: Arc<dyn AutopilotLink>, service_wait: Duration, c_tok: CancellationToken) -> Self {
        Self { link, service_wait, c_tok }
    }

    async fn ready(&self, service: Service) -> Result<(), ServiceError> {
        wait_for_service(&*self.link, service, self.service_wait, &self.c_tok).await
    }

    pub async fn set_mode(&self, mode: FlightMode) -> Result<(), ServiceError> {
        self.ready(Service::SetMode).await?;
        info!("Changing mode to {}", <&'static str>::from(mode));
        self.link.set_mode(mode).await
    }

    pub async fn arm(&self, value: bool) -> Result<(), ServiceError> {
        self.ready(Service::Arming).await?;
        info!("{} throttle", if value { "ARMing" } else { "DISARMing" });
        self.link.arm(value).await
    }

    pub async fn takeoff(&self, altitude: f64) -> Result<(), ServiceError> {
        self.ready(Service::Takeoff).await?;
        info!("TAKEOFF to {altitude} meters");
        self.link.takeoff(altitude).await
    }

    pub async fn get_param(&self, name: &str) -> Result<ParamValue, ServiceError> {
        self.ready(Service::ParamGet).await?;
        self.link.get_param(name).await
    }

    pub async fn set_param(&self, name: &str, value: ParamValue) -> Result<(), ServiceError> {
        self.ready(Service::ParamSet).await?;
        self.link.set_param(name, value).await
    }

    /// Read-modify-write of an integer parameter: only writes if the value differs.
    ///
    /// # Returns
    /// `Ok(true)` if the parameter had to be changed, `Ok(false)` if it already matched.
    ///
    /// # Errors
    /// Any `ServiceError` of the read or the write.
    pub async fn repair_param(&self, name: &str, expected: i64) -> Result<bool, ServiceError> {
        let current = self.get_param(name).await?;
        if current.integer == expected {
            return Ok(false);
        }
        self.set_param(name, ParamValue::integer(expected)).await?;
        info!("Changed {name} from {} to {expected}", current.integer);
        Ok(true)
    }

    /// Makes sure the bridge owns the vehicle as its ground-control station.
    pub async fn repair_gcs_owner(&self) -> Result<bool, ServiceError> {
        self.repair_param(Self::GCS_PARAM, Self::GCS_OWNER_ID).await
    }

    /// Lowers the return-to-launch altitude.
    pub async fn repair_rtl_altitude(&self) -> Result<bool, ServiceError> {
        self.repair_param(Self::RTL_ALT_PARAM, Self::RTL_ALT).await
    }
}
