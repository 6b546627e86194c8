mod image_frame;
mod range_scan;
mod synchronizer;
mod telemetry_hub;

pub use image_frame::{ImageDecodeError, ImageEncoding, RawImage};
pub use range_scan::{DiscretizedScan, INVALID_BIN, NO_RETURN_BIN, RangeScan};
pub use synchronizer::{Observation, SensorSynchronizer, SyncError};
pub use telemetry_hub::{TelemetryError, TelemetryHub};
