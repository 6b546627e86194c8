use crate::flight_control::Pose;
use crate::http_handler::http_client::HTTPClient;
use crate::sensing::{ImageDecodeError, ImageEncoding, RangeScan, RawImage, SensorSynchronizer, TelemetryHub};
use crate::{error, event, info, warn};
use chrono::{DateTime, Utc};
use futures::StreamExt;
use reqwest_eventsource::{Event, EventSource};
use std::{sync::Arc, time::Duration};
use strum_macros::Display;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// A single range reading as it travels over JSON, which has no infinities.
#[derive(serde::Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
enum WireRange {
    Number(f64),
    Text(String),
    /// An invalid reading.
    Null,
}

impl From<WireRange> for f64 {
    fn from(value: WireRange) -> Self {
        match value {
            WireRange::Number(v) => v,
            WireRange::Text(s) => match s.to_lowercase().as_str() {
                "inf" | "+inf" | "infinity" => f64::INFINITY,
                "-inf" | "-infinity" => f64::NEG_INFINITY,
                _ => f64::NAN,
            },
            WireRange::Null => f64::NAN,
        }
    }
}

#[derive(serde::Deserialize)]
struct AltitudeMsg {
    data: f64,
}

#[derive(serde::Deserialize)]
struct ModelStatesMsg {
    name: Vec<String>,
    pose: Vec<Pose>,
}

#[derive(serde::Deserialize)]
struct PoseMsg {
    pose: Pose,
}

#[derive(serde::Deserialize)]
struct ScanMsg {
    stamp: DateTime<Utc>,
    ranges: Vec<WireRange>,
}

#[derive(serde::Deserialize)]
struct ImageMsg {
    stamp: DateTime<Utc>,
    width: u32,
    height: u32,
    encoding: String,
    data: Vec<u8>,
}

#[derive(Debug, Display)]
pub enum FeedError {
    Json(serde_json::Error),
    Image(ImageDecodeError),
    /// `model_states` with different numbers of names and poses.
    LengthMismatch,
}

impl std::error::Error for FeedError {}

impl From<serde_json::Error> for FeedError {
    fn from(value: serde_json::Error) -> Self { FeedError::Json(value) }
}

impl From<ImageDecodeError> for FeedError {
    fn from(value: ImageDecodeError) -> Self { FeedError::Image(value) }
}

/// Subscribes to the bridge's server-sent topic stream and forwards every message to
/// the telemetry hub or the sensor synchronizer.
pub struct TopicFeed {
    client: Arc<HTTPClient>,
    telemetry: Arc<TelemetryHub>,
    sync: Arc<SensorSynchronizer>,
    backoff: Duration,
}

impl TopicFeed {
    pub(crate) fn new(
        client: Arc<HTTPClient>,
        telemetry: Arc<TelemetryHub>,
        sync: Arc<SensorSynchronizer>,
        backoff: Duration,
    ) -> Self {
        Self { client, telemetry, sync, backoff }
    }

    pub fn spawn(self, c_tok: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move { self.run(c_tok).await })
    }

    /// Consumes the stream until `c_tok` fires, reconnecting after `backoff` whenever
    /// it ends or fails.
    pub async fn run(&self, c_tok: CancellationToken) {
        let url = format!("{}/topics/stream", self.client.url());
        loop {
            match EventSource::new(self.client.stream_client().get(&url)) {
                Ok(mut source) => loop {
                    tokio::select! {
                        () = c_tok.cancelled() => {
                            source.close();
                            return;
                        }
                        next = source.next() => match next {
                            Some(Ok(Event::Open)) => info!("Topic stream connected"),
                            Some(Ok(Event::Message(msg))) => {
                                if let Err(e) = self.dispatch(&msg.event, &msg.data) {
                                    warn!("Skipping malformed {} message: {e:?}", msg.event);
                                }
                            }
                            Some(Err(e)) => {
                                warn!("Topic stream interrupted: {e}");
                                source.close();
                                break;
                            }
                            None => break,
                        }
                    }
                },
                Err(e) => error!("Cannot open topic stream at {url}: {e}"),
            }
            tokio::select! {
                () = c_tok.cancelled() => return,
                () = tokio::time::sleep(self.backoff) => {}
            }
        }
    }

    /// Decodes one topic message and hands it on.
    ///
    /// # Errors
    /// `FeedError` if the payload does not match the topic's message type. Unknown
    /// topics are ignored.
    pub fn dispatch(&self, topic: &str, payload: &str) -> Result<(), FeedError> {
        match topic {
            "rel_alt" => {
                let msg: AltitudeMsg = serde_json::from_str(payload)?;
                self.telemetry.push_altitude(msg.data);
            }
            "model_states" => {
                let msg: ModelStatesMsg = serde_json::from_str(payload)?;
                if msg.name.len() != msg.pose.len() {
                    return Err(FeedError::LengthMismatch);
                }
                self.telemetry.push_entity_states(msg.name.into_iter().zip(msg.pose));
            }
            "pose" => {
                let msg: PoseMsg = serde_json::from_str(payload)?;
                self.telemetry.push_vehicle_pose(msg.pose);
            }
            "scan" => {
                let msg: ScanMsg = serde_json::from_str(payload)?;
                let ranges = msg.ranges.into_iter().map(f64::from).collect();
                self.sync.push_scan(RangeScan::new(msg.stamp, ranges));
            }
            "image" => {
                let msg: ImageMsg = serde_json::from_str(payload)?;
                let encoding = ImageEncoding::try_from(msg.encoding.as_str())?;
                self.sync.push_image(RawImage {
                    stamp: msg.stamp,
                    width: msg.width,
                    height: msg.height,
                    encoding,
                    data: msg.data,
                });
            }
            other => event!("Ignoring topic {other}"),
        }
        Ok(())
    }
}
