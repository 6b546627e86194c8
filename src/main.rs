#![allow(dead_code, clippy::similar_names)]
#![warn(clippy::shadow_reuse, clippy::shadow_same, clippy::builtin_type_shadow)]
mod config;
mod episode;
mod error;
mod flight_control;
mod http_handler;
mod logger;
mod sensing;
mod sim_link;
mod timing;

use crate::config::EnvConfig;
use crate::episode::{NavEnv, SimLinks, TerminationLatch, sensing_for};
use crate::error::EnvError;
use crate::http_handler::http_client::HTTPClient;
use crate::sim_link::{
    ActuatorSink, AutopilotLink, Service, ServiceProbe, WorldLink, http_bridge::BridgeClient,
    topic_feed::TopicFeed,
};
use std::{env, sync::Arc};
use strum::IntoEnumIterator;
use tokio_util::sync::CancellationToken;

const DEFAULT_EPISODES: usize = 3;
/// Hard cap on the ticks of a single smoke-test episode.
const MAX_TICKS: usize = 500;

#[tokio::main(flavor = "multi_thread", worker_threads = 4)]
async fn main() {
    let config = EnvConfig::from_env();
    let episodes = env::var("NAV_EPISODES").ok().and_then(|v| v.parse().ok()).unwrap_or(DEFAULT_EPISODES);
    let seed = env::var("NAV_SEED").ok().and_then(|v| v.parse::<u64>().ok());
    info!("Starting {} backend against {}", config.backend, config.bridge_url);

    let c_tok = CancellationToken::new();
    let ctrl_c_tok = c_tok.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, shutting down.");
        }
        ctrl_c_tok.cancel();
    });

    let client = match HTTPClient::new(&config.bridge_url) {
        Ok(client) => Arc::new(client),
        Err(e) => fatal!("Could not build HTTP client: {e}"),
    };
    let latch = Arc::new(TerminationLatch::new());
    let (telemetry, sync) = sensing_for(&config, &latch);
    let feed = TopicFeed::new(Arc::clone(&client), Arc::clone(&telemetry), Arc::clone(&sync), config.units(1.0));
    let feed_handle = feed.spawn(c_tok.clone());

    let bridge = Arc::new(BridgeClient::new(client));
    for service in Service::iter() {
        match bridge.service_ready(service, config.units(config.service_wait)).await {
            Ok(()) => log!("{} is up", service.path()),
            Err(e) => warn!("{} not reachable yet: {e}", service.path()),
        }
    }
    let links = SimLinks {
        autopilot: Some(Arc::clone(&bridge) as Arc<dyn AutopilotLink>),
        world: Arc::clone(&bridge) as Arc<dyn WorldLink>,
        actuator: bridge as Arc<dyn ActuatorSink>,
    };
    let mut env = match NavEnv::new(links, telemetry, sync, latch, config, c_tok.clone()) {
        Ok(env) => env,
        Err(e) => fatal!("Could not set up environment: {e}"),
    };
    let used_seed = env.seed(seed);
    log!("Action space has {} actions, seed {used_seed:?}", env.action_space());

    match run(&mut env, episodes).await {
        Ok(()) => info!("Finished {episodes} episodes."),
        Err(EnvError::Cancelled) => warn!("Run cancelled."),
        Err(e) => error!("Run aborted: {e}"),
    }
    c_tok.cancel();
    feed_handle.await.ok();
}

/// Flies `episodes` episodes with uniformly random actions.
async fn run(env: &mut NavEnv, episodes: usize) -> Result<(), EnvError> {
    if let Some(report) = env.initialize().await? {
        info!(
            "Initial takeoff reached {:.2} after {} attempts",
            report.reached_altitude, report.attempts
        );
    }
    for _ in 0..episodes {
        env.reset().await?;
        let mut total = 0.0;
        let mut ticks = 0;
        loop {
            let action = env.sample_action();
            let res = env.step(action).await?;
            total += res.reward;
            ticks += 1;
            if res.done || ticks >= MAX_TICKS {
                let reason = res.info.termination.map_or_else(|| "tick limit".to_string(), |r| r.to_string());
                info!("Episode {} ended after {ticks} ticks ({reason}), return {total:.2}", env.episode());
                break;
            }
        }
    }
    Ok(())
}
