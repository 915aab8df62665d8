use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use acbus::domain::Position;
use acbus::feed::{FeedClient, FeedConfig, FeedSource, MockFeedClient};
use acbus::host::{HostReply, HostRequest};
use acbus::location::{FileLocation, GeoLocator, LocationProvider, LocatorConfig, StaticLocation};
use acbus::pipeline::{Pipeline, PipelineConfig};

/// Read and parse an environment variable, warning about unparsable values.
fn env_var<T: FromStr>(name: &str) -> Option<T> {
    let raw = std::env::var(name).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(name, value = %raw, "ignoring unparsable environment variable");
            None
        }
    }
}

fn feed_source() -> Arc<dyn FeedSource> {
    if let Ok(dir) = std::env::var("ACBUS_MOCK_DIR") {
        let mock = MockFeedClient::from_dir(&dir).expect("Failed to load mock feed data");
        info!(dir = %dir, stops_with_arrivals = mock.stops_with_arrivals().len(), "using mock feed");
        return Arc::new(mock);
    }

    let mut config = FeedConfig::default();
    if let Ok(url) = std::env::var("ACBUS_FEED_URL") {
        config = config.with_base_url(url);
    }
    if let Some(secs) = env_var("ACBUS_FEED_TIMEOUT_SECS") {
        config = config.with_timeout(secs);
    }

    let client = FeedClient::new(config).expect("Failed to create feed client");
    info!(url = client.base_url(), "using live feed");
    Arc::new(client)
}

fn location_provider() -> Arc<dyn LocationProvider> {
    if let Ok(path) = std::env::var("ACBUS_LOCATION_FILE") {
        info!(path = %path, "reading position fixes from file");
        let mut provider = FileLocation::new(path);
        if let Some(secs) = env_var("ACBUS_LOCATION_FILE_MAX_AGE_SECS") {
            provider = provider.with_max_age(Duration::from_secs(secs));
        }
        return Arc::new(provider);
    }

    let longitude: Option<f64> = env_var("ACBUS_LONGITUDE");
    let latitude: Option<f64> = env_var("ACBUS_LATITUDE");
    match (longitude, latitude) {
        (Some(lon), Some(lat)) if Position::new(lon, lat).is_finite() => {
            let position = Position::new(lon, lat);
            info!(%position, "using fixed position");
            Arc::new(StaticLocation::new(position))
        }
        _ => {
            error!(
                "set ACBUS_LOCATION_FILE, or both ACBUS_LONGITUDE and ACBUS_LATITUDE to finite numbers"
            );
            std::process::exit(2);
        }
    }
}

fn emit(reply: &HostReply) {
    match serde_json::to_string(reply) {
        Ok(line) => println!("{line}"),
        Err(e) => error!(error = %e, "failed to serialize reply"),
    }
}

#[tokio::main]
async fn main() {
    // stdout carries host replies only
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut locator_config = LocatorConfig::default();
    if let Some(secs) = env_var("ACBUS_LOCATION_TIMEOUT_SECS") {
        locator_config = locator_config.with_timeout(Duration::from_secs(secs));
    }
    if let Some(secs) = env_var("ACBUS_LOCATION_MAX_AGE_SECS") {
        locator_config = locator_config.with_max_age(Duration::from_secs(secs));
    }

    let feed = feed_source();
    let locator = GeoLocator::new(location_provider(), &locator_config);
    let pipeline = Arc::new(Pipeline::new(feed, locator, PipelineConfig::default()));

    // Periodic nearest-stop updates, like the watch's own polling
    if let Some(secs) = env_var::<u64>("ACBUS_REFRESH_SECS").filter(|s| *s > 0) {
        info!(secs, "starting periodic refresh");
        let pipeline = pipeline.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(secs));
            loop {
                interval.tick().await;
                emit(&pipeline.handle(&HostRequest::nearest()).await);
            }
        });
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                error!(error = %e, "failed to read request");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let reply = match serde_json::from_str::<HostRequest>(&line) {
            Ok(request) => pipeline.handle(&request).await,
            Err(e) => {
                warn!(error = %e, "invalid request");
                HostReply::failure(format!("invalid request: {e}"))
            }
        };
        emit(&reply);
    }

    info!("input closed, shutting down");
}
