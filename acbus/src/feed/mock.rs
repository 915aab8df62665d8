//! Mock feed for development and testing without network access.
//!
//! Serves canned bodies as if they came from the live interface. Bodies are
//! expected to follow the default field lists.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::Utc;
use futures::future::BoxFuture;

use crate::domain::StopId;

use super::FeedSource;
use super::error::FeedError;
use super::fields::{ARRIVAL_FIELDS, FieldLayout, STOP_FIELDS};

/// File holding the stop-list body inside a mock data directory.
const STOPS_FILE: &str = "stops.txt";

/// Sub-directory holding one `<stop id>.txt` arrivals body per stop.
const ARRIVALS_DIR: &str = "arrivals";

/// Mock feed that serves bodies from memory.
#[derive(Clone)]
pub struct MockFeedClient {
    stops: String,
    arrivals: HashMap<StopId, String>,
    stop_layout: FieldLayout,
    arrival_layout: FieldLayout,
    requests: Arc<AtomicUsize>,
}

impl MockFeedClient {
    /// Create a mock serving `stops` as the stop-list body and no arrivals.
    pub fn new(stops: impl Into<String>) -> Self {
        Self {
            stops: stops.into(),
            arrivals: HashMap::new(),
            stop_layout: FieldLayout::new(&STOP_FIELDS),
            arrival_layout: FieldLayout::new(&ARRIVAL_FIELDS),
            requests: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Serve `body` as the arrivals for `stop_id`.
    pub fn with_arrivals(mut self, stop_id: impl Into<StopId>, body: impl Into<String>) -> Self {
        self.arrivals.insert(stop_id.into(), body.into());
        self
    }

    /// Load bodies from a directory.
    ///
    /// Expects `stops.txt` and, optionally, `arrivals/{stop id}.txt` files
    /// (e.g. `arrivals/100000.txt`).
    pub fn from_dir(data_dir: impl AsRef<Path>) -> Result<Self, FeedError> {
        let data_dir = data_dir.as_ref();
        let stops_path = data_dir.join(STOPS_FILE);
        let mut mock = Self::new(read(&stops_path)?);

        let arrivals_dir = data_dir.join(ARRIVALS_DIR);
        if !arrivals_dir.is_dir() {
            return Ok(mock);
        }

        let entries = std::fs::read_dir(&arrivals_dir).map_err(|e| FeedError::Io {
            path: arrivals_dir.clone(),
            message: e.to_string(),
        })?;

        for entry in entries {
            let entry = entry.map_err(|e| FeedError::Io {
                path: arrivals_dir.clone(),
                message: e.to_string(),
            })?;

            let path = entry.path();
            if !path.is_file() || path.extension().and_then(|s| s.to_str()) != Some("txt") {
                continue;
            }

            let Some(stop_id) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let body = read(&path)?;
            mock.arrivals.insert(StopId::new(stop_id), body);
        }

        Ok(mock)
    }

    /// Stops that have canned arrivals.
    pub fn stops_with_arrivals(&self) -> Vec<StopId> {
        let mut ids: Vec<StopId> = self.arrivals.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Number of bodies served so far.
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    fn served(&self) {
        self.requests.fetch_add(1, Ordering::SeqCst);
    }
}

fn read(path: &Path) -> Result<String, FeedError> {
    std::fs::read_to_string(path).map_err(|e| FeedError::Io {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Version row with the current time, for stops without canned arrivals.
fn empty_arrivals_body() -> String {
    format!("[4,\"1.0\",{}]\n", Utc::now().timestamp_millis())
}

impl FeedSource for MockFeedClient {
    fn stop_layout(&self) -> &FieldLayout {
        &self.stop_layout
    }

    fn arrival_layout(&self) -> &FieldLayout {
        &self.arrival_layout
    }

    fn stops_body(&self) -> BoxFuture<'_, Result<String, FeedError>> {
        self.served();
        let body = self.stops.clone();
        Box::pin(async move { Ok(body) })
    }

    fn arrivals_body<'a>(&'a self, stop_id: &'a StopId) -> BoxFuture<'a, Result<String, FeedError>> {
        self.served();
        let body = self
            .arrivals
            .get(stop_id)
            .cloned()
            .unwrap_or_else(empty_arrivals_body);
        Box::pin(async move { Ok(body) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::{parse_arrivals, parse_stops};

    #[tokio::test]
    async fn load_mock_data() {
        let mock = MockFeedClient::from_dir("data/mock_feed").unwrap();

        assert!(mock.stops_with_arrivals().contains(&StopId::new("100000")));

        let body = mock.stops_body().await.unwrap();
        let stops = parse_stops(&body, mock.stop_layout()).unwrap();
        assert!(stops.iter().any(|s| s.id.as_str() == "100000"));
    }

    #[tokio::test]
    async fn canned_arrivals() {
        let mock = MockFeedClient::from_dir("data/mock_feed").unwrap();
        let id = StopId::new("100000");

        let body = mock.arrivals_body(&id).await.unwrap();
        let arrivals = parse_arrivals(&body, mock.arrival_layout()).unwrap();
        assert!(!arrivals.is_empty());
        assert_eq!(mock.request_count(), 1);
    }

    #[tokio::test]
    async fn unknown_stop_has_no_arrivals() {
        let mock = MockFeedClient::new("[4,\"1.0\",0]\n");
        let id = StopId::new("424242");

        let body = mock.arrivals_body(&id).await.unwrap();
        assert!(body.starts_with("[4,\"1.0\","));
        let arrivals = parse_arrivals(&body, mock.arrival_layout()).unwrap();
        assert!(arrivals.is_empty());
    }

    #[tokio::test]
    async fn from_temp_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("stops.txt"),
            "[4,\"1.0\",0]\n[0,\"Elisenbrunnen\",\"1001\",50.7740,6.0860]\n",
        )
        .unwrap();
        std::fs::create_dir(dir.path().join("arrivals")).unwrap();
        std::fs::write(
            dir.path().join("arrivals").join("1001.txt"),
            "[4,\"1.0\",0]\n[1,\"Elisenbrunnen\",\"3A\",\"Ringlinie\",120000]\n",
        )
        .unwrap();
        std::fs::write(dir.path().join("arrivals").join("README.md"), "ignored").unwrap();

        let mock = MockFeedClient::from_dir(dir.path()).unwrap();
        assert_eq!(mock.stops_with_arrivals(), vec![StopId::new("1001")]);
    }

    #[test]
    fn missing_directory_is_an_error() {
        let result = MockFeedClient::from_dir("/nonexistent/mock_feed");
        assert!(matches!(result, Err(FeedError::Io { .. })));
    }
}
