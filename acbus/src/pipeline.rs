//! The location → stops → arrivals pipeline.
//!
//! One run answers one host request:
//!
//! 1. locate the device
//! 2. fetch and parse the stop list, rank it by distance
//! 3. select the requested (or nearest) stop
//! 4. fetch and parse that stop's arrivals, rank them by ETA
//! 5. format both lists for the host
//!
//! The arrivals query needs the stop id from step 3, so the two feed calls
//! are strictly sequential. Runs never interleave: a run guard is held for
//! the whole run, and overlapping requests wait their turn.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::domain::{StopId, StopRecord};
use crate::feed::{FeedError, FeedSource, parse_arrivals, parse_stops};
use crate::host::{HostReply, HostRequest, format_bus_data, format_bus_stop_data};
use crate::location::{GeoLocator, LocationError};
use crate::rank::{
    NearbyStop, RankConfig, RankError, RankedArrivals, nearby_stops, rank_arrivals,
    rank_by_distance, select_stop,
};

/// Error that ends a pipeline run.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// No position could be determined
    #[error("location unavailable: {0}")]
    LocationUnavailable(#[from] LocationError),

    /// The feed could not be reached or refused the request
    #[error("feed unreachable: {0}")]
    FeedUnreachable(FeedError),

    /// The feed answered with something unusable
    #[error("feed malformed: {0}")]
    FeedMalformed(FeedError),

    /// No usable stops in the stop list
    #[error("no bus stops available")]
    NoStopsAvailable,

    /// The requested stop is not in the stop list
    #[error("requested bus stop {0} not found")]
    RequestedStopNotFound(StopId),
}

impl From<FeedError> for PipelineError {
    fn from(err: FeedError) -> Self {
        if err.is_malformed() {
            PipelineError::FeedMalformed(err)
        } else {
            PipelineError::FeedUnreachable(err)
        }
    }
}

impl From<RankError> for PipelineError {
    fn from(err: RankError) -> Self {
        match err {
            RankError::NoStopsAvailable => PipelineError::NoStopsAvailable,
            RankError::RequestedStopNotFound(id) => PipelineError::RequestedStopNotFound(id),
        }
    }
}

/// Configuration for pipeline runs.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Limits for the nearby-stop and arrivals lists.
    pub rank: RankConfig,

    /// Use the nearest stop when the requested one is not in the stop list.
    /// When false, such a request fails with `RequestedStopNotFound`.
    pub fallback_to_nearest: bool,
}

impl PipelineConfig {
    pub fn new(rank: RankConfig) -> Self {
        Self {
            rank,
            fallback_to_nearest: true,
        }
    }

    pub fn with_fallback_to_nearest(mut self, fallback: bool) -> Self {
        self.fallback_to_nearest = fallback;
        self
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::new(RankConfig::default())
    }
}

/// Result of a successful run.
#[derive(Debug, Clone)]
pub struct Update {
    /// Nearest stops, nearest first.
    pub nearby: Vec<NearbyStop>,

    /// Stop whose arrivals were fetched.
    pub selected: StopRecord,

    /// Whether `selected` replaced a requested stop that was not found.
    pub fell_back: bool,

    /// Upcoming arrivals at `selected`.
    pub arrivals: RankedArrivals,
}

impl Update {
    /// Render the update in the host's message schema.
    pub fn to_reply(&self) -> HostReply {
        HostReply::update(
            format_bus_stop_data(&self.nearby),
            self.selected.name.clone(),
            format_bus_data(&self.arrivals),
        )
    }
}

/// Runs the pipeline against a feed source and a locator.
pub struct Pipeline {
    feed: Arc<dyn FeedSource>,
    locator: GeoLocator,
    config: PipelineConfig,
    run_guard: Mutex<()>,
}

impl Pipeline {
    pub fn new(feed: Arc<dyn FeedSource>, locator: GeoLocator, config: PipelineConfig) -> Self {
        Self {
            feed,
            locator,
            config,
            run_guard: Mutex::new(()),
        }
    }

    /// Run once for `request`.
    pub async fn run(&self, request: &HostRequest) -> Result<Update, PipelineError> {
        let _running = self.run_guard.lock().await;

        info!(
            requested_stop = request.bus_stop_id.as_ref().map(StopId::as_str),
            update_stop_list = request.update_bus_stop_list,
            "starting bus update"
        );

        let position = self.locator.current_position().await?;
        debug!(%position, "determining closest bus stop");

        let body = self.feed.stops_body().await?;
        let stops = parse_stops(&body, self.feed.stop_layout())?;
        let ranked = rank_by_distance(stops, &position);

        let (selected, fell_back) = self.select(&ranked, request.bus_stop_id.as_ref())?;
        info!(
            stop = %selected.name,
            id = %selected.id,
            distance_m = selected.distance_meters.round(),
            "selected bus stop"
        );

        let nearby = nearby_stops(&ranked, self.config.rank.nearby_count);

        let body = self.feed.arrivals_body(&selected.id).await?;
        let arrivals = parse_arrivals(&body, self.feed.arrival_layout())?;
        let arrivals = rank_arrivals(arrivals, &self.config.rank);
        info!(count = arrivals.count(), stop = %selected.name, "assembled bus update");

        Ok(Update {
            nearby,
            selected: selected.clone(),
            fell_back,
            arrivals,
        })
    }

    /// Run once and always produce a reply, logging failures.
    pub async fn handle(&self, request: &HostRequest) -> HostReply {
        match self.run(request).await {
            Ok(update) => update.to_reply(),
            Err(e) => {
                error!(error = %e, "bus update failed");
                HostReply::failure(e.to_string())
            }
        }
    }

    fn select<'a>(
        &self,
        ranked: &'a [StopRecord],
        requested: Option<&StopId>,
    ) -> Result<(&'a StopRecord, bool), PipelineError> {
        match select_stop(ranked, requested) {
            Ok(stop) => Ok((stop, false)),
            Err(RankError::RequestedStopNotFound(id)) if self.config.fallback_to_nearest => {
                warn!(requested = %id, "requested bus stop not found, using nearest");
                let nearest = select_stop(ranked, None)?;
                Ok((nearest, true))
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use futures::future::BoxFuture;

    use crate::domain::Position;
    use crate::feed::{ARRIVAL_FIELDS, FieldLayout, MockFeedClient, STOP_FIELDS};
    use crate::location::{Fix, LocationProvider, LocatorConfig, StaticLocation};

    const NOW: i64 = 1_449_239_766_000;

    fn stops_body() -> String {
        format!(
            "[4,\"1.0\",{NOW}]\n\
             [0,\"Aachen Bushof\",\"100000\",50.7776,6.0908]\n\
             [0,\"Weit Weg\",\"100999\",50.8250,6.0900]\n"
        )
    }

    fn arrivals_body() -> String {
        format!(
            "[4,\"1.0\",{NOW}]\n\
             [1,\"Aachen Bushof\",\"33\",\"Vaals Grenze\",{}]\n\
             [1,\"Aachen Bushof\",\"5\",\"Uniklinik\",{}]\n",
            NOW + 300_000,
            NOW - 60_000
        )
    }

    fn locator(position: Position) -> GeoLocator {
        GeoLocator::new(
            Arc::new(StaticLocation::new(position)),
            &LocatorConfig::default(),
        )
    }

    fn aachen() -> Position {
        Position::new(6.09, 50.78)
    }

    fn pipeline(feed: impl FeedSource + 'static, config: PipelineConfig) -> Pipeline {
        Pipeline::new(Arc::new(feed), locator(aachen()), config)
    }

    fn mock() -> MockFeedClient {
        MockFeedClient::new(stops_body())
            .with_arrivals("100000", arrivals_body())
            .with_arrivals("100999", format!("[4,\"1.0\",{NOW}]\n"))
    }

    /// Feed that fails every request with the given error.
    struct FailingFeed {
        malformed: bool,
        layout: FieldLayout,
    }

    impl FailingFeed {
        fn new(malformed: bool) -> Self {
            Self {
                malformed,
                layout: FieldLayout::new(&STOP_FIELDS),
            }
        }

        fn error(&self) -> FeedError {
            if self.malformed {
                FeedError::Malformed("garbage".into())
            } else {
                FeedError::Status {
                    status: 503,
                    message: "Service Unavailable".into(),
                }
            }
        }
    }

    impl FeedSource for FailingFeed {
        fn stop_layout(&self) -> &FieldLayout {
            &self.layout
        }

        fn arrival_layout(&self) -> &FieldLayout {
            &self.layout
        }

        fn stops_body(&self) -> BoxFuture<'_, Result<String, FeedError>> {
            let err = self.error();
            Box::pin(async move { Err(err) })
        }

        fn arrivals_body<'a>(
            &'a self,
            _stop_id: &'a StopId,
        ) -> BoxFuture<'a, Result<String, FeedError>> {
            let err = self.error();
            Box::pin(async move { Err(err) })
        }
    }

    /// Provider that never has a position.
    struct NoLocation;

    impl LocationProvider for NoLocation {
        fn locate(&self) -> BoxFuture<'_, Result<Fix, LocationError>> {
            Box::pin(async { Err(LocationError::Unavailable("no fix".into())) })
        }
    }

    /// Feed that records how many requests are in flight at once.
    struct SlowFeed {
        inner: MockFeedClient,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    impl SlowFeed {
        fn new(inner: MockFeedClient) -> Self {
            Self {
                inner,
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
            }
        }

        async fn slowly<T>(&self, fut: BoxFuture<'_, T>) -> T {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            let out = fut.await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            out
        }
    }

    impl FeedSource for SlowFeed {
        fn stop_layout(&self) -> &FieldLayout {
            self.inner.stop_layout()
        }

        fn arrival_layout(&self) -> &FieldLayout {
            self.inner.arrival_layout()
        }

        fn stops_body(&self) -> BoxFuture<'_, Result<String, FeedError>> {
            Box::pin(self.slowly(self.inner.stops_body()))
        }

        fn arrivals_body<'a>(
            &'a self,
            stop_id: &'a StopId,
        ) -> BoxFuture<'a, Result<String, FeedError>> {
            Box::pin(self.slowly(self.inner.arrivals_body(stop_id)))
        }
    }

    #[tokio::test]
    async fn nearest_stop_with_arrivals() {
        let pipeline = pipeline(mock(), PipelineConfig::default());
        let update = pipeline.run(&HostRequest::nearest()).await.unwrap();

        assert_eq!(update.selected.id.as_str(), "100000");
        assert!(!update.fell_back);
        assert_eq!(update.nearby.len(), 2);
        assert_eq!(update.nearby[0].id.as_str(), "100000");
        assert!(update.nearby[0].distance_meters < update.nearby[1].distance_meters);

        let reply = update.to_reply();
        assert!(!reply.is_failure());
        assert_eq!(reply.bus_stop_name.as_deref(), Some("Aachen Bushof"));
        assert_eq!(
            reply.bus_data.as_deref(),
            Some("2;5;Uniklinik;0;33;Vaals Grenze;5")
        );
        let stop_data = reply.bus_stop_data.unwrap();
        assert!(stop_data.starts_with("Aachen Bushof;"));
        assert_eq!(stop_data.split(';').count(), 6);
    }

    #[tokio::test]
    async fn requested_stop_is_used() {
        let pipeline = pipeline(mock(), PipelineConfig::default());
        let update = pipeline
            .run(&HostRequest::for_stop("100999"))
            .await
            .unwrap();

        assert_eq!(update.selected.id.as_str(), "100999");
        assert!(update.arrivals.is_empty());
        assert_eq!(update.to_reply().bus_data.as_deref(), Some("0"));
        // The stop list is still ordered by distance.
        assert_eq!(update.nearby[0].id.as_str(), "100000");
    }

    #[tokio::test]
    async fn unknown_requested_stop_falls_back_to_nearest() {
        let pipeline = pipeline(mock(), PipelineConfig::default());
        let update = pipeline
            .run(&HostRequest::for_stop("424242"))
            .await
            .unwrap();

        assert!(update.fell_back);
        assert_eq!(update.selected.id.as_str(), "100000");
    }

    #[tokio::test]
    async fn unknown_requested_stop_without_fallback() {
        let config = PipelineConfig::default().with_fallback_to_nearest(false);
        let pipeline = pipeline(mock(), config);
        let err = pipeline
            .run(&HostRequest::for_stop("424242"))
            .await
            .unwrap_err();

        assert!(
            matches!(err, PipelineError::RequestedStopNotFound(ref id) if id.as_str() == "424242")
        );
    }

    #[tokio::test]
    async fn stop_list_without_usable_stops() {
        let feed = MockFeedClient::new(format!(
            "[4,\"1.0\",{NOW}]\n[0,\"Nirgendwo\",\"1\",0.0,0.0]\n"
        ));
        let pipeline = pipeline(feed, PipelineConfig::default());
        let err = pipeline.run(&HostRequest::nearest()).await.unwrap_err();
        assert!(matches!(err, PipelineError::NoStopsAvailable));
    }

    #[tokio::test]
    async fn location_failure() {
        let locator = GeoLocator::new(Arc::new(NoLocation), &LocatorConfig::default());
        let pipeline = Pipeline::new(Arc::new(mock()), locator, PipelineConfig::default());

        let err = pipeline.run(&HostRequest::nearest()).await.unwrap_err();
        assert!(matches!(err, PipelineError::LocationUnavailable(_)));
    }

    #[tokio::test]
    async fn non_finite_configured_position() {
        let feed = Arc::new(mock());
        let pipeline = Pipeline::new(
            feed.clone(),
            locator(Position::new(f64::NAN, 50.78)),
            PipelineConfig::default(),
        );

        let err = pipeline.run(&HostRequest::nearest()).await.unwrap_err();
        assert!(matches!(
            err,
            PipelineError::LocationUnavailable(LocationError::Invalid(_))
        ));
        assert_eq!(feed.request_count(), 0);
    }

    #[tokio::test]
    async fn location_failure_skips_the_feed() {
        let feed = Arc::new(mock());
        let locator = GeoLocator::new(Arc::new(NoLocation), &LocatorConfig::default());
        let pipeline = Pipeline::new(feed.clone(), locator, PipelineConfig::default());

        let _ = pipeline.run(&HostRequest::nearest()).await;
        assert_eq!(feed.request_count(), 0);
    }

    #[tokio::test]
    async fn unreachable_feed() {
        let pipeline = pipeline(FailingFeed::new(false), PipelineConfig::default());
        let err = pipeline.run(&HostRequest::nearest()).await.unwrap_err();
        assert!(matches!(err, PipelineError::FeedUnreachable(_)));
    }

    #[tokio::test]
    async fn malformed_feed() {
        let pipeline = pipeline(FailingFeed::new(true), PipelineConfig::default());
        let err = pipeline.run(&HostRequest::nearest()).await.unwrap_err();
        assert!(matches!(err, PipelineError::FeedMalformed(_)));
    }

    #[tokio::test]
    async fn empty_stop_list_is_malformed() {
        let pipeline = pipeline(MockFeedClient::new(""), PipelineConfig::default());
        let err = pipeline.run(&HostRequest::nearest()).await.unwrap_err();
        assert!(matches!(err, PipelineError::FeedMalformed(_)));
    }

    #[tokio::test]
    async fn failures_become_error_replies() {
        let pipeline = pipeline(FailingFeed::new(false), PipelineConfig::default());
        let reply = pipeline.handle(&HostRequest::nearest()).await;

        assert!(reply.is_failure());
        assert!(reply.bus_stop_data.is_none());
        assert!(reply.bus_data.is_none());
        assert!(reply.bus_error.unwrap().contains("feed unreachable"));
    }

    #[tokio::test]
    async fn overlapping_runs_do_not_interleave() {
        let feed = Arc::new(SlowFeed::new(mock()));
        let pipeline = Arc::new(Pipeline::new(
            feed.clone(),
            locator(aachen()),
            PipelineConfig::default(),
        ));

        let runs: Vec<_> = (0..4)
            .map(|_| {
                let pipeline = pipeline.clone();
                tokio::spawn(async move { pipeline.handle(&HostRequest::nearest()).await })
            })
            .collect();

        for run in futures::future::join_all(runs).await {
            assert!(!run.unwrap().is_failure());
        }
        assert_eq!(feed.max_in_flight.load(Ordering::SeqCst), 1);
        assert_eq!(feed.inner.request_count(), 8);
    }

    #[tokio::test]
    async fn limits_come_from_config() {
        let config = PipelineConfig::new(RankConfig::new(1, 1, 99));
        let pipeline = pipeline(mock(), config);
        let update = pipeline.run(&HostRequest::nearest()).await.unwrap();

        assert_eq!(update.nearby.len(), 1);
        assert_eq!(update.arrivals.count(), 1);
        assert_eq!(update.arrivals.entries[0].line_number, "5");
    }

    #[tokio::test]
    async fn runs_against_mock_data() {
        let feed = MockFeedClient::from_dir("data/mock_feed").unwrap();
        let bushof = Position::new(6.0908, 50.7776);
        let pipeline = Pipeline::new(Arc::new(feed), locator(bushof), PipelineConfig::default());
        let update = pipeline.run(&HostRequest::nearest()).await.unwrap();

        assert_eq!(update.selected.id.as_str(), "100000");
        assert_eq!(update.nearby.len(), 6);
        assert!(update.nearby.iter().all(|s| s.id.as_str() != "999999"));

        // SB63 is two hours out.
        let lines: Vec<_> = update
            .arrivals
            .entries
            .iter()
            .map(|a| a.line_number.as_str())
            .collect();
        assert_eq!(lines, ["5", "33", "51", "3A"]);
        assert_eq!(update.arrivals.entries[0].eta_minutes, 0);
    }

    #[test]
    fn layouts_follow_field_lists() {
        let mock = mock();
        assert_eq!(mock.stop_layout(), &FieldLayout::new(&STOP_FIELDS));
        assert_eq!(mock.arrival_layout(), &FieldLayout::new(&ARRIVAL_FIELDS));
    }
}
