use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use log::{debug, info, warn};

use super::cancel::CancelSignal;
use super::clock::Clock;
use crate::cache::RatingCache;
use crate::config::AppConfig;
use crate::domain::{AggregateRating, RatingRecord, RawRecord, TraitRatings};
use crate::errors::{FetchError, SubmitError};
use crate::rating;
use crate::remote::RemoteStore;
use crate::storage::LocalStore;
use crate::vote::{VoteLedger, VoteState};

#[derive(Debug, Clone)]
pub struct ControllerSettings {
    pub collection: String,
    pub device_id: String,
    pub app_version: String,
    pub freshness_window_ms: i64,
    pub fetch_timeout: Duration,
    pub refetch_delay: Duration,
}

impl From<&AppConfig> for ControllerSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            collection: config.remote.collection.clone(),
            device_id: config.remote.user_agent.clone(),
            app_version: config.vote.app_version.clone(),
            freshness_window_ms: config.cache.freshness_window_ms,
            fetch_timeout: config.remote.timeout(),
            refetch_delay: config.remote.refetch_delay(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    NotVoted,
    Voted,
}

/// What the UI should show as the general rating
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneralRating {
    /// Nothing cached and nothing fetched yet
    Unknown,
    /// Provisional value from a fresh local cache
    Cached(AggregateRating),
    /// Computed from the latest successful fetch
    Live(AggregateRating),
    /// The fetch succeeded but there were no valid records
    Neutral,
}

impl GeneralRating {
    pub fn ratings(&self) -> Option<AggregateRating> {
        match self {
            GeneralRating::Unknown => None,
            GeneralRating::Cached(aggregate) | GeneralRating::Live(aggregate) => Some(*aggregate),
            GeneralRating::Neutral => Some(TraitRatings::neutral()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Fetch,
    Submit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorBanner {
    pub kind: ErrorKind,
    pub message: String,
    pub retryable: bool,
}

/// Everything the UI needs to render one frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewSnapshot {
    pub phase: Phase,
    pub vote: VoteState,
    pub general: GeneralRating,
    pub loading: bool,
    pub error: Option<ErrorBanner>,
    /// The vote was submitted during this run
    pub just_voted: bool,
}

#[derive(Debug)]
pub enum RefreshOutcome {
    Updated(AggregateRating),
    Empty,
    Failed(FetchError),
    Cancelled,
    /// Nothing to refresh before this device has voted
    Skipped,
}

/// Reconciles the local cache and vote state with the remote record set
pub struct AggregationController<R: RemoteStore> {
    settings: ControllerSettings,
    cache: RatingCache,
    ledger: VoteLedger,
    remote: R,
    clock: Arc<dyn Clock>,
    cancel: CancelSignal,
    phase: Phase,
    vote: VoteState,
    general: GeneralRating,
    loading: bool,
    error: Option<ErrorBanner>,
    just_voted: bool,
}

impl<R: RemoteStore> AggregationController<R> {
    /// Run the version gate, then restore this device's state
    pub fn init(
        settings: ControllerSettings,
        store: Arc<dyn LocalStore>,
        remote: R,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let cache = RatingCache::with_window(store.clone(), settings.freshness_window_ms);
        let ledger = VoteLedger::new(store);

        let reset = ledger
            .app_version_gate(&settings.app_version)
            .unwrap_or_else(|e| {
                warn!("Version check failed, keeping local state: {:#}", e);
                false
            });

        let mut controller = Self {
            settings,
            cache,
            ledger,
            remote,
            clock,
            cancel: CancelSignal::new(),
            phase: Phase::NotVoted,
            vote: VoteState::not_voted(),
            general: GeneralRating::Unknown,
            loading: false,
            error: None,
            just_voted: false,
        };

        if !reset {
            controller.restore();
        }
        controller
    }

    pub fn snapshot(&self) -> ViewSnapshot {
        ViewSnapshot {
            phase: self.phase,
            vote: self.vote,
            general: self.general,
            loading: self.loading,
            error: self.error.clone(),
            just_voted: self.just_voted,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Handle that cancels in-flight work of this controller
    pub fn cancel_handle(&self) -> CancelSignal {
        self.cancel.clone()
    }

    /// Record this device's vote, publish it, then refresh the general rating
    pub async fn submit(&mut self, ratings: TraitRatings) -> Result<RefreshOutcome, SubmitError> {
        if self.phase == Phase::Voted {
            return Err(SubmitError::AlreadyVoted);
        }

        let ratings = TraitRatings::new(ratings.humble, ratings.considerate, ratings.kind, ratings.smart);
        let now = self.clock.now_millis();

        self.vote = self.ledger.record_vote(ratings, now)?;
        self.phase = Phase::Voted;
        self.just_voted = true;
        self.loading = true;

        self.publish(RatingRecord::new(ratings, now, self.settings.device_id.clone()))
            .await;

        if !self.wait_before_refetch().await {
            self.loading = false;
            return Ok(RefreshOutcome::Cancelled);
        }

        Ok(self.refresh().await)
    }

    /// Manual retry from the UI. Only meaningful once this device has voted.
    pub async fn request_refresh(&mut self) -> RefreshOutcome {
        if self.phase != Phase::Voted {
            debug!("Refresh requested before voting, skipping");
            return RefreshOutcome::Skipped;
        }
        self.refresh().await
    }

    /// Public results view, available whether or not this device voted
    pub async fn load_public_results(&mut self) -> RefreshOutcome {
        if self.general == GeneralRating::Unknown {
            self.show_fresh_cache();
        }
        self.refresh().await
    }

    // --- Helper Methods ---

    fn restore(&mut self) {
        self.vote = self.ledger.state();

        if !self.vote.has_voted {
            info!("No vote recorded on this device");
            return;
        }

        self.phase = Phase::Voted;
        self.loading = true;
        self.show_fresh_cache();
        info!("Restored vote for this device");
    }

    fn show_fresh_cache(&mut self) {
        if let Some(entry) = self.cache.read_fresh(self.clock.now_millis()) {
            self.general = GeneralRating::Cached(entry.aggregate);
        }
    }

    async fn refresh(&mut self) -> RefreshOutcome {
        self.loading = true;

        let collection = self.settings.collection.clone();
        let fetched = self.guarded(self.remote.fetch_all(&collection)).await;

        let outcome = match fetched {
            Ok(records) => self.apply_records(&records),
            Err(FetchError::Cancelled) => {
                info!("General rating refresh cancelled");
                RefreshOutcome::Cancelled
            }
            Err(e) => self.apply_failure(e),
        };

        self.loading = false;
        outcome
    }

    fn apply_records(&mut self, records: &[RawRecord]) -> RefreshOutcome {
        let report = rating::aggregate_with_report(records);
        info!(
            "Aggregated {} valid rating records, skipped {}",
            report.accepted, report.rejected
        );
        self.clear_error(ErrorKind::Fetch);

        match report.aggregate {
            Some(aggregate) => {
                if let Err(e) = self.cache.write(aggregate, self.clock.now_millis()) {
                    warn!("Failed to cache general rating: {:#}", e);
                }
                self.general = GeneralRating::Live(aggregate);
                RefreshOutcome::Updated(aggregate)
            }
            None => {
                if let Err(e) = self.cache.clear() {
                    warn!("Failed to clear cached general rating: {:#}", e);
                }
                self.general = GeneralRating::Neutral;
                RefreshOutcome::Empty
            }
        }
    }

    fn apply_failure(&mut self, error: FetchError) -> RefreshOutcome {
        warn!("Failed to refresh general rating: {}", error);

        self.error = Some(ErrorBanner {
            kind: ErrorKind::Fetch,
            message: "Could not load the general rating.".to_string(),
            retryable: error.is_retryable(),
        });
        RefreshOutcome::Failed(error)
    }

    async fn publish(&mut self, record: RatingRecord) {
        let collection = self.settings.collection.clone();
        let appended = self.guarded(self.remote.append_record(&collection, &record)).await;

        match appended {
            Ok(key) => debug!("Published rating as {}", key),
            Err(FetchError::Cancelled) => info!("Publishing rating cancelled"),
            Err(e) => {
                warn!("Failed to publish rating (kept locally): {}", e);
                self.error = Some(ErrorBanner {
                    kind: ErrorKind::Submit,
                    message: "Your rating was saved on this device but could not be sent.".to_string(),
                    retryable: false,
                });
            }
        }
    }

    /// Give the backend a moment to make the new record visible. Returns false if cancelled.
    async fn wait_before_refetch(&self) -> bool {
        let delay = self.settings.refetch_delay;
        if delay.is_zero() {
            return !self.cancel.is_cancelled();
        }

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => false,
            _ = tokio::time::sleep(delay) => true,
        }
    }

    /// Run a backend call under the fetch timeout and this controller's cancel signal
    async fn guarded<T, F>(&self, call: F) -> Result<T, FetchError>
    where
        F: Future<Output = Result<T>>,
    {
        let timeout = self.settings.fetch_timeout;

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(FetchError::Cancelled),
            result = tokio::time::timeout(timeout, call) => match result {
                Ok(Ok(value)) => Ok(value),
                Ok(Err(e)) => Err(FetchError::Backend(e)),
                Err(_) => Err(FetchError::TimedOut(timeout)),
            },
        }
    }

    fn clear_error(&mut self, kind: ErrorKind) {
        if self.error.as_ref().is_some_and(|e| e.kind == kind) {
            self.error = None;
        }
    }
}

impl<R: RemoteStore> Drop for AggregationController<R> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::InMemoryRemote;
    use crate::services::clock::ManualClock;
    use crate::storage::{MemoryStore, StorageKey};
    use async_trait::async_trait;
    use serde_json::json;

    const START: i64 = 1_700_000_000_000;

    struct Harness {
        store: Arc<MemoryStore>,
        remote: Arc<InMemoryRemote>,
        clock: Arc<ManualClock>,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                store: Arc::new(MemoryStore::new()),
                remote: Arc::new(InMemoryRemote::new()),
                clock: Arc::new(ManualClock::new(START)),
            }
        }

        fn settings(version: &str) -> ControllerSettings {
            ControllerSettings {
                collection: "ratings".to_string(),
                device_id: "test-device".to_string(),
                app_version: version.to_string(),
                freshness_window_ms: 300_000,
                fetch_timeout: Duration::from_secs(5),
                refetch_delay: Duration::ZERO,
            }
        }

        /// Simulates a page load
        fn load(&self) -> AggregationController<Arc<InMemoryRemote>> {
            self.load_version("1.0.0")
        }

        fn load_version(&self, version: &str) -> AggregationController<Arc<InMemoryRemote>> {
            AggregationController::init(
                Self::settings(version),
                self.store.clone(),
                self.remote.clone(),
                self.clock.clone(),
            )
        }

        fn seed(&self, h: u8, c: u8, k: u8, s: u8) {
            let record = RatingRecord::new(TraitRatings::new(h, c, k, s), START, "other-device");
            self.remote.insert_raw("ratings", RawRecord::from(&record));
        }
    }

    #[tokio::test]
    async fn test_first_load_is_not_voted() {
        let harness = Harness::new();
        let controller = harness.load();
        let snapshot = controller.snapshot();

        assert_eq!(snapshot.phase, Phase::NotVoted);
        assert_eq!(snapshot.general, GeneralRating::Unknown);
        assert!(!snapshot.loading);
        assert_eq!(harness.store.get(StorageKey::AppVersion).unwrap().as_deref(), Some("1.0.0"));
    }

    #[tokio::test]
    async fn test_sole_submission_is_the_aggregate() {
        let harness = Harness::new();
        let mut controller = harness.load();
        let ratings = TraitRatings::new(80, 20, 90, 10);

        let outcome = controller.submit(ratings).await.unwrap();

        assert!(matches!(outcome, RefreshOutcome::Updated(a) if a == ratings));
        let snapshot = controller.snapshot();
        assert_eq!(snapshot.phase, Phase::Voted);
        assert_eq!(snapshot.general, GeneralRating::Live(ratings));
        assert_eq!(snapshot.vote.ratings(), Some(ratings));
        assert!(snapshot.just_voted);
        assert!(!snapshot.loading);
        assert_eq!(harness.remote.len("ratings"), 1);

        let cached = RatingCache::new(harness.store.clone()).read().unwrap();
        assert_eq!(cached.aggregate, ratings);
        assert_eq!(cached.computed_at, START);
    }

    #[tokio::test]
    async fn test_second_record_yields_rounded_mean() {
        let harness = Harness::new();
        let mut controller = harness.load();
        controller.submit(TraitRatings::new(80, 20, 90, 10)).await.unwrap();
        drop(controller);

        harness.seed(60, 40, 70, 30);
        let mut controller = harness.load();
        let outcome = controller.request_refresh().await;

        assert!(matches!(outcome, RefreshOutcome::Updated(a) if a == TraitRatings::new(70, 30, 80, 20)));
    }

    #[tokio::test]
    async fn test_reload_shows_fresh_cache_before_fetch() {
        let harness = Harness::new();
        let mut controller = harness.load();
        controller.submit(TraitRatings::new(80, 20, 90, 10)).await.unwrap();
        drop(controller);

        harness.clock.advance(60_000);
        let controller = harness.load();
        let snapshot = controller.snapshot();

        assert_eq!(snapshot.phase, Phase::Voted);
        assert_eq!(snapshot.general, GeneralRating::Cached(TraitRatings::new(80, 20, 90, 10)));
        assert!(snapshot.loading);
        assert!(!snapshot.just_voted);
    }

    #[tokio::test]
    async fn test_reload_with_garbage_cache_timestamp_is_a_miss() {
        let harness = Harness::new();
        let mut controller = harness.load();
        controller.submit(TraitRatings::new(80, 20, 90, 10)).await.unwrap();
        drop(controller);

        let text = r#"{"aggregate":{"humble":1,"considerate":2,"kind":3,"smart":4},"computedAt":-9223372036854775808}"#;
        harness.store.set(StorageKey::GeneralRatings, text).unwrap();
        let controller = harness.load();

        assert_eq!(controller.phase(), Phase::Voted);
        assert_eq!(controller.snapshot().general, GeneralRating::Unknown);
        assert_eq!(harness.store.get(StorageKey::GeneralRatings).unwrap(), None);
    }

    #[tokio::test]
    async fn test_reload_after_clock_moved_back_drops_cache() {
        let harness = Harness::new();
        let mut controller = harness.load();
        controller.submit(TraitRatings::new(80, 20, 90, 10)).await.unwrap();
        drop(controller);

        harness.clock.set(START - 60_000);
        let controller = harness.load();

        assert_eq!(controller.snapshot().general, GeneralRating::Unknown);
        assert!(RatingCache::new(harness.store.clone()).read().is_none());
    }

    #[tokio::test]
    async fn test_reload_ignores_stale_cache() {
        let harness = Harness::new();
        let mut controller = harness.load();
        controller.submit(TraitRatings::new(80, 20, 90, 10)).await.unwrap();
        drop(controller);

        harness.clock.advance(300_000);
        let controller = harness.load();

        assert_eq!(controller.snapshot().general, GeneralRating::Unknown);
        assert_eq!(controller.phase(), Phase::Voted);
    }

    #[tokio::test]
    async fn test_cannot_vote_twice() {
        let harness = Harness::new();
        let mut controller = harness.load();
        controller.submit(TraitRatings::neutral()).await.unwrap();

        let second = controller.submit(TraitRatings::new(1, 2, 3, 4)).await;
        assert!(matches!(second, Err(SubmitError::AlreadyVoted)));

        let mut reloaded = harness.load();
        assert!(matches!(
            reloaded.submit(TraitRatings::new(1, 2, 3, 4)).await,
            Err(SubmitError::AlreadyVoted)
        ));
        assert_eq!(harness.remote.len("ratings"), 1);
    }

    #[tokio::test]
    async fn test_fetch_failure_keeps_cache_and_shows_retryable_error() {
        let harness = Harness::new();
        let mut controller = harness.load();
        controller.submit(TraitRatings::new(80, 20, 90, 10)).await.unwrap();
        drop(controller);

        harness.remote.set_fail_fetches(true);
        let mut controller = harness.load();
        let outcome = controller.request_refresh().await;

        assert!(matches!(outcome, RefreshOutcome::Failed(FetchError::Backend(_))));
        let snapshot = controller.snapshot();
        assert_eq!(snapshot.general, GeneralRating::Cached(TraitRatings::new(80, 20, 90, 10)));
        assert!(snapshot.error.as_ref().is_some_and(|e| e.retryable));
        assert!(RatingCache::new(harness.store.clone()).read().is_some());

        harness.remote.set_fail_fetches(false);
        let outcome = controller.request_refresh().await;
        assert!(matches!(outcome, RefreshOutcome::Updated(_)));
        assert_eq!(controller.snapshot().error, None);
    }

    #[tokio::test]
    async fn test_zero_valid_records_clears_cache_and_shows_neutral() {
        let harness = Harness::new();
        let mut controller = harness.load();
        controller.submit(TraitRatings::new(80, 20, 90, 10)).await.unwrap();
        drop(controller);

        // Collection wiped and replaced with junk
        let remote = Arc::new(InMemoryRemote::new());
        remote.insert_raw("ratings", RawRecord(json!({"humble": "n/a"})));
        let mut controller = AggregationController::init(
            Harness::settings("1.0.0"),
            harness.store.clone(),
            remote,
            harness.clock.clone(),
        );

        let outcome = controller.request_refresh().await;

        assert!(matches!(outcome, RefreshOutcome::Empty));
        assert_eq!(controller.snapshot().general, GeneralRating::Neutral);
        assert_eq!(controller.snapshot().general.ratings(), Some(TraitRatings::neutral()));
        assert!(RatingCache::new(harness.store.clone()).read().is_none());
        assert_eq!(controller.snapshot().error, None);
    }

    #[tokio::test]
    async fn test_version_bump_resets_vote_once() {
        let harness = Harness::new();
        let mut controller = harness.load();
        controller.submit(TraitRatings::neutral()).await.unwrap();
        drop(controller);

        let controller = harness.load_version("2.0.0");
        assert_eq!(controller.phase(), Phase::NotVoted);
        assert_eq!(controller.snapshot().general, GeneralRating::Unknown);
        drop(controller);

        let mut controller = harness.load_version("2.0.0");
        controller.submit(TraitRatings::neutral()).await.unwrap();
        drop(controller);

        let controller = harness.load_version("2.0.0");
        assert_eq!(controller.phase(), Phase::Voted);
    }

    #[tokio::test]
    async fn test_refresh_before_voting_is_skipped() {
        let harness = Harness::new();
        harness.seed(10, 10, 10, 10);
        let mut controller = harness.load();

        assert!(matches!(controller.request_refresh().await, RefreshOutcome::Skipped));
        assert_eq!(harness.remote.fetch_count(), 0);
    }

    #[tokio::test]
    async fn test_public_results_without_vote() {
        let harness = Harness::new();
        harness.seed(10, 20, 30, 40);
        let mut controller = harness.load();

        let outcome = controller.load_public_results().await;

        assert!(matches!(outcome, RefreshOutcome::Updated(_)));
        assert_eq!(controller.phase(), Phase::NotVoted);
        assert_eq!(controller.snapshot().general, GeneralRating::Live(TraitRatings::new(10, 20, 30, 40)));
    }

    #[tokio::test]
    async fn test_append_failure_keeps_local_vote() {
        let harness = Harness::new();
        harness.remote.set_fail_appends(true);
        harness.seed(40, 40, 40, 40);
        let mut controller = harness.load();

        let outcome = controller.submit(TraitRatings::new(80, 80, 80, 80)).await.unwrap();

        assert!(matches!(outcome, RefreshOutcome::Updated(a) if a == TraitRatings::new(40, 40, 40, 40)));
        let snapshot = controller.snapshot();
        assert_eq!(snapshot.phase, Phase::Voted);
        assert!(snapshot.error.as_ref().is_some_and(|e| e.kind == ErrorKind::Submit));
        assert!(VoteLedger::new(harness.store.clone()).has_voted());
    }

    #[tokio::test]
    async fn test_cancelled_refresh_leaves_state_untouched() {
        let harness = Harness::new();
        let mut controller = harness.load();
        controller.submit(TraitRatings::new(80, 20, 90, 10)).await.unwrap();

        harness.seed(0, 0, 0, 0);
        controller.cancel_handle().cancel();
        let outcome = controller.request_refresh().await;

        assert!(matches!(outcome, RefreshOutcome::Cancelled));
        assert_eq!(controller.snapshot().general, GeneralRating::Live(TraitRatings::new(80, 20, 90, 10)));
        assert!(!controller.snapshot().loading);
        assert_eq!(controller.snapshot().error, None);
    }

    struct SlowRemote;

    #[async_trait]
    impl RemoteStore for SlowRemote {
        async fn append_record(&self, _collection: &str, _record: &RatingRecord) -> Result<String> {
            Ok("slow".to_string())
        }

        async fn fetch_all(&self, _collection: &str) -> Result<Vec<RawRecord>> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(Vec::new())
        }
    }

    fn slow_controller(harness: &Harness, timeout: Duration) -> AggregationController<SlowRemote> {
        let settings = ControllerSettings {
            fetch_timeout: timeout,
            ..Harness::settings("1.0.0")
        };
        AggregationController::init(settings, harness.store.clone(), SlowRemote, harness.clock.clone())
    }

    #[tokio::test]
    async fn test_slow_fetch_times_out() {
        let harness = Harness::new();
        let mut controller = slow_controller(&harness, Duration::from_millis(20));

        let outcome = controller.load_public_results().await;

        assert!(matches!(outcome, RefreshOutcome::Failed(FetchError::TimedOut(_))));
        assert!(controller.snapshot().error.is_some());
    }

    #[tokio::test]
    async fn test_pending_fetch_is_cancelled() {
        let harness = Harness::new();
        let mut controller = slow_controller(&harness, Duration::from_secs(60));
        let handle = controller.cancel_handle();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            handle.cancel();
        });
        let outcome = tokio::time::timeout(Duration::from_secs(5), controller.load_public_results())
            .await
            .unwrap();

        assert!(matches!(outcome, RefreshOutcome::Cancelled));
    }

    #[tokio::test]
    async fn test_drop_cancels_outstanding_handles() {
        let harness = Harness::new();
        let controller = harness.load();
        let handle = controller.cancel_handle();

        drop(controller);

        assert!(handle.is_cancelled());
    }
}
