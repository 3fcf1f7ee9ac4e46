pub mod dedupe;
pub mod scheduler;

pub use dedupe::dedupe;
pub use scheduler::{PeriodicSearch, ScheduleHandle};

use crate::error::SearchError;
use crate::models::{DiscoveredListing, Location, SearchRun};
use crate::scrapers::{Fetcher, SourceAdapter};
use crate::store::SearchHistory;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

/// Runs handed back when a search is requested while one is in flight
pub const RECENT_RUNS: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    Completed(SearchRun),
    /// Another run was in progress; nothing was started
    AlreadyRunning(Vec<SearchRun>),
}

impl SearchOutcome {
    pub fn completed(&self) -> Option<&SearchRun> {
        match self {
            SearchOutcome::Completed(run) => Some(run),
            SearchOutcome::AlreadyRunning(_) => None,
        }
    }
}

/// Queries every configured source for guarantee-friendly listings.
///
/// Requests go out one at a time in source then query order, with a fixed
/// pause between them. At most one run is active; a second call while running
/// returns the recent history instead of starting another.
pub struct SearchOrchestrator {
    sources: Vec<Arc<dyn SourceAdapter>>,
    fetcher: Arc<dyn Fetcher>,
    history: Arc<SearchHistory>,
    request_delay: Duration,
    running: AtomicBool,
    last_search_at: Mutex<Option<DateTime<Utc>>>,
    /// Latest discovery stamp handed out, in epoch millis
    last_stamp_ms: AtomicI64,
}

impl SearchOrchestrator {
    pub fn new(
        sources: Vec<Arc<dyn SourceAdapter>>,
        fetcher: Arc<dyn Fetcher>,
        history: Arc<SearchHistory>,
        request_delay: Duration,
    ) -> Self {
        Self {
            sources,
            fetcher,
            history,
            request_delay,
            running: AtomicBool::new(false),
            last_search_at: Mutex::new(None),
            last_stamp_ms: AtomicI64::new(i64::MIN),
        }
    }

    pub fn history(&self) -> &Arc<SearchHistory> {
        &self.history
    }

    pub fn is_searching(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Completion time of the last finished run in this process
    pub async fn last_search_at(&self) -> Option<DateTime<Utc>> {
        *self.last_search_at.lock().await
    }

    pub async fn search(&self, location: &Location) -> Result<SearchOutcome, SearchError> {
        let location = validate_location(location)?;

        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            info!("Search already in progress");
            return Ok(SearchOutcome::AlreadyRunning(self.history.recent(RECENT_RUNS).await));
        }
        let _running = RunningFlag(&self.running);

        info!("Starting property search for {}", location.label());

        let mut found = Vec::new();
        let mut issued = 0usize;
        for source in &self.sources {
            info!("Searching {}...", source.source_name());

            for query in source.queries() {
                if issued > 0 && !self.request_delay.is_zero() {
                    tokio::time::sleep(self.request_delay).await;
                }
                issued += 1;

                let request = source.build_request(query, &location);
                match self.fetcher.fetch(&request).await {
                    Ok(body) => {
                        let mut listings = source.parse_response(&body, &request);
                        self.stamp_uniquely(&mut listings);
                        info!(
                            source = source.source_name(),
                            query = %query,
                            found = listings.len(),
                            "Query finished"
                        );
                        found.extend(listings);
                    }
                    Err(err) => {
                        error!(
                            source = source.source_name(),
                            query = %query,
                            "Error searching source: {:#}",
                            err
                        );
                    }
                }
            }
        }

        let unique = dedupe(found);
        let run = SearchRun::new(location.label(), unique);
        if run.synthetic_count() > 0 {
            warn!(synthetic = run.synthetic_count(), "Run includes fallback example listings");
        }

        if let Err(err) = self.history.record(run.clone()).await {
            error!("Failed to persist search history: {:#}", err);
        }
        *self.last_search_at.lock().await = Some(Utc::now());

        info!("Search completed. Found {} unique properties", run.total_found);
        Ok(SearchOutcome::Completed(run))
    }
}

impl SearchOrchestrator {
    /// Listing ids derive from source and discovery millisecond, so stamps are
    /// pushed forward until each one is later than every stamp before it.
    /// Only called while holding the running guard.
    fn stamp_uniquely(&self, listings: &mut [DiscoveredListing]) {
        let mut last = self.last_stamp_ms.load(Ordering::SeqCst);
        for listing in listings {
            let stamp = listing.scraped_at.timestamp_millis();
            if stamp <= last {
                listing.scraped_at = listing.scraped_at + chrono::Duration::milliseconds(last - stamp + 1);
            }
            last = listing.scraped_at.timestamp_millis();
        }
        self.last_stamp_ms.store(last, Ordering::SeqCst);
    }
}

/// Trimmed copy of the location, rejected when either part is blank
pub fn validate_location(location: &Location) -> Result<Location, SearchError> {
    let city = location.city.trim();
    let state = location.state.trim();
    if city.is_empty() || state.is_empty() {
        return Err(SearchError::MissingLocation);
    }
    Ok(Location::new(city, state))
}

/// Clears the running flag when a run ends, however it ends
struct RunningFlag<'a>(&'a AtomicBool);

impl Drop for RunningFlag<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::scrapers::{CraigslistSource, ExtractionSource, SearchTarget, SourceRequest};
    use crate::normalize::to_listing;
    use crate::store::kv::MemoryStore;
    use anyhow::Result;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::Mutex as StdMutex;
    use tokio::sync::Notify;

    /// Answers requests from a closure and remembers what was asked
    pub(crate) struct ScriptedFetcher<F> {
        respond: F,
        pub(crate) seen: StdMutex<Vec<String>>,
    }

    impl<F> ScriptedFetcher<F>
    where
        F: Fn(&SourceRequest) -> Result<String> + Send + Sync,
    {
        pub(crate) fn new(respond: F) -> Self {
            Self {
                respond,
                seen: StdMutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl<F> Fetcher for ScriptedFetcher<F>
    where
        F: Fn(&SourceRequest) -> Result<String> + Send + Sync,
    {
        async fn fetch(&self, request: &SourceRequest) -> Result<String> {
            self.seen.lock().unwrap().push(request.origin_url().to_string());
            (self.respond)(request)
        }
    }

    struct GatedFetcher {
        gate: Arc<Notify>,
    }

    #[async_trait]
    impl Fetcher for GatedFetcher {
        async fn fetch(&self, _request: &SourceRequest) -> Result<String> {
            self.gate.notified().await;
            Ok("[]".to_string())
        }
    }

    pub(crate) fn rent_com() -> Arc<dyn SourceAdapter> {
        Arc::new(ExtractionSource::new(SearchTarget::new(
            "Rent.com",
            "https://www.rent.com",
            "/search",
            &["second chance leasing", "insurent accepted"],
        )))
    }

    fn zillow() -> Arc<dyn SourceAdapter> {
        Arc::new(ExtractionSource::new(SearchTarget::new(
            "Zillow Rentals",
            "https://www.zillow.com",
            "/homes/for_rent",
            &["lease guarantee"],
        )))
    }

    pub(crate) const RIVERSIDE: &str = r#"[{"title": "Riverside - second chance", "address": "12 River Rd", "city": "Austin", "state": "TX", "price": 1000, "bedrooms": 2, "bathrooms": 1}]"#;

    async fn orchestrator(
        sources: Vec<Arc<dyn SourceAdapter>>,
        fetcher: Arc<dyn Fetcher>,
        delay: Duration,
    ) -> SearchOrchestrator {
        let history = Arc::new(SearchHistory::load(Arc::new(MemoryStore::new())).await);
        SearchOrchestrator::new(sources, fetcher, history, delay)
    }

    fn austin() -> Location {
        Location::new("Austin", "TX")
    }

    #[tokio::test]
    async fn zero_queries_complete_with_an_empty_run() {
        let fetcher = Arc::new(ScriptedFetcher::new(|_: &SourceRequest| Ok(String::new())));
        let orchestrator = orchestrator(Vec::new(), fetcher, Duration::ZERO).await;

        let outcome = orchestrator.search(&austin()).await.unwrap();
        let run = outcome.completed().unwrap();
        assert_eq!(run.total_found, 0);
        assert!(run.results.is_empty());
        assert_eq!(run.query, "Austin, TX");
        assert_eq!(orchestrator.history().len().await, 1);
    }

    #[tokio::test]
    async fn blank_location_is_rejected_before_any_request() {
        let fetcher = Arc::new(ScriptedFetcher::new(|_: &SourceRequest| Ok(String::new())));
        let orchestrator = orchestrator(vec![rent_com()], fetcher.clone(), Duration::ZERO).await;

        let err = orchestrator.search(&Location::new("  ", "TX")).await.unwrap_err();
        assert_eq!(err, SearchError::MissingLocation);
        assert!(fetcher.seen.lock().unwrap().is_empty());
        assert!(orchestrator.history().is_empty().await);
    }

    #[tokio::test]
    async fn queries_run_in_configured_order() {
        let fetcher = Arc::new(ScriptedFetcher::new(|_: &SourceRequest| Ok("[]".to_string())));
        let orchestrator = orchestrator(vec![rent_com(), zillow()], fetcher.clone(), Duration::ZERO).await;

        orchestrator.search(&austin()).await.unwrap();

        let seen = fetcher.seen.lock().unwrap().clone();
        assert_eq!(seen.len(), 3);
        assert!(seen[0].contains("rent.com") && seen[0].contains("second+chance+leasing"));
        assert!(seen[1].contains("rent.com") && seen[1].contains("insurent+accepted"));
        assert!(seen[2].contains("zillow.com"));
    }

    #[tokio::test]
    async fn a_failing_query_does_not_abort_the_run() {
        let fetcher = Arc::new(ScriptedFetcher::new(|request: &SourceRequest| {
            if request.origin_url().contains("rent.com") {
                anyhow::bail!("connection reset")
            }
            Ok(RIVERSIDE.to_string())
        }));
        let orchestrator = orchestrator(vec![rent_com(), zillow()], fetcher.clone(), Duration::ZERO).await;

        let outcome = orchestrator.search(&austin()).await.unwrap();
        let run = outcome.completed().unwrap();
        assert_eq!(fetcher.seen.lock().unwrap().len(), 3);
        assert_eq!(run.total_found, 1);
        assert_eq!(run.results[0].source, "Zillow Rentals");
        assert!(!run.results[0].synthetic);
    }

    #[tokio::test]
    async fn duplicates_across_queries_are_collapsed_once() {
        let fetcher = Arc::new(ScriptedFetcher::new(|_: &SourceRequest| Ok(RIVERSIDE.to_string())));
        let orchestrator = orchestrator(vec![rent_com(), zillow()], fetcher, Duration::ZERO).await;

        let outcome = orchestrator.search(&austin()).await.unwrap();
        let run = outcome.completed().unwrap();
        assert_eq!(run.total_found, 1);
        assert_eq!(run.results[0].source, "Rent.com");
        assert_eq!(orchestrator.history().discovered().await.len(), 1);
    }

    #[tokio::test]
    async fn unreadable_extractions_fall_back_to_tagged_examples() {
        let fetcher = Arc::new(ScriptedFetcher::new(|_: &SourceRequest| {
            Ok("Sorry, I cannot browse the web.".to_string())
        }));
        let orchestrator = orchestrator(vec![rent_com()], fetcher, Duration::ZERO).await;

        let outcome = orchestrator.search(&austin()).await.unwrap();
        let run = outcome.completed().unwrap();
        assert_eq!(run.total_found, 3);
        assert_eq!(run.synthetic_count(), 3);
    }

    #[tokio::test]
    async fn html_sources_run_alongside_extraction_sources() {
        let fetcher = Arc::new(ScriptedFetcher::new(|request: &SourceRequest| match request {
            SourceRequest::Page { .. } => Ok(r#"<ol><li class="cl-static-search-result">
                    <a href="https://austin.craigslist.org/apa/1.html"><div class="title">1br rhino ok</div>
                    <div class="price">$800</div><div class="location">Hyde Park</div></a></li></ol>"#
                .to_string()),
            SourceRequest::Extraction { .. } => Ok(RIVERSIDE.to_string()),
        }));
        let craigslist: Arc<dyn SourceAdapter> = Arc::new(CraigslistSource::new(&["rhino"]));
        let orchestrator = orchestrator(vec![zillow(), craigslist], fetcher, Duration::ZERO).await;

        let outcome = orchestrator.search(&austin()).await.unwrap();
        let sources: Vec<_> = outcome
            .completed()
            .unwrap()
            .results
            .iter()
            .map(|l| l.source.clone())
            .collect();
        assert_eq!(sources, vec!["Zillow Rentals", "Craigslist"]);
    }

    #[tokio::test(start_paused = true)]
    async fn requests_are_spaced_by_the_delay() {
        let fetcher = Arc::new(ScriptedFetcher::new(|_: &SourceRequest| Ok("[]".to_string())));
        let orchestrator = orchestrator(vec![rent_com(), zillow()], fetcher, Duration::from_secs(2)).await;

        let started = tokio::time::Instant::now();
        orchestrator.search(&austin()).await.unwrap();
        assert!(started.elapsed() >= Duration::from_secs(4));
        assert!(started.elapsed() < Duration::from_secs(6));
    }

    #[tokio::test]
    async fn second_search_while_running_is_a_no_op() {
        let gate = Arc::new(Notify::new());
        let fetcher = Arc::new(GatedFetcher { gate: gate.clone() });
        let orchestrator = Arc::new(orchestrator(vec![zillow()], fetcher, Duration::ZERO).await);
        let earlier = SearchRun::new("Dallas, TX".to_string(), Vec::new());
        orchestrator.history().record(earlier.clone()).await.unwrap();

        let first = tokio::spawn({
            let orchestrator = orchestrator.clone();
            async move { orchestrator.search(&austin()).await }
        });
        while !orchestrator.is_searching() {
            tokio::task::yield_now().await;
        }

        let second = orchestrator.search(&austin()).await.unwrap();
        assert_eq!(second, SearchOutcome::AlreadyRunning(vec![earlier]));

        gate.notify_one();
        let first = first.await.unwrap().unwrap();
        assert!(first.completed().is_some());
        assert!(!orchestrator.is_searching());
        assert!(orchestrator.last_search_at().await.is_some());
        assert_eq!(orchestrator.history().len().await, 2);
    }

    #[tokio::test]
    async fn listings_keep_distinct_ids_across_queries_and_runs() {
        let fetcher = Arc::new(ScriptedFetcher::new(|request: &SourceRequest| {
            if request.origin_url().contains("second+chance+leasing") {
                return Ok(RIVERSIDE.to_string());
            }
            Ok(r#"[
                {"title": "Oak Flats - Insurent ok", "address": "9 Oak St", "price": 1300, "bedrooms": 1},
                {"title": "Elm Row - Rhino deposit", "address": "4 Elm St", "price": 900, "bedrooms": 1}
            ]"#
            .to_string())
        }));
        let orchestrator = orchestrator(vec![rent_com()], fetcher, Duration::ZERO).await;

        let outcome = orchestrator.search(&austin()).await.unwrap();
        assert_eq!(outcome.completed().unwrap().total_found, 3);
        orchestrator.search(&austin()).await.unwrap();

        let discovered = orchestrator.history().discovered().await;
        let ids: HashSet<_> = discovered.iter().map(|l| to_listing(l).id).collect();
        assert_eq!(discovered.len(), 6);
        assert_eq!(ids.len(), 6);
        assert!(discovered
            .windows(2)
            .all(|pair| pair[0].scraped_at.timestamp_millis() < pair[1].scraped_at.timestamp_millis()));
    }
}
