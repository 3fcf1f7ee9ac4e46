use crate::models::{DiscoveredListing, SearchRun};
use crate::store::kv::{load_list, save_list, KeyValueStore, SCRAPED_PROPERTIES_KEY, SEARCH_RESULTS_KEY};
use anyhow::Result;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

#[derive(Default)]
struct HistoryState {
    /// Oldest first, as persisted
    runs: Vec<SearchRun>,
    discovered: Vec<DiscoveredListing>,
}

/// Completed search runs and the log of every listing they discovered.
///
/// Only `record` mutates it, and the orchestrator is the only caller.
pub struct SearchHistory {
    state: RwLock<HistoryState>,
    store: Arc<dyn KeyValueStore>,
}

impl SearchHistory {
    /// Reads both collections from the store
    pub async fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let runs: Vec<SearchRun> = load_list(store.as_ref(), SEARCH_RESULTS_KEY).await;
        let discovered: Vec<DiscoveredListing> = load_list(store.as_ref(), SCRAPED_PROPERTIES_KEY).await;
        info!(runs = runs.len(), discovered = discovered.len(), "Loaded search history");

        Self {
            state: RwLock::new(HistoryState { runs, discovered }),
            store,
        }
    }

    /// Appends a run and its listings, then writes both collections.
    ///
    /// The in-memory history keeps the run even if a write fails.
    pub async fn record(&self, run: SearchRun) -> Result<()> {
        let (runs, discovered) = {
            let mut state = self.state.write().await;
            state.discovered.extend(run.results.iter().cloned());
            state.runs.push(run);
            (state.runs.clone(), state.discovered.clone())
        };

        save_list(self.store.as_ref(), SEARCH_RESULTS_KEY, &runs).await?;
        save_list(self.store.as_ref(), SCRAPED_PROPERTIES_KEY, &discovered).await?;
        Ok(())
    }

    /// All runs, most recent first
    pub async fn runs(&self) -> Vec<SearchRun> {
        let mut runs = self.state.read().await.runs.clone();
        runs.sort_by(|a, b| b.searched_at.cmp(&a.searched_at));
        runs
    }

    pub async fn recent(&self, limit: usize) -> Vec<SearchRun> {
        let mut runs = self.runs().await;
        runs.truncate(limit);
        runs
    }

    pub async fn latest(&self) -> Option<SearchRun> {
        self.runs().await.into_iter().next()
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.runs.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Every discovered listing in discovery order
    pub async fn discovered(&self) -> Vec<DiscoveredListing> {
        self.state.read().await.discovered.clone()
    }

    pub async fn discovered_since(&self, cutoff: DateTime<Utc>) -> Vec<DiscoveredListing> {
        self.state
            .read()
            .await
            .discovered
            .iter()
            .filter(|listing| listing.scraped_at > cutoff)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrapers::fallback::example_listings;
    use crate::store::kv::MemoryStore;
    use chrono::Duration;

    fn run_at(query: &str, searched_at: DateTime<Utc>, results: Vec<DiscoveredListing>) -> SearchRun {
        let mut run = SearchRun::new(query.to_string(), results);
        run.searched_at = searched_at;
        run
    }

    #[tokio::test]
    async fn runs_are_listed_most_recent_first() {
        let history = SearchHistory::load(Arc::new(MemoryStore::new())).await;
        let now = Utc::now();
        history.record(run_at("Austin, TX", now - Duration::hours(2), vec![])).await.unwrap();
        history.record(run_at("Dallas, TX", now, vec![])).await.unwrap();
        history.record(run_at("Waco, TX", now - Duration::hours(1), vec![])).await.unwrap();

        let queries: Vec<_> = history.runs().await.into_iter().map(|r| r.query).collect();
        assert_eq!(queries, vec!["Dallas, TX", "Waco, TX", "Austin, TX"]);
        assert_eq!(history.recent(1).await[0].query, "Dallas, TX");
        assert_eq!(history.latest().await.unwrap().query, "Dallas, TX");
    }

    #[tokio::test]
    async fn recorded_runs_survive_reload() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let history = SearchHistory::load(store.clone()).await;
        history
            .record(SearchRun::new("Austin, TX".to_string(), example_listings("Rent.com", "u")))
            .await
            .unwrap();

        let reloaded = SearchHistory::load(store).await;
        assert_eq!(reloaded.len().await, 1);
        assert_eq!(reloaded.discovered().await.len(), 3);
    }

    #[tokio::test]
    async fn discovered_since_filters_by_scrape_time() {
        let history = SearchHistory::load(Arc::new(MemoryStore::new())).await;
        let mut listings = example_listings("Rent.com", "u");
        listings[0].scraped_at = Utc::now() - Duration::days(2);
        history.record(SearchRun::new("Austin, TX".to_string(), listings)).await.unwrap();

        let recent = history.discovered_since(Utc::now() - Duration::hours(24)).await;
        assert_eq!(recent.len(), 2);
    }
}
