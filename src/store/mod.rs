//! Persisted user state and the operations the UI layer calls.

pub mod history;
pub mod kv;

pub use history::SearchHistory;
pub use kv::{JsonFileStore, KeyValueStore, MemoryStore};

use crate::catalog::{apply_filters, merge_listings};
use crate::error::StoreError;
use crate::models::{
    Application, ApplicationStatus, ApplicationUpdate, FilterCriteria, Listing, Location, SavedMark,
    SearchRun,
};
use crate::search::{PeriodicSearch, ScheduleHandle, SearchOrchestrator, SearchOutcome};
use chrono::{Duration, Utc};
use kv::{load_list, save_list, APPLICATIONS_KEY, SAVED_PROPERTIES_KEY};
use std::sync::Arc;
use tracing::{info, warn};

/// Curated listings, search results, saved marks, applications and the
/// current filter, behind one handle
pub struct PropertyStore {
    kv: Arc<dyn KeyValueStore>,
    curated: Vec<Listing>,
    orchestrator: Arc<SearchOrchestrator>,
    saved: Vec<SavedMark>,
    applications: Vec<Application>,
    filters: FilterCriteria,
    schedule: Option<ScheduleHandle>,
}

impl PropertyStore {
    pub async fn load(
        kv: Arc<dyn KeyValueStore>,
        curated: Vec<Listing>,
        orchestrator: Arc<SearchOrchestrator>,
    ) -> Self {
        let saved: Vec<SavedMark> = load_list(kv.as_ref(), SAVED_PROPERTIES_KEY).await;
        let applications: Vec<Application> = load_list(kv.as_ref(), APPLICATIONS_KEY).await;
        info!(
            saved = saved.len(),
            applications = applications.len(),
            curated = curated.len(),
            "Loaded property store"
        );

        Self {
            kv,
            curated,
            orchestrator,
            saved,
            applications,
            filters: FilterCriteria::default(),
            schedule: None,
        }
    }

    pub fn history(&self) -> &Arc<SearchHistory> {
        self.orchestrator.history()
    }

    // Saved listings

    /// Marks a listing as saved. Saving again replaces the timestamp and notes.
    pub async fn save_property(&mut self, property_id: &str, notes: Option<String>) -> Result<(), StoreError> {
        self.saved.retain(|mark| mark.property_id != property_id);
        self.saved.push(SavedMark {
            property_id: property_id.to_string(),
            saved_at: Utc::now(),
            notes,
        });
        self.persist_saved().await
    }

    pub async fn unsave_property(&mut self, property_id: &str) -> Result<(), StoreError> {
        let before = self.saved.len();
        self.saved.retain(|mark| mark.property_id != property_id);
        if self.saved.len() == before {
            return Ok(());
        }
        self.persist_saved().await
    }

    pub fn is_saved(&self, property_id: &str) -> bool {
        self.saved.iter().any(|mark| mark.property_id == property_id)
    }

    pub fn saved_marks(&self) -> &[SavedMark] {
        &self.saved
    }

    /// Saved listings in catalog order
    pub async fn saved_listings(&self) -> Vec<Listing> {
        self.all_listings()
            .await
            .into_iter()
            .filter(|listing| self.is_saved(&listing.id))
            .collect()
    }

    // Applications

    /// Opens a draft application, or returns the live one already open for
    /// this listing
    pub async fn start_application(&mut self, property_id: &str) -> Result<String, StoreError> {
        if let Some(existing) = self.live_application_for(property_id) {
            return Ok(existing.id.clone());
        }

        let application = Application::draft(property_id);
        let id = application.id.clone();
        info!(application = %id, property = property_id, "Started application");
        self.applications.push(application);
        self.persist_applications().await?;
        Ok(id)
    }

    pub async fn update_application(&mut self, app_id: &str, update: ApplicationUpdate) -> Result<(), StoreError> {
        let application = self
            .applications
            .iter_mut()
            .find(|app| app.id == app_id)
            .ok_or_else(|| StoreError::UnknownApplication(app_id.to_string()))?;

        if let Some(next) = update.status {
            if !application.status.can_transition_to(next) {
                return Err(StoreError::InvalidTransition {
                    from: application.status,
                    to: next,
                });
            }
        } else if !application.status.is_live() {
            return Err(StoreError::InvalidTransition {
                from: application.status,
                to: application.status,
            });
        }

        if let Some(next) = update.status {
            if next == ApplicationStatus::Submitted && application.submitted_at.is_none() {
                application.submitted_at = Some(Utc::now());
            }
            application.status = next;
        }
        if let Some(guarantee_type) = update.guarantee_type {
            application.guarantee_type = Some(guarantee_type);
        }

        self.persist_applications().await
    }

    /// Soft-deletes: the record stays in history with status `deleted`
    pub async fn remove_application(&mut self, app_id: &str) -> Result<(), StoreError> {
        let application = self
            .applications
            .iter_mut()
            .find(|app| app.id == app_id)
            .ok_or_else(|| StoreError::UnknownApplication(app_id.to_string()))?;

        if application.status == ApplicationStatus::Deleted {
            return Ok(());
        }
        application.status = ApplicationStatus::Deleted;
        self.persist_applications().await
    }

    /// Every application ever started, deleted ones included
    pub fn applications(&self) -> &[Application] {
        &self.applications
    }

    pub fn active_applications(&self) -> Vec<&Application> {
        self.applications.iter().filter(|app| app.status.is_live()).collect()
    }

    pub fn live_application_for(&self, property_id: &str) -> Option<&Application> {
        self.applications
            .iter()
            .find(|app| app.property_id == property_id && app.status.is_live())
    }

    // Web search

    pub async fn search_web(&self, city: &str, state: &str) -> Result<SearchOutcome, StoreError> {
        let outcome = self.orchestrator.search(&Location::new(city, state)).await?;
        if let SearchOutcome::Completed(run) = &outcome {
            info!("Web search completed. Found {} new properties", run.total_found);
        }
        Ok(outcome)
    }

    /// Starts searching on an interval, replacing any schedule already running
    pub fn start_periodic_search(&mut self, city: &str, state: &str, interval_hours: u64) -> Result<(), StoreError> {
        let handle = PeriodicSearch::start(
            self.orchestrator.clone(),
            &Location::new(city, state),
            interval_hours,
        )?;
        if let Some(previous) = self.schedule.replace(handle) {
            previous.cancel();
        }
        info!("Started periodic search for {}, {}", city, state);
        Ok(())
    }

    /// Cancels the schedule; returns whether one was running
    pub fn stop_periodic_search(&mut self) -> bool {
        match self.schedule.take() {
            Some(handle) => {
                handle.cancel();
                info!("Periodic search disabled");
                true
            }
            None => false,
        }
    }

    pub fn is_periodic_search_active(&self) -> bool {
        self.schedule.as_ref().is_some_and(|handle| !handle.is_cancelled())
    }

    pub fn is_searching(&self) -> bool {
        self.orchestrator.is_searching()
    }

    /// Runs, most recent first
    pub async fn search_history(&self) -> Vec<SearchRun> {
        self.history().runs().await
    }

    /// Listings discovered during the last 24 hours
    pub async fn recent_discovery_count(&self) -> usize {
        self.history()
            .discovered_since(Utc::now() - Duration::hours(24))
            .await
            .len()
    }

    // Catalog

    pub async fn all_listings(&self) -> Vec<Listing> {
        let discovered = self.history().discovered().await;
        merge_listings(&self.curated, &discovered)
    }

    pub async fn filtered_listings(&self) -> Vec<Listing> {
        apply_filters(&self.all_listings().await, &self.filters)
    }

    pub fn filters(&self) -> &FilterCriteria {
        &self.filters
    }

    pub fn set_filters(&mut self, filters: FilterCriteria) {
        self.filters = filters;
    }

    async fn persist_saved(&self) -> Result<(), StoreError> {
        save_list(self.kv.as_ref(), SAVED_PROPERTIES_KEY, &self.saved)
            .await
            .map_err(|source| persist_error(SAVED_PROPERTIES_KEY, source))
    }

    async fn persist_applications(&self) -> Result<(), StoreError> {
        save_list(self.kv.as_ref(), APPLICATIONS_KEY, &self.applications)
            .await
            .map_err(|source| persist_error(APPLICATIONS_KEY, source))
    }
}

fn persist_error(key: &'static str, source: anyhow::Error) -> StoreError {
    warn!(key, "Error saving data: {:#}", source);
    StoreError::Persist { key, source }
}
