use anyhow::Context;
use guarantee_scout::models::{Listing, SearchRun};
use guarantee_scout::scrapers::{default_sources, HttpFetcher};
use guarantee_scout::store::{JsonFileStore, KeyValueStore, SearchHistory};
use guarantee_scout::{PropertyStore, ScoutConfig, SearchOrchestrator, SearchOutcome};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ScoutConfig::from_env().context("Failed to load configuration")?;

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();

    info!("🏠 Guarantee Scout - second chance rental search");
    info!("==========================================");

    let kv: Arc<dyn KeyValueStore> = Arc::new(JsonFileStore::open(&config.data_dir).await?);
    let history = Arc::new(SearchHistory::load(kv.clone()).await);
    let fetcher = Arc::new(HttpFetcher::new(config.llm_endpoint.clone(), config.http_timeout)?);
    let orchestrator = Arc::new(SearchOrchestrator::new(
        default_sources(),
        fetcher,
        history,
        config.request_delay,
    ));

    let curated = load_curated(&config.data_dir.join("curated_listings.json")).await?;
    let mut store = PropertyStore::load(kv, curated, orchestrator).await;
    let location = &config.location;

    match config.interval_hours {
        Some(hours) => {
            store.start_periodic_search(&location.city, &location.state, hours)?;
            info!("Searching every {} hours, press Ctrl-C to stop", hours);
            tokio::signal::ctrl_c().await.context("Failed to listen for Ctrl-C")?;
            store.stop_periodic_search();
        }
        None => match store.search_web(&location.city, &location.state).await? {
            SearchOutcome::Completed(run) => print_run(&run),
            SearchOutcome::AlreadyRunning(_) => warn!("Search already in progress"),
        },
    }

    let listings = store.filtered_listings().await;
    info!(
        "📋 {} listings in catalog, {} discovered in the last 24h",
        listings.len(),
        store.recent_discovery_count().await
    );

    Ok(())
}

/// Hand-maintained listings shown ahead of discovered ones
async fn load_curated(path: &Path) -> anyhow::Result<Vec<Listing>> {
    let json = match tokio::fs::read_to_string(path).await {
        Ok(json) => json,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(err).with_context(|| format!("Failed to read {}", path.display())),
    };
    serde_json::from_str(&json).with_context(|| format!("Failed to parse {}", path.display()))
}

fn print_run(run: &SearchRun) {
    info!("\n✅ Found {} properties for {}\n", run.total_found, run.query);

    for (i, listing) in run.results.iter().enumerate() {
        println!("{}. {} (${}/mo)", i + 1, listing.title, listing.price);
        println!("   {} bd, {} ba", listing.bedrooms, listing.bathrooms);
        if !listing.address.is_empty() {
            println!("   Address: {}", listing.address);
        }
        println!("   Source: {}", listing.source);
        println!("   Keywords: {}", listing.guarantee_keywords.join(", "));
        if listing.synthetic {
            println!("   (example listing, extraction failed)");
        }
        println!("   URL: {}", listing.source_url);
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn missing_curated_file_means_no_curated_listings() {
        let temp_dir = TempDir::new().unwrap();
        let curated = load_curated(&temp_dir.path().join("curated_listings.json")).await.unwrap();
        assert!(curated.is_empty());
    }

    #[tokio::test]
    async fn unreadable_curated_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("curated_listings.json");
        tokio::fs::write(&path, "{not json").await.unwrap();

        let err = load_curated(&path).await.unwrap_err();
        assert!(err.to_string().contains("Failed to parse"));

        tokio::fs::write(&path, "[]").await.unwrap();
        assert!(load_curated(&path).await.unwrap().is_empty());
    }
}
