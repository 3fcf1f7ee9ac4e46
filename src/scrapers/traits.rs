use crate::models::{DiscoveredListing, Location};
use crate::scrapers::types::SourceRequest;
use anyhow::Result;
use async_trait::async_trait;

/// Common contract for all listing sources.
/// Each source decides how a query becomes a request and how the response
/// text becomes listings; the orchestrator drives them all the same way.
pub trait SourceAdapter: Send + Sync {
    /// Name recorded on every listing this source produces
    fn source_name(&self) -> &str;

    /// Search phrases issued against this source, in order
    fn queries(&self) -> &[String];

    fn build_request(&self, query: &str, location: &Location) -> SourceRequest;

    /// Listings found in the response. Irrelevant records are already dropped.
    fn parse_response(&self, body: &str, request: &SourceRequest) -> Vec<DiscoveredListing>;
}

/// Executes source requests over the network
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Returns the response text: the page body, or the completion text of an
    /// extraction call
    async fn fetch(&self, request: &SourceRequest) -> Result<String>;
}
