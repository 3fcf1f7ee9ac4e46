use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

mod application;
mod filter;

pub use application::{Application, ApplicationStatus, ApplicationUpdate};
pub use filter::FilterCriteria;

/// Lease guarantee programs a listing can accept
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum GuaranteeType {
    Rhino,
    Insurent,
    Direct,
}

impl GuaranteeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            GuaranteeType::Rhino => "rhino",
            GuaranteeType::Insurent => "insurent",
            GuaranteeType::Direct => "direct",
        }
    }
}

/// City and state a search is scoped to
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Location {
    pub city: String,
    pub state: String,
}

impl Location {
    pub fn new(city: impl Into<String>, state: impl Into<String>) -> Self {
        Self {
            city: city.into(),
            state: state.into(),
        }
    }

    /// "Austin, TX"
    pub fn label(&self) -> String {
        format!("{}, {}", self.city, self.state)
    }
}

/// Canonical listing used for filtering and display, curated or discovered
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: String,
    pub title: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub price: u32,
    pub bedrooms: u32,
    pub bathrooms: f32,
    pub sqft: u32,
    pub images: Vec<String>,
    pub accepts_guarantee: bool,
    pub guarantee_types: Vec<GuaranteeType>,
    pub available_date: String,
    pub description: String,
    pub amenities: Vec<String>,
    pub pet_policy: String,
    pub landlord_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_management: Option<String>,
    pub application_fee: u32,
    pub security_deposit: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_income: Option<u32>,
    pub credit_score_flexible: bool,
    /// Example data shown in place of a failed extraction, not a real listing
    #[serde(default)]
    pub synthetic: bool,
}

/// Raw listing as found by a source, before normalization.
///
/// Appended to the discovery log once per successful extraction and never
/// mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveredListing {
    pub source: String,
    pub source_url: String,
    pub title: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub price: u32,
    pub bedrooms: u32,
    pub bathrooms: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sqft: Option<u32>,
    pub images: Vec<String>,
    pub description: String,
    pub contact_info: String,
    pub scraped_at: DateTime<Utc>,
    pub guarantee_keywords: Vec<String>,
    /// Set on fallback examples substituted for a failed extraction
    #[serde(default)]
    pub synthetic: bool,
}

/// One completed orchestration pass
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchRun {
    pub id: String,
    pub query: String,
    pub results: Vec<DiscoveredListing>,
    pub searched_at: DateTime<Utc>,
    pub total_found: usize,
}

impl SearchRun {
    pub fn new(query: String, results: Vec<DiscoveredListing>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            query,
            total_found: results.len(),
            results,
            searched_at: Utc::now(),
        }
    }

    /// Number of results that came from fallback data rather than a source
    pub fn synthetic_count(&self) -> usize {
        self.results.iter().filter(|r| r.synthetic).count()
    }
}

/// A listing the user bookmarked
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SavedMark {
    pub property_id: String,
    pub saved_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}
