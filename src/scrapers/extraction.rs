use crate::models::{DiscoveredListing, Location};
use crate::normalize::discovered_from_value;
use crate::scrapers::fallback;
use crate::scrapers::keywords::GUARANTEE_KEYWORDS;
use crate::scrapers::traits::SourceAdapter;
use crate::scrapers::types::{ChatMessage, SearchTarget, SourceRequest};
use chrono::{Duration, Utc};
use reqwest::Url;
use serde_json::Value;
use tracing::{debug, info, warn};

const SYSTEM_PROMPT: &str = "You are a web scraping assistant that extracts rental property information from website content. Focus only on properties that accept second chance leasing or lease guarantee programs. Return ONLY valid JSON, no explanatory text.";

/// Source whose search page is read by the extraction endpoint, which answers
/// with a JSON array of listings
pub struct ExtractionSource {
    target: SearchTarget,
}

impl ExtractionSource {
    pub fn new(target: SearchTarget) -> Self {
        Self { target }
    }

    /// Search page URL for one query, e.g.
    /// `https://www.rent.com/search?q=insurent+accepted+Austin+TX&location=Austin%2C+TX`
    pub fn search_url(&self, query: &str, location: &Location) -> String {
        let base = format!("{}{}", self.target.base_url, self.target.search_path);
        let q = format!("{} {} {}", query, location.city, location.state);
        let label = location.label();
        let params = [("q", q.as_str()), ("location", label.as_str())];

        match Url::parse_with_params(&base, &params) {
            Ok(url) => url.to_string(),
            Err(err) => {
                warn!(site = %self.target.name, error = %err, "Invalid search base URL");
                base
            }
        }
    }

    fn user_prompt(page_url: &str) -> String {
        format!(
            r#"Please fetch and analyze this URL for rental properties that accept second chance leasing: {page_url}

Analyze this rental property website page and extract any rental listings that mention second chance leasing, lease guarantees, or flexible credit requirements.

Look for properties that mention any of these keywords: {keywords}

For each property found, extract:
- Title/name of the property
- Address (street, city, state)
- Price (monthly rent)
- Bedrooms and bathrooms
- Square footage (if available)
- Description text
- Contact information (phone, email, or website)
- Any images URLs
- Which guarantee keywords were mentioned

Return ONLY a valid JSON array of properties. If no relevant properties are found, return an empty array [].
Do not include any explanatory text, just the JSON array.

Example format:
[
  {{
    "title": "Property Name",
    "address": "123 Main St",
    "city": "Austin",
    "state": "TX",
    "price": 1200,
    "bedrooms": 2,
    "bathrooms": 1,
    "sqft": 800,
    "description": "Property description...",
    "contactInfo": "555-123-4567 or email@example.com",
    "images": ["https://example.com/image1.jpg"],
    "guaranteeKeywords": ["second chance", "bad credit ok"]
  }}
]"#,
            keywords = GUARANTEE_KEYWORDS.join(", "),
        )
    }
}

impl SourceAdapter for ExtractionSource {
    fn source_name(&self) -> &str {
        &self.target.name
    }

    fn queries(&self) -> &[String] {
        &self.target.search_queries
    }

    fn build_request(&self, query: &str, location: &Location) -> SourceRequest {
        let page_url = self.search_url(query, location);
        let messages = vec![
            ChatMessage::system(SYSTEM_PROMPT),
            ChatMessage::user(Self::user_prompt(&page_url)),
        ];
        SourceRequest::Extraction { page_url, messages }
    }

    fn parse_response(&self, body: &str, request: &SourceRequest) -> Vec<DiscoveredListing> {
        let source = self.source_name();
        let url = request.origin_url();
        debug!(source, response_length = body.len(), "Parsing extraction response");

        let Some(records) = parse_payload(body) else {
            warn!(source, url, "No readable JSON array in extraction response");
            return fallback::example_listings(source, url);
        };

        // Identities derive from the scrape time, so each record gets its own millisecond
        let scraped_at = Utc::now();
        let total = records.len();
        let listings: Vec<_> = records
            .iter()
            .enumerate()
            .map(|(index, record)| {
                let at = scraped_at + Duration::milliseconds(index as i64);
                discovered_from_value(record, source, url, at)
            })
            .filter(|listing| !listing.guarantee_keywords.is_empty())
            .collect();

        info!(source, parsed = total, relevant = listings.len(), "Extraction parsed");
        listings
    }
}

/// Reads the listing objects out of a completion.
///
/// Markdown code fences are removed, then only the first top-level `[...]` is
/// parsed. `None` when there is no array or it is not valid JSON.
pub fn parse_payload(text: &str) -> Option<Vec<Value>> {
    let cleaned = strip_code_fences(text.trim());
    let array = first_json_array(&cleaned)?;
    serde_json::from_str::<Vec<Value>>(array).ok()
}

fn strip_code_fences(text: &str) -> String {
    text.replace("```json", "").replace("```", "")
}

/// Slice of `text` from the first `[` to its matching `]`, ignoring brackets
/// inside JSON strings
fn first_json_array(text: &str) -> Option<&str> {
    let start = text.find('[')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}
