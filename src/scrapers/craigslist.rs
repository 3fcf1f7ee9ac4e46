use crate::models::{DiscoveredListing, Location};
use crate::scrapers::keywords::match_keywords;
use crate::scrapers::traits::SourceAdapter;
use crate::scrapers::types::SourceRequest;
use chrono::{DateTime, Duration, Utc};
use reqwest::Url;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, warn};

/// Craigslist apartment search, read straight from the static results page
pub struct CraigslistSource {
    queries: Vec<String>,
}

impl CraigslistSource {
    pub fn new(queries: &[&str]) -> Self {
        Self {
            queries: queries.iter().map(|q| q.to_string()).collect(),
        }
    }

    /// `https://austin.craigslist.org/search/apa?query=...`
    pub fn search_url(query: &str, location: &Location) -> String {
        let subdomain: String = location
            .city
            .to_lowercase()
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        let base = format!("https://{}.craigslist.org/search/apa", subdomain);

        match Url::parse_with_params(&base, &[("query", query)]) {
            Ok(url) => url.to_string(),
            Err(err) => {
                warn!(city = %location.city, error = %err, "Invalid Craigslist search URL");
                base
            }
        }
    }

    fn parse_card(
        card: ElementRef<'_>,
        selectors: &CardSelectors,
        page_url: &str,
        scraped_at: DateTime<Utc>,
    ) -> Option<DiscoveredListing> {
        let title = card
            .select(&selectors.title)
            .next()
            .map(|t| t.text().collect::<String>())
            .or_else(|| card.value().attr("title").map(str::to_string))
            .unwrap_or_default()
            .trim()
            .to_string();

        let keywords = match_keywords(&title);
        if keywords.is_empty() {
            debug!(title = %title, "Skipping listing without guarantee signal");
            return None;
        }

        let price = card
            .select(&selectors.price)
            .next()
            .map(|p| p.text().collect::<String>())
            .and_then(|text| {
                let digits: String = text.chars().filter(|c| c.is_ascii_digit()).collect();
                digits.parse::<u32>().ok()
            })
            .unwrap_or(0);

        let neighborhood = card
            .select(&selectors.location)
            .next()
            .map(|l| l.text().collect::<String>().trim().to_string())
            .unwrap_or_default();

        let url = card
            .select(&selectors.link)
            .next()
            .and_then(|a| a.value().attr("href"))
            .unwrap_or(page_url)
            .to_string();

        Some(DiscoveredListing {
            source: "Craigslist".to_string(),
            source_url: url,
            bedrooms: bedrooms_from_title(&title).unwrap_or(0),
            title: title.clone(),
            address: neighborhood,
            city: String::new(),
            state: String::new(),
            price,
            bathrooms: 0.0,
            sqft: None,
            images: Vec::new(),
            description: title,
            contact_info: String::new(),
            scraped_at,
            guarantee_keywords: keywords.into_iter().map(str::to_string).collect(),
            synthetic: false,
        })
    }
}

impl SourceAdapter for CraigslistSource {
    fn source_name(&self) -> &str {
        "Craigslist"
    }

    fn queries(&self) -> &[String] {
        &self.queries
    }

    fn build_request(&self, query: &str, location: &Location) -> SourceRequest {
        SourceRequest::Page {
            url: Self::search_url(query, location),
        }
    }

    fn parse_response(&self, body: &str, request: &SourceRequest) -> Vec<DiscoveredListing> {
        let Some(selectors) = CardSelectors::new() else {
            warn!("Craigslist selectors failed to compile");
            return Vec::new();
        };

        let document = Html::parse_document(body);
        let cards: Vec<_> = document.select(&selectors.card).collect();
        debug!(cards = cards.len(), "Found Craigslist result cards");

        let scraped_at = Utc::now();
        let listings: Vec<_> = cards
            .into_iter()
            .enumerate()
            .filter_map(|(index, card)| {
                let at = scraped_at + Duration::milliseconds(index as i64);
                Self::parse_card(card, &selectors, request.origin_url(), at)
            })
            .collect();

        info!(relevant = listings.len(), "Parsed Craigslist results");
        listings
    }
}

struct CardSelectors {
    card: Selector,
    title: Selector,
    price: Selector,
    location: Selector,
    link: Selector,
}

impl CardSelectors {
    fn new() -> Option<Self> {
        Some(Self {
            card: Selector::parse("li.cl-static-search-result").ok()?,
            title: Selector::parse("div.title").ok()?,
            price: Selector::parse("div.price").ok()?,
            location: Selector::parse("div.location").ok()?,
            link: Selector::parse("a").ok()?,
        })
    }
}

/// Reads "2br" style bedroom counts out of a posting title
fn bedrooms_from_title(title: &str) -> Option<u32> {
    title
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter_map(|token| token.to_ascii_lowercase().strip_suffix("br").map(str::to_string))
        .find_map(|count| count.parse().ok())
}
