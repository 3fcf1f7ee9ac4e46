pub mod craigslist;
pub mod extraction;
pub mod fallback;
pub mod http;
pub mod keywords;
pub mod traits;
pub mod types;

pub use craigslist::CraigslistSource;
pub use extraction::ExtractionSource;
pub use http::HttpFetcher;
pub use traits::{Fetcher, SourceAdapter};
pub use types::{SearchTarget, SourceRequest};

use std::sync::Arc;

/// The sites searched by default, in the order they are queried
pub fn default_sources() -> Vec<Arc<dyn SourceAdapter>> {
    vec![
        Arc::new(ExtractionSource::new(SearchTarget::new(
            "Apartments.com",
            "https://www.apartments.com",
            "/search",
            &[
                "second chance rental",
                "bad credit ok",
                "eviction ok",
                "liberty rent accepted",
                "rhino insurance accepted",
                "lease guarantee accepted",
            ],
        ))),
        Arc::new(ExtractionSource::new(SearchTarget::new(
            "Rent.com",
            "https://www.rent.com",
            "/search",
            &[
                "second chance leasing",
                "credit flexible",
                "guarantee programs",
                "insurent accepted",
            ],
        ))),
        Arc::new(ExtractionSource::new(SearchTarget::new(
            "Zillow Rentals",
            "https://www.zillow.com",
            "/homes/for_rent",
            &["second chance rental", "flexible credit", "lease guarantee"],
        ))),
        Arc::new(CraigslistSource::new(&[
            "second chance",
            "bad credit ok",
            "eviction ok",
            "liberty rent",
            "rhino",
            "lease guarantee",
        ])),
    ]
}
