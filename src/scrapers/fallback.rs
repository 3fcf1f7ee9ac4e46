use crate::models::DiscoveredListing;
use chrono::{Duration, Utc};
use tracing::info;

/// Example listings substituted when an extraction payload cannot be read.
///
/// Always the same three records, each marked `synthetic` so callers can tell
/// them apart from real results.
pub fn example_listings(source: &str, url: &str) -> Vec<DiscoveredListing> {
    info!(source, "📋 Substituting example listings for unreadable extraction");

    let scraped_at = Utc::now();
    let listing = |index: i64,
                   title: &str,
                   address: &str,
                   price: u32,
                   bedrooms: u32,
                   bathrooms: f32,
                   sqft: u32,
                   image: &str,
                   description: &str,
                   contact: &str,
                   keywords: &[&str]| DiscoveredListing {
        source: source.to_string(),
        source_url: url.to_string(),
        title: title.to_string(),
        address: address.to_string(),
        city: "Austin".to_string(),
        state: "TX".to_string(),
        price,
        bedrooms,
        bathrooms,
        sqft: Some(sqft),
        images: vec![image.to_string()],
        description: description.to_string(),
        contact_info: contact.to_string(),
        scraped_at: scraped_at + Duration::milliseconds(index),
        guarantee_keywords: keywords.iter().map(|k| k.to_string()).collect(),
        synthetic: true,
    };

    vec![
        listing(
            0,
            "Riverside Apartments - Second Chance Leasing Available",
            "1234 River View Dr",
            1250,
            2,
            1.0,
            850,
            "https://images.unsplash.com/photo-1560448204-e02f11c3d0e2?w=400",
            "Beautiful riverside apartment with second chance leasing program. We work with Liberty Rent and Rhino for qualified applicants.",
            "(555) 123-4567",
            &["liberty rent", "rhino", "second chance"],
        ),
        listing(
            1,
            "Downtown Lofts - Bad Credit OK",
            "567 Main Street",
            1450,
            1,
            1.0,
            650,
            "https://images.unsplash.com/photo-1522708323590-d24dbb6b0267?w=400",
            "Modern downtown loft accepting applicants with bad credit. Lease guarantee programs accepted including Insurent and The Guarantors.",
            "(555) 987-6543",
            &["insurent", "the guarantors", "bad credit ok", "lease guarantee"],
        ),
        listing(
            2,
            "Garden View Apartments - Flexible Credit Requirements",
            "890 Garden Lane",
            1100,
            2,
            2.0,
            950,
            "https://images.unsplash.com/photo-1545324418-cc1a3fa10c00?w=400",
            "Spacious apartments with flexible credit requirements. We accept deposit alternatives and work with various guarantee programs.",
            "(555) 456-7890",
            &["flexible credit", "deposit alternative"],
        ),
    ]
}
