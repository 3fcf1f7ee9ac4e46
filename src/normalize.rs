//! Mapping of heterogeneous source records onto the canonical listing shape.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::models::{DiscoveredListing, GuaranteeType, Listing};
use crate::scrapers::keywords::match_keywords;

/// Builds a `DiscoveredListing` from one object of an extraction payload.
///
/// Numeric fields only accept JSON numbers that are finite and non-negative;
/// anything else is treated as absent. The record's guarantee keywords are
/// re-derived with the keyword matcher over its title, description and the
/// keywords the extractor reported, so they are always canonical phrases.
pub fn discovered_from_value(
    value: &Value,
    source: &str,
    source_url: &str,
    scraped_at: DateTime<Utc>,
) -> DiscoveredListing {
    let title = text_field(value, "title");
    let description = text_field(value, "description");
    let reported = string_list(value, "guaranteeKeywords");

    let haystack = format!("{}\n{}\n{}", title, description, reported.join("\n"));
    let guarantee_keywords = match_keywords(&haystack)
        .into_iter()
        .map(str::to_string)
        .collect();

    DiscoveredListing {
        source: source.to_string(),
        source_url: source_url.to_string(),
        title,
        address: text_field(value, "address"),
        city: text_field(value, "city"),
        state: text_field(value, "state"),
        price: whole_number(value, "price").unwrap_or(0),
        bedrooms: whole_number(value, "bedrooms").unwrap_or(0),
        bathrooms: number_field(value, "bathrooms").map(|n| n as f32).unwrap_or(0.0),
        sqft: whole_number(value, "sqft"),
        images: string_list(value, "images"),
        description,
        contact_info: text_field(value, "contactInfo"),
        scraped_at,
        guarantee_keywords,
        synthetic: false,
    }
}

/// Converts a discovered listing into the canonical shape.
///
/// Deterministic in its input: normalizing the same record twice yields equal
/// listings, including the identity.
pub fn to_listing(discovered: &DiscoveredListing) -> Listing {
    Listing {
        id: listing_id(&discovered.source, discovered.scraped_at),
        title: discovered.title.clone(),
        address: discovered.address.clone(),
        city: discovered.city.clone(),
        state: discovered.state.clone(),
        zip_code: String::new(),
        price: discovered.price,
        bedrooms: discovered.bedrooms,
        bathrooms: discovered.bathrooms,
        sqft: discovered.sqft.unwrap_or(0),
        images: discovered.images.clone(),
        accepts_guarantee: true,
        guarantee_types: guarantee_types(&discovered.guarantee_keywords),
        available_date: discovered.scraped_at.format("%Y-%m-%d").to_string(),
        description: discovered.description.clone(),
        amenities: Vec::new(),
        pet_policy: "Contact for details".to_string(),
        landlord_name: discovered.source.clone(),
        property_management: None,
        application_fee: 0,
        security_deposit: discovered.price,
        minimum_income: None,
        credit_score_flexible: true,
        synthetic: discovered.synthetic,
    }
}

/// `scraped-<source>-<epoch millis>`
pub fn listing_id(source: &str, scraped_at: DateTime<Utc>) -> String {
    format!("scraped-{}-{}", source, scraped_at.timestamp_millis())
}

/// Maps matched guarantee phrases onto program tags, first-seen order, no
/// duplicates.
pub fn guarantee_types<S: AsRef<str>>(keywords: &[S]) -> Vec<GuaranteeType> {
    let mut types = Vec::new();
    for keyword in keywords {
        let keyword = keyword.as_ref().to_lowercase();
        let tag = if keyword.contains("rhino") {
            GuaranteeType::Rhino
        } else if keyword.contains("insurent") {
            GuaranteeType::Insurent
        } else {
            GuaranteeType::Direct
        };
        if !types.contains(&tag) {
            types.push(tag);
        }
    }
    types
}

fn text_field(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

fn number_field(value: &Value, key: &str) -> Option<f64> {
    value
        .get(key)
        .and_then(Value::as_f64)
        .filter(|n| n.is_finite() && *n >= 0.0)
}

fn whole_number(value: &Value, key: &str) -> Option<u32> {
    number_field(value, key).map(|n| n.round().min(u32::MAX as f64) as u32)
}

fn string_list(value: &Value, key: &str) -> Vec<String> {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
