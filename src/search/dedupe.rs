use crate::models::DiscoveredListing;
use std::collections::HashSet;

/// Drops listings whose address, price and bedroom count repeat an earlier
/// one. First occurrence wins and order is preserved.
///
/// Descriptions and sources are ignored. Listings with an empty address share
/// one bucket per price/bedrooms pair.
pub fn dedupe(listings: Vec<DiscoveredListing>) -> Vec<DiscoveredListing> {
    let mut seen = HashSet::new();
    listings
        .into_iter()
        .filter(|listing| seen.insert(dedupe_key(listing)))
        .collect()
}

fn dedupe_key(listing: &DiscoveredListing) -> (String, u32, u32) {
    let address = listing
        .address
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    (address, listing.price, listing.bedrooms)
}
