use crate::models::{DiscoveredListing, FilterCriteria, Listing};
use crate::normalize::to_listing;

/// Curated listings first, then normalized discoveries, each in insertion order
pub fn merge_listings(curated: &[Listing], discovered: &[DiscoveredListing]) -> Vec<Listing> {
    curated
        .iter()
        .cloned()
        .chain(discovered.iter().map(to_listing))
        .collect()
}

/// Listings satisfying every criterion, order preserved
pub fn apply_filters(listings: &[Listing], criteria: &FilterCriteria) -> Vec<Listing> {
    listings
        .iter()
        .filter(|listing| criteria.matches(listing))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GuaranteeType;
    use crate::scrapers::fallback::example_listings;

    fn curated(id: &str, price: u32, bedrooms: u32) -> Listing {
        let mut listing = to_listing(&example_listings("Curated", "u").remove(0));
        listing.id = id.to_string();
        listing.price = price;
        listing.bedrooms = bedrooms;
        listing.bathrooms = 1.0;
        listing.city = "Austin".to_string();
        listing.credit_score_flexible = false;
        listing.guarantee_types = vec![GuaranteeType::Insurent];
        listing.synthetic = false;
        listing
    }

    #[test]
    fn curated_listings_come_before_discovered() {
        let discovered = example_listings("Rent.com", "u");
        let merged = merge_listings(&[curated("c1", 1000, 2), curated("c2", 1100, 1)], &discovered);

        let ids: Vec<_> = merged.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids.len(), 5);
        assert_eq!(&ids[..2], &["c1", "c2"]);
        assert!(ids[2..].iter().all(|id| id.starts_with("scraped-Rent.com-")));
        assert!(ids[2] != ids[3] && ids[3] != ids[4]);
        assert_eq!(merged[2].title, discovered[0].title);
    }

    #[test]
    fn fallback_listings_stay_marked_after_merge() {
        let mut discovered = example_listings("Rent.com", "u");
        discovered[0].synthetic = false;
        let merged = merge_listings(&[curated("c1", 1000, 2)], &discovered);

        let marks: Vec<_> = merged.iter().map(|l| l.synthetic).collect();
        assert_eq!(marks, vec![false, false, true, true]);

        let criteria = FilterCriteria {
            max_price: Some(1500),
            ..Default::default()
        };
        assert_eq!(apply_filters(&merged, &criteria).iter().filter(|l| l.synthetic).count(), 2);
    }

    #[test]
    fn price_and_bedroom_bounds_combine() {
        let listings = vec![curated("cheap", 1000, 2), curated("pricey", 1500, 2)];
        let criteria = FilterCriteria {
            max_price: Some(1200),
            min_bedrooms: Some(2),
            ..Default::default()
        };

        let ids: Vec<_> = apply_filters(&listings, &criteria).into_iter().map(|l| l.id).collect();
        assert_eq!(ids, vec!["cheap"]);
    }

    #[test]
    fn empty_criteria_match_everything() {
        let listings = vec![curated("a", 5000, 0), curated("b", 0, 9)];
        assert_eq!(apply_filters(&listings, &FilterCriteria::default()).len(), 2);
        assert!(FilterCriteria::default().is_empty());
    }

    #[test]
    fn guarantee_types_match_any_requested() {
        let mut rhino = curated("rhino", 1000, 1);
        rhino.guarantee_types = vec![GuaranteeType::Rhino, GuaranteeType::Direct];
        let listings = vec![curated("insurent", 1000, 1), rhino];

        let criteria = FilterCriteria {
            guarantee_types: Some(vec![GuaranteeType::Direct, GuaranteeType::Insurent]),
            ..Default::default()
        };
        assert_eq!(apply_filters(&listings, &criteria).len(), 2);

        let criteria = FilterCriteria {
            guarantee_types: Some(vec![GuaranteeType::Rhino]),
            ..Default::default()
        };
        let ids: Vec<_> = apply_filters(&listings, &criteria).into_iter().map(|l| l.id).collect();
        assert_eq!(ids, vec!["rhino"]);
    }

    #[test]
    fn city_and_credit_flag_narrow_results() {
        let mut dallas = curated("dallas", 1000, 1);
        dallas.city = "Dallas".to_string();
        dallas.credit_score_flexible = true;
        let listings = vec![curated("austin", 1000, 1), dallas];

        let by_city = FilterCriteria {
            city: Some("  dallas ".to_string()),
            ..Default::default()
        };
        assert_eq!(apply_filters(&listings, &by_city)[0].id, "dallas");

        let flexible_only = FilterCriteria {
            credit_score_flexible: Some(true),
            min_bathrooms: Some(1.0),
            ..Default::default()
        };
        let ids: Vec<_> = apply_filters(&listings, &flexible_only).into_iter().map(|l| l.id).collect();
        assert_eq!(ids, vec!["dallas"]);
        assert_eq!(flexible_only.active_count(), 2);
    }

    #[test]
    fn zero_is_a_real_bound() {
        let listings = vec![curated("free", 0, 0), curated("paid", 10, 0)];
        let criteria = FilterCriteria {
            max_price: Some(0),
            ..Default::default()
        };
        assert_eq!(apply_filters(&listings, &criteria).len(), 1);
    }
}
