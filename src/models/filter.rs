use serde::{Deserialize, Serialize};

use super::{GuaranteeType, Listing};

/// User-selected bounds over the listing catalog.
///
/// Every defined criterion must hold. An all-`None` value matches everything.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FilterCriteria {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_price: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_bedrooms: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_bathrooms: Option<f32>,
    /// Matches when the listing accepts any of these
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guarantee_types: Option<Vec<GuaranteeType>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credit_score_flexible: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
}

impl FilterCriteria {
    pub fn matches(&self, listing: &Listing) -> bool {
        if let Some(max_price) = self.max_price {
            if listing.price > max_price {
                return false;
            }
        }
        if let Some(min_bedrooms) = self.min_bedrooms {
            if listing.bedrooms < min_bedrooms {
                return false;
            }
        }
        if let Some(min_bathrooms) = self.min_bathrooms {
            if listing.bathrooms < min_bathrooms {
                return false;
            }
        }
        if let Some(flexible) = self.credit_score_flexible {
            if listing.credit_score_flexible != flexible {
                return false;
            }
        }
        if let Some(city) = self.city.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
            if !listing.city.trim().eq_ignore_ascii_case(city) {
                return false;
            }
        }
        if let Some(wanted) = self.guarantee_types.as_ref().filter(|t| !t.is_empty()) {
            if !wanted.iter().any(|t| listing.guarantee_types.contains(t)) {
                return false;
            }
        }
        true
    }

    /// Number of criteria currently constraining the catalog
    pub fn active_count(&self) -> usize {
        [
            self.max_price.is_some(),
            self.min_bedrooms.is_some(),
            self.min_bathrooms.is_some(),
            self.guarantee_types.as_ref().is_some_and(|t| !t.is_empty()),
            self.credit_score_flexible.is_some(),
            self.city.as_deref().is_some_and(|c| !c.trim().is_empty()),
        ]
        .into_iter()
        .filter(|set| *set)
        .count()
    }

    pub fn is_empty(&self) -> bool {
        self.active_count() == 0
    }
}
