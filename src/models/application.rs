use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::GuaranteeType;

/// Lifecycle of a rental application.
///
/// `Draft -> Submitted -> UnderReview -> Approved | Denied`. Any status other
/// than `Deleted` may move to `Deleted`, which is terminal and keeps the record
/// in history.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ApplicationStatus {
    Draft,
    Submitted,
    UnderReview,
    Approved,
    Denied,
    Deleted,
}

impl ApplicationStatus {
    pub fn is_live(&self) -> bool {
        !matches!(self, ApplicationStatus::Deleted)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ApplicationStatus::Approved | ApplicationStatus::Denied | ApplicationStatus::Deleted
        )
    }

    pub fn can_transition_to(&self, next: ApplicationStatus) -> bool {
        use ApplicationStatus::*;

        if *self == next {
            return self.is_live();
        }
        match (self, next) {
            (Deleted, _) => false,
            (_, Deleted) => true,
            (Draft, Submitted) => true,
            (Submitted, UnderReview) => true,
            (UnderReview, Approved) | (UnderReview, Denied) => true,
            _ => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Draft => "draft",
            ApplicationStatus::Submitted => "submitted",
            ApplicationStatus::UnderReview => "under-review",
            ApplicationStatus::Approved => "approved",
            ApplicationStatus::Denied => "denied",
            ApplicationStatus::Deleted => "deleted",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: String,
    pub property_id: String,
    pub status: ApplicationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guarantee_type: Option<GuaranteeType>,
}

impl Application {
    pub fn draft(property_id: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            property_id: property_id.into(),
            status: ApplicationStatus::Draft,
            submitted_at: None,
            guarantee_type: None,
        }
    }
}

/// Partial update applied by `PropertyStore::update_application`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApplicationUpdate {
    pub status: Option<ApplicationStatus>,
    pub guarantee_type: Option<GuaranteeType>,
}
