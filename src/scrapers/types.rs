use serde::{Deserialize, Serialize};

/// A listing site searched through its public search page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchTarget {
    pub name: String,
    pub base_url: String,
    pub search_path: String,
    pub search_queries: Vec<String>,
}

impl SearchTarget {
    pub fn new(name: &str, base_url: &str, search_path: &str, queries: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            base_url: base_url.to_string(),
            search_path: search_path.to_string(),
            search_queries: queries.iter().map(|q| q.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// What a source wants fetched for one query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceRequest {
    /// Plain GET of a listing page
    Page { url: String },
    /// Ask the extraction endpoint to read `page_url` and return listings as JSON
    Extraction {
        page_url: String,
        messages: Vec<ChatMessage>,
    },
}

impl SourceRequest {
    /// The listing page this request is about
    pub fn origin_url(&self) -> &str {
        match self {
            SourceRequest::Page { url } => url,
            SourceRequest::Extraction { page_url, .. } => page_url,
        }
    }
}
