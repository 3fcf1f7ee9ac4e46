pub mod catalog;
pub mod config;
pub mod error;
pub mod models;
pub mod normalize;
pub mod scrapers;
pub mod search;
pub mod store;

pub use config::ScoutConfig;
pub use error::{ConfigError, SearchError, StoreError};
pub use search::{SearchOrchestrator, SearchOutcome};
pub use store::PropertyStore;
