pub mod analytics_store;
pub mod credentials;
pub mod journal;
pub mod log_store;

pub use analytics_store::AnalyticsStore;
pub use credentials::{CredentialStore, CredentialStoreError};
pub use journal::{Journal, JournalError};
pub use log_store::LogStore;
