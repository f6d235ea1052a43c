pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::cli::CliConfig;

pub use crate::adapters::firestore::FirestoreStore;
pub use crate::adapters::memory::MemoryStore;
pub use crate::config::SyncSettings;
pub use crate::core::{fetcher::CsvFetcher, sync::ScoreSync};
pub use crate::utils::error::{Result, SyncError};
