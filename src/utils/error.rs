use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Credential initialization failed: {message}")]
    CredentialError { message: String },

    #[error("Error fetching CSV from {url}: {message}")]
    FetchError { url: String, message: String },

    #[error("No scores found in CSV from {url}")]
    NoScoresError { url: String },

    #[error("No CSV URL provided (contest URL: {contest_url})")]
    MissingCsvUrlError { contest_url: String },

    #[error("Batch commit failed with status {status}: {message}")]
    CommitError { status: u16, message: String },

    #[error("Player store error: {message}")]
    StoreError { message: String },

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error in '{field}': {message}")]
    ConfigError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Credential,
    Source,
    Storage,
    Configuration,
}

impl SyncError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            SyncError::CredentialError { .. } => ErrorCategory::Credential,
            SyncError::FetchError { .. }
            | SyncError::NoScoresError { .. }
            | SyncError::MissingCsvUrlError { .. } => ErrorCategory::Source,
            SyncError::CommitError { .. }
            | SyncError::StoreError { .. }
            | SyncError::HttpError(_)
            | SyncError::SerializationError(_) => ErrorCategory::Storage,
            SyncError::IoError(_)
            | SyncError::ConfigError { .. }
            | SyncError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            SyncError::CredentialError { .. } => {
                "Set FIREBASE_SERVICE_ACCOUNT_KEY to a service account file or configure application default credentials"
            }
            SyncError::FetchError { .. } | SyncError::NoScoresError { .. } => {
                "Check that the CSV URL is reachable and has a hackerrank_id/username/id column"
            }
            SyncError::MissingCsvUrlError { .. } => {
                "Direct contest scraping is not implemented, pass --csv-url"
            }
            SyncError::CommitError { .. } => {
                "Earlier batches were committed; fix the store error and rerun only after checking the data"
            }
            SyncError::StoreError { .. }
            | SyncError::HttpError(_)
            | SyncError::SerializationError(_) => {
                "Check the project id, collection path and network access to Firestore"
            }
            SyncError::IoError(_)
            | SyncError::ConfigError { .. }
            | SyncError::InvalidConfigValueError { .. } => {
                "Check the command line flags and the configuration file"
            }
        }
    }

    /// Every failure path of a sync run exits with 1.
    pub fn exit_code(&self) -> i32 {
        1
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
