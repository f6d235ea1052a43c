#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::adapters::firestore::{
    FirestoreOptions, DEFAULT_COLLECTION_PATH, DEFAULT_DATABASE, DEFAULT_PAGE_SIZE,
};
use crate::core::fetcher::DEFAULT_CONTEST_BASE_URL;
use crate::core::writer::{DEFAULT_BATCH_LIMIT, MAX_BATCH_WRITES};
use crate::utils::error::{Result, SyncError};
use crate::utils::validation::{
    validate_collection_path, validate_non_empty_string, validate_range, validate_url, Validate,
};
use toml_config::TomlConfig;

/// Values given on the command line; they win over the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsOverrides {
    pub csv_url: Option<String>,
    pub contest_url: Option<String>,
    pub project_id: Option<String>,
    pub collection_path: Option<String>,
    pub batch_limit: Option<usize>,
    pub dry_run: bool,
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncSettings {
    pub csv_url: Option<String>,
    pub contest_url: Option<String>,
    pub contest_base_url: String,
    pub batch_limit: usize,
    pub dry_run: bool,
    pub firestore: FirestoreOptions,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self::resolve(TomlConfig::default(), SettingsOverrides::default())
    }
}

impl SyncSettings {
    /// Flag, then file, then built-in default.
    pub fn resolve(file: TomlConfig, overrides: SettingsOverrides) -> Self {
        Self {
            csv_url: overrides.csv_url.or(file.source.csv_url),
            contest_url: overrides.contest_url.or(file.source.contest_url),
            contest_base_url: file
                .source
                .contest_base_url
                .unwrap_or_else(|| DEFAULT_CONTEST_BASE_URL.to_string()),
            batch_limit: overrides
                .batch_limit
                .or(file.sync.batch_limit)
                .unwrap_or(DEFAULT_BATCH_LIMIT),
            dry_run: overrides.dry_run,
            firestore: FirestoreOptions {
                project_id: overrides.project_id.or(file.firestore.project_id),
                database: file
                    .firestore
                    .database
                    .unwrap_or_else(|| DEFAULT_DATABASE.to_string()),
                collection_path: overrides
                    .collection_path
                    .or(file.firestore.collection_path)
                    .unwrap_or_else(|| DEFAULT_COLLECTION_PATH.to_string()),
                page_size: file.firestore.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
            },
        }
    }
}

fn reject_placeholder(field: &str, value: &str) -> Result<()> {
    if value.contains("${") {
        return Err(SyncError::ConfigError {
            field: field.to_string(),
            message: format!("unresolved environment placeholder in '{}'", value),
        });
    }
    Ok(())
}

impl Validate for SyncSettings {
    fn validate(&self) -> Result<()> {
        if let Some(url) = &self.csv_url {
            validate_url("csv_url", url)?;
        }
        if let Some(url) = &self.contest_url {
            validate_url("contest_url", url)?;
        }
        validate_url("source.contest_base_url", &self.contest_base_url)?;
        validate_range("batch_limit", self.batch_limit, 1, MAX_BATCH_WRITES)?;

        if let Some(project) = &self.firestore.project_id {
            validate_non_empty_string("firestore.project_id", project)?;
            reject_placeholder("firestore.project_id", project)?;
        }
        validate_non_empty_string("firestore.database", &self.firestore.database)?;
        reject_placeholder("firestore.database", &self.firestore.database)?;
        validate_collection_path("firestore.collection_path", &self.firestore.collection_path)?;
        validate_range("firestore.page_size", self.firestore.page_size, 1, usize::MAX)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::toml_config::{FirestoreSection, SourceSection, SyncSection};

    #[test]
    fn test_defaults() {
        let settings = SyncSettings::default();
        assert_eq!(settings.batch_limit, 400);
        assert_eq!(settings.contest_base_url, DEFAULT_CONTEST_BASE_URL);
        assert_eq!(settings.firestore.collection_path, DEFAULT_COLLECTION_PATH);
        assert_eq!(settings.firestore.database, "(default)");
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_cli_overrides_file() {
        let file = TomlConfig {
            firestore: FirestoreSection {
                project_id: Some("from-file".to_string()),
                collection_path: Some("file_players".to_string()),
                ..FirestoreSection::default()
            },
            source: SourceSection {
                csv_url: Some("https://file.example.com/a.csv".to_string()),
                ..SourceSection::default()
            },
            sync: SyncSection {
                batch_limit: Some(100),
            },
        };
        let overrides = SettingsOverrides {
            project_id: Some("from-cli".to_string()),
            batch_limit: Some(50),
            ..SettingsOverrides::default()
        };

        let settings = SyncSettings::resolve(file, overrides);
        assert_eq!(settings.firestore.project_id.as_deref(), Some("from-cli"));
        assert_eq!(settings.firestore.collection_path, "file_players");
        assert_eq!(settings.batch_limit, 50);
        assert_eq!(
            settings.csv_url.as_deref(),
            Some("https://file.example.com/a.csv")
        );
    }

    #[test]
    fn test_validation_failures() {
        let mut settings = SyncSettings::default();
        settings.batch_limit = 501;
        assert!(settings.validate().is_err());

        let mut settings = SyncSettings::default();
        settings.csv_url = Some("file:///tmp/scores.csv".to_string());
        assert!(settings.validate().is_err());

        let mut settings = SyncSettings::default();
        settings.firestore.project_id = Some("${GCP_PROJECT}".to_string());
        assert!(matches!(
            settings.validate(),
            Err(SyncError::ConfigError { .. })
        ));

        let mut settings = SyncSettings::default();
        settings.firestore.collection_path = "artifacts/acm-squid-arena".to_string();
        assert!(settings.validate().is_err());
    }
}
