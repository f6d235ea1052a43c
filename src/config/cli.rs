use crate::config::toml_config::TomlConfig;
use crate::config::{SettingsOverrides, SyncSettings};
use crate::utils::error::Result;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "arena-sync")]
#[command(about = "Sync daily contest scores into the player database")]
pub struct CliConfig {
    #[arg(long, help = "Custom contest URL (informational, scraping is not implemented)")]
    pub contest_url: Option<String>,

    #[arg(long, help = "Direct CSV URL")]
    pub csv_url: Option<String>,

    #[arg(long, help = "TOML configuration file")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Firestore project id (defaults to the credentials' project)")]
    pub project_id: Option<String>,

    #[arg(long, help = "Firestore collection path holding player documents")]
    pub collection: Option<String>,

    #[arg(long, help = "Writes per commit, at most 500")]
    pub batch_limit: Option<usize>,

    #[arg(long, help = "Fetch and reconcile without writing")]
    pub dry_run: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log as JSON lines")]
    pub log_json: bool,
}

impl CliConfig {
    pub fn overrides(&self) -> SettingsOverrides {
        SettingsOverrides {
            csv_url: self.csv_url.clone(),
            contest_url: self.contest_url.clone(),
            project_id: self.project_id.clone(),
            collection_path: self.collection.clone(),
            batch_limit: self.batch_limit,
            dry_run: self.dry_run,
        }
    }

    pub fn load_settings(&self) -> Result<SyncSettings> {
        let file = match &self.config {
            Some(path) => {
                tracing::debug!("Loading configuration from {}", path.display());
                TomlConfig::from_file(path)?
            }
            None => TomlConfig::default(),
        };
        Ok(SyncSettings::resolve(file, self.overrides()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_flags() {
        let config = CliConfig::parse_from([
            "arena-sync",
            "--csv-url",
            "https://example.com/day.csv",
            "--batch-limit",
            "200",
            "--dry-run",
        ]);
        assert_eq!(config.csv_url.as_deref(), Some("https://example.com/day.csv"));
        assert_eq!(config.batch_limit, Some(200));
        assert!(config.dry_run);
        assert!(config.contest_url.is_none());
    }

    #[test]
    fn test_load_settings_with_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("sync.toml");
        std::fs::write(&path, "[sync]\nbatch_limit = 300\n\n[firestore]\nproject_id = \"arena\"\n")
            .unwrap();

        let config = CliConfig::parse_from([
            "arena-sync".to_string(),
            "--config".to_string(),
            path.to_string_lossy().to_string(),
            "--project-id".to_string(),
            "override".to_string(),
        ]);
        let settings = config.load_settings().unwrap();

        assert_eq!(settings.batch_limit, 300);
        assert_eq!(settings.firestore.project_id.as_deref(), Some("override"));
    }
}
