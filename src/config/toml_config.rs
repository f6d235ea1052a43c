use crate::utils::error::{Result, SyncError};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub firestore: FirestoreSection,
    #[serde(default)]
    pub source: SourceSection,
    #[serde(default)]
    pub sync: SyncSection,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FirestoreSection {
    pub project_id: Option<String>,
    pub database: Option<String>,
    pub collection_path: Option<String>,
    pub page_size: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceSection {
    pub csv_url: Option<String>,
    pub contest_url: Option<String>,
    pub contest_base_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncSection {
    pub batch_limit: Option<usize>,
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(SyncError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| SyncError::ConfigError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the variable's value; unset variables stay as-is.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| SyncError::ConfigError {
            field: "toml_parsing".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_full_config() {
        let config = TomlConfig::from_toml_str(
            r#"
[firestore]
project_id = "arena-prod"
database = "(default)"
collection_path = "players"
page_size = 100

[source]
contest_base_url = "https://contest.example.com/day"

[sync]
batch_limit = 250
"#,
        )
        .unwrap();

        assert_eq!(config.firestore.project_id.as_deref(), Some("arena-prod"));
        assert_eq!(config.firestore.page_size, Some(100));
        assert_eq!(
            config.source.contest_base_url.as_deref(),
            Some("https://contest.example.com/day")
        );
        assert_eq!(config.sync.batch_limit, Some(250));
    }

    #[test]
    fn test_sections_are_optional() {
        let config = TomlConfig::from_toml_str("[sync]\nbatch_limit = 10\n").unwrap();
        assert_eq!(config.firestore, FirestoreSection::default());
        assert_eq!(config.sync.batch_limit, Some(10));
    }

    #[test]
    fn test_env_substitution() {
        std::env::set_var("ARENA_SYNC_TEST_PROJECT", "from-env");
        let config = TomlConfig::from_toml_str(
            "[firestore]\nproject_id = \"${ARENA_SYNC_TEST_PROJECT}\"\ndatabase = \"${ARENA_SYNC_UNSET_VAR}\"\n",
        )
        .unwrap();

        assert_eq!(config.firestore.project_id.as_deref(), Some("from-env"));
        assert_eq!(
            config.firestore.database.as_deref(),
            Some("${ARENA_SYNC_UNSET_VAR}")
        );
    }

    #[test]
    fn test_invalid_toml() {
        let result = TomlConfig::from_toml_str("[sync\nbatch_limit = ");
        assert!(matches!(result, Err(SyncError::ConfigError { .. })));
    }

    #[test]
    fn test_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("arena-sync.toml");
        std::fs::write(&path, "[source]\ncsv_url = \"https://example.com/day.csv\"\n").unwrap();

        let config = TomlConfig::from_file(&path).unwrap();
        assert_eq!(
            config.source.csv_url.as_deref(),
            Some("https://example.com/day.csv")
        );

        assert!(matches!(
            TomlConfig::from_file(temp_dir.path().join("missing.toml")),
            Err(SyncError::IoError(_))
        ));
    }
}
