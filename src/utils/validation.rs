use crate::utils::error::{Result, SyncError};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(SyncError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(SyncError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(SyncError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(SyncError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(SyncError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

/// A Firestore collection path alternates collection and document ids and
/// always ends on a collection, so it has an odd number of segments.
pub fn validate_collection_path(field_name: &str, path: &str) -> Result<()> {
    validate_non_empty_string(field_name, path)?;

    let segments: Vec<&str> = path.split('/').collect();
    if segments.iter().any(|s| s.is_empty()) {
        return Err(SyncError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Collection path contains an empty segment".to_string(),
        });
    }
    if segments.len() % 2 == 0 {
        return Err(SyncError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Collection path must end with a collection id".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("csv_url", "https://example.com/scores.csv").is_ok());
        assert!(validate_url("csv_url", "http://example.com").is_ok());
        assert!(validate_url("csv_url", "").is_err());
        assert!(validate_url("csv_url", "invalid-url").is_err());
        assert!(validate_url("csv_url", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("batch_limit", 400, 1, 500).is_ok());
        assert!(validate_range("batch_limit", 0, 1, 500).is_err());
        assert!(validate_range("batch_limit", 501, 1, 500).is_err());
    }

    #[test]
    fn test_validate_collection_path() {
        assert!(validate_collection_path("collection", "players").is_ok());
        assert!(validate_collection_path(
            "collection",
            "artifacts/acm-squid-arena/public/data/players"
        )
        .is_ok());
        assert!(validate_collection_path("collection", "artifacts/acm").is_err());
        assert!(validate_collection_path("collection", "a//b").is_err());
        assert!(validate_collection_path("collection", "  ").is_err());
    }
}
