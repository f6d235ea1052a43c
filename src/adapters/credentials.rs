use crate::utils::error::{Result, SyncError};
use async_trait::async_trait;
use gcp_auth::{CustomServiceAccount, TokenProvider};
use std::path::Path;
use std::sync::Arc;

pub const DATASTORE_SCOPE: &str = "https://www.googleapis.com/auth/datastore";

/// Path to a service account JSON file.
pub const SERVICE_ACCOUNT_ENV: &str = "FIREBASE_SERVICE_ACCOUNT_KEY";

pub const EMULATOR_HOST_ENV: &str = "FIRESTORE_EMULATOR_HOST";

/// Bearer token the Firestore emulator accepts for admin access.
pub const EMULATOR_TOKEN: &str = "owner";

#[async_trait]
pub trait AccessTokenSource: Send + Sync {
    async fn access_token(&self) -> Result<String>;

    async fn project_id(&self) -> Result<String>;
}

fn credential_error(context: &str, err: impl std::fmt::Display) -> SyncError {
    SyncError::CredentialError {
        message: format!("{}: {}", context, err),
    }
}

/// Google OAuth credentials for the Firestore API.
pub struct GoogleCredentials {
    provider: Arc<dyn TokenProvider>,
}

impl GoogleCredentials {
    /// Uses the service account named by [`SERVICE_ACCOUNT_ENV`] when that file
    /// exists, application default credentials otherwise.
    pub async fn discover() -> Result<Self> {
        let provider: Arc<dyn TokenProvider> = match std::env::var(SERVICE_ACCOUNT_ENV) {
            Ok(path) if Path::new(&path).exists() => {
                tracing::debug!("Using service account file {}", path);
                let account = CustomServiceAccount::from_file(&path)
                    .map_err(|e| credential_error("invalid service account file", e))?;
                Arc::new(account)
            }
            Ok(path) => {
                tracing::warn!(
                    "{} points to missing file {}, falling back to default credentials",
                    SERVICE_ACCOUNT_ENV,
                    path
                );
                gcp_auth::provider()
                    .await
                    .map_err(|e| credential_error("no default credentials", e))?
            }
            Err(_) => gcp_auth::provider()
                .await
                .map_err(|e| credential_error("no default credentials", e))?,
        };

        Ok(Self { provider })
    }
}

#[async_trait]
impl AccessTokenSource for GoogleCredentials {
    async fn access_token(&self) -> Result<String> {
        let token = self
            .provider
            .token(&[DATASTORE_SCOPE])
            .await
            .map_err(|e| credential_error("failed to obtain access token", e))?;
        Ok(token.as_str().to_string())
    }

    async fn project_id(&self) -> Result<String> {
        let project = self
            .provider
            .project_id()
            .await
            .map_err(|e| credential_error("credentials carry no project id", e))?;
        Ok(project.to_string())
    }
}

/// A fixed token, for the emulator and tests.
#[derive(Debug, Clone)]
pub struct StaticToken {
    token: String,
    project_id: Option<String>,
}

impl StaticToken {
    pub fn new(token: impl Into<String>, project_id: Option<String>) -> Self {
        Self {
            token: token.into(),
            project_id,
        }
    }

    pub fn emulator(project_id: Option<String>) -> Self {
        Self::new(EMULATOR_TOKEN, project_id)
    }
}

#[async_trait]
impl AccessTokenSource for StaticToken {
    async fn access_token(&self) -> Result<String> {
        Ok(self.token.clone())
    }

    async fn project_id(&self) -> Result<String> {
        self.project_id.clone().ok_or_else(|| SyncError::CredentialError {
            message: "no project id configured".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_token() {
        let source = StaticToken::emulator(Some("demo-arena".to_string()));
        assert_eq!(source.access_token().await.unwrap(), EMULATOR_TOKEN);
        assert_eq!(source.project_id().await.unwrap(), "demo-arena");

        let anonymous = StaticToken::new("t", None);
        assert!(matches!(
            anonymous.project_id().await,
            Err(SyncError::CredentialError { .. })
        ));
    }
}
