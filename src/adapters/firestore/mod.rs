pub mod rest;

use crate::adapters::credentials::{
    AccessTokenSource, GoogleCredentials, StaticToken, EMULATOR_HOST_ENV,
};
use crate::domain::model::{NewPlayer, PlayerRecord, PlayerWrite, ScoreUpdate, ScoreWindow};
use crate::domain::ports::PlayerStore;
use crate::utils::error::{Result, SyncError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use rest::{
    CommitRequest, Document, DocumentMask, FieldTransform, ListDocumentsResponse, Precondition,
    Value, Write,
};
use std::collections::BTreeMap;
use std::sync::Arc;

pub const FIRESTORE_API_BASE: &str = "https://firestore.googleapis.com/v1";
pub const DEFAULT_DATABASE: &str = "(default)";
pub const DEFAULT_COLLECTION_PATH: &str = "artifacts/acm-squid-arena/public/data/players";
pub const DEFAULT_PAGE_SIZE: usize = 300;

pub const FIELD_NAME: &str = "name";
pub const FIELD_HACKERRANK_ID: &str = "hackerrank_id";
pub const FIELD_ENROLL_NO: &str = "enroll_no";
pub const FIELD_PREVIOUS_SCORES: &str = "previous_scores";
pub const FIELD_TOTAL_SCORE: &str = "totalScore";
pub const FIELD_ELIMINATED: &str = "eliminated";
pub const FIELD_LAST_UPDATED: &str = "last_updated";

/// Where the player collection lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirestoreSettings {
    pub api_base: String,
    pub project_id: String,
    pub database: String,
    pub collection_path: String,
    pub page_size: usize,
}

/// Connection options before credentials have been resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FirestoreOptions {
    pub project_id: Option<String>,
    pub database: String,
    pub collection_path: String,
    pub page_size: usize,
}

/// Decodes a stored player, defaulting absent fields.
pub fn record_from_document(doc: &Document) -> Result<PlayerRecord> {
    let id = doc.id().ok_or_else(|| SyncError::StoreError {
        message: format!("document without a usable name: {:?}", doc.name),
    })?;

    let string_field = |field: &str| {
        doc.fields
            .get(field)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };

    let previous_scores: Vec<i64> = doc
        .fields
        .get(FIELD_PREVIOUS_SCORES)
        .and_then(Value::as_array)
        .map(|values| values.iter().filter_map(Value::as_i64).collect())
        .unwrap_or_default();

    let last_updated = doc
        .fields
        .get(FIELD_LAST_UPDATED)
        .and_then(Value::as_timestamp)
        .and_then(|ts| DateTime::parse_from_rfc3339(ts).ok())
        .map(|ts| ts.with_timezone(&Utc));

    Ok(PlayerRecord {
        id: id.to_string(),
        name: string_field(FIELD_NAME),
        hackerrank_id: string_field(FIELD_HACKERRANK_ID),
        enroll_no: string_field(FIELD_ENROLL_NO),
        previous_scores: ScoreWindow::from_scores(previous_scores),
        total_score: doc
            .fields
            .get(FIELD_TOTAL_SCORE)
            .and_then(Value::as_i64)
            .unwrap_or(0),
        eliminated: doc
            .fields
            .get(FIELD_ELIMINATED)
            .and_then(Value::as_bool)
            .unwrap_or(false),
        last_updated,
    })
}

fn score_fields(window: &ScoreWindow, total: i64, eliminated: bool) -> BTreeMap<String, Value> {
    BTreeMap::from([
        (
            FIELD_PREVIOUS_SCORES.to_string(),
            Value::integer_array(window.as_slice()),
        ),
        (FIELD_TOTAL_SCORE.to_string(), Value::integer(total)),
        (FIELD_ELIMINATED.to_string(), Value::BooleanValue(eliminated)),
    ])
}

/// Full document write; replaces anything stored under the id.
pub fn create_write(document_name: String, player: &NewPlayer) -> Write {
    let mut fields = score_fields(&player.previous_scores, player.total_score, player.eliminated);
    fields.insert(FIELD_NAME.to_string(), Value::string(&player.name));
    fields.insert(
        FIELD_HACKERRANK_ID.to_string(),
        Value::string(&player.hackerrank_id),
    );
    fields.insert(FIELD_ENROLL_NO.to_string(), Value::string(&player.enroll_no));

    Write {
        update: Document {
            name: document_name,
            fields,
        },
        update_mask: None,
        update_transforms: vec![FieldTransform::request_time(FIELD_LAST_UPDATED)],
        current_document: None,
    }
}

/// Masked write of the score fields; fails if the document is gone.
pub fn update_write(document_name: String, update: &ScoreUpdate) -> Write {
    Write {
        update: Document {
            name: document_name,
            fields: score_fields(&update.previous_scores, update.total_score, update.eliminated),
        },
        update_mask: Some(DocumentMask {
            field_paths: vec![
                FIELD_PREVIOUS_SCORES.to_string(),
                FIELD_TOTAL_SCORE.to_string(),
                FIELD_ELIMINATED.to_string(),
            ],
        }),
        update_transforms: vec![FieldTransform::request_time(FIELD_LAST_UPDATED)],
        current_document: Some(Precondition { exists: true }),
    }
}

/// [`PlayerStore`] over the Firestore REST API.
pub struct FirestoreStore {
    client: Client,
    tokens: Arc<dyn AccessTokenSource>,
    settings: FirestoreSettings,
}

impl FirestoreStore {
    pub fn new(
        client: Client,
        tokens: Arc<dyn AccessTokenSource>,
        settings: FirestoreSettings,
    ) -> Self {
        Self {
            client,
            tokens,
            settings,
        }
    }

    /// Resolves credentials and project id. `FIRESTORE_EMULATOR_HOST` selects
    /// the local emulator instead of Google.
    pub async fn connect(client: Client, options: FirestoreOptions) -> Result<Self> {
        let (tokens, api_base) = match std::env::var(EMULATOR_HOST_ENV) {
            Ok(host) if !host.trim().is_empty() => {
                tracing::info!("Using Firestore emulator at {}", host);
                let tokens: Arc<dyn AccessTokenSource> =
                    Arc::new(StaticToken::emulator(options.project_id.clone()));
                (tokens, format!("http://{}/v1", host.trim()))
            }
            _ => {
                let tokens: Arc<dyn AccessTokenSource> =
                    Arc::new(GoogleCredentials::discover().await?);
                (tokens, FIRESTORE_API_BASE.to_string())
            }
        };

        // Fail during initialization rather than on the first request.
        tokens.access_token().await?;

        let project_id = match options.project_id {
            Some(project) => project,
            None => tokens.project_id().await?,
        };
        tracing::debug!("Firestore project: {}", project_id);

        Ok(Self::new(
            client,
            tokens,
            FirestoreSettings {
                api_base,
                project_id,
                database: options.database,
                collection_path: options.collection_path,
                page_size: options.page_size,
            },
        ))
    }

    pub fn settings(&self) -> &FirestoreSettings {
        &self.settings
    }

    fn documents_path(&self) -> String {
        format!(
            "projects/{}/databases/{}/documents",
            self.settings.project_id, self.settings.database
        )
    }

    pub fn document_name(&self, player_id: &str) -> String {
        format!(
            "{}/{}/{}",
            self.documents_path(),
            self.settings.collection_path,
            player_id
        )
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.settings.api_base.trim_end_matches('/'), path)
    }

    fn encode(&self, write: &PlayerWrite) -> Write {
        let name = self.document_name(write.player_id());
        match write {
            PlayerWrite::Create(player) => create_write(name, player),
            PlayerWrite::Update(update) => update_write(name, update),
        }
    }
}

#[async_trait]
impl PlayerStore for FirestoreStore {
    async fn list_players(&self) -> Result<Vec<PlayerRecord>> {
        let url = self.url(&format!(
            "{}/{}",
            self.documents_path(),
            self.settings.collection_path
        ));
        let token = self.tokens.access_token().await?;
        let page_size = self.settings.page_size.to_string();

        let mut players = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let mut request = self
                .client
                .get(&url)
                .bearer_auth(&token)
                .query(&[("pageSize", page_size.as_str())]);
            if let Some(next) = &page_token {
                request = request.query(&[("pageToken", next.as_str())]);
            }

            let response = request.send().await?;
            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(SyncError::StoreError {
                    message: format!("listing players failed with status {}: {}", status, body),
                });
            }

            let page: ListDocumentsResponse = response.json().await?;
            tracing::debug!("Listed page of {} player documents", page.documents.len());
            for doc in &page.documents {
                players.push(record_from_document(doc)?);
            }

            match page.next_page_token {
                Some(next) if !next.is_empty() => page_token = Some(next),
                _ => break,
            }
        }

        Ok(players)
    }

    async fn commit(&self, writes: &[PlayerWrite]) -> Result<()> {
        if writes.is_empty() {
            return Ok(());
        }

        let body = CommitRequest {
            writes: writes.iter().map(|w| self.encode(w)).collect(),
        };
        let token = self.tokens.access_token().await?;

        let response = self
            .client
            .post(self.url(&format!("{}:commit", self.documents_path())))
            .bearer_auth(&token)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SyncError::CommitError {
                status: status.as_u16(),
                message,
            });
        }

        tracing::debug!("Firestore accepted commit of {} writes", writes.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_from_document_defaults() {
        let doc: Document = serde_json::from_value(json!({
            "name": "projects/p/databases/(default)/documents/players/bob",
            "fields": {
                "name": {"stringValue": "Bob"}
            }
        }))
        .unwrap();

        let record = record_from_document(&doc).unwrap();
        assert_eq!(record.id, "bob");
        assert_eq!(record.name, "Bob");
        assert!(record.previous_scores.is_empty());
        assert_eq!(record.total_score, 0);
        assert!(!record.eliminated);
        assert!(record.last_updated.is_none());
    }

    #[test]
    fn test_record_from_document_full() {
        let doc: Document = serde_json::from_value(json!({
            "name": "projects/p/databases/(default)/documents/players/alice",
            "fields": {
                "name": {"stringValue": "Alice"},
                "hackerrank_id": {"stringValue": "alice"},
                "enroll_no": {"stringValue": "21CS001"},
                "previous_scores": {"arrayValue": {"values": [
                    {"integerValue": "5"}, {"integerValue": "0"}, {"integerValue": "7"}
                ]}},
                "totalScore": {"integerValue": "112"},
                "eliminated": {"booleanValue": false},
                "last_updated": {"timestampValue": "2026-10-13T18:30:00.123456Z"}
            }
        }))
        .unwrap();

        let record = record_from_document(&doc).unwrap();
        assert_eq!(record.enroll_no, "21CS001");
        assert_eq!(record.previous_scores.as_slice(), &[5, 0, 7]);
        assert_eq!(record.total_score, 112);
        assert!(record.last_updated.is_some());
    }

    #[test]
    fn test_update_write_shape() {
        let update = ScoreUpdate {
            id: "alice".to_string(),
            previous_scores: ScoreWindow::from_scores(vec![0, 0, 0]),
            total_score: 9,
            eliminated: true,
        };
        let write = update_write(
            "projects/p/databases/(default)/documents/players/alice".to_string(),
            &update,
        );

        assert_eq!(
            serde_json::to_value(&write).unwrap(),
            json!({
                "update": {
                    "name": "projects/p/databases/(default)/documents/players/alice",
                    "fields": {
                        "eliminated": {"booleanValue": true},
                        "previous_scores": {"arrayValue": {"values": [
                            {"integerValue": "0"}, {"integerValue": "0"}, {"integerValue": "0"}
                        ]}},
                        "totalScore": {"integerValue": "9"}
                    }
                },
                "updateMask": {"fieldPaths": ["previous_scores", "totalScore", "eliminated"]},
                "updateTransforms": [
                    {"fieldPath": "last_updated", "setToServerValue": "REQUEST_TIME"}
                ],
                "currentDocument": {"exists": true}
            })
        );
    }

    #[test]
    fn test_create_write_has_no_mask() {
        let player = NewPlayer::from_first_score("P42", 17);
        let write = create_write("docs/players/P42".to_string(), &player);
        let value = serde_json::to_value(&write).unwrap();

        assert!(value.get("updateMask").is_none());
        assert!(value.get("currentDocument").is_none());
        assert_eq!(value["update"]["fields"]["enroll_no"], json!({"stringValue": "NEW"}));
        assert_eq!(value["update"]["fields"]["name"], json!({"stringValue": "P42"}));
        assert_eq!(value["update"]["fields"]["totalScore"], json!({"integerValue": "17"}));
    }

    #[test]
    fn test_document_name() {
        let store = FirestoreStore::new(
            Client::new(),
            Arc::new(StaticToken::new("t", None)),
            FirestoreSettings {
                api_base: FIRESTORE_API_BASE.to_string(),
                project_id: "arena".to_string(),
                database: DEFAULT_DATABASE.to_string(),
                collection_path: DEFAULT_COLLECTION_PATH.to_string(),
                page_size: DEFAULT_PAGE_SIZE,
            },
        );
        assert_eq!(
            store.document_name("alice"),
            "projects/arena/databases/(default)/documents/artifacts/acm-squid-arena/public/data/players/alice"
        );
    }
}
