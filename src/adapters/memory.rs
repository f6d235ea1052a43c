use crate::domain::model::{PlayerRecord, PlayerWrite};
use crate::domain::ports::PlayerStore;
use crate::utils::error::{Result, SyncError};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Debug, Default)]
struct MemoryState {
    players: BTreeMap<String, PlayerRecord>,
    commits: Vec<usize>,
    commit_attempts: usize,
    fail_on_commit: Option<usize>,
}

/// Map-backed [`PlayerStore`] with Firestore's commit rules: a batch is
/// applied entirely or not at all, and updates require an existing document.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_players(players: impl IntoIterator<Item = PlayerRecord>) -> Self {
        let state = MemoryState {
            players: players.into_iter().map(|p| (p.id.clone(), p)).collect(),
            ..MemoryState::default()
        };
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    pub async fn get(&self, player_id: &str) -> Option<PlayerRecord> {
        self.state.lock().await.players.get(player_id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.state.lock().await.players.len()
    }

    /// Sizes of the successful commits, in order.
    pub async fn commit_sizes(&self) -> Vec<usize> {
        self.state.lock().await.commits.clone()
    }

    /// Makes the `nth` commit attempt (1-based) fail without applying.
    pub async fn fail_on_commit(&self, nth: usize) {
        self.state.lock().await.fail_on_commit = Some(nth);
    }
}

#[async_trait]
impl PlayerStore for MemoryStore {
    async fn list_players(&self) -> Result<Vec<PlayerRecord>> {
        Ok(self.state.lock().await.players.values().cloned().collect())
    }

    async fn commit(&self, writes: &[PlayerWrite]) -> Result<()> {
        let mut state = self.state.lock().await;
        state.commit_attempts += 1;

        if state.fail_on_commit == Some(state.commit_attempts) {
            return Err(SyncError::CommitError {
                status: 503,
                message: "simulated commit failure".to_string(),
            });
        }

        for write in writes {
            if let PlayerWrite::Update(update) = write {
                if !state.players.contains_key(&update.id) {
                    return Err(SyncError::CommitError {
                        status: 404,
                        message: format!("No document to update: {}", update.id),
                    });
                }
            }
        }

        let now = Utc::now();
        for write in writes {
            match write {
                PlayerWrite::Create(player) => {
                    state
                        .players
                        .insert(player.id.clone(), PlayerRecord::from_new(player, Some(now)));
                }
                PlayerWrite::Update(update) => {
                    if let Some(record) = state.players.get_mut(&update.id) {
                        record.previous_scores = update.previous_scores.clone();
                        record.total_score = update.total_score;
                        record.eliminated = update.eliminated;
                        record.last_updated = Some(now);
                    }
                }
            }
        }

        state.commits.push(writes.len());
        Ok(())
    }
}
