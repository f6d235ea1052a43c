use crate::domain::model::{PlayerRecord, PlayerWrite};
use crate::utils::error::Result;
use async_trait::async_trait;

/// The document database holding one record per player.
#[async_trait]
pub trait PlayerStore: Send + Sync {
    /// Every stored player, eliminated ones included.
    async fn list_players(&self) -> Result<Vec<PlayerRecord>>;

    /// Applies all writes atomically. The store stamps `last_updated`.
    async fn commit(&self, writes: &[PlayerWrite]) -> Result<()>;
}

