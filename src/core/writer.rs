use crate::domain::model::PlayerWrite;
use crate::domain::ports::PlayerStore;
use crate::utils::error::Result;

/// Firestore rejects commits with more writes than this.
pub const MAX_BATCH_WRITES: usize = 500;

pub const DEFAULT_BATCH_LIMIT: usize = 400;

/// Buffers writes and commits them in batches of at most `limit`.
///
/// Batches are independent: a failed commit leaves earlier batches applied and
/// is returned to the caller without touching the rest of the input.
pub struct BatchWriter<'s, S: PlayerStore + ?Sized> {
    store: &'s S,
    limit: usize,
    label: &'static str,
    buffer: Vec<PlayerWrite>,
    committed: usize,
}

impl<'s, S: PlayerStore + ?Sized> BatchWriter<'s, S> {
    pub fn new(store: &'s S, limit: usize, label: &'static str) -> Self {
        let limit = limit.clamp(1, MAX_BATCH_WRITES);
        Self {
            store,
            limit,
            label,
            buffer: Vec::with_capacity(limit),
            committed: 0,
        }
    }

    pub async fn push(&mut self, write: PlayerWrite) -> Result<()> {
        self.buffer.push(write);
        if self.buffer.len() >= self.limit {
            let size = self.buffer.len();
            self.flush().await?;
            println!("Committed batch of {} {}", size, self.label);
        }
        Ok(())
    }

    /// Commits the remainder and returns the number of writes committed.
    pub async fn finish(mut self) -> Result<usize> {
        if !self.buffer.is_empty() {
            let remaining = self.buffer.len();
            self.flush().await?;
            println!("Committed final batch of {} {}", remaining, self.label);
        }
        Ok(self.committed)
    }

    async fn flush(&mut self) -> Result<()> {
        tracing::debug!("Committing {} {} writes", self.buffer.len(), self.label);
        self.store.commit(&self.buffer).await?;
        self.committed += self.buffer.len();
        self.buffer.clear();
        Ok(())
    }
}

/// Writes every item through one [`BatchWriter`].
pub async fn write_all<S, I>(
    store: &S,
    limit: usize,
    label: &'static str,
    writes: I,
) -> Result<usize>
where
    S: PlayerStore + ?Sized,
    I: IntoIterator<Item = PlayerWrite>,
{
    let mut writer = BatchWriter::new(store, limit, label);
    for write in writes {
        writer.push(write).await?;
    }
    writer.finish().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryStore;
    use crate::domain::model::{NewPlayer, PlayerRecord, ScoreUpdate, ScoreWindow};
    use crate::utils::error::SyncError;

    fn seeded_store(count: usize) -> MemoryStore {
        MemoryStore::with_players((0..count).map(|i| {
            PlayerRecord::from_new(&NewPlayer::from_first_score(&format!("p{:04}", i), 1), None)
        }))
    }

    fn update(i: usize) -> PlayerWrite {
        PlayerWrite::Update(ScoreUpdate {
            id: format!("p{:04}", i),
            previous_scores: ScoreWindow::from_scores(vec![1, 2]),
            total_score: 3,
            eliminated: false,
        })
    }

    #[tokio::test]
    async fn test_batches_split_at_limit() {
        let store = seeded_store(850);
        let committed = write_all(&store, 400, "updates", (0..850).map(update))
            .await
            .unwrap();

        assert_eq!(committed, 850);
        assert_eq!(store.commit_sizes().await, vec![400, 400, 50]);
    }

    #[tokio::test]
    async fn test_exact_multiple_has_no_empty_batch() {
        let store = seeded_store(800);
        write_all(&store, 400, "updates", (0..800).map(update))
            .await
            .unwrap();
        assert_eq!(store.commit_sizes().await, vec![400, 400]);
    }

    #[tokio::test]
    async fn test_no_writes_no_commits() {
        let store = MemoryStore::new();
        let committed = write_all(&store, 400, "updates", Vec::<PlayerWrite>::new())
            .await
            .unwrap();
        assert_eq!(committed, 0);
        assert!(store.commit_sizes().await.is_empty());
    }

    #[tokio::test]
    async fn test_limit_is_capped_at_backend_ceiling() {
        let store = seeded_store(600);
        write_all(&store, 10_000, "updates", (0..600).map(update))
            .await
            .unwrap();
        assert_eq!(store.commit_sizes().await, vec![500, 100]);
    }

    #[tokio::test]
    async fn test_failed_batch_keeps_earlier_batches() {
        let store = seeded_store(10);
        store.fail_on_commit(2).await;

        let result = write_all(&store, 4, "updates", (0..10).map(update)).await;

        assert!(matches!(result, Err(SyncError::CommitError { .. })));
        assert_eq!(store.commit_sizes().await, vec![4]);
        let first = store.get("p0000").await.unwrap();
        assert_eq!(first.total_score, 3);
        let unprocessed = store.get("p0009").await.unwrap();
        assert_eq!(unprocessed.total_score, 1);
    }
}
