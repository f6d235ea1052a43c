use crate::core::fetcher::CsvFetcher;
use crate::core::reconciler::reconcile;
use crate::core::writer::{write_all, DEFAULT_BATCH_LIMIT};
use crate::domain::model::{PlayerWrite, ScoreSheet, SyncReport};
use crate::domain::ports::PlayerStore;
use crate::utils::error::{Result, SyncError};

/// One run: fetch the sheet, reconcile it against the stored roster, write.
pub struct ScoreSync<S: PlayerStore> {
    store: S,
    fetcher: CsvFetcher,
    batch_limit: usize,
    dry_run: bool,
}

impl<S: PlayerStore> ScoreSync<S> {
    pub fn new(store: S, fetcher: CsvFetcher) -> Self {
        Self {
            store,
            fetcher,
            batch_limit: DEFAULT_BATCH_LIMIT,
            dry_run: false,
        }
    }

    pub fn with_batch_limit(mut self, batch_limit: usize) -> Self {
        self.batch_limit = batch_limit;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// A failed fetch counts as an empty sheet, so both end in
    /// [`SyncError::NoScoresError`] before the store is touched.
    pub async fn run(&self, csv_url: &str) -> Result<SyncReport> {
        println!("Fetching CSV from: {}", csv_url);
        let scores = match self.fetcher.fetch_scores(csv_url).await {
            Ok(scores) => scores,
            Err(e) => {
                tracing::error!("{}", e);
                eprintln!("Error fetching CSV: {}", e);
                ScoreSheet::new()
            }
        };
        println!("Parsed {} player scores from CSV", scores.len());

        if scores.is_empty() {
            return Err(SyncError::NoScoresError {
                url: csv_url.to_string(),
            });
        }

        let roster = self.store.list_players().await?;
        println!("Processing {} players...", roster.len());

        let plan = reconcile(&scores, &roster);
        let mut report = SyncReport {
            scores_parsed: scores.len(),
            skipped_eliminated: plan.skipped_eliminated,
            newly_eliminated: plan.updates.iter().filter(|u| u.eliminated).count(),
            dry_run: self.dry_run,
            ..SyncReport::default()
        };

        if self.dry_run {
            println!(
                "Dry run: would add {} new players and update {} players",
                plan.creates.len(),
                plan.updates.len()
            );
            report.players_added = plan.creates.len();
            report.players_updated = plan.updates.len();
            return Ok(report);
        }

        if plan.creates.is_empty() {
            println!("No new players to add");
        } else {
            println!("Adding {} new players...", plan.creates.len());
        }
        report.players_added = write_all(
            &self.store,
            self.batch_limit,
            "new players",
            plan.creates.into_iter().map(PlayerWrite::Create),
        )
        .await?;
        if report.players_added > 0 {
            println!("✓ Added {} new players", report.players_added);
        }

        report.players_updated = write_all(
            &self.store,
            self.batch_limit,
            "updates",
            plan.updates.into_iter().map(PlayerWrite::Update),
        )
        .await?;
        println!("✓ Successfully updated {} players", report.players_updated);

        tracing::info!(
            added = report.players_added,
            updated = report.players_updated,
            eliminated_today = report.newly_eliminated,
            skipped_eliminated = report.skipped_eliminated,
            "Sync finished"
        );
        Ok(report)
    }
}

impl SyncReport {
    pub fn print_summary(&self) {
        if self.dry_run {
            println!("\n✓ Dry run complete, nothing written");
        } else {
            println!("\n✓ Sync complete!");
        }
        println!("  - New players added: {}", self.players_added);
        println!("  - Players updated: {}", self.players_updated);
    }
}
