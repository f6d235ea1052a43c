use arena_sync::core::fetcher::resolve_csv_url;
use arena_sync::utils::validation::Validate;
use arena_sync::utils::{error::SyncError, logger};
use arena_sync::{CliConfig, CsvFetcher, FirestoreStore, ScoreSync};
use clap::Parser;
use reqwest::Client;

fn fail(e: &SyncError) -> ! {
    tracing::error!("❌ {} (Category: {:?})", e, e.category());
    eprintln!("❌ {}", e);
    eprintln!("💡 {}", e.recovery_suggestion());
    std::process::exit(e.exit_code());
}

#[tokio::main]
async fn main() {
    let config = CliConfig::parse();

    logger::init_cli_logger(config.verbose, config.log_json);
    tracing::info!("Starting arena-sync");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    let settings = match config.load_settings() {
        Ok(settings) => settings,
        Err(e) => fail(&e),
    };
    if let Err(e) = settings.validate() {
        fail(&e);
    }

    let client = Client::new();

    let store = match FirestoreStore::connect(client.clone(), settings.firestore.clone()).await {
        Ok(store) => store,
        Err(e) => fail(&e),
    };
    println!("✓ Firebase initialized");
    tracing::info!(
        "Players collection: {} (project {})",
        store.settings().collection_path,
        store.settings().project_id
    );

    let csv_url = match resolve_csv_url(
        settings.csv_url.as_deref(),
        settings.contest_url.as_deref(),
        &settings.contest_base_url,
    ) {
        Ok(url) => url,
        Err(e) => fail(&e),
    };

    let sync = ScoreSync::new(store, CsvFetcher::new(client))
        .with_batch_limit(settings.batch_limit)
        .with_dry_run(settings.dry_run);

    match sync.run(&csv_url).await {
        Ok(report) => report.print_summary(),
        Err(e) => fail(&e),
    }
}
