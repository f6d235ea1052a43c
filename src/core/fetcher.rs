use crate::domain::model::ScoreSheet;
use crate::utils::error::{Result, SyncError};
use chrono::{Local, NaiveDate};
use csv::StringRecord;
use reqwest::Client;

pub const DEFAULT_CONTEST_BASE_URL: &str = "https://www.hackerrank.com/acmsquidgame";

/// Candidate column names for one logical field, highest priority first.
#[derive(Debug, Clone, Copy)]
pub struct FieldAliases {
    pub field: &'static str,
    pub candidates: &'static [&'static str],
}

pub const PLAYER_ID_COLUMNS: FieldAliases = FieldAliases {
    field: "player_id",
    candidates: &["hackerrank_id", "username", "id"],
};

pub const SCORE_COLUMNS: FieldAliases = FieldAliases {
    field: "score",
    candidates: &["score", "total_score"],
};

impl FieldAliases {
    /// Header positions of the candidates that exist, in priority order.
    pub fn resolve(&self, headers: &StringRecord) -> Vec<usize> {
        self.candidates
            .iter()
            .filter_map(|name| headers.iter().position(|h| h == *name))
            .collect()
    }
}

fn first_non_empty<'r>(record: &'r StringRecord, columns: &[usize]) -> Option<&'r str> {
    columns
        .iter()
        .filter_map(|idx| record.get(*idx))
        .find(|value| !value.is_empty())
}

/// Unparsable or negative scores count as 0.
fn first_score(record: &StringRecord, columns: &[usize]) -> i64 {
    columns
        .iter()
        .filter_map(|idx| record.get(*idx))
        .find_map(|value| value.parse::<i64>().ok().filter(|score| *score >= 0))
        .unwrap_or(0)
}

/// Parses a score CSV with a header row into a [`ScoreSheet`].
pub fn parse_scores(text: &str) -> std::result::Result<ScoreSheet, csv::Error> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers = reader.headers()?.clone();
    let id_columns = PLAYER_ID_COLUMNS.resolve(&headers);
    let score_columns = SCORE_COLUMNS.resolve(&headers);

    if id_columns.is_empty() {
        tracing::warn!(
            "CSV header has none of the {} columns {:?}",
            PLAYER_ID_COLUMNS.field,
            PLAYER_ID_COLUMNS.candidates
        );
    }
    tracing::debug!(?headers, ?id_columns, ?score_columns, "Resolved CSV columns");

    let mut sheet = ScoreSheet::new();
    let mut dropped = 0usize;
    for row in reader.records() {
        let row = row?;
        match first_non_empty(&row, &id_columns) {
            Some(player_id) => sheet.insert(player_id, first_score(&row, &score_columns)),
            None => dropped += 1,
        }
    }

    if dropped > 0 {
        tracing::debug!("Dropped {} CSV rows without a player identifier", dropped);
    }
    Ok(sheet)
}

/// Fetches the score CSV over HTTP.
#[derive(Debug, Clone)]
pub struct CsvFetcher {
    client: Client,
}

impl CsvFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub async fn fetch_scores(&self, url: &str) -> Result<ScoreSheet> {
        let fetch_error = |message: String| SyncError::FetchError {
            url: url.to_string(),
            message,
        };

        tracing::debug!("Requesting CSV: {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| fetch_error(e.to_string()))?;

        tracing::debug!("CSV response status: {}", response.status());
        let response = response
            .error_for_status()
            .map_err(|e| fetch_error(e.to_string()))?;

        let body = response
            .bytes()
            .await
            .map_err(|e| fetch_error(e.to_string()))?;
        let text = String::from_utf8(body.to_vec())
            .map_err(|e| fetch_error(format!("response is not UTF-8: {}", e)))?;

        parse_scores(&text).map_err(|e| fetch_error(format!("malformed CSV: {}", e)))
    }
}

/// `<base>ddmmyyyy`
pub fn contest_url_for(base: &str, date: NaiveDate) -> String {
    format!("{}{}", base, date.format("%d%m%Y"))
}

pub fn todays_contest_url(base: &str) -> String {
    contest_url_for(base, Local::now().date_naive())
}

/// Picks the CSV to sync. Without a CSV URL there is nothing to fetch, since
/// scores are not scraped from the contest page.
pub fn resolve_csv_url(
    csv_url: Option<&str>,
    contest_url: Option<&str>,
    contest_base_url: &str,
) -> Result<String> {
    if let Some(url) = csv_url {
        return Ok(url.to_string());
    }

    let contest_url = contest_url
        .map(str::to_string)
        .unwrap_or_else(|| todays_contest_url(contest_base_url));
    println!("Contest URL: {}", contest_url);
    tracing::warn!("Direct contest scraping not implemented. Please provide --csv-url");
    Err(SyncError::MissingCsvUrlError { contest_url })
}
