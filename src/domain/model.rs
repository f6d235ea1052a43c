use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Number of daily scores kept per player.
pub const WINDOW_LEN: usize = 3;

/// Enrollment marker for players created from a CSV, to be corrected by hand.
pub const NEW_ENROLLMENT: &str = "NEW";

/// Today's scores keyed by player identifier. A repeated identifier overwrites
/// the earlier entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScoreSheet {
    scores: BTreeMap<String, i64>,
}

impl ScoreSheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, player_id: impl Into<String>, score: i64) {
        self.scores.insert(player_id.into(), score);
    }

    pub fn get(&self, player_id: &str) -> Option<i64> {
        self.scores.get(player_id).copied()
    }

    /// Score for the day, 0 for players missing from the sheet.
    pub fn score_or_zero(&self, player_id: &str) -> i64 {
        self.get(player_id).unwrap_or(0)
    }

    pub fn contains(&self, player_id: &str) -> bool {
        self.scores.contains_key(player_id)
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.scores.iter().map(|(id, score)| (id.as_str(), *score))
    }
}

impl<S: Into<String>> FromIterator<(S, i64)> for ScoreSheet {
    fn from_iter<I: IntoIterator<Item = (S, i64)>>(iter: I) -> Self {
        let mut sheet = ScoreSheet::new();
        for (id, score) in iter {
            sheet.insert(id, score);
        }
        sheet
    }
}

/// Trailing daily scores, oldest first, never longer than [`WINDOW_LEN`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScoreWindow(Vec<i64>);

impl ScoreWindow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a window from stored scores, keeping only the most recent ones.
    pub fn from_scores(scores: Vec<i64>) -> Self {
        let mut window = Self(scores);
        window.truncate_front();
        window
    }

    pub fn push(&mut self, score: i64) {
        self.0.push(score);
        self.truncate_front();
    }

    pub fn pushed(&self, score: i64) -> Self {
        let mut next = self.clone();
        next.push(score);
        next
    }

    /// Full and all zero.
    pub fn is_exhausted(&self) -> bool {
        self.0.len() == WINDOW_LEN && self.0.iter().all(|s| *s == 0)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[i64] {
        &self.0
    }

    fn truncate_front(&mut self) {
        if self.0.len() > WINDOW_LEN {
            let excess = self.0.len() - WINDOW_LEN;
            self.0.drain(..excess);
        }
    }
}

impl From<Vec<i64>> for ScoreWindow {
    fn from(scores: Vec<i64>) -> Self {
        Self::from_scores(scores)
    }
}

/// A stored player document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    /// Document id, the player's contest identifier.
    pub id: String,
    pub name: String,
    pub hackerrank_id: String,
    pub enroll_no: String,
    pub previous_scores: ScoreWindow,
    pub total_score: i64,
    pub eliminated: bool,
    pub last_updated: Option<DateTime<Utc>>,
}

impl PlayerRecord {
    pub fn from_new(player: &NewPlayer, last_updated: Option<DateTime<Utc>>) -> Self {
        Self {
            id: player.id.clone(),
            name: player.name.clone(),
            hackerrank_id: player.hackerrank_id.clone(),
            enroll_no: player.enroll_no.clone(),
            previous_scores: player.previous_scores.clone(),
            total_score: player.total_score,
            eliminated: player.eliminated,
            last_updated,
        }
    }
}

/// A player seen for the first time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPlayer {
    pub id: String,
    pub name: String,
    pub hackerrank_id: String,
    pub enroll_no: String,
    pub previous_scores: ScoreWindow,
    pub total_score: i64,
    pub eliminated: bool,
}

impl NewPlayer {
    /// Placeholder record: name and enrollment need manual correction.
    pub fn from_first_score(player_id: &str, score: i64) -> Self {
        let mut window = ScoreWindow::new();
        window.push(score);
        Self {
            id: player_id.to_string(),
            name: player_id.to_string(),
            hackerrank_id: player_id.to_string(),
            enroll_no: NEW_ENROLLMENT.to_string(),
            previous_scores: window,
            total_score: score,
            eliminated: false,
        }
    }
}

/// Daily update of an existing, not yet eliminated player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreUpdate {
    pub id: String,
    pub previous_scores: ScoreWindow,
    pub total_score: i64,
    pub eliminated: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerWrite {
    Create(NewPlayer),
    Update(ScoreUpdate),
}

impl PlayerWrite {
    pub fn player_id(&self) -> &str {
        match self {
            PlayerWrite::Create(player) => &player.id,
            PlayerWrite::Update(update) => &update.id,
        }
    }
}

/// Writes computed from one roster snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncPlan {
    pub creates: Vec<NewPlayer>,
    pub updates: Vec<ScoreUpdate>,
    pub skipped_eliminated: usize,
    pub rejected_ids: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub scores_parsed: usize,
    pub players_added: usize,
    pub players_updated: usize,
    pub skipped_eliminated: usize,
    pub newly_eliminated: usize,
    pub dry_run: bool,
}
