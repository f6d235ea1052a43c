use crate::domain::model::{NewPlayer, PlayerRecord, ScoreSheet, ScoreUpdate, SyncPlan};
use std::collections::HashSet;

/// Firestore rejects these as document ids.
fn is_valid_document_id(player_id: &str) -> bool {
    !player_id.contains('/') && player_id != "." && player_id != ".."
}

/// Next state of an existing, not eliminated player given today's sheet.
pub fn advance(record: &PlayerRecord, scores: &ScoreSheet) -> ScoreUpdate {
    let today = scores.score_or_zero(&record.id);
    let window = record.previous_scores.pushed(today);
    let eliminated = window.is_exhausted();

    ScoreUpdate {
        id: record.id.clone(),
        previous_scores: window,
        total_score: record.total_score.saturating_add(today),
        eliminated,
    }
}

/// Splits today's sheet against one roster snapshot.
///
/// Creations only come from identifiers absent from `roster` and updates only
/// from `roster`, so no player is both created and updated in one run.
pub fn reconcile(scores: &ScoreSheet, roster: &[PlayerRecord]) -> SyncPlan {
    let stored: HashSet<&str> = roster.iter().map(|r| r.id.as_str()).collect();
    let mut plan = SyncPlan::default();

    for (player_id, score) in scores.iter() {
        if stored.contains(player_id) {
            continue;
        }
        if !is_valid_document_id(player_id) {
            tracing::warn!("Skipping player id that cannot be stored: {:?}", player_id);
            plan.rejected_ids.push(player_id.to_string());
            continue;
        }
        plan.creates.push(NewPlayer::from_first_score(player_id, score));
    }

    for record in roster {
        if record.eliminated {
            plan.skipped_eliminated += 1;
            continue;
        }
        plan.updates.push(advance(record, scores));
    }

    debug_assert!(plan
        .creates
        .iter()
        .all(|p| !stored.contains(p.id.as_str())));

    tracing::debug!(
        "Plan: {} creates, {} updates, {} eliminated skipped",
        plan.creates.len(),
        plan.updates.len(),
        plan.skipped_eliminated
    );
    plan
}
