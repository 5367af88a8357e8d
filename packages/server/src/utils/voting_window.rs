use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

/// Built-in voting window, used whenever the stored bounds are unusable.
pub const DEFAULT_START: &str = "2026-03-13T00:00:00-05:00";
pub const DEFAULT_END: &str = "2026-04-03T23:59:59-05:00";

/// Where a point in time falls relative to the resolved window.
/// Bounds are inclusive on both ends.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum VotingPhase {
    Before,
    Active,
    Ended,
}

/// The hardcoded default window.
pub fn default_window() -> (DateTime<Utc>, DateTime<Utc>) {
    let start = DateTime::parse_from_rfc3339(DEFAULT_START)
        .expect("valid timestamp")
        .with_timezone(&Utc);
    let end = DateTime::parse_from_rfc3339(DEFAULT_END)
        .expect("valid timestamp")
        .with_timezone(&Utc);
    (start, end)
}

/// Resolve stored bounds to a concrete window.
///
/// Falls back to BOTH defaults when either bound is missing or when
/// `end <= start`, so bad admin input can never leave voting open
/// without bounds.
pub fn resolve_voting_window(
    starts_at: Option<DateTime<Utc>>,
    ends_at: Option<DateTime<Utc>>,
) -> (DateTime<Utc>, DateTime<Utc>) {
    match (starts_at, ends_at) {
        (Some(start), Some(end)) if end > start => (start, end),
        _ => default_window(),
    }
}

/// Classify `now` against a resolved window.
pub fn phase_at(now: DateTime<Utc>, start: DateTime<Utc>, end: DateTime<Utc>) -> VotingPhase {
    if now < start {
        VotingPhase::Before
    } else if now > end {
        VotingPhase::Ended
    } else {
        VotingPhase::Active
    }
}
