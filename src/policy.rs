//! Interval-growth policy for review scheduling.
//!
//! Pure functions only: no clock, no storage, no randomness. The engine
//! feeds in the previous interval (0 when the card has never been
//! reviewed) and gets back the next interval in seconds.

/// Interval scheduled after a failed recall, regardless of history.
pub const RETRY_SECONDS: i64 = 60;

/// Smallest interval after a successful recall (one day).
pub const RECALL_FLOOR_SECONDS: i64 = 86_400;

/// Smallest interval after an easy recall (four days).
pub const EASY_FLOOR_SECONDS: i64 = 345_600;

/// Hard cap on any interval (365 days).
pub const MAX_INTERVAL_SECONDS: i64 = 31_536_000;

const RECALL_GROWTH: f64 = 1.5;
const EASY_GROWTH: f64 = 2.5;

/// Caller's self-assessment of recall quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rating {
    NoRecall,
    Recall,
    EasyRecall,
}

impl Rating {
    pub fn from_i32(value: i32) -> Option<Self> {
        match value {
            0 => Some(Rating::NoRecall),
            1 => Some(Rating::Recall),
            2 => Some(Rating::EasyRecall),
            _ => None,
        }
    }

    pub fn as_i32(self) -> i32 {
        match self {
            Rating::NoRecall => 0,
            Rating::Recall => 1,
            Rating::EasyRecall => 2,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Rating::NoRecall => "分からない",
            Rating::Recall => "分かる",
            Rating::EasyRecall => "簡単",
        }
    }
}

/// Next interval in seconds for a review with the given rating.
///
/// A failed recall always resets to [`RETRY_SECONDS`], even when the
/// previous interval was much larger. Successful recalls grow the
/// previous interval and never fall below their per-rating floor, so
/// the first review of a card (previous interval 0) lands exactly on
/// the floor.
pub fn next_interval(rating: Rating, previous_interval_seconds: i64) -> i64 {
    match rating {
        Rating::NoRecall => RETRY_SECONDS,
        Rating::Recall => grow(previous_interval_seconds, RECALL_GROWTH, RECALL_FLOOR_SECONDS),
        Rating::EasyRecall => grow(previous_interval_seconds, EASY_GROWTH, EASY_FLOOR_SECONDS),
    }
}

fn grow(previous_interval_seconds: i64, growth: f64, floor: i64) -> i64 {
    // Truncate to whole seconds before the floor comparison
    let proposed = (previous_interval_seconds as f64 * growth) as i64;
    proposed.max(floor).min(MAX_INTERVAL_SECONDS)
}
