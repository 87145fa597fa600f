use chrono::{DateTime, Duration, Utc};
use diesel::prelude::*;

use crate::data::models::{NewReviewRecord, ReviewError, ReviewRecord};
use crate::data::repositories::ReviewRepository;
use crate::policy::{self, Rating};

/// Result of a review submission: the durable record plus whether it
/// was reused from an earlier submission with the same key.
#[derive(Debug)]
pub struct SubmitOutcome {
    pub record: ReviewRecord,
    pub idempotent: bool,
}

/// The core scheduling engine: turns a client submission into exactly
/// one durable record and answers due-card queries.
pub struct SchedulerEngine<'a> {
    conn: &'a mut SqliteConnection,
}

impl<'a> SchedulerEngine<'a> {
    pub fn new(conn: &'a mut SqliteConnection) -> Self {
        SchedulerEngine { conn }
    }

    /// Record a review and schedule the card's next due time.
    ///
    /// Exactly one record is ever committed per idempotency key: a
    /// retry of a committed submission returns the stored record
    /// unchanged (the original rating stays authoritative even if the
    /// retry disagrees), and a lost insert race is resolved by
    /// re-reading the winner's record. Neither path is an error.
    pub fn submit_review(
        &mut self,
        user_id: &str,
        card_id: &str,
        rating: i32,
        idempotency_key: &str,
        submitted_at: DateTime<Utc>,
    ) -> Result<SubmitOutcome, ReviewError> {
        if user_id.is_empty() || card_id.is_empty() || idempotency_key.is_empty() {
            return Err(ReviewError::Validation(
                "user_id, card_id and idempotency_key must be non-empty".into(),
            ));
        }
        let rating = Rating::from_i32(rating).ok_or_else(|| {
            ReviewError::Validation(format!("rating must be 0, 1 or 2, got {}", rating))
        })?;

        // Fast path: retry of an already-committed submission
        if let Some(existing) =
            ReviewRepository::find_by_idempotency_key(self.conn, idempotency_key)?
        {
            log::info!(
                "idempotent_reuse user_id={} card_id={} idempotency_key={}",
                user_id,
                card_id,
                idempotency_key
            );
            return Ok(SubmitOutcome {
                record: existing,
                idempotent: true,
            });
        }

        let last = ReviewRepository::latest_for_pair(self.conn, user_id, card_id)?;
        let previous_interval = last.as_ref().map_or(0, |r| r.interval_seconds);
        let streak = match rating {
            Rating::NoRecall => 0,
            _ => last.as_ref().map_or(0, |r| r.streak) + 1,
        };

        let interval_seconds = policy::next_interval(rating, previous_interval);
        let next_review_at = (submitted_at + Duration::seconds(interval_seconds)).naive_utc();

        let new_record = NewReviewRecord {
            user_id,
            card_id,
            rating: rating.as_i32(),
            streak,
            interval_seconds,
            next_review_at,
            created_at: Utc::now().naive_utc(),
            idempotency_key,
        };

        let inserted = ReviewRepository::insert_if_absent(self.conn, &new_record)?;
        let record = ReviewRepository::find_by_idempotency_key(self.conn, idempotency_key)?
            .ok_or_else(|| {
                ReviewError::StoreUnavailable(format!(
                    "record for idempotency key {} not readable after insert",
                    idempotency_key
                ))
            })?;

        if inserted {
            log::info!(
                "review_scheduled user_id={} card_id={} interval_seconds={} next_review_utc={}",
                user_id,
                card_id,
                record.interval_seconds,
                record.next_review_at
            );
        } else {
            // A concurrent writer committed the key first; its record wins
            log::info!(
                "idempotent_reuse user_id={} card_id={} idempotency_key={}",
                user_id,
                card_id,
                idempotency_key
            );
        }

        Ok(SubmitOutcome {
            record,
            idempotent: !inserted,
        })
    }

    /// Card ids for this user whose current schedule is due at or
    /// before `until`. Cards never reviewed are never due.
    pub fn due_cards(
        &mut self,
        user_id: &str,
        until: DateTime<Utc>,
    ) -> Result<Vec<String>, ReviewError> {
        if user_id.is_empty() {
            return Err(ReviewError::Validation("user_id must be non-empty".into()));
        }
        Ok(ReviewRepository::due_cards(
            self.conn,
            user_id,
            until.naive_utc(),
        )?)
    }
}
