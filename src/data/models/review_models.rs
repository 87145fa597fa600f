use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::{Insertable, Queryable, Selectable};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::schema::review_records;

/// One durable review submission.
///
/// Records are append-only and never updated; the record with the
/// largest `created_at` for a (user, card) pair is that card's current
/// schedule.
#[derive(Debug, Clone, Queryable, Selectable, Serialize)]
#[diesel(table_name = review_records)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ReviewRecord {
    pub record_id: i32,
    pub user_id: String,
    pub card_id: String,
    pub rating: i32,
    pub streak: i32,
    pub interval_seconds: i64,
    pub next_review_at: NaiveDateTime,
    pub created_at: NaiveDateTime,
    pub idempotency_key: String,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = review_records)]
pub struct NewReviewRecord<'a> {
    pub user_id: &'a str,
    pub card_id: &'a str,
    pub rating: i32,
    pub streak: i32,
    pub interval_seconds: i64,
    pub next_review_at: NaiveDateTime,
    pub created_at: NaiveDateTime,
    pub idempotency_key: &'a str,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SubmitReviewRequest {
    #[validate(length(min = 1, message = "user_id must be non-empty"))]
    pub user_id: String,
    #[validate(length(min = 1, message = "card_id must be non-empty"))]
    pub card_id: String,
    #[validate(range(min = 0, max = 2, message = "rating must be 0, 1 or 2"))]
    pub rating: i32,
    #[validate(length(min = 1, max = 64, message = "idempotency_key must be 1-64 characters"))]
    pub idempotency_key: String,
}

#[derive(Debug, Serialize)]
pub struct SubmitReviewResponse {
    pub next_review_utc: String,
    pub next_review_jst: String,
    pub interval_seconds: i64,
    pub rating_label: &'static str,
    pub idempotent: bool,
}

#[derive(Debug, Deserialize)]
pub struct DueCardsQuery {
    pub until: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct DueCardsResponse {
    pub user_id: String,
    pub until_utc: String,
    pub until_jst: String,
    pub card_ids: Vec<String>,
}
