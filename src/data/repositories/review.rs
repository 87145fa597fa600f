use chrono::NaiveDateTime;
use diesel::prelude::*;
use diesel::sql_types::{Text, Timestamp};

use crate::data::models::{NewReviewRecord, ReviewRecord};
use crate::schema::review_records;

/// Store primitives for the append-only review log.
///
/// All atomicity lives here: the idempotency-key uniqueness constraint
/// makes `insert_if_absent` the single race arbiter, and the latest
/// record per pair is always recomputed on read.
pub struct ReviewRepository;

#[derive(QueryableByName)]
struct DueRow {
    #[diesel(sql_type = Text)]
    card_id: String,
}

impl ReviewRepository {
    /// Insert a record unless its idempotency key is already taken.
    ///
    /// Returns `false` when another writer committed the key first; the
    /// caller re-reads the winning record in that case.
    pub fn insert_if_absent(
        conn: &mut SqliteConnection,
        record: &NewReviewRecord,
    ) -> Result<bool, diesel::result::Error> {
        let inserted = diesel::insert_into(review_records::table)
            .values(record)
            .on_conflict(review_records::idempotency_key)
            .do_nothing()
            .execute(conn)?;
        Ok(inserted > 0)
    }

    pub fn find_by_idempotency_key(
        conn: &mut SqliteConnection,
        key: &str,
    ) -> Result<Option<ReviewRecord>, diesel::result::Error> {
        review_records::table
            .filter(review_records::idempotency_key.eq(key))
            .first::<ReviewRecord>(conn)
            .optional()
    }

    /// Latest record for a (user, card) pair, i.e. the card's current
    /// schedule. `record_id` breaks `created_at` ties.
    pub fn latest_for_pair(
        conn: &mut SqliteConnection,
        user_id: &str,
        card_id: &str,
    ) -> Result<Option<ReviewRecord>, diesel::result::Error> {
        review_records::table
            .filter(review_records::user_id.eq(user_id))
            .filter(review_records::card_id.eq(card_id))
            .order_by(review_records::created_at.desc())
            .then_order_by(review_records::record_id.desc())
            .first::<ReviewRecord>(conn)
            .optional()
    }

    /// Card ids for a user whose current schedule is due at or before
    /// `until`, boundary inclusive. Only each pair's latest record
    /// counts; earlier records for the same card are ignored.
    pub fn due_cards(
        conn: &mut SqliteConnection,
        user_id: &str,
        until: NaiveDateTime,
    ) -> Result<Vec<String>, diesel::result::Error> {
        // SQLite resolves bare columns next to MAX() to the row that
        // holds the maximum, which picks each card's latest record.
        let rows = diesel::sql_query(
            "SELECT card_id FROM ( \
                SELECT card_id, next_review_at, MAX(created_at) AS created_at \
                FROM review_records WHERE user_id = ? GROUP BY card_id \
            ) WHERE next_review_at <= ?",
        )
        .bind::<Text, _>(user_id)
        .bind::<Timestamp, _>(until)
        .load::<DueRow>(conn)?;

        Ok(rows.into_iter().map(|row| row.card_id).collect())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveDate};

    use super::*;
    use crate::test_support;

    fn record_at<'a>(
        user_id: &'a str,
        card_id: &'a str,
        key: &'a str,
        created_at: NaiveDateTime,
        next_review_at: NaiveDateTime,
    ) -> NewReviewRecord<'a> {
        NewReviewRecord {
            user_id,
            card_id,
            rating: 2,
            streak: 1,
            interval_seconds: 345_600,
            next_review_at,
            created_at,
            idempotency_key: key,
        }
    }

    fn base_time() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 7, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_insert_if_absent_rejects_duplicate_key() {
        let mut conn = test_support::conn();
        let t = base_time();

        let first = record_at("u1", "c1", "key-1", t, t + Duration::days(4));
        assert!(ReviewRepository::insert_if_absent(&mut conn, &first).unwrap());

        let second = record_at("u1", "c2", "key-1", t, t + Duration::days(1));
        assert!(!ReviewRepository::insert_if_absent(&mut conn, &second).unwrap());

        // The first writer's record is untouched
        let stored = ReviewRepository::find_by_idempotency_key(&mut conn, "key-1")
            .unwrap()
            .unwrap();
        assert_eq!(stored.card_id, "c1");
    }

    #[test]
    fn test_find_by_idempotency_key_missing() {
        let mut conn = test_support::conn();
        assert!(ReviewRepository::find_by_idempotency_key(&mut conn, "nope")
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_latest_for_pair_picks_newest_record() {
        let mut conn = test_support::conn();
        let t = base_time();

        let older = record_at("u1", "c1", "key-a", t, t + Duration::days(4));
        let newer = record_at("u1", "c1", "key-b", t + Duration::seconds(5), t + Duration::days(10));
        ReviewRepository::insert_if_absent(&mut conn, &older).unwrap();
        ReviewRepository::insert_if_absent(&mut conn, &newer).unwrap();

        let latest = ReviewRepository::latest_for_pair(&mut conn, "u1", "c1")
            .unwrap()
            .unwrap();
        assert_eq!(latest.idempotency_key, "key-b");

        assert!(ReviewRepository::latest_for_pair(&mut conn, "u1", "c2")
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_due_cards_uses_only_latest_record_per_pair() {
        let mut conn = test_support::conn();
        let t = base_time();

        // c1: an old due record superseded by one far in the future
        let superseded = record_at("u1", "c1", "key-1", t, t + Duration::seconds(60));
        let current = record_at("u1", "c1", "key-2", t + Duration::seconds(5), t + Duration::days(30));
        ReviewRepository::insert_if_absent(&mut conn, &superseded).unwrap();
        ReviewRepository::insert_if_absent(&mut conn, &current).unwrap();

        // c2: one record, due soon
        let due = record_at("u1", "c2", "key-3", t, t + Duration::seconds(60));
        ReviewRepository::insert_if_absent(&mut conn, &due).unwrap();

        let card_ids =
            ReviewRepository::due_cards(&mut conn, "u1", t + Duration::minutes(2)).unwrap();
        assert_eq!(card_ids, vec!["c2".to_string()]);
    }

    #[test]
    fn test_due_cards_boundary_is_inclusive() {
        let mut conn = test_support::conn();
        let t = base_time();
        let due_at = t + Duration::seconds(60);

        let record = record_at("u1", "c1", "key-1", t, due_at);
        ReviewRepository::insert_if_absent(&mut conn, &record).unwrap();

        assert_eq!(
            ReviewRepository::due_cards(&mut conn, "u1", due_at).unwrap(),
            vec!["c1".to_string()]
        );
        assert!(ReviewRepository::due_cards(&mut conn, "u1", due_at - Duration::seconds(1))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_due_cards_scoped_to_user() {
        let mut conn = test_support::conn();
        let t = base_time();

        let record = record_at("u1", "c1", "key-1", t, t + Duration::seconds(60));
        ReviewRepository::insert_if_absent(&mut conn, &record).unwrap();

        assert!(ReviewRepository::due_cards(&mut conn, "u2", t + Duration::days(1))
            .unwrap()
            .is_empty());
    }
}
