use diesel::connection::SimpleConnection;
use diesel::{Connection, SqliteConnection};

/// Fresh in-memory database with the real migration applied.
pub fn conn() -> SqliteConnection {
    let mut conn =
        SqliteConnection::establish(":memory:").expect("in-memory database should open");
    conn.batch_execute(include_str!(
        "../migrations/2025-06-28-091247_create_review_records/up.sql"
    ))
    .expect("schema migration should apply");
    conn
}
