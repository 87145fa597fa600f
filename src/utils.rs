use chrono::{FixedOffset, NaiveDateTime};

const JST_OFFSET_SECONDS: i32 = 9 * 3600;

/// RFC 3339 rendering of a stored UTC timestamp.
pub fn to_utc_iso(value: NaiveDateTime) -> String {
    value.and_utc().to_rfc3339()
}

/// Same instant rendered in JST, for the user-facing mirror fields.
pub fn to_jst_iso(value: NaiveDateTime) -> String {
    let jst = FixedOffset::east_opt(JST_OFFSET_SECONDS).expect("JST offset is in range");
    value.and_utc().with_timezone(&jst).to_rfc3339()
}
