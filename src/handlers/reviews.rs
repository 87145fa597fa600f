use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Router,
};
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    data::models::{
        DueCardsQuery, DueCardsResponse, ReviewError, SubmitReviewRequest, SubmitReviewResponse,
    },
    policy::Rating,
    scheduler::SchedulerEngine,
    utils, DbPool,
};

#[axum::debug_handler]
pub async fn submit_review(
    State(pool): State<DbPool>,
    Json(payload): Json<SubmitReviewRequest>,
) -> Result<(StatusCode, Json<SubmitReviewResponse>), ReviewError> {
    let request_id = Uuid::new_v4();
    payload.validate()?;

    log::info!(
        "review_received request_id={} user_id={} card_id={} rating={} idempotency_key={}",
        request_id,
        payload.user_id,
        payload.card_id,
        payload.rating,
        payload.idempotency_key
    );

    let mut conn = pool.get()?;
    let outcome = SchedulerEngine::new(&mut conn).submit_review(
        &payload.user_id,
        &payload.card_id,
        payload.rating,
        &payload.idempotency_key,
        Utc::now(),
    )?;

    let status = if outcome.idempotent {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    let record = outcome.record;
    let rating_label = Rating::from_i32(record.rating).map_or("unknown", Rating::label);

    log::info!(
        "review_api_response request_id={} user_id={} card_id={} idempotent={} interval_seconds={} next_review_utc={} status={}",
        request_id,
        record.user_id,
        record.card_id,
        outcome.idempotent,
        record.interval_seconds,
        record.next_review_at,
        status.as_u16()
    );

    Ok((
        status,
        Json(SubmitReviewResponse {
            next_review_utc: utils::to_utc_iso(record.next_review_at),
            next_review_jst: utils::to_jst_iso(record.next_review_at),
            interval_seconds: record.interval_seconds,
            rating_label,
            idempotent: outcome.idempotent,
        }),
    ))
}

#[axum::debug_handler]
pub async fn due_cards(
    State(pool): State<DbPool>,
    Path(user_id): Path<String>,
    Query(query): Query<DueCardsQuery>,
) -> Result<Json<DueCardsResponse>, ReviewError> {
    let request_id = Uuid::new_v4();

    let mut conn = pool.get()?;
    let card_ids = SchedulerEngine::new(&mut conn).due_cards(&user_id, query.until)?;

    log::info!(
        "due_cards_api_response request_id={} user_id={} until_utc={} card_count={}",
        request_id,
        user_id,
        query.until.to_rfc3339(),
        card_ids.len()
    );

    Ok(Json(DueCardsResponse {
        user_id,
        until_utc: query.until.to_rfc3339(),
        until_jst: utils::to_jst_iso(query.until.naive_utc()),
        card_ids,
    }))
}

pub fn reviews_router(pool: DbPool) -> Router {
    Router::new()
        .route("/reviews", post(submit_review))
        .route("/users/{user_id}/due-cards", get(due_cards))
        .with_state(pool)
}
