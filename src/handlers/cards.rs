//! JSON endpoints for grading and due-set selection.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config;
use crate::domain::{Card, DueQuery, Quality};
use crate::error::ScheduleError;
use crate::services::{self, DueSummary};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    /// Raw score, validated into `Quality` before any lookup
    pub quality: i64,
}

#[derive(Debug, Deserialize)]
pub struct DueParams {
    pub owner: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct SummaryParams {
    pub owner: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DueResponse {
    pub now: DateTime<Utc>,
    pub cards: Vec<Card>,
}

/// An empty `owner=` means "no owner given"
fn normalize_owner(owner: Option<String>) -> Option<String> {
    owner.filter(|o| !o.trim().is_empty())
}

/// POST /api/cards/{id}/review
pub async fn submit_review(
    State(state): State<AppState>,
    Path(card_id): Path<i64>,
    Json(request): Json<ReviewRequest>,
) -> Result<Json<Card>, ScheduleError> {
    let quality = Quality::new(request.quality)?;
    let now = state.clock.now();
    let card = services::grade_review(&state.db, card_id, quality, now)?;
    Ok(Json(card))
}

/// GET /api/cards/{id}
pub async fn get_card(
    State(state): State<AppState>,
    Path(card_id): Path<i64>,
) -> Result<Json<Card>, ScheduleError> {
    Ok(Json(services::get_card(&state.db, card_id)?))
}

/// GET /api/due?owner=&limit=
pub async fn due_cards(
    State(state): State<AppState>,
    Query(params): Query<DueParams>,
) -> Result<Json<DueResponse>, ScheduleError> {
    let now = state.clock.now();
    let query = DueQuery::new(
        now,
        normalize_owner(params.owner),
        params.limit.unwrap_or(config::DEFAULT_DUE_LIMIT),
    )?;
    let cards = services::due_cards(&state.db, &query)?;
    Ok(Json(DueResponse { now, cards }))
}

/// GET /api/due/summary?owner=
pub async fn due_summary(
    State(state): State<AppState>,
    Query(params): Query<SummaryParams>,
) -> Result<Json<DueSummary>, ScheduleError> {
    let owner = normalize_owner(params.owner);
    let summary = services::due_summary(&state.db, state.clock.now(), owner.as_deref())?;
    Ok(Json(summary))
}
