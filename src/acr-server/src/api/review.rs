//! Code review endpoint.

use std::sync::Arc;

use axum::{Json, extract::State};

use crate::error::AppResult;
use crate::state::AppState;

use super::ApiJson;
use super::types::{ReviewRequest, ReviewResponse};

/// Review the submitted code.
///
/// Upstream failures still answer 200 with placeholder text; only an empty
/// `code` (400) or a malformed body is an error.
pub async fn review_code(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<ReviewRequest>,
) -> AppResult<Json<ReviewResponse>> {
    let review = state
        .dispatcher
        .review(req.code(), req.language())
        .await?;
    Ok(Json(ReviewResponse { review }))
}
