//! Code generation endpoint.

use std::sync::Arc;

use axum::{Json, extract::State};

use crate::error::AppResult;
use crate::state::AppState;

use super::ApiJson;
use super::types::{GenerateRequest, GenerateResponse};

/// Generate code from the submitted description.
pub async fn generate_code(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<GenerateRequest>,
) -> AppResult<Json<GenerateResponse>> {
    let code = state
        .dispatcher
        .generate(req.description(), req.language())
        .await?;
    Ok(Json(GenerateResponse { code }))
}
