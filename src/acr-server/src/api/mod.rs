//! REST API routes and handlers.

mod generate;
mod health;
mod review;
pub mod types;

use std::sync::Arc;

use axum::extract::FromRequest;
use axum::{
    Router,
    routing::{get, post},
};

use crate::error::AppError;
use crate::state::AppState;

pub use types::{
    GenerateRequest, GenerateResponse, HealthResponse, ReviewRequest, ReviewResponse,
};

/// JSON body extractor whose rejections render as `{"error": ...}`.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Create the API routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/review", post(review::review_code))
        .route("/generate", post(generate::generate_code))
}
