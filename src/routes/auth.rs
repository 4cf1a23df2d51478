use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::extractors::ApiJson;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct IssueTokenRequest {
    pub email: String,
}

#[derive(Serialize)]
pub struct IssueTokenResponse {
    pub token: String,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/jwt", post(issue_token))
}

/// POST /jwt
async fn issue_token(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<IssueTokenRequest>,
) -> AppResult<Json<IssueTokenResponse>> {
    let email = req.email.trim();
    if email.is_empty() {
        return Err(AppError::BadRequest("Email is required".into()));
    }
    let token = state.tokens.issue(email)?;
    Ok(Json(IssueTokenResponse { token }))
}
