use axum::extract::State;
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::auth::ensure_self;
use crate::db::models::User;
use crate::error::AppResult;
use crate::extractors::{AdminUser, ApiJson, ApiPath, AuthUser};
use crate::state::AppState;
use crate::users::{self, EnsuredUser};

#[derive(Deserialize)]
pub struct CreateUserRequest {
    #[serde(default)]
    pub name: String,
    pub email: String,
    pub photo: Option<String>,
}

#[derive(Serialize)]
pub struct AdminStatus {
    pub admin: bool,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", post(create_user).get(list_users))
        .route("/users/admin/{email}", get(admin_status))
        .route("/users/{id}/admin", patch(make_admin))
}

/// POST /users, idempotent per email
async fn create_user(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreateUserRequest>,
) -> AppResult<Json<EnsuredUser>> {
    let conn = state.db.get()?;
    let ensured = users::ensure_user(&conn, &req.name, &req.email, req.photo.as_deref())?;
    Ok(Json(ensured))
}

async fn list_users(State(state): State<AppState>, _admin: AdminUser) -> AppResult<Json<Vec<User>>> {
    let conn = state.db.get()?;
    Ok(Json(users::list_users(&conn)?))
}

async fn admin_status(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    ApiPath(email): ApiPath<String>,
) -> AppResult<Json<AdminStatus>> {
    ensure_self(&claims, &email)?;
    let conn = state.db.get()?;
    Ok(Json(AdminStatus {
        admin: users::is_admin(&conn, &email)?,
    }))
}

async fn make_admin(
    State(state): State<AppState>,
    _admin: AdminUser,
    ApiPath(id): ApiPath<String>,
) -> AppResult<Json<User>> {
    let conn = state.db.get()?;
    Ok(Json(users::make_admin(&conn, &id)?))
}
