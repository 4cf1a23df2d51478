use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use crate::db::models::{PetCategory, SuccessStory};
use crate::error::AppResult;
use crate::extractors::ApiPath;
use crate::read_model::reference;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/success-stories", get(list_stories))
        .route("/success-stories/{id}", get(story))
        .route("/pet-categories", get(list_categories))
}

async fn list_stories(State(state): State<AppState>) -> AppResult<Json<Vec<SuccessStory>>> {
    let conn = state.db.get()?;
    Ok(Json(reference::list_success_stories(&conn)?))
}

async fn story(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> AppResult<Json<SuccessStory>> {
    let conn = state.db.get()?;
    Ok(Json(reference::get_success_story(&conn, &id)?))
}

async fn list_categories(State(state): State<AppState>) -> AppResult<Json<Vec<PetCategory>>> {
    let conn = state.db.get()?;
    Ok(Json(reference::list_categories(&conn)?))
}
