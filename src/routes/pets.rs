use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::adoption::{self, NewPet, PetUpdate, RequesterInfo};
use crate::auth::{ensure_owner_or_admin, ensure_self};
use crate::db::models::{Pet, PetRequest};
use crate::error::{AppError, AppResult};
use crate::extractors::{AdminUser, ApiJson, ApiPath, ApiQuery, AuthUser};
use crate::read_model::pets::{self, MyRequest, PetDetail, PetWithRequest};
use crate::read_model::{PageQuery, PageRequest};
use crate::routes::form::{self, FormData};
use crate::state::AppState;
use crate::users;

// -- Request/Response types --

#[derive(Deserialize)]
pub struct PetListQuery {
    pub category: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PetsPage {
    pub pets: Vec<Pet>,
    pub total_pages: u64,
    pub current_page: u32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRequestBody {
    pub pet_id: String,
    pub requester_name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
}

#[derive(Serialize)]
pub struct AdoptedResponse {
    pub adopted: usize,
}

#[derive(Serialize)]
pub struct DeletedResponse {
    pub deleted: bool,
}

/// `upload_limit` caps the multipart bodies of the create and update routes.
pub fn router(upload_limit: usize) -> Router<AppState> {
    Router::new()
        .route("/pets", get(list_available).post(add_pet))
        .route(
            "/pets/{id}",
            get(pet_detail).patch(update_pet).delete(delete_pet),
        )
        .layer(DefaultBodyLimit::max(upload_limit))
        .route("/pets/{id}/adopt", patch(mark_adopted))
        .route("/admin/pets", get(all_pets))
        .route("/my-pets/{email}", get(my_pets))
        .route("/my-pets/{email}/requests", get(requested_pets))
        .route("/pet-requests", post(file_request))
        .route("/my-requests/{email}", get(my_requests))
}

// -- Handlers --

/// GET /pets?category=&page=&limit=
async fn list_available(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<PetListQuery>,
) -> AppResult<Json<PetsPage>> {
    let page = PageRequest::from_query(
        &PageQuery {
            page: query.page,
            limit: query.limit,
        },
        &state.config.pagination,
    );
    let category = pets::category_filter(query.category.as_deref());

    let conn = state.db.get()?;
    let result = pets::list_available_pets(&conn, category.as_deref(), page)?;
    Ok(Json(PetsPage {
        pets: result.items,
        total_pages: result.total_pages,
        current_page: result.current_page,
    }))
}

async fn pet_detail(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> AppResult<Json<PetDetail>> {
    let conn = state.db.get()?;
    Ok(Json(pets::get_pet_detail(&conn, &id)?))
}

/// POST /pets (multipart). The image is uploaded only after every other
/// field has validated, and the pet is stored only after the upload succeeds.
async fn add_pet(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    mut form: FormData,
) -> AppResult<(StatusCode, Json<Pet>)> {
    let name = form.required("name")?;
    let category = form.required("category")?;
    let age = form
        .parse::<i64>("age")?
        .ok_or_else(|| AppError::BadRequest("age is required".into()))?;
    let location = form.required("location")?;
    let short_description = form.text("shortDescription").unwrap_or_default();
    let long_description = form.text("longDescription").unwrap_or_default();
    let image = form
        .take_image()
        .ok_or_else(|| AppError::BadRequest("image is required".into()))?;

    let owner_name = match form.text("ownerName") {
        Some(name) => name,
        None => {
            let conn = state.db.get()?;
            users::find_by_email(&conn, &claims.email)?
                .map(|user| user.name)
                .unwrap_or_default()
        }
    };

    let image_url = form::upload(state.images.as_ref(), image).await?;

    let conn = state.db.get()?;
    let pet = adoption::add_pet(
        &conn,
        NewPet {
            name,
            category,
            age,
            location,
            short_description,
            long_description,
            image_url,
            owner_name,
            owner_email: claims.email,
        },
    )?;
    Ok((StatusCode::CREATED, Json(pet)))
}

fn load_managed_pet(state: &AppState, claims: &crate::auth::Claims, id: &str) -> AppResult<Pet> {
    let conn = state.db.get()?;
    let pet = adoption::find_pet(&conn, id)?.ok_or(AppError::NotFound)?;
    ensure_owner_or_admin(&conn, claims, &pet.owner_email)?;
    Ok(pet)
}

/// PATCH /pets/{id} (multipart, every field optional)
async fn update_pet(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    ApiPath(id): ApiPath<String>,
    mut form: FormData,
) -> AppResult<Json<Pet>> {
    load_managed_pet(&state, &claims, &id)?;

    let mut update = PetUpdate {
        name: form.text("name"),
        category: form.text("category"),
        age: form.parse::<i64>("age")?,
        location: form.text("location"),
        short_description: form.text("shortDescription"),
        long_description: form.text("longDescription"),
        image_url: None,
    };
    if let Some(image) = form.take_image() {
        update.image_url = Some(form::upload(state.images.as_ref(), image).await?);
    }

    let conn = state.db.get()?;
    Ok(Json(adoption::update_pet(&conn, &id, update)?))
}

async fn delete_pet(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    ApiPath(id): ApiPath<String>,
) -> AppResult<Json<DeletedResponse>> {
    load_managed_pet(&state, &claims, &id)?;
    let conn = state.db.get()?;
    adoption::delete_pet(&conn, &id)?;
    Ok(Json(DeletedResponse { deleted: true }))
}

/// PATCH /pets/{id}/adopt
async fn mark_adopted(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    ApiPath(id): ApiPath<String>,
) -> AppResult<Json<AdoptedResponse>> {
    load_managed_pet(&state, &claims, &id)?;
    let conn = state.db.get()?;
    let adopted = adoption::mark_adopted(&conn, &id)?;
    Ok(Json(AdoptedResponse { adopted }))
}

async fn all_pets(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> AppResult<Json<Vec<PetWithRequest>>> {
    let conn = state.db.get()?;
    Ok(Json(pets::list_all_pets(&conn)?))
}

async fn my_pets(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    ApiPath(email): ApiPath<String>,
) -> AppResult<Json<Vec<PetWithRequest>>> {
    ensure_self(&claims, &email)?;
    let conn = state.db.get()?;
    Ok(Json(pets::list_my_pets(&conn, &email)?))
}

async fn requested_pets(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    ApiPath(email): ApiPath<String>,
) -> AppResult<Json<Vec<PetWithRequest>>> {
    ensure_self(&claims, &email)?;
    let conn = state.db.get()?;
    Ok(Json(pets::list_requested_pets(&conn, &email)?))
}

/// POST /pet-requests. The requester email always comes from the token.
async fn file_request(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    ApiJson(body): ApiJson<FileRequestBody>,
) -> AppResult<(StatusCode, Json<PetRequest>)> {
    let conn = state.db.get()?;
    let request = adoption::file_request(
        &conn,
        &body.pet_id,
        RequesterInfo {
            name: body.requester_name,
            email: claims.email,
            phone: body.phone,
            address: body.address,
        },
    )?;
    Ok((StatusCode::CREATED, Json(request)))
}

async fn my_requests(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    ApiPath(email): ApiPath<String>,
) -> AppResult<Json<Vec<MyRequest>>> {
    ensure_self(&claims, &email)?;
    let conn = state.db.get()?;
    Ok(Json(pets::list_my_requests(&conn, &email)?))
}
