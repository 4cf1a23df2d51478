use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::auth::ensure_self;
use crate::db::models::{Donation, DonationCampaign};
use crate::error::{AppError, AppResult};
use crate::extractors::{ApiJson, ApiPath, ApiQuery, AuthUser};
use crate::ledger::{self, DonorInfo, NewCampaign};
use crate::read_model::campaigns::{
    self, CampaignContribution, CampaignDetail, CampaignSummary,
};
use crate::read_model::{PageQuery, PageRequest};
use crate::routes::form::{self, FormData};
use crate::state::AppState;
use crate::users;

// -- Request/Response types --

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignsPage {
    pub campaigns: Vec<CampaignSummary>,
    pub total_pages: u64,
    pub current_page: u32,
}

#[derive(Serialize)]
pub struct CampaignTotal {
    pub total: f64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DonationBody {
    pub campaign_id: String,
    pub amount: f64,
    pub donor_name: Option<String>,
}

#[derive(Deserialize)]
pub struct PaymentIntentBody {
    pub amount: f64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntentResponse {
    pub client_secret: String,
}

/// `upload_limit` caps the multipart body of campaign creation.
pub fn router(upload_limit: usize) -> Router<AppState> {
    Router::new()
        .route(
            "/donation-campaigns",
            get(list_campaigns).post(create_campaign),
        )
        .layer(DefaultBodyLimit::max(upload_limit))
        .route("/donation-campaigns/all", get(all_campaigns))
        .route("/donation-campaigns/{id}", get(campaign_detail))
        .route("/donation-campaigns/{id}/total", get(campaign_total))
        .route("/my-campaigns/{email}", get(my_campaigns))
        .route("/donations", post(record_donation))
        .route("/my-donations/{email}", get(my_donations))
        .route("/create-payment-intent", post(create_payment_intent))
}

// -- Handlers --

/// GET /donation-campaigns?page=&limit=, newest first
async fn list_campaigns(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> AppResult<Json<CampaignsPage>> {
    let page = PageRequest::from_query(&query, &state.config.pagination);
    let conn = state.db.get()?;
    let result = campaigns::list_campaigns(&conn, page)?;
    Ok(Json(CampaignsPage {
        campaigns: result.items,
        total_pages: result.total_pages,
        current_page: result.current_page,
    }))
}

async fn all_campaigns(State(state): State<AppState>) -> AppResult<Json<Vec<CampaignSummary>>> {
    let conn = state.db.get()?;
    Ok(Json(campaigns::list_all_campaigns(&conn)?))
}

async fn campaign_detail(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> AppResult<Json<CampaignDetail>> {
    let conn = state.db.get()?;
    Ok(Json(campaigns::get_campaign_detail(&conn, &id)?))
}

/// GET /donation-campaigns/{id}/total, zero when nothing was given
async fn campaign_total(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> AppResult<Json<CampaignTotal>> {
    let conn = state.db.get()?;
    let total = campaigns::get_campaign_total(&conn, &id)?;
    Ok(Json(CampaignTotal { total }))
}

/// POST /donation-campaigns (multipart, image required)
async fn create_campaign(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    mut form: FormData,
) -> AppResult<(StatusCode, Json<DonationCampaign>)> {
    let pet_name = form.required("petName")?;
    let max_donation = form
        .parse::<f64>("maxDonation")?
        .ok_or_else(|| AppError::BadRequest("maxDonation is required".into()))?;
    let last_date = form.required("lastDate")?;
    let short_description = form.text("shortDescription").unwrap_or_default();
    let long_description = form.text("longDescription").unwrap_or_default();
    let image = form
        .take_image()
        .ok_or_else(|| AppError::BadRequest("image is required".into()))?;
    if !max_donation.is_finite() || max_donation <= 0.0 {
        return Err(AppError::BadRequest(
            "max donation must be a positive number".into(),
        ));
    }

    let creator_name = match form.text("creatorName") {
        Some(name) => name,
        None => {
            let conn = state.db.get()?;
            users::find_by_email(&conn, &claims.email)?
                .map(|user| user.name)
                .unwrap_or_default()
        }
    };

    let pet_image = form::upload(state.images.as_ref(), image).await?;

    let conn = state.db.get()?;
    let campaign = ledger::create_campaign(
        &conn,
        NewCampaign {
            pet_name,
            pet_image,
            max_donation,
            last_date,
            short_description,
            long_description,
            creator_name,
            creator_email: claims.email,
        },
    )?;
    Ok((StatusCode::CREATED, Json(campaign)))
}

async fn my_campaigns(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    ApiPath(email): ApiPath<String>,
) -> AppResult<Json<Vec<CampaignSummary>>> {
    ensure_self(&claims, &email)?;
    let conn = state.db.get()?;
    Ok(Json(campaigns::list_my_campaigns(&conn, &email)?))
}

/// POST /donations. The donor is always the token holder.
async fn record_donation(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    ApiJson(body): ApiJson<DonationBody>,
) -> AppResult<(StatusCode, Json<Donation>)> {
    let conn = state.db.get()?;
    let name = match body.donor_name.filter(|name| !name.trim().is_empty()) {
        Some(name) => name,
        None => users::find_by_email(&conn, &claims.email)?
            .map(|user| user.name)
            .unwrap_or_default(),
    };
    let donation = ledger::record_donation(
        &conn,
        &body.campaign_id,
        DonorInfo {
            name,
            email: claims.email,
        },
        body.amount,
    )?;
    Ok((StatusCode::CREATED, Json(donation)))
}

async fn my_donations(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    ApiPath(email): ApiPath<String>,
) -> AppResult<Json<Vec<CampaignContribution>>> {
    ensure_self(&claims, &email)?;
    let conn = state.db.get()?;
    Ok(Json(campaigns::list_my_donations(&conn, &email)?))
}

/// POST /create-payment-intent
async fn create_payment_intent(
    State(state): State<AppState>,
    _user: AuthUser,
    ApiJson(body): ApiJson<PaymentIntentBody>,
) -> AppResult<Json<PaymentIntentResponse>> {
    let client_secret = ledger::create_payment_intent(
        state.payments.as_ref(),
        body.amount,
        &state.config.payments.currency,
    )
    .await?;
    Ok(Json(PaymentIntentResponse { client_secret }))
}
