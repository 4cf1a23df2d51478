//! Donation campaigns and the append-only donation ledger.

use rusqlite::{params, Connection};
use serde::Deserialize;

use crate::db;
use crate::db::models::{Donation, DonationCampaign};
use crate::error::{AppError, AppResult};
use crate::read_model::campaigns::find_campaign;
use crate::upstream::PaymentProcessor;

#[derive(Debug, Clone)]
pub struct NewCampaign {
    pub pet_name: String,
    pub pet_image: String,
    pub max_donation: f64,
    pub last_date: String,
    pub short_description: String,
    pub long_description: String,
    pub creator_name: String,
    pub creator_email: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DonorInfo {
    #[serde(default)]
    pub name: String,
    pub email: String,
}

fn require_positive(field: &str, value: f64) -> AppResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(AppError::BadRequest(format!(
            "{field} must be a positive number"
        )));
    }
    Ok(())
}

pub fn create_campaign(conn: &Connection, campaign: NewCampaign) -> AppResult<DonationCampaign> {
    if campaign.pet_name.trim().is_empty() {
        return Err(AppError::BadRequest("pet name is required".into()));
    }
    if campaign.pet_image.trim().is_empty() {
        return Err(AppError::BadRequest("image is required".into()));
    }
    require_positive("max donation", campaign.max_donation)?;

    let stored = DonationCampaign {
        id: uuid::Uuid::now_v7().to_string(),
        pet_name: campaign.pet_name.trim().to_string(),
        pet_image: campaign.pet_image,
        max_donation: campaign.max_donation,
        last_date: campaign.last_date,
        short_description: campaign.short_description,
        long_description: campaign.long_description,
        creator_name: campaign.creator_name,
        creator_email: campaign.creator_email,
        created_at: db::now_timestamp(),
    };

    conn.execute(
        "INSERT INTO donation_campaigns (id, pet_name, pet_image, max_donation, last_date,
            short_description, long_description, creator_name, creator_email, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            stored.id,
            stored.pet_name,
            stored.pet_image,
            stored.max_donation,
            stored.last_date,
            stored.short_description,
            stored.long_description,
            stored.creator_name,
            stored.creator_email,
            stored.created_at,
        ],
    )?;

    tracing::info!("Campaign {} created by {}", stored.id, stored.creator_email);
    Ok(stored)
}

/// Append one donation. Campaigns may be funded past their goal.
pub fn record_donation(
    conn: &Connection,
    campaign_id: &str,
    donor: DonorInfo,
    amount: f64,
) -> AppResult<Donation> {
    require_positive("amount", amount)?;
    if donor.email.trim().is_empty() {
        return Err(AppError::BadRequest("donor email is required".into()));
    }
    if find_campaign(conn, campaign_id)?.is_none() {
        return Err(AppError::NotFound);
    }

    let donation = Donation {
        id: uuid::Uuid::now_v7().to_string(),
        campaign_id: campaign_id.to_string(),
        donor_name: donor.name,
        donor_email: donor.email,
        amount,
        donated_at: db::now_timestamp(),
    };

    conn.execute(
        "INSERT INTO donations (id, campaign_id, donor_name, donor_email, amount, donated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            donation.id,
            donation.campaign_id,
            donation.donor_name,
            donation.donor_email,
            donation.amount,
            donation.donated_at,
        ],
    )?;

    tracing::info!(
        "Donation {} of {} to campaign {} from {}",
        donation.id,
        donation.amount,
        donation.campaign_id,
        donation.donor_email
    );
    Ok(donation)
}

/// Convert a major-unit amount to minor units (cents).
pub fn minor_units(amount: f64) -> AppResult<i64> {
    require_positive("amount", amount)?;
    let cents = (amount * 100.0).round();
    if cents < 1.0 || cents > i64::MAX as f64 {
        return Err(AppError::BadRequest("amount is out of range".into()));
    }
    Ok(cents as i64)
}

/// Ask the payment processor for a client-confirmable secret.
pub async fn create_payment_intent(
    processor: &dyn PaymentProcessor,
    amount: f64,
    currency: &str,
) -> AppResult<String> {
    let cents = minor_units(amount)?;
    let secret = processor.create_intent(cents, currency).await?;
    tracing::info!("Payment intent created for {} {} minor units", cents, currency);
    Ok(secret)
}

#[cfg(test)]
pub(crate) fn sample_campaign(pet_name: &str, creator_email: &str) -> NewCampaign {
    NewCampaign {
        pet_name: pet_name.to_string(),
        pet_image: format!("https://img.example/{pet_name}.png"),
        max_donation: 100.0,
        last_date: "2030-01-01".to_string(),
        short_description: "Needs surgery".to_string(),
        long_description: "Needs surgery on a hind leg".to_string(),
        creator_name: "Creator".to_string(),
        creator_email: creator_email.to_string(),
    }
}

#[cfg(test)]
pub(crate) fn donor(email: &str) -> DonorInfo {
    DonorInfo {
        name: format!("donor {email}"),
        email: email.to_string(),
    }
}
