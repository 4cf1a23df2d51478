//! Pet records and the adoption request lifecycle.
//!
//! Per pet, the state is inferred from its requests: no request, a pending
//! request, or an adopted one. Requests point at pets by plain id with no
//! integrity guarantee in either direction.

use rusqlite::{params, Connection, OptionalExtension};
use serde::Deserialize;

use crate::db;
use crate::db::models::{Pet, PetRequest, RequestStatus};
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone)]
pub struct NewPet {
    pub name: String,
    pub category: String,
    pub age: i64,
    pub location: String,
    pub short_description: String,
    pub long_description: String,
    pub image_url: String,
    pub owner_name: String,
    pub owner_email: String,
}

/// Partial update; `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct PetUpdate {
    pub name: Option<String>,
    pub category: Option<String>,
    pub age: Option<i64>,
    pub location: Option<String>,
    pub short_description: Option<String>,
    pub long_description: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequesterInfo {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
}

fn require(field: &str, value: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::BadRequest(format!("{field} is required")));
    }
    Ok(())
}

pub fn add_pet(conn: &Connection, pet: NewPet) -> AppResult<Pet> {
    require("name", &pet.name)?;
    require("category", &pet.category)?;
    require("image", &pet.image_url)?;
    require("owner email", &pet.owner_email)?;
    if pet.age < 0 {
        return Err(AppError::BadRequest("age cannot be negative".into()));
    }

    let stored = Pet {
        id: uuid::Uuid::now_v7().to_string(),
        name: pet.name.trim().to_string(),
        category: pet.category.trim().to_lowercase(),
        age: pet.age,
        location: pet.location,
        short_description: pet.short_description,
        long_description: pet.long_description,
        image_url: pet.image_url,
        owner_name: pet.owner_name,
        owner_email: pet.owner_email,
        posted_at: db::now_timestamp(),
    };

    conn.execute(
        "INSERT INTO pets (id, name, category, age, location, short_description,
            long_description, image_url, owner_name, owner_email, posted_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            stored.id,
            stored.name,
            stored.category,
            stored.age,
            stored.location,
            stored.short_description,
            stored.long_description,
            stored.image_url,
            stored.owner_name,
            stored.owner_email,
            stored.posted_at,
        ],
    )?;

    tracing::info!("Pet {} listed by {}", stored.id, stored.owner_email);
    Ok(stored)
}

/// Optional lookup; callers decide whether absence is an error.
pub fn find_pet(conn: &Connection, pet_id: &str) -> AppResult<Option<Pet>> {
    let sql = format!("SELECT {} FROM pets p WHERE p.id = ?1", Pet::COLUMNS);
    Ok(conn
        .query_row(&sql, params![pet_id], Pet::from_row)
        .optional()?)
}

pub fn update_pet(conn: &Connection, pet_id: &str, update: PetUpdate) -> AppResult<Pet> {
    if let Some(age) = update.age {
        if age < 0 {
            return Err(AppError::BadRequest("age cannot be negative".into()));
        }
    }

    let updated = conn.execute(
        "UPDATE pets SET
            name = COALESCE(?2, name),
            category = COALESCE(?3, category),
            age = COALESCE(?4, age),
            location = COALESCE(?5, location),
            short_description = COALESCE(?6, short_description),
            long_description = COALESCE(?7, long_description),
            image_url = COALESCE(?8, image_url)
         WHERE id = ?1",
        params![
            pet_id,
            update.name.map(|n| n.trim().to_string()),
            update.category.map(|c| c.trim().to_lowercase()),
            update.age,
            update.location,
            update.short_description,
            update.long_description,
            update.image_url,
        ],
    )?;
    if updated == 0 {
        return Err(AppError::NotFound);
    }

    find_pet(conn, pet_id)?.ok_or(AppError::NotFound)
}

/// Remove the pet record only. Requests that reference it are left in place.
pub fn delete_pet(conn: &Connection, pet_id: &str) -> AppResult<()> {
    let deleted = conn.execute("DELETE FROM pets WHERE id = ?1", params![pet_id])?;
    if deleted == 0 {
        return Err(AppError::NotFound);
    }
    tracing::info!("Pet {} deleted", pet_id);
    Ok(())
}

/// File a pending adoption request. The pet must exist; earlier requests
/// for the same pet are not checked.
pub fn file_request(
    conn: &Connection,
    pet_id: &str,
    requester: RequesterInfo,
) -> AppResult<PetRequest> {
    require("requester name", &requester.name)?;
    require("requester email", &requester.email)?;
    if find_pet(conn, pet_id)?.is_none() {
        return Err(AppError::NotFound);
    }

    let request = PetRequest {
        id: uuid::Uuid::now_v7().to_string(),
        pet_id: pet_id.to_string(),
        requester_name: requester.name,
        requester_email: requester.email,
        requester_phone: requester.phone,
        requester_address: requester.address,
        status: RequestStatus::Pending,
        requested_at: db::now_timestamp(),
    };

    conn.execute(
        "INSERT INTO pet_requests (id, pet_id, requester_name, requester_email,
            requester_phone, requester_address, status, requested_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            request.id,
            request.pet_id,
            request.requester_name,
            request.requester_email,
            request.requester_phone,
            request.requester_address,
            request.status,
            request.requested_at,
        ],
    )?;

    tracing::info!(
        "Adoption request {} filed for pet {} by {}",
        request.id,
        request.pet_id,
        request.requester_email
    );
    Ok(request)
}

/// Mark every request for the pet as adopted. Returns how many requests
/// matched; applying it again leaves the same state.
pub fn mark_adopted(conn: &Connection, pet_id: &str) -> AppResult<usize> {
    let matched = conn.execute(
        "UPDATE pet_requests SET status = ?1 WHERE pet_id = ?2",
        params![RequestStatus::Adopted, pet_id],
    )?;
    if matched == 0 {
        return Err(AppError::NotFound);
    }
    tracing::info!("Pet {} adopted ({} request(s))", pet_id, matched);
    Ok(matched)
}

#[cfg(test)]
pub(crate) fn sample_pet(name: &str, category: &str, owner_email: &str) -> NewPet {
    NewPet {
        name: name.to_string(),
        category: category.to_string(),
        age: 2,
        location: "Dhaka".to_string(),
        short_description: format!("{name} is friendly"),
        long_description: format!("{name} loves long walks"),
        image_url: format!("https://img.example/{name}.png"),
        owner_name: "Owner".to_string(),
        owner_email: owner_email.to_string(),
    }
}

#[cfg(test)]
pub(crate) fn requester(email: &str) -> RequesterInfo {
    RequesterInfo {
        name: "Requester".to_string(),
        email: email.to_string(),
        phone: "555-0100".to_string(),
        address: "12 Elm St".to_string(),
    }
}
