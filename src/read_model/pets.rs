use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::Serialize;

use crate::adoption;
use crate::db::models::{Pet, RequestStatus};
use crate::error::{AppError, AppResult};
use crate::read_model::pagination::{Page, PageRequest};

/// Joins each pet `p` to its most recent request `r`, if any. Ties on
/// `requested_at` fall back to insertion order.
const LATEST_REQUEST_JOIN: &str = "LEFT JOIN pet_requests r ON r.rowid = (
        SELECT r2.rowid FROM pet_requests r2
        WHERE r2.pet_id = p.id
        ORDER BY r2.requested_at DESC, r2.rowid DESC
        LIMIT 1
    )";

const AVAILABLE: &str = "NOT EXISTS (SELECT 1 FROM pet_requests rq WHERE rq.pet_id = p.id)";

/// The reduced requester view exposed on a pet's detail page.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestSummary {
    pub requester_name: String,
    pub requester_address: String,
    pub status: RequestStatus,
    pub requested_at: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PetDetail {
    #[serde(flatten)]
    pub pet: Pet,
    pub request: Option<RequestSummary>,
}

/// One joined row per pet; request fields are null when no request exists.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PetWithRequest {
    #[serde(flatten)]
    pub pet: Pet,
    pub request_status: Option<RequestStatus>,
    pub requested_at: Option<String>,
    pub requester_name: Option<String>,
    pub requester_email: Option<String>,
}

impl PetWithRequest {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let base = Pet::COLUMN_COUNT;
        Ok(Self {
            pet: Pet::from_row(row)?,
            request_status: row.get(base)?,
            requested_at: row.get(base + 1)?,
            requester_name: row.get(base + 2)?,
            requester_email: row.get(base + 3)?,
        })
    }
}

/// A request as seen by the person who filed it. The pet may be gone.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MyRequest {
    pub request_id: String,
    pub pet_id: String,
    pub status: RequestStatus,
    pub requested_at: String,
    pub pet_name: Option<String>,
    pub pet_image: Option<String>,
    pub owner_email: Option<String>,
}

/// `"all"` and blank values disable category filtering.
pub fn category_filter(raw: Option<&str>) -> Option<String> {
    let value = raw?.trim();
    if value.is_empty() || value.eq_ignore_ascii_case("all") {
        None
    } else {
        Some(value.to_lowercase())
    }
}

/// Pets with zero requests of any status, in insertion order.
pub fn list_available_pets(
    conn: &Connection,
    category: Option<&str>,
    page: PageRequest,
) -> AppResult<Page<Pet>> {
    let matching: i64 = conn.query_row(
        &format!("SELECT COUNT(*) FROM pets p WHERE {AVAILABLE} AND (?1 IS NULL OR p.category = ?1)"),
        params![category],
        |row| row.get(0),
    )?;

    let sql = format!(
        "SELECT {} FROM pets p
         WHERE {AVAILABLE} AND (?1 IS NULL OR p.category = ?1)
         ORDER BY p.rowid
         LIMIT ?2 OFFSET ?3",
        Pet::COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let items = stmt
        .query_map(
            params![category, i64::from(page.limit), page.offset()],
            Pet::from_row,
        )?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Page {
        items,
        total_pages: page.total_pages(u64::try_from(matching).unwrap_or(0)),
        current_page: page.page,
    })
}

pub fn get_pet_detail(conn: &Connection, pet_id: &str) -> AppResult<PetDetail> {
    let pet = adoption::find_pet(conn, pet_id)?.ok_or(AppError::NotFound)?;

    let request = conn
        .query_row(
            "SELECT requester_name, requester_address, status, requested_at
             FROM pet_requests
             WHERE pet_id = ?1
             ORDER BY requested_at DESC, rowid DESC
             LIMIT 1",
            params![pet_id],
            |row| {
                Ok(RequestSummary {
                    requester_name: row.get(0)?,
                    requester_address: row.get(1)?,
                    status: row.get(2)?,
                    requested_at: row.get(3)?,
                })
            },
        )
        .optional()?;

    Ok(PetDetail { pet, request })
}

fn joined_pets(
    conn: &Connection,
    filter: &str,
    args: &[&dyn rusqlite::ToSql],
) -> AppResult<Vec<PetWithRequest>> {
    let sql = format!(
        "SELECT {}, r.status, r.requested_at, r.requester_name, r.requester_email
         FROM pets p
         {LATEST_REQUEST_JOIN}
         WHERE {filter}
         ORDER BY p.rowid",
        Pet::COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(args, PetWithRequest::from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Every pet the owner listed, each joined to its current request.
pub fn list_my_pets(conn: &Connection, owner_email: &str) -> AppResult<Vec<PetWithRequest>> {
    joined_pets(conn, "p.owner_email = ?1", params![owner_email])
}

/// The owner's pets whose current request is pending or adopted.
pub fn list_requested_pets(
    conn: &Connection,
    owner_email: &str,
) -> AppResult<Vec<PetWithRequest>> {
    joined_pets(
        conn,
        "p.owner_email = ?1 AND r.status IN ('pending', 'adopted')",
        params![owner_email],
    )
}

/// Every pet in the system, for the admin dashboard.
pub fn list_all_pets(conn: &Connection) -> AppResult<Vec<PetWithRequest>> {
    joined_pets(conn, "1 = 1", params![])
}

/// Requests filed by `requester_email`, newest first.
pub fn list_my_requests(conn: &Connection, requester_email: &str) -> AppResult<Vec<MyRequest>> {
    let mut stmt = conn.prepare(
        "SELECT r.id, r.pet_id, r.status, r.requested_at, p.name, p.image_url, p.owner_email
         FROM pet_requests r
         LEFT JOIN pets p ON p.id = r.pet_id
         WHERE r.requester_email = ?1
         ORDER BY r.requested_at DESC, r.rowid DESC",
    )?;
    let rows = stmt
        .query_map(params![requester_email], |row| {
            Ok(MyRequest {
                request_id: row.get(0)?,
                pet_id: row.get(1)?,
                status: row.get(2)?,
                requested_at: row.get(3)?,
                pet_name: row.get(4)?,
                pet_image: row.get(5)?,
                owner_email: row.get(6)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}
