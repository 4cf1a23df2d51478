use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef};
use rusqlite::{Row, ToSql};
use serde::{Deserialize, Serialize};

/// Account role. Plain members have no stored role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "none")]
    Member,
    #[serde(rename = "admin")]
    Admin,
}

impl ToSql for Role {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        match self {
            Role::Member => Ok(ToSqlOutput::from(rusqlite::types::Null)),
            Role::Admin => Ok(ToSqlOutput::from("admin")),
        }
    }
}

impl FromSql for Role {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value {
            ValueRef::Null => Ok(Role::Member),
            ValueRef::Text(text) if text == b"admin" => Ok(Role::Admin),
            _ => Err(FromSqlError::InvalidType),
        }
    }
}

/// Status of an adoption request. There is no rejected state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Adopted,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Adopted => "adopted",
        }
    }
}

impl ToSql for RequestStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for RequestStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "pending" => Ok(RequestStatus::Pending),
            "adopted" => Ok(RequestStatus::Adopted),
            other => Err(FromSqlError::Other(
                format!("unknown request status {other:?}").into(),
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub photo: Option<String>,
    pub role: Role,
    pub created_at: String,
}

impl User {
    pub const COLUMNS: &'static str = "id, name, email, photo, role, created_at";

    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            email: row.get(2)?,
            photo: row.get(3)?,
            role: row.get(4)?,
            created_at: row.get(5)?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pet {
    pub id: String,
    pub name: String,
    pub category: String,
    pub age: i64,
    pub location: String,
    pub short_description: String,
    pub long_description: String,
    pub image_url: String,
    pub owner_name: String,
    pub owner_email: String,
    pub posted_at: String,
}

impl Pet {
    /// Column list qualified with the `p` alias used by every pet query.
    pub const COLUMNS: &'static str = "p.id, p.name, p.category, p.age, p.location, \
        p.short_description, p.long_description, p.image_url, p.owner_name, \
        p.owner_email, p.posted_at";
    pub const COLUMN_COUNT: usize = 11;

    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            category: row.get(2)?,
            age: row.get(3)?,
            location: row.get(4)?,
            short_description: row.get(5)?,
            long_description: row.get(6)?,
            image_url: row.get(7)?,
            owner_name: row.get(8)?,
            owner_email: row.get(9)?,
            posted_at: row.get(10)?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PetRequest {
    pub id: String,
    pub pet_id: String,
    pub requester_name: String,
    pub requester_email: String,
    pub requester_phone: String,
    pub requester_address: String,
    pub status: RequestStatus,
    pub requested_at: String,
}

impl PetRequest {
    pub const COLUMNS: &'static str = "r.id, r.pet_id, r.requester_name, r.requester_email, \
        r.requester_phone, r.requester_address, r.status, r.requested_at";

    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            pet_id: row.get(1)?,
            requester_name: row.get(2)?,
            requester_email: row.get(3)?,
            requester_phone: row.get(4)?,
            requester_address: row.get(5)?,
            status: row.get(6)?,
            requested_at: row.get(7)?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DonationCampaign {
    pub id: String,
    pub pet_name: String,
    pub pet_image: String,
    pub max_donation: f64,
    pub last_date: String,
    pub short_description: String,
    pub long_description: String,
    pub creator_name: String,
    pub creator_email: String,
    pub created_at: String,
}

impl DonationCampaign {
    pub const COLUMNS: &'static str = "c.id, c.pet_name, c.pet_image, c.max_donation, \
        c.last_date, c.short_description, c.long_description, c.creator_name, \
        c.creator_email, c.created_at";
    pub const COLUMN_COUNT: usize = 10;

    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            pet_name: row.get(1)?,
            pet_image: row.get(2)?,
            max_donation: row.get(3)?,
            last_date: row.get(4)?,
            short_description: row.get(5)?,
            long_description: row.get(6)?,
            creator_name: row.get(7)?,
            creator_email: row.get(8)?,
            created_at: row.get(9)?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Donation {
    pub id: String,
    pub campaign_id: String,
    pub donor_name: String,
    pub donor_email: String,
    pub amount: f64,
    pub donated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuccessStory {
    pub id: String,
    pub pet_name: String,
    pub image: String,
    pub adopter_name: String,
    pub story: String,
    pub adopted_on: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PetCategory {
    pub id: String,
    pub name: String,
    pub image: String,
}
