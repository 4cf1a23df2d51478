use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;

use crate::db;
use crate::db::models::{Role, User};
use crate::error::{AppError, AppResult};

/// Outcome of [`ensure_user`]: `inserted` is false when the email already existed.
#[derive(Debug, Clone, Serialize)]
pub struct EnsuredUser {
    pub inserted: bool,
    pub user: User,
}

/// Create the user for `email` unless one exists. Repeat calls return the
/// stored record untouched.
pub fn ensure_user(
    conn: &Connection,
    name: &str,
    email: &str,
    photo: Option<&str>,
) -> AppResult<EnsuredUser> {
    let email = email.trim();
    if email.is_empty() {
        return Err(AppError::BadRequest("Email is required".into()));
    }

    let id = uuid::Uuid::now_v7().to_string();
    let inserted = conn.execute(
        "INSERT OR IGNORE INTO users (id, name, email, photo, role, created_at)
         VALUES (?1, ?2, ?3, ?4, NULL, ?5)",
        params![id, name.trim(), email, photo, db::now_timestamp()],
    )? > 0;

    let user = find_by_email(conn, email)?
        .ok_or_else(|| AppError::Internal(format!("user {email} vanished after upsert")))?;

    if inserted {
        tracing::info!("Created user {}", email);
    }

    Ok(EnsuredUser { inserted, user })
}

pub fn find_by_email(conn: &Connection, email: &str) -> AppResult<Option<User>> {
    let sql = format!("SELECT {} FROM users WHERE email = ?1", User::COLUMNS);
    Ok(conn
        .query_row(&sql, params![email], User::from_row)
        .optional()?)
}

pub fn list_users(conn: &Connection) -> AppResult<Vec<User>> {
    let sql = format!("SELECT {} FROM users ORDER BY rowid", User::COLUMNS);
    let mut stmt = conn.prepare(&sql)?;
    let users = stmt
        .query_map([], User::from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(users)
}

/// Elevate a user to admin. Idempotent.
pub fn make_admin(conn: &Connection, user_id: &str) -> AppResult<User> {
    let updated = conn.execute(
        "UPDATE users SET role = ?1 WHERE id = ?2",
        params![Role::Admin, user_id],
    )?;
    if updated == 0 {
        return Err(AppError::NotFound);
    }

    let sql = format!("SELECT {} FROM users WHERE id = ?1", User::COLUMNS);
    let user = conn.query_row(&sql, params![user_id], User::from_row)?;
    tracing::info!("Granted admin role to {}", user.email);
    Ok(user)
}

pub fn is_admin(conn: &Connection, email: &str) -> AppResult<bool> {
    Ok(find_by_email(conn, email)?
        .map(|user| user.role == Role::Admin)
        .unwrap_or(false))
}
