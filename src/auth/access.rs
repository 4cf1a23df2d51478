use rusqlite::Connection;

use crate::auth::tokens::Claims;
use crate::db::models::Role;
use crate::error::{AppError, AppResult};
use crate::users;

/// Allow when `actual` meets or exceeds `required`.
pub fn authorize(actual: Role, required: Role) -> AppResult<()> {
    if actual >= required {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

/// Look up the claim's user and require the admin role. Unknown users are
/// treated as plain members.
pub fn require_admin(conn: &Connection, claims: &Claims) -> AppResult<()> {
    let role = users::find_by_email(conn, &claims.email)?
        .map(|user| user.role)
        .unwrap_or(Role::Member);
    authorize(role, Role::Admin)
}

/// Per-user endpoints only serve the caller's own data.
pub fn ensure_self(claims: &Claims, email: &str) -> AppResult<()> {
    if claims.email == email {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

/// Owners may manage their own records; admins may manage any.
pub fn ensure_owner_or_admin(conn: &Connection, claims: &Claims, owner_email: &str) -> AppResult<()> {
    if claims.email == owner_email {
        return Ok(());
    }
    require_admin(conn, claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_connection;

    fn claims(email: &str) -> Claims {
        Claims {
            email: email.to_string(),
            iat: 0,
            exp: 0,
        }
    }

    #[test]
    fn authorize_is_a_role_ordering() {
        assert!(authorize(Role::Admin, Role::Admin).is_ok());
        assert!(authorize(Role::Admin, Role::Member).is_ok());
        assert!(authorize(Role::Member, Role::Member).is_ok());
        assert!(matches!(
            authorize(Role::Member, Role::Admin),
            Err(AppError::Forbidden)
        ));
    }

    #[test]
    fn require_admin_rejects_members_and_unknown_users() {
        let conn = test_connection();
        users::ensure_user(&conn, "Ann", "ann@example.com", None).unwrap();

        assert!(matches!(
            require_admin(&conn, &claims("ann@example.com")),
            Err(AppError::Forbidden)
        ));
        assert!(matches!(
            require_admin(&conn, &claims("ghost@example.com")),
            Err(AppError::Forbidden)
        ));
    }

    #[test]
    fn require_admin_accepts_admins() {
        let conn = test_connection();
        let created = users::ensure_user(&conn, "Root", "root@example.com", None).unwrap();
        users::make_admin(&conn, &created.user.id).unwrap();

        assert!(require_admin(&conn, &claims("root@example.com")).is_ok());
    }

    #[test]
    fn ensure_self_compares_emails() {
        assert!(ensure_self(&claims("a@example.com"), "a@example.com").is_ok());
        assert!(matches!(
            ensure_self(&claims("a@example.com"), "b@example.com"),
            Err(AppError::Forbidden)
        ));
    }

    #[test]
    fn owner_or_admin_lets_owner_through_without_lookup() {
        let conn = test_connection();
        assert!(ensure_owner_or_admin(&conn, &claims("o@example.com"), "o@example.com").is_ok());
        assert!(matches!(
            ensure_owner_or_admin(&conn, &claims("x@example.com"), "o@example.com"),
            Err(AppError::Forbidden)
        ));
    }
}
