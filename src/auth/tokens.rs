use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

const MAX_TTL_HOURS: i64 = 24 * 365 * 100;

/// Claims carried by an access token. `email` is the identity claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

/// Issues and verifies HS256 access tokens with a fixed lifetime.
#[derive(Clone)]
pub struct AccessTokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl AccessTokenService {
    pub fn new(secret: &str, ttl_hours: u64) -> Self {
        // Capped well inside chrono's Duration range.
        let hours = i64::try_from(ttl_hours).unwrap_or(i64::MAX).min(MAX_TTL_HOURS);
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::hours(hours),
        }
    }

    pub fn issue(&self, email: &str) -> Result<String, AppError> {
        self.issue_at(email, Utc::now())
    }

    /// Issue a token as if it were minted at `now`.
    pub fn issue_at(&self, email: &str, now: DateTime<Utc>) -> Result<String, AppError> {
        let claims = Claims {
            email: email.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(format!("token signing failed: {e}")))
    }

    /// Any decoding failure (bad signature, malformed, expired) is Unauthorized.
    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        jsonwebtoken::decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!("Rejected access token: {}", e);
                AppError::Unauthorized
            })
    }
}

/// Generate a random 32-byte hex signing secret.
pub fn generate_secret() -> String {
    let bytes: [u8; 32] = rand::thread_rng().gen();
    hex::encode(bytes)
}

/// Pull the token out of an `Authorization: Bearer <token>` header value.
pub fn bearer_token(header_value: &str) -> Option<&str> {
    let (scheme, token) = header_value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(secret: &str) -> AccessTokenService {
        AccessTokenService::new(secret, 6)
    }

    #[test]
    fn issued_token_verifies_and_carries_email() {
        let tokens = service("secret");
        let token = tokens.issue("ann@example.com").unwrap();

        let claims = tokens.verify(&token).unwrap();
        assert_eq!(claims.email, "ann@example.com");
        assert_eq!(claims.exp - claims.iat, 6 * 3600);
    }

    #[test]
    fn token_signed_with_other_key_is_unauthorized() {
        let token = service("secret-a").issue("ann@example.com").unwrap();
        let err = service("secret-b").verify(&token).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized));
    }

    #[test]
    fn token_past_its_window_is_unauthorized() {
        let tokens = service("secret");
        let minted = Utc::now() - Duration::hours(7);
        let token = tokens.issue_at("ann@example.com", minted).unwrap();

        assert!(matches!(tokens.verify(&token), Err(AppError::Unauthorized)));
    }

    #[test]
    fn token_inside_its_window_is_accepted() {
        let tokens = service("secret");
        let minted = Utc::now() - Duration::hours(5);
        let token = tokens.issue_at("ann@example.com", minted).unwrap();

        assert!(tokens.verify(&token).is_ok());
    }

    #[test]
    fn malformed_token_is_unauthorized() {
        let tokens = service("secret");
        assert!(matches!(
            tokens.verify("not.a.jwt"),
            Err(AppError::Unauthorized)
        ));
        assert!(matches!(tokens.verify(""), Err(AppError::Unauthorized)));
    }

    #[test]
    fn bearer_token_parses_header() {
        assert_eq!(bearer_token("Bearer abc.def"), Some("abc.def"));
        assert_eq!(bearer_token("bearer   abc"), Some("abc"));
        assert_eq!(bearer_token("Basic abc"), None);
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token("abc"), None);
    }

    #[test]
    fn generate_secret_is_64_hex_chars() {
        let secret = generate_secret();
        assert_eq!(secret.len(), 64);
        assert!(secret.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(secret, generate_secret());
    }
}
