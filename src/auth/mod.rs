pub mod access;
pub mod tokens;

pub use access::{authorize, ensure_owner_or_admin, ensure_self, require_admin};
pub use tokens::{AccessTokenService, Claims};
