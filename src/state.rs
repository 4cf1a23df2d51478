use std::sync::Arc;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

use crate::auth::tokens::AccessTokenService;
use crate::config::Config;
use crate::upstream::{ImageStore, PaymentProcessor};

pub type DbPool = Pool<SqliteConnectionManager>;

#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub config: Config,
    pub tokens: Arc<AccessTokenService>,
    pub images: Arc<dyn ImageStore>,
    pub payments: Arc<dyn PaymentProcessor>,
}
