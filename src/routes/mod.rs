pub mod auth;
pub mod campaigns;
pub mod form;
pub mod home;
pub mod pets;
pub mod stories;
pub mod users;

use axum::Router;

use crate::config::Config;
use crate::state::AppState;

/// Every HTTP route, without the tracing and CORS layers.
pub fn router(config: &Config) -> Router<AppState> {
    let upload_limit = config.images.max_upload_bytes;
    Router::new()
        .merge(home::router())
        .merge(auth::router())
        .merge(users::router())
        .merge(pets::router(upload_limit))
        .merge(campaigns::router(upload_limit))
        .merge(stories::router())
}
