/// API routes and handlers
pub mod admin;
pub mod middleware;
pub mod public;

use crate::context::AppContext;
use axum::Router;

/// Build API routes
pub fn routes() -> Router<AppContext> {
    Router::new().merge(public::routes()).merge(admin::routes())
}
