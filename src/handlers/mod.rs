pub mod checkout;
pub mod health;
pub mod loyalty;

use axum::Router;
use std::sync::Arc;

use crate::AppState;

/// Assemble the versioned API router.
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .nest("/checkout", checkout::routes())
        .nest("/customers", loyalty::routes())
}
