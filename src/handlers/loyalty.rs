use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;

use crate::{
    entities::customer_loyalty, errors::ServiceError, tenant::TenantContext, AppState,
};

#[derive(Debug, Serialize)]
pub struct LoyaltySummaryResponse {
    pub success: bool,
    pub summary: customer_loyalty::Model,
}

/// GET /api/v1/customers/:id/loyalty
///
/// Returns the cached summary row, computing it from the ledger on
/// first access.
async fn get_loyalty_summary(
    State(state): State<Arc<AppState>>,
    ctx: TenantContext,
    Path(customer_id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    let summary = state.loyalty_service.summary(ctx, customer_id).await?;
    Ok(Json(LoyaltySummaryResponse {
        success: true,
        summary,
    }))
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/:id/loyalty", get(get_loyalty_summary))
}
