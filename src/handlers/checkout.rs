use axum::{
    extract::{Json, State},
    response::IntoResponse,
    routing::post,
    Router,
};
use serde::Serialize;
use std::sync::Arc;

use crate::{
    errors::ServiceError,
    services::checkout::{CheckoutOutcome, CheckoutTotals, FinalizeCheckoutInput},
    tenant::TenantContext,
    AppState,
};

/// Success payload for a finalized checkout
#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub success: bool,
    pub invoice: crate::entities::invoice::Model,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booking: Option<crate::entities::booking::Model>,
    pub totals: CheckoutTotals,
}

impl From<CheckoutOutcome> for CheckoutResponse {
    fn from(outcome: CheckoutOutcome) -> Self {
        Self {
            success: true,
            invoice: outcome.invoice,
            booking: outcome.booking,
            totals: outcome.totals,
        }
    }
}

/// POST /api/v1/checkout
///
/// Failures come back as `{success: false, message}` via the
/// `ServiceError` response mapping; raw datastore errors never reach
/// the client.
async fn finalize_checkout(
    State(state): State<Arc<AppState>>,
    ctx: TenantContext,
    Json(payload): Json<FinalizeCheckoutInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let outcome = state.checkout_service.finalize_checkout(ctx, payload).await?;
    Ok(Json(CheckoutResponse::from(outcome)))
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/", post(finalize_checkout))
}
