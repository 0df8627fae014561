//! Salonflow API library
//!
//! Multi-tenant checkout finalization and loyalty settlement for salon
//! and spa businesses: given a cart of typed line items, this service
//! computes authoritative totals, persists booking, membership, and
//! invoice rows in one transaction, and settles the customer's loyalty
//! point ledger.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]

pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod migrator;
pub mod services;
pub mod tenant;

use axum::Router;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::events::EventSender;
use crate::services::{checkout::CheckoutService, loyalty::LoyaltyService};

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub event_sender: EventSender,
    pub checkout_service: CheckoutService,
    pub loyalty_service: LoyaltyService,
}

impl AppState {
    pub fn new(
        db: Arc<DatabaseConnection>,
        config: config::AppConfig,
        event_sender: EventSender,
    ) -> Self {
        let checkout_service = CheckoutService::new(db.clone(), event_sender.clone());
        let loyalty_service = LoyaltyService::new(db.clone());
        Self {
            db,
            config,
            event_sender,
            checkout_service,
            loyalty_service,
        }
    }
}

/// Build the full application router.
pub fn app_router(state: Arc<AppState>) -> Router {
    Router::new()
        .nest("/api/v1", handlers::api_routes())
        .merge(handlers::health::routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
