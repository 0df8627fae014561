#![allow(dead_code)]

use chrono::Utc;
use rust_decimal::Decimal;
use salonflow_api::{
    db,
    entities::{customer, membership_plan, salon_service},
    events::{Event, EventSender},
};
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Fresh in-memory sqlite database with the full schema applied. Each
/// test gets its own database because the single pooled connection owns
/// the in-memory store.
pub async fn setup_db() -> Arc<DatabaseConnection> {
    let pool = db::connect("sqlite::memory:").await.expect("connect");
    db::run_migrations(&pool).await.expect("migrations");
    Arc::new(pool)
}

/// Event channel whose receiver is handed back so sends never warn.
pub fn event_channel() -> (EventSender, mpsc::Receiver<Event>) {
    let (tx, rx) = mpsc::channel(64);
    (EventSender::new(tx), rx)
}

pub async fn seed_customer(db: &DatabaseConnection, tenant_id: i64, name: &str) -> i64 {
    let row = customer::ActiveModel {
        tenant_id: Set(tenant_id),
        name: Set(name.to_string()),
        phone: Set(None),
        email: Set(None),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("seed customer");
    row.id
}

pub async fn seed_service(
    db: &DatabaseConnection,
    tenant_id: i64,
    name: &str,
    price: Decimal,
    is_active: bool,
) -> i64 {
    let row = salon_service::ActiveModel {
        tenant_id: Set(tenant_id),
        name: Set(name.to_string()),
        price: Set(price),
        duration_minutes: Set(Some(30)),
        is_active: Set(is_active),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("seed service");
    row.id
}

pub async fn seed_plan(
    db: &DatabaseConnection,
    tenant_id: i64,
    name: &str,
    price: Decimal,
) -> i64 {
    let row = membership_plan::ActiveModel {
        tenant_id: Set(tenant_id),
        name: Set(name.to_string()),
        price: Set(price),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("seed plan");
    row.id
}
