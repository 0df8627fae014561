//! Checkout finalization.
//!
//! Takes a cart of typed line items plus payment and discount inputs,
//! computes the authoritative totals, and persists the booking, booking
//! lines, membership activations, invoice, and loyalty ledger entries
//! in a single database transaction. A failure anywhere in the write
//! sequence rolls the whole checkout back; callers never see a booking
//! without its invoice.
//!
//! Trust boundary: `coupon_discount` and `points_earned` arrive
//! pre-computed from the caller. The caller must have validated the
//! coupon and applied its own point-earning rules before invoking this
//! service; only amount clamping (never below zero) happens here.

use chrono::{Duration, NaiveDate, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{info, instrument};

use crate::{
    entities::{
        booking, booking_service, customer, customer_membership, invoice,
        loyalty_transaction::{self, TransactionType},
        membership_plan, salon_service,
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::loyalty,
    tenant::TenantContext,
};

/// GST applied on the coupon-reduced subtotal; uniform across tenants
pub const GST_RATE: Decimal = dec!(0.18);
/// Earned points lapse 45 days after the checkout that granted them
pub const POINT_EXPIRY_DAYS: i64 = 45;
/// Memberships sold at checkout run for a fixed one-year term
pub const MEMBERSHIP_TERM_DAYS: i64 = 365;

const BOOKING_STATUS_COMPLETED: &str = "completed";

/// One entry in the checkout cart
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItem {
    pub id: i64,
    pub name: String,
    pub price: Decimal,
    pub quantity: i32,
    #[serde(rename = "type")]
    pub item_type: CartItemType,
    #[serde(default)]
    pub staff_id: Option<i64>,
    #[serde(default)]
    pub staff_name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CartItemType {
    Service,
    Product,
    Package,
    Membership,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GiftCardPayment {
    pub code: String,
    pub amount: Decimal,
}

/// Input to [`CheckoutService::finalize_checkout`]
#[derive(Debug, Clone, Deserialize)]
pub struct FinalizeCheckoutInput {
    pub customer_id: i64,
    pub items: Vec<CartItem>,
    pub payment_method: String,
    #[serde(default)]
    pub coupon_code: Option<String>,
    #[serde(default)]
    pub coupon_discount: Option<Decimal>,
    /// Points to redeem; doubles as the loyalty discount amount
    /// (1 point = 1 currency unit)
    #[serde(default)]
    pub redeem_points: Option<i64>,
    /// Points to award, computed by the caller
    #[serde(default)]
    pub points_earned: Option<i64>,
    #[serde(default)]
    pub gift_cards: Option<Vec<GiftCardPayment>>,
    #[serde(default)]
    pub booking_date: Option<NaiveDate>,
    #[serde(default)]
    pub booking_time: Option<String>,
    #[serde(default)]
    pub invoice_date: Option<NaiveDate>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Authoritative totals breakdown returned with every success
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckoutTotals {
    pub subtotal: Decimal,
    pub coupon_discount: Decimal,
    pub gst_amount: Decimal,
    pub gift_card_discount: Decimal,
    pub loyalty_discount: Decimal,
    pub total: Decimal,
    pub points_redeemed: i64,
    pub points_earned: i64,
}

#[derive(Debug, Serialize)]
pub struct CheckoutOutcome {
    pub invoice: invoice::Model,
    pub booking: Option<booking::Model>,
    pub totals: CheckoutTotals,
}

/// `service_details` invoice blob: service, package, and membership
/// items plus the discount metadata, as an explicit structured record.
#[derive(Debug, Serialize)]
struct ServiceDetailsRecord<'a> {
    service_items: &'a [CartItem],
    package_items: &'a [CartItem],
    membership_items: &'a [CartItem],
    coupon_code: Option<&'a str>,
    coupon_discount: Decimal,
    loyalty_points_used: i64,
    gift_cards: &'a [GiftCardPayment],
}

/// Compute the totals for a cart. Pure arithmetic, shared by the write
/// path and the tests.
///
/// `gst = max(0, (subtotal - coupon) * GST_RATE)` and the grand total is
/// floored at zero no matter how large the stacked discounts are.
pub fn compute_totals(
    items: &[CartItem],
    coupon_discount: Option<Decimal>,
    gift_cards: &[GiftCardPayment],
    redeem_points: Option<i64>,
    points_earned: Option<i64>,
) -> CheckoutTotals {
    let subtotal: Decimal = items
        .iter()
        .map(|item| item.price * Decimal::from(item.quantity))
        .sum();

    let coupon_discount = coupon_discount.unwrap_or(Decimal::ZERO).max(Decimal::ZERO);
    let gst_amount = ((subtotal - coupon_discount) * GST_RATE).max(Decimal::ZERO);
    let gift_card_discount: Decimal = gift_cards.iter().map(|gc| gc.amount).sum();
    let points_redeemed = redeem_points.unwrap_or(0).max(0);
    let points_earned = points_earned.unwrap_or(0).max(0);
    let loyalty_discount = Decimal::from(points_redeemed);

    let total = (subtotal + gst_amount - coupon_discount - gift_card_discount - loyalty_discount)
        .max(Decimal::ZERO);

    CheckoutTotals {
        subtotal,
        coupon_discount,
        gst_amount,
        gift_card_discount,
        loyalty_discount,
        total,
        points_redeemed,
        points_earned,
    }
}

fn generate_booking_number() -> String {
    let suffix: u16 = rand::thread_rng().gen_range(0..1000);
    format!("BK{}{:03}", Utc::now().timestamp_millis(), suffix)
}

fn generate_invoice_number() -> String {
    let suffix: u16 = rand::thread_rng().gen_range(0..10000);
    format!("INV-{}-{:04}", Utc::now().timestamp_millis(), suffix)
}

#[derive(Clone)]
pub struct CheckoutService {
    db: Arc<DatabaseConnection>,
    event_sender: EventSender,
}

impl CheckoutService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: EventSender) -> Self {
        Self { db, event_sender }
    }

    /// Finalize a checkout: validate, compute totals, persist all rows
    /// transactionally, settle loyalty points, and emit events.
    #[instrument(skip(self, input), fields(tenant_id = ctx.tenant_id, customer_id = input.customer_id))]
    pub async fn finalize_checkout(
        &self,
        ctx: TenantContext,
        input: FinalizeCheckoutInput,
    ) -> Result<CheckoutOutcome, ServiceError> {
        validate_input(&input)?;

        // Tenant-scoped customer resolution gates everything else.
        customer::Entity::find_by_id(input.customer_id)
            .filter(customer::Column::TenantId.eq(ctx.tenant_id))
            .one(&*self.db)
            .await?
            .ok_or(ServiceError::CustomerNotFound(input.customer_id))?;

        let gift_cards = input.gift_cards.clone().unwrap_or_default();
        let totals = compute_totals(
            &input.items,
            input.coupon_discount,
            &gift_cards,
            input.redeem_points,
            input.points_earned,
        );

        let service_items: Vec<CartItem> = items_of(&input.items, CartItemType::Service);
        let product_items: Vec<CartItem> = items_of(&input.items, CartItemType::Product);
        let package_items: Vec<CartItem> = items_of(&input.items, CartItemType::Package);
        let membership_items: Vec<CartItem> = items_of(&input.items, CartItemType::Membership);

        let today = Utc::now().date_naive();
        let now = Utc::now();

        // The whole write sequence is one transaction: a failure at any
        // point leaves no orphaned booking, invoice, or ledger row.
        let txn = self.db.begin().await?;

        let booking_row = if service_items.is_empty() {
            None
        } else {
            Some(
                self.persist_booking(&txn, ctx, &input, &service_items, totals.total, today, now)
                    .await?,
            )
        };

        let mut activated_plans = Vec::with_capacity(membership_items.len());
        for item in &membership_items {
            let plan = membership_plan::Entity::find_by_id(item.id)
                .filter(membership_plan::Column::TenantId.eq(ctx.tenant_id))
                .one(&txn)
                .await?
                .ok_or(ServiceError::MembershipPlanNotFound(item.id))?;

            let membership = customer_membership::ActiveModel {
                tenant_id: Set(ctx.tenant_id),
                customer_id: Set(input.customer_id),
                plan_id: Set(plan.id),
                start_date: Set(today),
                end_date: Set(today + Duration::days(MEMBERSHIP_TERM_DAYS)),
                created_at: Set(now),
                ..Default::default()
            };
            membership.insert(&txn).await?;
            activated_plans.push(plan.id);
        }

        let invoice_date = input.invoice_date.unwrap_or(today);
        let service_details = ServiceDetailsRecord {
            service_items: &service_items,
            package_items: &package_items,
            membership_items: &membership_items,
            coupon_code: input.coupon_code.as_deref(),
            coupon_discount: totals.coupon_discount,
            loyalty_points_used: totals.points_redeemed,
            gift_cards: &gift_cards,
        };

        let invoice_row = invoice::ActiveModel {
            tenant_id: Set(ctx.tenant_id),
            customer_id: Set(input.customer_id),
            booking_id: Set(booking_row.as_ref().map(|b| b.id)),
            invoice_number: Set(generate_invoice_number()),
            amount: Set(totals.total),
            subtotal: Set(totals.subtotal),
            discount_amount: Set(totals.coupon_discount
                + totals.gift_card_discount
                + totals.loyalty_discount),
            gst_amount: Set(totals.gst_amount),
            payment_method: Set(input.payment_method.clone()),
            service_details: Set(serde_json::to_value(&service_details)
                .map_err(|e| ServiceError::InternalError(e.to_string()))?),
            product_details: Set(serde_json::to_value(&product_items)
                .map_err(|e| ServiceError::InternalError(e.to_string()))?),
            invoice_date: Set(invoice_date),
            due_date: Set(input.due_date.unwrap_or(invoice_date)),
            notes: Set(input.notes.clone()),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        if totals.points_redeemed > 0 {
            loyalty_transaction::ActiveModel {
                tenant_id: Set(ctx.tenant_id),
                customer_id: Set(input.customer_id),
                invoice_id: Set(Some(invoice_row.id)),
                points: Set(totals.points_redeemed),
                amount: Set(Decimal::from(totals.points_redeemed)),
                transaction_type: Set(TransactionType::Redeemed),
                description: Set(format!(
                    "Redeemed {} points on invoice {}",
                    totals.points_redeemed, invoice_row.invoice_number
                )),
                expires_at: Set(None),
                created_at: Set(now),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
            loyalty::recompute_summary(&txn, ctx, input.customer_id).await?;
        }

        if totals.points_earned > 0 {
            loyalty_transaction::ActiveModel {
                tenant_id: Set(ctx.tenant_id),
                customer_id: Set(input.customer_id),
                invoice_id: Set(Some(invoice_row.id)),
                points: Set(totals.points_earned),
                amount: Set(totals.total),
                transaction_type: Set(TransactionType::Earned),
                description: Set(format!(
                    "Earned {} points on invoice {}",
                    totals.points_earned, invoice_row.invoice_number
                )),
                expires_at: Set(Some(now + Duration::days(POINT_EXPIRY_DAYS))),
                created_at: Set(now),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
            loyalty::recompute_summary(&txn, ctx, input.customer_id).await?;
        }

        txn.commit().await?;

        self.event_sender
            .send(Event::CheckoutCompleted {
                tenant_id: ctx.tenant_id,
                customer_id: input.customer_id,
                invoice_id: invoice_row.id,
                booking_id: booking_row.as_ref().map(|b| b.id),
                total: totals.total,
            })
            .await;
        for plan_id in activated_plans {
            self.event_sender
                .send(Event::MembershipActivated {
                    tenant_id: ctx.tenant_id,
                    customer_id: input.customer_id,
                    plan_id,
                })
                .await;
        }
        if totals.points_redeemed > 0 {
            self.event_sender
                .send(Event::LoyaltyLedgerRecorded {
                    tenant_id: ctx.tenant_id,
                    customer_id: input.customer_id,
                    transaction_type: TransactionType::Redeemed,
                    points: totals.points_redeemed,
                })
                .await;
        }
        if totals.points_earned > 0 {
            self.event_sender
                .send(Event::LoyaltyLedgerRecorded {
                    tenant_id: ctx.tenant_id,
                    customer_id: input.customer_id,
                    transaction_type: TransactionType::Earned,
                    points: totals.points_earned,
                })
                .await;
        }

        info!(
            invoice_number = %invoice_row.invoice_number,
            total = %totals.total,
            "checkout finalized"
        );

        Ok(CheckoutOutcome {
            invoice: invoice_row,
            booking: booking_row,
            totals,
        })
    }

    /// Validate the service line items against the active in-tenant
    /// catalog, then write the booking and its line rows. Any missing
    /// or inactive service id aborts the entire checkout before a
    /// single row is written.
    async fn persist_booking<C: ConnectionTrait>(
        &self,
        conn: &C,
        ctx: TenantContext,
        input: &FinalizeCheckoutInput,
        service_items: &[CartItem],
        total: Decimal,
        today: NaiveDate,
        now: chrono::DateTime<Utc>,
    ) -> Result<booking::Model, ServiceError> {
        let requested: BTreeSet<i64> = service_items.iter().map(|item| item.id).collect();
        let found: BTreeSet<i64> = salon_service::Entity::find()
            .filter(salon_service::Column::TenantId.eq(ctx.tenant_id))
            .filter(salon_service::Column::IsActive.eq(true))
            .filter(salon_service::Column::Id.is_in(requested.iter().copied()))
            .all(conn)
            .await?
            .into_iter()
            .map(|s| s.id)
            .collect();

        let missing: Vec<String> = requested
            .difference(&found)
            .map(|id| id.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(ServiceError::InvalidServiceReference(format!(
                "unknown or inactive service id(s): {}",
                missing.join(", ")
            )));
        }

        let booking_row = booking::ActiveModel {
            tenant_id: Set(ctx.tenant_id),
            customer_id: Set(input.customer_id),
            staff_id: Set(service_items.first().and_then(|item| item.staff_id)),
            booking_number: Set(generate_booking_number()),
            booking_date: Set(input.booking_date.unwrap_or(today)),
            booking_time: Set(input
                .booking_time
                .clone()
                .unwrap_or_else(|| Utc::now().format("%H:%M").to_string())),
            // Grand total of the checkout, not the service-only subtotal
            total_amount: Set(total),
            status: Set(BOOKING_STATUS_COMPLETED.to_string()),
            notes: Set(input.notes.clone()),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(conn)
        .await?;

        for item in service_items {
            booking_service::ActiveModel {
                tenant_id: Set(ctx.tenant_id),
                booking_id: Set(booking_row.id),
                service_id: Set(item.id),
                quantity: Set(item.quantity),
                price: Set(item.price),
                ..Default::default()
            }
            .insert(conn)
            .await?;
        }

        Ok(booking_row)
    }
}

fn items_of(items: &[CartItem], item_type: CartItemType) -> Vec<CartItem> {
    items
        .iter()
        .filter(|item| item.item_type == item_type)
        .cloned()
        .collect()
}

fn validate_input(input: &FinalizeCheckoutInput) -> Result<(), ServiceError> {
    if input.customer_id <= 0 {
        return Err(ServiceError::InvalidInput(
            "customer_id must be a positive integer".to_string(),
        ));
    }
    if input.items.is_empty() {
        return Err(ServiceError::InvalidInput(
            "cart must contain at least one item".to_string(),
        ));
    }
    if input.payment_method.trim().is_empty() {
        return Err(ServiceError::InvalidInput(
            "payment_method is required".to_string(),
        ));
    }
    for item in &input.items {
        if item.price < Decimal::ZERO {
            return Err(ServiceError::InvalidInput(format!(
                "item '{}' has a negative price",
                item.name
            )));
        }
        if item.quantity < 1 {
            return Err(ServiceError::InvalidInput(format!(
                "item '{}' has quantity below 1",
                item.name
            )));
        }
    }
    Ok(())
}
