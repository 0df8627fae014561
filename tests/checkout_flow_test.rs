mod common;

use assert_matches::assert_matches;
use chrono::{Duration, Utc};
use rust_decimal_macros::dec;
use salonflow_api::{
    entities::{
        booking, booking_service, customer_loyalty, customer_membership, invoice,
        loyalty_transaction::{self, TransactionType},
    },
    errors::ServiceError,
    services::checkout::{
        CartItem, CartItemType, CheckoutService, FinalizeCheckoutInput, GiftCardPayment,
    },
    tenant::TenantContext,
};
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};

use common::{event_channel, seed_customer, seed_plan, seed_service, setup_db};

const TENANT: i64 = 1;

fn ctx() -> TenantContext {
    TenantContext::new(TENANT)
}

fn service_item(id: i64, name: &str, price: rust_decimal::Decimal, staff_id: Option<i64>) -> CartItem {
    CartItem {
        id,
        name: name.to_string(),
        price,
        quantity: 1,
        item_type: CartItemType::Service,
        staff_id,
        staff_name: None,
    }
}

fn base_input(customer_id: i64, items: Vec<CartItem>) -> FinalizeCheckoutInput {
    FinalizeCheckoutInput {
        customer_id,
        items,
        payment_method: "cash".to_string(),
        coupon_code: None,
        coupon_discount: None,
        redeem_points: None,
        points_earned: None,
        gift_cards: None,
        booking_date: None,
        booking_time: None,
        invoice_date: None,
        due_date: None,
        notes: None,
    }
}

#[tokio::test]
async fn end_to_end_haircut_checkout() {
    let db = setup_db().await;
    let (events, _rx) = event_channel();
    let customer_id = seed_customer(&db, TENANT, "Asha").await;
    let service_id = seed_service(&db, TENANT, "Haircut", dec!(500), true).await;

    let service = CheckoutService::new(db.clone(), events);
    let mut input = base_input(
        customer_id,
        vec![service_item(service_id, "Haircut", dec!(500), Some(9))],
    );
    input.points_earned = Some(50);

    let before = Utc::now();
    let outcome = service.finalize_checkout(ctx(), input).await.expect("checkout");

    assert_eq!(outcome.totals.subtotal, dec!(500));
    assert_eq!(outcome.totals.gst_amount, dec!(90));
    assert_eq!(outcome.totals.total, dec!(590));
    assert_eq!(outcome.totals.points_earned, 50);

    let booking_row = outcome.booking.expect("booking created");
    assert_eq!(booking_row.total_amount, dec!(590));
    assert_eq!(booking_row.status, "completed");
    assert_eq!(booking_row.staff_id, Some(9));
    assert!(booking_row.booking_number.starts_with("BK"));

    let lines = booking_service::Entity::find()
        .filter(booking_service::Column::BookingId.eq(booking_row.id))
        .all(&*db)
        .await
        .unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].service_id, service_id);

    assert_eq!(outcome.invoice.amount, dec!(590));
    assert_eq!(outcome.invoice.booking_id, Some(booking_row.id));
    assert!(outcome.invoice.invoice_number.starts_with("INV-"));

    let ledger = loyalty_transaction::Entity::find()
        .filter(loyalty_transaction::Column::CustomerId.eq(customer_id))
        .all(&*db)
        .await
        .unwrap();
    assert_eq!(ledger.len(), 1);
    assert_eq!(ledger[0].transaction_type, TransactionType::Earned);
    assert_eq!(ledger[0].points, 50);
    assert_eq!(ledger[0].amount, dec!(590));
    let expires = ledger[0].expires_at.expect("earned entries expire");
    assert!(expires >= before + Duration::days(45) - Duration::minutes(1));
    assert!(expires <= Utc::now() + Duration::days(45) + Duration::minutes(1));

    let summary = customer_loyalty::Entity::find_by_id((TENANT, customer_id))
        .one(&*db)
        .await
        .unwrap()
        .expect("summary upserted");
    assert_eq!(summary.points, 50);
    assert_eq!(summary.lifetime_spending, dec!(590));
    assert_eq!(summary.tier.to_string(), "bronze");
}

#[tokio::test]
async fn redemption_lowers_total_and_balance() {
    let db = setup_db().await;
    let (events, _rx) = event_channel();
    let customer_id = seed_customer(&db, TENANT, "Bina").await;
    let service_id = seed_service(&db, TENANT, "Haircut", dec!(500), true).await;
    let service = CheckoutService::new(db.clone(), events);

    // First checkout banks 200 points.
    let mut earn = base_input(
        customer_id,
        vec![service_item(service_id, "Haircut", dec!(500), None)],
    );
    earn.points_earned = Some(200);
    service.finalize_checkout(ctx(), earn).await.expect("earn checkout");

    // Second checkout spends 100 of them.
    let mut redeem = base_input(
        customer_id,
        vec![service_item(service_id, "Haircut", dec!(500), None)],
    );
    redeem.redeem_points = Some(100);
    let outcome = service
        .finalize_checkout(ctx(), redeem)
        .await
        .expect("redeem checkout");

    assert_eq!(outcome.totals.loyalty_discount, dec!(100));
    assert_eq!(outcome.totals.total, dec!(490));

    let summary = customer_loyalty::Entity::find_by_id((TENANT, customer_id))
        .one(&*db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(summary.points, 100); // 200 earned - 100 redeemed
    assert_eq!(summary.total_redeemed, 100);
}

#[tokio::test]
async fn unknown_service_aborts_with_no_writes() {
    let db = setup_db().await;
    let (events, _rx) = event_channel();
    let customer_id = seed_customer(&db, TENANT, "Chaya").await;
    seed_service(&db, TENANT, "Haircut", dec!(500), true).await;
    let service = CheckoutService::new(db.clone(), events);

    let mut input = base_input(
        customer_id,
        vec![service_item(999, "Ghost service", dec!(100), None)],
    );
    input.points_earned = Some(10);

    let err = service.finalize_checkout(ctx(), input).await.unwrap_err();
    assert_matches!(err, ServiceError::InvalidServiceReference(_));

    assert_eq!(booking::Entity::find().count(&*db).await.unwrap(), 0);
    assert_eq!(invoice::Entity::find().count(&*db).await.unwrap(), 0);
    assert_eq!(
        loyalty_transaction::Entity::find().count(&*db).await.unwrap(),
        0
    );
}

#[tokio::test]
async fn inactive_service_is_rejected() {
    let db = setup_db().await;
    let (events, _rx) = event_channel();
    let customer_id = seed_customer(&db, TENANT, "Dev").await;
    let retired = seed_service(&db, TENANT, "Old perm", dec!(900), false).await;
    let service = CheckoutService::new(db.clone(), events);

    let input = base_input(
        customer_id,
        vec![service_item(retired, "Old perm", dec!(900), None)],
    );
    let err = service.finalize_checkout(ctx(), input).await.unwrap_err();
    assert_matches!(err, ServiceError::InvalidServiceReference(_));
}

#[tokio::test]
async fn cross_tenant_service_is_rejected() {
    let db = setup_db().await;
    let (events, _rx) = event_channel();
    let customer_id = seed_customer(&db, TENANT, "Esha").await;
    let foreign = seed_service(&db, 2, "Other tenant facial", dec!(700), true).await;
    let service = CheckoutService::new(db.clone(), events);

    let input = base_input(
        customer_id,
        vec![service_item(foreign, "Facial", dec!(700), None)],
    );
    let err = service.finalize_checkout(ctx(), input).await.unwrap_err();
    assert_matches!(err, ServiceError::InvalidServiceReference(_));
}

#[tokio::test]
async fn product_only_cart_creates_no_booking() {
    let db = setup_db().await;
    let (events, _rx) = event_channel();
    let customer_id = seed_customer(&db, TENANT, "Faiza").await;
    let service = CheckoutService::new(db.clone(), events);

    let input = base_input(
        customer_id,
        vec![CartItem {
            id: 11,
            name: "Shampoo".to_string(),
            price: dec!(350),
            quantity: 2,
            item_type: CartItemType::Product,
            staff_id: None,
            staff_name: None,
        }],
    );
    let outcome = service.finalize_checkout(ctx(), input).await.expect("checkout");

    assert!(outcome.booking.is_none());
    assert_eq!(outcome.invoice.booking_id, None);
    assert_eq!(booking::Entity::find().count(&*db).await.unwrap(), 0);

    // Product items land in product_details, not service_details.
    let products = outcome.invoice.product_details.as_array().unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0]["name"], "Shampoo");
}

#[tokio::test]
async fn membership_checkout_activates_fixed_term() {
    let db = setup_db().await;
    let (events, _rx) = event_channel();
    let customer_id = seed_customer(&db, TENANT, "Gita").await;
    let plan_id = seed_plan(&db, TENANT, "Gold Annual", dec!(12000)).await;
    let service = CheckoutService::new(db.clone(), events);

    let input = base_input(
        customer_id,
        vec![CartItem {
            id: plan_id,
            name: "Gold Annual".to_string(),
            price: dec!(12000),
            quantity: 1,
            item_type: CartItemType::Membership,
            staff_id: None,
            staff_name: None,
        }],
    );
    let outcome = service.finalize_checkout(ctx(), input).await.expect("checkout");
    assert!(outcome.booking.is_none());

    let membership = customer_membership::Entity::find()
        .filter(customer_membership::Column::CustomerId.eq(customer_id))
        .one(&*db)
        .await
        .unwrap()
        .expect("membership row");
    assert_eq!(membership.plan_id, plan_id);
    assert_eq!(
        membership.end_date - membership.start_date,
        Duration::days(365)
    );
}

#[tokio::test]
async fn missing_membership_plan_rolls_back_booking() {
    let db = setup_db().await;
    let (events, _rx) = event_channel();
    let customer_id = seed_customer(&db, TENANT, "Hema").await;
    let service_id = seed_service(&db, TENANT, "Haircut", dec!(500), true).await;
    let service = CheckoutService::new(db.clone(), events);

    let input = base_input(
        customer_id,
        vec![
            service_item(service_id, "Haircut", dec!(500), None),
            CartItem {
                id: 404,
                name: "Phantom plan".to_string(),
                price: dec!(9999),
                quantity: 1,
                item_type: CartItemType::Membership,
                staff_id: None,
                staff_name: None,
            },
        ],
    );
    let err = service.finalize_checkout(ctx(), input).await.unwrap_err();
    assert_matches!(err, ServiceError::MembershipPlanNotFound(404));

    // The booking written before the plan lookup must have rolled back.
    assert_eq!(booking::Entity::find().count(&*db).await.unwrap(), 0);
    assert_eq!(invoice::Entity::find().count(&*db).await.unwrap(), 0);
}

#[tokio::test]
async fn unknown_or_foreign_customer_is_rejected() {
    let db = setup_db().await;
    let (events, _rx) = event_channel();
    let foreign_customer = seed_customer(&db, 2, "Other tenant").await;
    seed_service(&db, TENANT, "Haircut", dec!(500), true).await;
    let service = CheckoutService::new(db.clone(), events);

    let input = base_input(9999, vec![service_item(1, "Haircut", dec!(500), None)]);
    let err = service.finalize_checkout(ctx(), input).await.unwrap_err();
    assert_matches!(err, ServiceError::CustomerNotFound(9999));

    let input = base_input(
        foreign_customer,
        vec![service_item(1, "Haircut", dec!(500), None)],
    );
    let err = service.finalize_checkout(ctx(), input).await.unwrap_err();
    assert_matches!(err, ServiceError::CustomerNotFound(_));
}

#[tokio::test]
async fn stacked_discounts_floor_the_invoice_at_zero() {
    let db = setup_db().await;
    let (events, _rx) = event_channel();
    let customer_id = seed_customer(&db, TENANT, "Irfan").await;
    let service_id = seed_service(&db, TENANT, "Trim", dec!(100), true).await;
    let service = CheckoutService::new(db.clone(), events);

    let mut input = base_input(
        customer_id,
        vec![service_item(service_id, "Trim", dec!(100), None)],
    );
    input.coupon_discount = Some(dec!(300));
    input.gift_cards = Some(vec![GiftCardPayment {
        code: "GC-1".to_string(),
        amount: dec!(500),
    }]);

    let outcome = service.finalize_checkout(ctx(), input).await.expect("checkout");
    assert_eq!(outcome.totals.total, dec!(0));
    assert_eq!(outcome.invoice.amount, dec!(0));
    assert_eq!(outcome.invoice.discount_amount, dec!(800));
}
