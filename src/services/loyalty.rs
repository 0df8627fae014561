//! Loyalty ledger aggregation.
//!
//! The `customer_loyalty` row is a pure function of the append-only
//! `loyalty_transactions` history. After every ledger write the summary
//! is recomputed from scratch and the row overwritten, so it can never
//! drift from the ledger even when a previous write was skipped. At
//! salon scale (a few thousand entries per customer at most) the
//! O(ledger) recompute is cheaper to reason about than incremental
//! maintenance.

use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{
    sea_query::OnConflict, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    QueryFilter, Set,
};
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::{
    entities::{
        customer_loyalty::{self, LoyaltyTier},
        loyalty_transaction::{self, TransactionType},
    },
    errors::ServiceError,
    tenant::TenantContext,
};

/// Lifetime-spending thresholds, in the tenant's base currency units
pub const TIER_SILVER_MIN: Decimal = dec!(25000);
pub const TIER_GOLD_MIN: Decimal = dec!(50000);
pub const TIER_PLATINUM_MIN: Decimal = dec!(100000);

/// Aggregate of a customer's full ledger history
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LedgerTotals {
    pub total_earned: i64,
    pub total_redeemed: i64,
    pub lifetime_spending: Decimal,
}

impl LedgerTotals {
    /// Current balance, floored at zero even if redemptions ever
    /// outran earnings.
    pub fn points(&self) -> i64 {
        (self.total_earned - self.total_redeemed).max(0)
    }
}

/// Fold the ledger rows into totals. Earned entries contribute points
/// and lifetime spending; redeemed entries only consume points.
pub fn summarize(rows: &[loyalty_transaction::Model]) -> LedgerTotals {
    rows.iter().fold(LedgerTotals::default(), |mut acc, row| {
        match row.transaction_type {
            TransactionType::Earned => {
                acc.total_earned += row.points;
                acc.lifetime_spending += row.amount;
            }
            TransactionType::Redeemed => acc.total_redeemed += row.points,
        }
        acc
    })
}

pub fn tier_for(lifetime_spending: Decimal) -> LoyaltyTier {
    if lifetime_spending >= TIER_PLATINUM_MIN {
        LoyaltyTier::Platinum
    } else if lifetime_spending >= TIER_GOLD_MIN {
        LoyaltyTier::Gold
    } else if lifetime_spending >= TIER_SILVER_MIN {
        LoyaltyTier::Silver
    } else {
        LoyaltyTier::Bronze
    }
}

/// Recompute one customer's summary from the full ledger and upsert the
/// `(tenant_id, customer_id)` row, overwriting every computed field.
///
/// Generic over the connection so the checkout flow can run it inside
/// its own transaction; a failure here aborts the whole checkout rather
/// than leaving a durable ledger write with a stale summary.
pub async fn recompute_summary<C: ConnectionTrait>(
    conn: &C,
    ctx: TenantContext,
    customer_id: i64,
) -> Result<customer_loyalty::Model, ServiceError> {
    let rows = loyalty_transaction::Entity::find()
        .filter(loyalty_transaction::Column::TenantId.eq(ctx.tenant_id))
        .filter(loyalty_transaction::Column::CustomerId.eq(customer_id))
        .all(conn)
        .await?;

    let totals = summarize(&rows);
    let summary = customer_loyalty::Model {
        tenant_id: ctx.tenant_id,
        customer_id,
        points: totals.points(),
        tier: tier_for(totals.lifetime_spending),
        lifetime_spending: totals.lifetime_spending,
        total_earned: totals.total_earned,
        total_redeemed: totals.total_redeemed,
        last_activity: Utc::now(),
    };

    debug!(
        tenant_id = ctx.tenant_id,
        customer_id,
        points = summary.points,
        tier = %summary.tier,
        ledger_len = rows.len(),
        "recomputed loyalty summary"
    );

    let active = customer_loyalty::ActiveModel {
        tenant_id: Set(summary.tenant_id),
        customer_id: Set(summary.customer_id),
        points: Set(summary.points),
        tier: Set(summary.tier),
        lifetime_spending: Set(summary.lifetime_spending),
        total_earned: Set(summary.total_earned),
        total_redeemed: Set(summary.total_redeemed),
        last_activity: Set(summary.last_activity),
    };
    customer_loyalty::Entity::insert(active)
        .on_conflict(
            OnConflict::columns([
                customer_loyalty::Column::TenantId,
                customer_loyalty::Column::CustomerId,
            ])
            .update_columns([
                customer_loyalty::Column::Points,
                customer_loyalty::Column::Tier,
                customer_loyalty::Column::LifetimeSpending,
                customer_loyalty::Column::TotalEarned,
                customer_loyalty::Column::TotalRedeemed,
                customer_loyalty::Column::LastActivity,
            ])
            .to_owned(),
        )
        // Skip last-insert-id extraction: composite key plus upsert
        // makes it meaningless here.
        .exec_without_returning(conn)
        .await?;

    Ok(summary)
}

/// Read-side loyalty service backing the summary endpoint.
#[derive(Clone)]
pub struct LoyaltyService {
    db: Arc<DatabaseConnection>,
}

impl LoyaltyService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Fetch the cached summary, computing it on demand for customers
    /// with no row yet.
    #[instrument(skip(self), fields(tenant_id = ctx.tenant_id))]
    pub async fn summary(
        &self,
        ctx: TenantContext,
        customer_id: i64,
    ) -> Result<customer_loyalty::Model, ServiceError> {
        let existing = customer_loyalty::Entity::find_by_id((ctx.tenant_id, customer_id))
            .one(&*self.db)
            .await?;
        match existing {
            Some(row) => Ok(row),
            None => recompute_summary(&*self.db, ctx, customer_id).await,
        }
    }

    /// Force a recompute from the ledger.
    #[instrument(skip(self), fields(tenant_id = ctx.tenant_id))]
    pub async fn recompute(
        &self,
        ctx: TenantContext,
        customer_id: i64,
    ) -> Result<customer_loyalty::Model, ServiceError> {
        recompute_summary(&*self.db, ctx, customer_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use test_case::test_case;

    fn ledger_row(transaction_type: TransactionType, points: i64, amount: Decimal) -> loyalty_transaction::Model {
        loyalty_transaction::Model {
            id: 0,
            tenant_id: 1,
            customer_id: 1,
            invoice_id: None,
            points,
            amount,
            transaction_type,
            description: String::new(),
            expires_at: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn summarize_splits_earned_and_redeemed() {
        let rows = vec![
            ledger_row(TransactionType::Earned, 50, dec!(590)),
            ledger_row(TransactionType::Earned, 30, dec!(300)),
            ledger_row(TransactionType::Redeemed, 20, dec!(20)),
        ];
        let totals = summarize(&rows);
        assert_eq!(totals.total_earned, 80);
        assert_eq!(totals.total_redeemed, 20);
        assert_eq!(totals.lifetime_spending, dec!(890));
        assert_eq!(totals.points(), 60);
    }

    #[test]
    fn points_never_go_negative() {
        let rows = vec![
            ledger_row(TransactionType::Earned, 10, dec!(100)),
            ledger_row(TransactionType::Redeemed, 25, dec!(25)),
        ];
        let totals = summarize(&rows);
        assert_eq!(totals.points(), 0);
        assert_eq!(totals.total_redeemed, 25);
    }

    #[test]
    fn empty_ledger_summarizes_to_zero() {
        let totals = summarize(&[]);
        assert_eq!(totals, LedgerTotals::default());
        assert_eq!(totals.points(), 0);
        assert_eq!(tier_for(totals.lifetime_spending), LoyaltyTier::Bronze);
    }

    #[test_case(dec!(0) => LoyaltyTier::Bronze)]
    #[test_case(dec!(24999.99) => LoyaltyTier::Bronze)]
    #[test_case(dec!(25000) => LoyaltyTier::Silver)]
    #[test_case(dec!(49999.99) => LoyaltyTier::Silver)]
    #[test_case(dec!(50000) => LoyaltyTier::Gold)]
    #[test_case(dec!(99999.99) => LoyaltyTier::Gold)]
    #[test_case(dec!(100000) => LoyaltyTier::Platinum)]
    #[test_case(dec!(250000) => LoyaltyTier::Platinum)]
    fn tier_boundaries(lifetime_spending: Decimal) -> LoyaltyTier {
        tier_for(lifetime_spending)
    }
}
