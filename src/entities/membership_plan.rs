use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Purchasable membership plan (e.g. "Gold Annual")
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "membership_plans")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub tenant_id: i64,
    pub name: String,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub price: Decimal,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::customer_membership::Entity")]
    CustomerMemberships,
}

impl Related<super::customer_membership::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CustomerMemberships.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
