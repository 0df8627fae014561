//! Sea-ORM entities for the checkout and loyalty settlement schema.
//!
//! Every table carries a `tenant_id` column; application-level
//! `WHERE tenant_id = ?` filtering is the sole isolation boundary
//! between tenants.

pub mod booking;
pub mod booking_service;
pub mod customer;
pub mod customer_loyalty;
pub mod customer_membership;
pub mod invoice;
pub mod loyalty_transaction;
pub mod membership_plan;
pub mod salon_service;
