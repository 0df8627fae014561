pub mod checkout;
pub mod loyalty;
