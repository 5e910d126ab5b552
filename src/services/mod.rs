pub mod payhere;
pub mod payment_ledger;
pub mod plans;
