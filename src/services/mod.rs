pub mod orders;
pub mod payments;
pub mod purchases;
pub mod reports;
