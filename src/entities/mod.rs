//! sea-orm entity definitions for the back-office data model.
//!
//! Five core tables carry the ledger subsystem (documents, line items,
//! payments, cash movements, stock movements); the rest is reference data.

pub mod cash_movement;
pub mod currency;
pub mod customer;
pub mod enums;
pub mod order;
pub mod order_item;
pub mod payment;
pub mod product;
pub mod purchase;
pub mod purchase_item;
pub mod stock_movement;
pub mod supplier;
pub mod unit;
