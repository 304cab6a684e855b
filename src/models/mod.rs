//! # models
//!
//! Row types for the four persisted tables plus the request DTOs that cross
//! the API boundary.  One file per table, mirroring the schema in
//! `migrations/001_init.sql`.

pub mod market;
pub mod position;
pub mod transaction;
pub mod user;

pub use market::Stock;
pub use position::Position;
pub use transaction::{TradeRequest, TradeSide, TransactionRecord};
pub use user::User;
