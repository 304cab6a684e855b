//! # engine
//!
//! The trading core: cost-basis accounting (`accounting`) and the read-only
//! portfolio projection (`valuation`).  Handlers are thin glue around these
//! two entry points.

pub mod accounting;
pub mod valuation;

pub use accounting::{execute_trade, TradeReceipt};
pub use valuation::{value_portfolio, Holding, PortfolioSummary};
