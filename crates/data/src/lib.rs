//! PostgreSQL persistence layer for the OptionDesk platform.
//!
//! Repositories cover the read side; the [`Ledger`] owns every write that
//! moves money so balances, trade state, transaction records, and audit
//! entries always change together.

pub mod database;
pub mod ledger;
pub mod models;
pub mod repositories;

pub use database::DatabaseClient;
pub use ledger::{BalanceDrift, ClaimedCode, Ledger, ReviewedTransaction, SettledTrade};
pub use repositories::Repositories;
