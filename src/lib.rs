//! Budgetn keeps track of personal income and expenses.
//!
//! Transactions are stored in a local SQLite database. This library provides:
//! - [db]: opening the database and migrating its schema,
//! - [transaction]: the transaction model, its queries, and the totals and
//!   filters computed over a list of transactions,
//! - [Ledger]: an async facade that keeps an up to date copy of every
//!   transaction for front ends,
//! - [currency]: formatting amounts for display.

#![warn(missing_docs)]

pub mod currency;
mod database_id;
pub mod db;
mod error;
mod ledger;
pub mod logging;
mod timezone;
pub mod transaction;

pub use database_id::TransactionId;
pub use error::Error;
pub use ledger::{Freshness, Ledger, LedgerState};
pub use timezone::{parse_date, today};
