//! Transaction management for the budgeting application.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and `TransactionBuilder` for creating transactions
//! - Database functions for storing, querying, and managing transactions
//! - Totals and filters computed over a list of transactions

mod core;
mod filter;
mod recurrence;
mod summary;

pub use core::{
    Transaction, TransactionBuilder, count_transactions, create_transaction, delete_transaction,
    get_all_transactions, get_transaction, map_transaction_row, update_transaction,
};
pub use filter::{TransactionFilter, TransactionKind, title_matches};
pub use recurrence::RecurringType;
pub use summary::{Summary, balance, total_expenses, total_income};
