//! Searching and filtering the in-memory transaction list.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Error, transaction::Transaction};

/// Which direction of money flow to show.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Show every transaction.
    #[default]
    All,
    /// Only transactions with a positive amount.
    Income,
    /// Only transactions with a negative amount.
    Expense,
}

impl TransactionKind {
    /// Whether a transaction with `amount` is shown under this kind.
    ///
    /// Transactions with an amount of exactly zero only show under [TransactionKind::All].
    pub fn matches(&self, amount: f64) -> bool {
        match self {
            TransactionKind::All => true,
            TransactionKind::Income => amount > 0.0,
            TransactionKind::Expense => amount < 0.0,
        }
    }
}

impl Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            TransactionKind::All => "all",
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
        })
    }
}

impl FromStr for TransactionKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(TransactionKind::All),
            "income" => Ok(TransactionKind::Income),
            "expense" | "expenses" => Ok(TransactionKind::Expense),
            _ => Err(Error::InvalidTransactionKind(s.to_owned())),
        }
    }
}

/// A search query combined with a [TransactionKind].
///
/// A transaction is shown only if it passes both.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionFilter {
    /// Text to look for in transaction titles, ignoring case.
    pub search: String,
    /// The direction of money flow to show.
    pub kind: TransactionKind,
}

impl TransactionFilter {
    /// Whether `transaction` passes the filter.
    pub fn matches(&self, transaction: &Transaction) -> bool {
        title_matches(&transaction.title, &self.search) && self.kind.matches(transaction.amount)
    }

    /// The transactions that pass the filter, in their original order.
    pub fn apply<'a>(&self, transactions: &'a [Transaction]) -> Vec<&'a Transaction> {
        transactions
            .iter()
            .filter(|transaction| self.matches(transaction))
            .collect()
    }
}

/// Case insensitive substring search. An empty query matches every title.
pub fn title_matches(title: &str, query: &str) -> bool {
    title.to_lowercase().contains(&query.to_lowercase())
}
