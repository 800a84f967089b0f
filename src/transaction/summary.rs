//! Balance, income and expense totals over a list of transactions.
//!
//! These are recomputed from the full list on every call.

use serde::Serialize;

use crate::transaction::Transaction;

/// The totals shown above the transaction list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Summary {
    /// The sum of all amounts, income minus expenses.
    pub balance: f64,
    /// The sum of all positive amounts.
    pub income: f64,
    /// The magnitude of the sum of all negative amounts.
    pub expenses: f64,
}

impl Summary {
    /// Calculate the totals for `transactions`.
    pub fn from_transactions(transactions: &[Transaction]) -> Self {
        Self {
            balance: balance(transactions),
            income: total_income(transactions),
            expenses: total_expenses(transactions),
        }
    }
}

/// The signed sum of every transaction amount.
pub fn balance(transactions: &[Transaction]) -> f64 {
    transactions
        .iter()
        .map(|transaction| transaction.amount)
        .sum()
}

/// The sum of the amounts of income transactions.
pub fn total_income(transactions: &[Transaction]) -> f64 {
    transactions
        .iter()
        .filter(|transaction| transaction.is_income())
        .map(|transaction| transaction.amount)
        .sum()
}

/// The sum of the amounts of expense transactions as a positive number.
pub fn total_expenses(transactions: &[Transaction]) -> f64 {
    transactions
        .iter()
        .filter(|transaction| transaction.is_expense())
        .map(|transaction| transaction.amount)
        .sum::<f64>()
        .abs()
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use crate::{
        TransactionId,
        transaction::{Summary, Transaction, balance, total_expenses, total_income},
    };

    fn transaction(title: &str, amount: f64) -> Transaction {
        Transaction::build(title, amount, date!(2024 - 01 - 01), "Test")
            .finalize(TransactionId::generate())
    }

    #[test]
    fn salary_and_coffee_example() {
        let transactions = [transaction("Salary", 1000.0), transaction("Coffee", -5.0)];

        let summary = Summary::from_transactions(&transactions);

        assert_eq!(
            summary,
            Summary {
                balance: 995.0,
                income: 1000.0,
                expenses: 5.0,
            }
        );
    }

    #[test]
    fn empty_list_is_all_zero() {
        assert_eq!(Summary::from_transactions(&[]), Summary::default());
    }

    #[test]
    fn zero_amounts_count_as_neither_income_nor_expense() {
        let transactions = [transaction("Refund", 0.0)];

        assert_eq!(total_income(&transactions), 0.0);
        assert_eq!(total_expenses(&transactions), 0.0);
        assert_eq!(balance(&transactions), 0.0);
    }

    #[test]
    fn balance_is_income_minus_expenses() {
        let amounts = [
            12.5, -3.25, 0.0, 100.0, -87.75, -0.5, 42.0, -1000.0, 250.25, -19.99,
        ];
        let transactions: Vec<Transaction> = amounts
            .iter()
            .map(|amount| transaction("Test", *amount))
            .collect();

        let summary = Summary::from_transactions(&transactions);

        assert!(
            (summary.balance - (summary.income - summary.expenses)).abs() < 1e-9,
            "{summary:?}"
        );
        assert!(summary.expenses >= 0.0);
    }
}
