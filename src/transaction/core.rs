//! Defines the core data models and database queries for transactions.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{Error, database_id::TransactionId, transaction::RecurringType};

// ============================================================================
// MODELS
// ============================================================================

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// A short label for what the transaction was for, e.g. "Salary".
    pub title: String,
    /// The amount of money spent or earned in this transaction.
    ///
    /// Income is positive and expenses are negative.
    pub amount: f64,
    /// When the transaction happened.
    pub date: Date,
    /// A free text label used to group transactions, e.g. "Food".
    pub category: String,
    /// Whether the transaction repeats on a schedule.
    pub is_recurring: bool,
    /// How often the transaction repeats. Only meaningful if `is_recurring` is set.
    pub recurring_type: Option<RecurringType>,
    /// The last date the transaction repeats on, if any.
    pub recurring_end_date: Option<Date>,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [TransactionBuilder] for discoverability.
    pub fn build(title: &str, amount: f64, date: Date, category: &str) -> TransactionBuilder {
        TransactionBuilder {
            title: title.to_owned(),
            amount,
            date,
            category: category.to_owned(),
            is_recurring: false,
            recurring_type: None,
            recurring_end_date: None,
        }
    }

    /// Whether the transaction is money earned.
    pub fn is_income(&self) -> bool {
        self.amount > 0.0
    }

    /// Whether the transaction is money spent.
    pub fn is_expense(&self) -> bool {
        self.amount < 0.0
    }
}

/// A builder for creating [Transaction] instances.
///
/// The ID is assigned when the transaction is stored with [create_transaction].
///
/// # Examples
///
/// ```ignore
/// use time::macros::date;
///
/// use crate::transaction::{RecurringType, Transaction};
///
/// let rent = Transaction::build("Rent", -1200.0, date!(2025 - 01 - 01), "Housing")
///     .recurring(RecurringType::Monthly)
///     .recurring_end_date(Some(date!(2025 - 12 - 01)));
/// ```
#[derive(Debug, PartialEq, Clone)]
pub struct TransactionBuilder {
    /// A short label for what the transaction was for.
    pub title: String,

    /// The monetary amount of the transaction.
    ///
    /// Positive values represent income, negative values represent expenses.
    ///
    /// # Examples
    /// - `1000.00` - Salary deposit
    /// - `-4.50` - Coffee
    pub amount: f64,

    /// The date when the transaction occurred.
    pub date: Date,

    /// The category of the transaction, e.g. "Groceries", "Transport", "Rent".
    pub category: String,

    /// Whether the transaction repeats.
    pub is_recurring: bool,

    /// How often the transaction repeats.
    pub recurring_type: Option<RecurringType>,

    /// When the repetition stops.
    pub recurring_end_date: Option<Date>,
}

impl TransactionBuilder {
    /// Mark the transaction as repeating every `interval`.
    pub fn recurring(mut self, interval: RecurringType) -> Self {
        self.is_recurring = true;
        self.recurring_type = Some(interval);
        self
    }

    /// Set the date the repetition ends on.
    pub fn recurring_end_date(mut self, end_date: Option<Date>) -> Self {
        self.recurring_end_date = end_date;
        self
    }

    /// Attach `id` to the builder's fields.
    pub fn finalize(self, id: TransactionId) -> Transaction {
        Transaction {
            id,
            title: self.title,
            amount: self.amount,
            date: self.date,
            category: self.category,
            is_recurring: self.is_recurring,
            recurring_type: self.recurring_type,
            recurring_end_date: self.recurring_end_date,
        }
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

const SELECT_COLUMNS: &str = "id, title, amount, date, category, isRecurring, recurringType, recurringEndDate";

/// Create a new transaction in the database from a builder.
///
/// A new ID is generated for the transaction.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is some SQL error.
pub fn create_transaction(
    builder: TransactionBuilder,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction = builder.finalize(TransactionId::generate());

    connection.execute(
        "INSERT INTO transactions (
            id, title, amount, date, category, isRecurring, recurringType, recurringEndDate
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        (
            &transaction.id,
            &transaction.title,
            transaction.amount,
            transaction.date,
            &transaction.category,
            transaction.is_recurring,
            transaction.recurring_type,
            transaction.recurring_end_date,
        ),
    )?;

    tracing::debug!("Created transaction {}", transaction.id);

    Ok(transaction)
}

/// Retrieve a transaction from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid transaction,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_transaction(id: &TransactionId, connection: &Connection) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(&format!(
            "SELECT {SELECT_COLUMNS} FROM transactions WHERE id = :id"
        ))?
        .query_one(&[(":id", id)], map_transaction_row)?;

    Ok(transaction)
}

/// Retrieve every transaction, most recent first.
///
/// Transactions on the same date are ordered by ID so that the order does not
/// change between calls.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error,
/// including a stored value that cannot be read back (e.g. a malformed date).
pub fn get_all_transactions(connection: &Connection) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(&format!(
            "SELECT {SELECT_COLUMNS} FROM transactions ORDER BY date DESC, id ASC"
        ))?
        .query_map([], map_transaction_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(|error| error.into()))
        .collect()
}

/// Overwrite every field of the stored transaction with the same ID as `transaction`.
///
/// Updating a transaction that does not exist changes nothing and is not an
/// error.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn update_transaction(transaction: &Transaction, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE transactions
         SET title = ?1,
             amount = ?2,
             date = ?3,
             category = ?4,
             isRecurring = ?5,
             recurringType = ?6,
             recurringEndDate = ?7
         WHERE id = ?8",
        (
            &transaction.title,
            transaction.amount,
            transaction.date,
            &transaction.category,
            transaction.is_recurring,
            transaction.recurring_type,
            transaction.recurring_end_date,
            &transaction.id,
        ),
    )?;

    if rows_affected == 0 {
        tracing::warn!(
            "Tried to update transaction {} which is not in the database",
            transaction.id
        );
    } else {
        tracing::debug!("Updated transaction {}", transaction.id);
    }

    Ok(())
}

/// Delete a transaction by ID.
///
/// Deleting a transaction that does not exist changes nothing and is not an
/// error.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn delete_transaction(id: &TransactionId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM transactions WHERE id = ?1", [id])?;

    if rows_affected == 0 {
        tracing::warn!("Tried to delete transaction {id} which is not in the database");
    } else {
        tracing::debug!("Deleted transaction {id}");
    }

    Ok(())
}

/// Get the total number of transactions in the database.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn count_transactions(connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM transactions;", [], |row| row.get(0))
        .map_err(|error| error.into())
}

/// Map a database row to a Transaction.
///
/// Expects the columns in the order of `SELECT_COLUMNS`.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let is_recurring: Option<bool> = row.get(5)?;

    Ok(Transaction {
        id: row.get(0)?,
        title: row.get(1)?,
        amount: row.get(2)?,
        date: row.get(3)?,
        category: row.get(4)?,
        is_recurring: is_recurring.unwrap_or(false),
        recurring_type: row.get(6)?,
        recurring_end_date: row.get(7)?,
    })
}

// ============================================================================
// TESTS
// ============================================================================
