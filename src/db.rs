//! Opening the application database and keeping its schema up to date.
//!
//! The schema is described by [MIGRATIONS], an ordered list of idempotent
//! steps. The number of steps applied so far is stored in SQLite's
//! `user_version` pragma, so opening a database only runs the steps it has
//! not seen yet. Databases written before versioning existed report version
//! zero; since every step checks the current shape of the table first, they
//! are upgraded in place without losing rows.

use std::path::Path;

use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};

use crate::Error;

/// A single step in the schema history.
#[derive(Debug)]
pub struct Migration {
    /// A short name used in log messages.
    pub name: &'static str,
    apply: fn(&Connection) -> Result<(), rusqlite::Error>,
}

/// Every schema change in the order it must be applied.
///
/// Migration `n` (counting from one) leaves the database at schema version `n`.
/// Only ever append to this list.
pub const MIGRATIONS: &[Migration] = &[
    Migration {
        name: "create_transactions_table",
        apply: create_transactions_table,
    },
    Migration {
        name: "add_recurrence_columns",
        apply: add_recurrence_columns,
    },
    Migration {
        name: "create_date_index",
        apply: create_date_index,
    },
    Migration {
        name: "trim_datetimes_to_dates",
        apply: trim_datetimes_to_dates,
    },
];

/// The columns added after the first release, with their definitions.
const RECURRENCE_COLUMNS: [(&str, &str); 3] = [
    ("isRecurring", "INTEGER DEFAULT 0"),
    ("recurringType", "TEXT"),
    ("recurringEndDate", "TEXT"),
];

/// The schema version a fully migrated database has.
pub fn latest_schema_version() -> i64 {
    MIGRATIONS.len() as i64
}

/// Open the database file at `path`, creating it if needed, and bring its
/// schema up to date.
///
/// # Errors
/// Returns an error if the file cannot be opened or the schema cannot be
/// migrated. The application cannot work without its database, so callers
/// should treat this as fatal.
pub fn open(path: impl AsRef<Path>) -> Result<Connection, Error> {
    let path = path.as_ref();
    tracing::info!("Opening database at {}", path.display());

    let connection = Connection::open(path)?;
    initialize(&connection)?;

    Ok(connection)
}

/// Create or upgrade the tables for the domain models.
///
/// Safe to call every time the application starts.
///
/// # Errors
/// Returns an [Error::UnsupportedSchemaVersion] if the database was written
/// by a newer version of the application, or an [Error::SqlError] if a
/// migration fails. Nothing is changed if an error is returned.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    migrate_to(connection, latest_schema_version())
}

/// Apply migrations until the database is at schema version `target`.
///
/// All pending migrations run in one exclusive transaction. A database that
/// is already at or above `target` (but not above the latest known version)
/// is left untouched.
///
/// # Errors
/// See [initialize].
pub fn migrate_to(connection: &Connection, target: i64) -> Result<(), Error> {
    let transaction =
        SqlTransaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    let current = schema_version(&transaction)?;
    let latest = latest_schema_version();

    if current > latest {
        return Err(Error::UnsupportedSchemaVersion {
            found: current,
            supported: latest,
        });
    }

    let target = target.min(latest);

    if current >= target {
        tracing::debug!("Database schema is at version {current}, nothing to migrate");
        return Ok(());
    }

    for (index, migration) in MIGRATIONS
        .iter()
        .enumerate()
        .take(target as usize)
        .skip(current.max(0) as usize)
    {
        let version = index as i64 + 1;
        tracing::info!("Applying migration {version} ({})", migration.name);
        (migration.apply)(&transaction)?;
        set_schema_version(&transaction, version)?;
    }

    transaction.commit()?;
    tracing::info!("Database schema migrated from version {current} to {target}");

    Ok(())
}

/// Get the schema version stored in the database.
///
/// # Errors
/// Returns an [Error::SqlError] if the pragma cannot be read.
pub fn schema_version(connection: &Connection) -> Result<i64, Error> {
    connection
        .query_row("PRAGMA user_version;", [], |row| row.get(0))
        .map_err(|error| error.into())
}

fn set_schema_version(connection: &Connection, version: i64) -> Result<(), rusqlite::Error> {
    // Pragmas do not accept bound parameters.
    connection.execute_batch(&format!("PRAGMA user_version = {version};"))
}

/// The names of the columns of `table` in definition order.
pub(crate) fn column_names(
    connection: &Connection,
    table: &str,
) -> Result<Vec<String>, rusqlite::Error> {
    connection
        .prepare(&format!("PRAGMA table_info(\"{table}\");"))?
        .query_map([], |row| row.get::<usize, String>(1))?
        .collect()
}

fn create_transactions_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS transactions (
                id TEXT PRIMARY KEY NOT NULL,
                title TEXT NOT NULL,
                amount REAL NOT NULL,
                date TEXT NOT NULL,
                category TEXT NOT NULL
                )",
        (),
    )?;

    Ok(())
}

fn add_recurrence_columns(connection: &Connection) -> Result<(), rusqlite::Error> {
    let existing_columns = column_names(connection, "transactions")?;

    for (name, definition) in RECURRENCE_COLUMNS {
        if existing_columns.iter().any(|column| column == name) {
            continue;
        }

        tracing::info!("Adding missing column {name} to transactions");
        connection.execute(
            &format!("ALTER TABLE transactions ADD COLUMN {name} {definition};"),
            (),
        )?;
    }

    Ok(())
}

fn create_date_index(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transactions_date ON transactions(date);",
        (),
    )?;

    Ok(())
}

/// Older versions of the app stored whatever the date picker produced, which
/// was sometimes a full ISO-8601 timestamp such as `2024-01-02T09:30:00.000Z`.
/// Keep only the date part so every row reads as `YYYY-MM-DD`.
fn trim_datetimes_to_dates(connection: &Connection) -> Result<(), rusqlite::Error> {
    let trimmed = connection.execute(
        "UPDATE transactions SET date = substr(date, 1, 10) WHERE length(date) > 10;",
        (),
    )?;

    if trimmed > 0 {
        tracing::info!("Trimmed the time from {trimmed} transaction dates");
    }

    Ok(())
}
