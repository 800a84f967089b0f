//! The async interface for front ends.
//!
//! A [Ledger] owns the database connection and an in-memory copy of every
//! transaction. Front ends read the copy (or subscribe to it) and call
//! [Ledger::add], [Ledger::update] and [Ledger::delete] to change the data.
//!
//! The copy follows one rule: after any successful write it is marked
//! [Freshness::Stale] and then replaced by a full reload from the database,
//! while the connection is still held. A failed write leaves the copy as it
//! was. A failed reload keeps the previous list and reports
//! [Freshness::Failed] so front ends can show an error.

use std::{
    path::Path,
    sync::{Arc, Mutex},
};

use rusqlite::Connection;
use tokio::{sync::watch, task::spawn_blocking};

use crate::{
    Error, TransactionId, db,
    transaction::{
        Summary, Transaction, TransactionBuilder, TransactionFilter, create_transaction,
        delete_transaction, get_all_transactions, get_transaction, update_transaction,
    },
};

/// Whether the in-memory list matches the database.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Freshness {
    /// The database has changed (or has not been read yet) and the list is
    /// about to be reloaded.
    #[default]
    Stale,
    /// The list was reloaded after the last change.
    Fresh,
    /// The last reload failed. The list is the last one that loaded.
    Failed(String),
}

/// A snapshot of the transactions held by a [Ledger].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LedgerState {
    /// Every transaction, most recent first.
    pub transactions: Vec<Transaction>,
    /// Whether `transactions` is up to date.
    pub status: Freshness,
}

/// Owns the database connection and the cached transaction list.
///
/// Cloning a ledger is cheap and the clones share the connection and list.
#[derive(Debug, Clone)]
pub struct Ledger {
    connection: Arc<Mutex<Connection>>,
    state: Arc<watch::Sender<LedgerState>>,
}

impl Ledger {
    /// Open the database file at `path` and load every transaction.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened, migrated or read.
    /// The app cannot work without its database, so this should be treated
    /// as fatal.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref().to_owned();

        let connection = spawn_blocking(move || db::open(path))
            .await
            .map_err(|error| Error::BackgroundTaskFailed(error.to_string()))??;

        let ledger = Self::unloaded(connection);
        ledger.refresh().await?;

        Ok(ledger)
    }

    /// Create a ledger for `connection`, bringing the schema up to date and
    /// loading every transaction.
    ///
    /// # Errors
    /// Returns an error if the schema cannot be migrated or the transactions
    /// cannot be read.
    pub async fn new(connection: Connection) -> Result<Self, Error> {
        let ledger = Self::unloaded(connection);

        ledger
            .run(|connection, state| {
                db::initialize(connection)?;
                reload(connection, state)
            })
            .await?;

        Ok(ledger)
    }

    fn unloaded(connection: Connection) -> Self {
        let (sender, _) = watch::channel(LedgerState::default());

        Self {
            connection: Arc::new(Mutex::new(connection)),
            state: Arc::new(sender),
        }
    }

    /// Reload every transaction from the database.
    ///
    /// # Errors
    /// Returns an error if the transactions cannot be read. The previous list
    /// is kept and the status is set to [Freshness::Failed].
    pub async fn refresh(&self) -> Result<(), Error> {
        self.run(reload).await
    }

    /// Store a new transaction and return its ID.
    ///
    /// # Errors
    /// Returns an error if the transaction cannot be stored.
    pub async fn add(&self, builder: TransactionBuilder) -> Result<TransactionId, Error> {
        self.run(move |connection, state| {
            let transaction = create_transaction(builder, connection)?;
            reload_after_write(connection, state);
            Ok(transaction.id)
        })
        .await
    }

    /// Replace the stored transaction that has the same ID as `transaction`.
    ///
    /// Nothing changes if there is no such transaction.
    ///
    /// # Errors
    /// Returns an error if the database could not be updated.
    pub async fn update(&self, transaction: Transaction) -> Result<(), Error> {
        self.run(move |connection, state| {
            update_transaction(&transaction, connection)?;
            reload_after_write(connection, state);
            Ok(())
        })
        .await
    }

    /// Delete the transaction with `id`.
    ///
    /// Nothing changes if there is no such transaction.
    ///
    /// # Errors
    /// Returns an error if the database could not be updated.
    pub async fn delete(&self, id: TransactionId) -> Result<(), Error> {
        self.run(move |connection, state| {
            delete_transaction(&id, connection)?;
            reload_after_write(connection, state);
            Ok(())
        })
        .await
    }

    /// Read a single transaction straight from the database.
    ///
    /// # Errors
    /// Returns an [Error::NotFound] if there is no transaction with `id`.
    pub async fn get(&self, id: TransactionId) -> Result<Transaction, Error> {
        self.run(move |connection, _| get_transaction(&id, connection))
            .await
    }

    /// A copy of the current list and its status.
    pub fn state(&self) -> LedgerState {
        self.state.borrow().clone()
    }

    /// Watch for changes to the list.
    pub fn subscribe(&self) -> watch::Receiver<LedgerState> {
        self.state.subscribe()
    }

    /// Totals over the full, unfiltered list.
    pub fn summary(&self) -> Summary {
        Summary::from_transactions(&self.state.borrow().transactions)
    }

    /// The transactions that pass `filter`, most recent first.
    pub fn filtered(&self, filter: &TransactionFilter) -> Vec<Transaction> {
        filter
            .apply(&self.state.borrow().transactions)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Run `operation` on the blocking thread pool with exclusive use of the
    /// connection.
    ///
    /// If an earlier operation panicked while holding the connection, the lock
    /// is taken over anyway. Every write is a single autocommitted statement
    /// and migrations roll back when their transaction is dropped, so the
    /// connection is never left halfway through a change.
    async fn run<T, F>(&self, operation: F) -> Result<T, Error>
    where
        F: FnOnce(&Connection, &watch::Sender<LedgerState>) -> Result<T, Error> + Send + 'static,
        T: Send + 'static,
    {
        let connection = self.connection.clone();
        let state = self.state.clone();

        spawn_blocking(move || {
            let guard = connection.lock().unwrap_or_else(|poisoned| {
                tracing::warn!("Recovering the database connection after a panic");
                poisoned.into_inner()
            });
            operation(&*guard, &*state)
        })
        .await
        .map_err(|error| Error::BackgroundTaskFailed(error.to_string()))?
    }
}

fn reload(connection: &Connection, state: &watch::Sender<LedgerState>) -> Result<(), Error> {
    match get_all_transactions(connection) {
        Ok(transactions) => {
            tracing::debug!("Loaded {} transactions", transactions.len());
            state.send_replace(LedgerState {
                transactions,
                status: Freshness::Fresh,
            });
            Ok(())
        }
        Err(error) => {
            tracing::error!("Could not load transactions: {error}");
            state.send_modify(|state| state.status = Freshness::Failed(error.to_string()));
            Err(error)
        }
    }
}

/// The write has already been committed, so a failed reload is reported
/// through the status rather than as an error of the write.
fn reload_after_write(connection: &Connection, state: &watch::Sender<LedgerState>) {
    state.send_modify(|state| state.status = Freshness::Stale);

    if let Err(error) = reload(connection, state) {
        tracing::warn!("Saved the change but could not reload transactions: {error}");
    }
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error, TransactionId,
        ledger::{Freshness, Ledger},
        transaction::{Summary, Transaction, TransactionFilter, TransactionKind},
    };

    async fn get_test_ledger() -> Ledger {
        let conn = Connection::open_in_memory().unwrap();
        Ledger::new(conn).await.expect("Could not create ledger")
    }

    async fn add_example_transactions(ledger: &Ledger) -> (TransactionId, TransactionId) {
        let salary = ledger
            .add(Transaction::build(
                "Salary",
                1000.0,
                date!(2024 - 01 - 01),
                "Work",
            ))
            .await
            .unwrap();
        let coffee = ledger
            .add(Transaction::build(
                "Coffee",
                -5.0,
                date!(2024 - 01 - 02),
                "Food",
            ))
            .await
            .unwrap();

        (salary, coffee)
    }

    #[tokio::test]
    async fn new_ledger_is_fresh_and_empty() {
        let ledger = get_test_ledger().await;

        let state = ledger.state();

        assert!(state.transactions.is_empty());
        assert_eq!(state.status, Freshness::Fresh);
    }

    #[tokio::test]
    async fn add_reloads_the_list() {
        let ledger = get_test_ledger().await;

        let (salary, coffee) = add_example_transactions(&ledger).await;

        let state = ledger.state();
        assert_eq!(state.status, Freshness::Fresh);
        let ids: Vec<TransactionId> = state
            .transactions
            .into_iter()
            .map(|transaction| transaction.id)
            .collect();
        assert_eq!(ids, [coffee, salary]);
    }

    #[tokio::test]
    async fn summary_and_filters_use_the_cached_list() {
        let ledger = get_test_ledger().await;
        add_example_transactions(&ledger).await;

        assert_eq!(
            ledger.summary(),
            Summary {
                balance: 995.0,
                income: 1000.0,
                expenses: 5.0,
            }
        );

        let expenses = ledger.filtered(&TransactionFilter {
            kind: TransactionKind::Expense,
            ..Default::default()
        });
        assert_eq!(expenses.len(), 1);
        assert_eq!(expenses[0].title, "Coffee");

        let search = ledger.filtered(&TransactionFilter {
            search: "sal".to_owned(),
            ..Default::default()
        });
        assert_eq!(search.len(), 1);
        assert_eq!(search[0].title, "Salary");
    }

    #[tokio::test]
    async fn update_and_delete_reload_the_list() {
        let ledger = get_test_ledger().await;
        let (salary, coffee) = add_example_transactions(&ledger).await;

        let mut transaction = ledger.get(salary.clone()).await.unwrap();
        transaction.amount = 1100.0;
        ledger.update(transaction).await.unwrap();
        ledger.delete(coffee).await.unwrap();

        let state = ledger.state();
        assert_eq!(state.transactions.len(), 1);
        assert_eq!(state.transactions[0].id, salary);
        assert_eq!(state.transactions[0].amount, 1100.0);
    }

    #[tokio::test]
    async fn subscribers_see_changes() {
        let ledger = get_test_ledger().await;
        let mut receiver = ledger.subscribe();

        ledger
            .add(Transaction::build(
                "Gift",
                50.0,
                date!(2024 - 06 - 01),
                "Other",
            ))
            .await
            .unwrap();

        assert!(receiver.has_changed().unwrap());
        let state = receiver.borrow_and_update().clone();
        assert_eq!(state.status, Freshness::Fresh);
        assert_eq!(state.transactions.len(), 1);
    }

    #[tokio::test]
    async fn failed_reload_keeps_previous_list() {
        let ledger = get_test_ledger().await;
        add_example_transactions(&ledger).await;
        let before = ledger.state().transactions;
        ledger
            .run(|connection, _| {
                connection.execute("DROP TABLE transactions", ())?;
                Ok(())
            })
            .await
            .unwrap();

        let result = ledger.refresh().await;

        assert!(matches!(result, Err(Error::SqlError(_))), "got {result:?}");
        let state = ledger.state();
        assert_eq!(state.transactions, before);
        assert!(matches!(state.status, Freshness::Failed(_)));
    }

    #[tokio::test]
    async fn failed_write_leaves_list_untouched() {
        let ledger = get_test_ledger().await;
        add_example_transactions(&ledger).await;
        let before = ledger.state();
        ledger
            .run(|connection, _| {
                connection.execute("DROP TABLE transactions", ())?;
                Ok(())
            })
            .await
            .unwrap();

        let result = ledger
            .add(Transaction::build(
                "Lost",
                1.0,
                date!(2024 - 01 - 03),
                "None",
            ))
            .await;

        assert!(result.is_err());
        assert_eq!(ledger.state(), before);
    }

    #[tokio::test]
    async fn open_upgrades_legacy_file_with_timestamped_dates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("legacy.db");
        Connection::open(&path)
            .unwrap()
            .execute_batch(
                "CREATE TABLE transactions (
                    id TEXT PRIMARY KEY NOT NULL,
                    title TEXT NOT NULL,
                    amount REAL NOT NULL,
                    date TEXT NOT NULL,
                    category TEXT NOT NULL
                );
                INSERT INTO transactions (id, title, amount, date, category) VALUES
                    ('a1b2c3d4e', 'Salary', 3000.0, '2024-01-01', 'Work'),
                    ('f5g6h7i8j', 'Coffee', -4.5, '2024-01-02T09:30:00.000Z', 'Food');",
            )
            .unwrap();

        let ledger = Ledger::open(&path).await.expect("Could not open legacy file");

        let state = ledger.state();
        assert_eq!(state.status, Freshness::Fresh);
        assert_eq!(state.transactions.len(), 2);
        assert_eq!(state.transactions[0].title, "Coffee");
        assert_eq!(state.transactions[0].date, date!(2024 - 01 - 02));
    }

    #[tokio::test]
    async fn panicked_operation_does_not_lock_out_later_calls() {
        let ledger = get_test_ledger().await;
        add_example_transactions(&ledger).await;

        let result = ledger
            .run(|_, _| -> Result<(), Error> { panic!("storage operation panicked") })
            .await;

        assert!(
            matches!(result, Err(Error::BackgroundTaskFailed(_))),
            "got {result:?}"
        );
        ledger.refresh().await.expect("Could not reload after a panic");
        ledger
            .add(Transaction::build(
                "Rent",
                -1200.0,
                date!(2024 - 01 - 03),
                "Housing",
            ))
            .await
            .expect("Could not add after a panic");
        assert_eq!(ledger.state().transactions.len(), 3);
    }

    #[tokio::test]
    async fn open_reads_data_written_earlier() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("budgetn.db");

        let first = Ledger::open(&path).await.expect("Could not open ledger");
        let id = first
            .add(Transaction::build(
                "Salary",
                1000.0,
                date!(2024 - 01 - 01),
                "Work",
            ))
            .await
            .unwrap();
        drop(first);

        let second = Ledger::open(&path).await.expect("Could not reopen ledger");

        let state = second.state();
        assert_eq!(state.transactions.len(), 1);
        assert_eq!(state.transactions[0].id, id);
    }
}
