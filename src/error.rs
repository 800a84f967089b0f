//! Defines the app level error type.

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// The database was written by a newer version of the application.
    ///
    /// The schema cannot be downgraded, so the database must be opened with
    /// a version that knows about schema version `found`.
    #[error("database schema version {found} is newer than the latest supported version {supported}")]
    UnsupportedSchemaVersion {
        /// The version stored in the database.
        found: i64,
        /// The newest version this build can migrate to.
        supported: i64,
    },

    /// A recurrence interval that is not one of daily, weekly, monthly or yearly.
    #[error("\"{0}\" is not a valid recurrence interval")]
    InvalidRecurringType(String),

    /// A transaction kind filter that is not one of all, income or expense.
    #[error("\"{0}\" is not a valid transaction kind")]
    InvalidTransactionKind(String),

    /// A date string could not be parsed.
    ///
    /// Callers should pass in the original error as a string and the date
    /// string that caused the error.
    #[error("could not parse date string \"{1}\": {0}")]
    InvalidDateFormat(String, String),

    /// The currency symbol could not be used to build a number formatter.
    #[error("invalid currency symbol \"{0}\"")]
    InvalidCurrency(String),

    /// A blocking database task panicked or was cancelled before finishing.
    #[error("background database task failed: {0}")]
    BackgroundTaskFailed(String),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::Error;

    #[test]
    fn no_rows_maps_to_not_found() {
        let error: Error = rusqlite::Error::QueryReturnedNoRows.into();

        assert_eq!(error, Error::NotFound);
    }

    #[test]
    fn other_sql_errors_are_wrapped() {
        let error: Error = rusqlite::Error::InvalidQuery.into();

        assert_eq!(error, Error::SqlError(rusqlite::Error::InvalidQuery));
    }
}
