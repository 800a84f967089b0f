//! How often a recurring transaction repeats.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};

use crate::Error;

/// The interval at which a recurring transaction repeats.
///
/// Stored in the database as lower case text, e.g. "monthly".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecurringType {
    /// Repeats every day.
    Daily,
    /// Repeats every week.
    Weekly,
    /// Repeats every month.
    Monthly,
    /// Repeats every year.
    Yearly,
}

impl RecurringType {
    /// The text used to store the interval.
    pub fn as_str(&self) -> &'static str {
        match self {
            RecurringType::Daily => "daily",
            RecurringType::Weekly => "weekly",
            RecurringType::Monthly => "monthly",
            RecurringType::Yearly => "yearly",
        }
    }
}

impl Display for RecurringType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecurringType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "daily" => Ok(RecurringType::Daily),
            "weekly" => Ok(RecurringType::Weekly),
            "monthly" => Ok(RecurringType::Monthly),
            "yearly" => Ok(RecurringType::Yearly),
            _ => Err(Error::InvalidRecurringType(s.to_owned())),
        }
    }
}

impl ToSql for RecurringType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for RecurringType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let text = value.as_str()?;

        text.parse()
            .map_err(|error: Error| FromSqlError::Other(Box::new(error)))
    }
}

#[cfg(test)]
mod tests {
    use crate::{Error, transaction::RecurringType};

    #[test]
    fn parses_known_intervals_ignoring_case() {
        assert_eq!("daily".parse::<RecurringType>(), Ok(RecurringType::Daily));
        assert_eq!("Weekly".parse::<RecurringType>(), Ok(RecurringType::Weekly));
        assert_eq!(" MONTHLY ".parse::<RecurringType>(), Ok(RecurringType::Monthly));
        assert_eq!("yearly".parse::<RecurringType>(), Ok(RecurringType::Yearly));
    }

    #[test]
    fn rejects_unknown_interval() {
        let result = "fortnightly".parse::<RecurringType>();

        assert_eq!(
            result,
            Err(Error::InvalidRecurringType("fortnightly".to_owned()))
        );
    }

    #[test]
    fn display_matches_stored_text() {
        assert_eq!(RecurringType::Monthly.to_string(), "monthly");
    }
}
