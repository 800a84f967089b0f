//! Local dates and the date format used for storage.

use time::{Date, OffsetDateTime, format_description::BorrowedFormatItem, macros::format_description};

use crate::Error;

/// Dates are stored as `YYYY-MM-DD` so that sorting the text sorts the dates.
const DATE_FORMAT: &[BorrowedFormatItem<'_>] = format_description!("[year]-[month]-[day]");

/// Today's date in the local timezone, or in UTC if the local offset cannot
/// be determined.
pub fn today() -> Date {
    OffsetDateTime::now_local()
        .unwrap_or_else(|error| {
            tracing::debug!("Could not get local offset, falling back to UTC: {error}");
            OffsetDateTime::now_utc()
        })
        .date()
}

/// Parse a `YYYY-MM-DD` date string.
///
/// # Errors
/// Returns an [Error::InvalidDateFormat] if `text` is not a valid date in that format.
pub fn parse_date(text: &str) -> Result<Date, Error> {
    Date::parse(text.trim(), DATE_FORMAT)
        .map_err(|error| Error::InvalidDateFormat(error.to_string(), text.to_owned()))
}
