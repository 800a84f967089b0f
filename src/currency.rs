//! Formatting amounts of money for display.

use numfmt::{Formatter, Precision};
use serde::{Deserialize, Serialize};

use crate::Error;

/// The currency amounts are displayed in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Currency {
    /// The ISO 4217 code, e.g. "USD".
    pub code: String,
    /// The symbol placed in front of amounts, e.g. "$".
    pub symbol: String,
}

impl Currency {
    /// Look up the symbol for `code`.
    ///
    /// Codes without a known symbol use the code itself followed by a space,
    /// e.g. "CHF 12.00".
    pub fn from_code(code: &str) -> Self {
        let code = code.trim().to_uppercase();
        let symbol = match code.as_str() {
            "USD" | "AUD" | "CAD" | "NZD" => "$".to_owned(),
            "EUR" => "€".to_owned(),
            "GBP" => "£".to_owned(),
            "JPY" => "¥".to_owned(),
            "INR" => "₹".to_owned(),
            _ => format!("{code} "),
        };

        Self { code, symbol }
    }
}

impl Default for Currency {
    fn default() -> Self {
        Self::from_code("USD")
    }
}

/// Format `amount` with the currency symbol, thousands separators and two
/// decimal places, e.g. "$1,234.50" or "-$4.50".
///
/// The amount is rounded to the nearest cent first, so float leftovers such
/// as `0.1 + 0.2 - 0.3` show as "$0.00".
///
/// # Errors
/// Returns an [Error::InvalidCurrency] if the symbol cannot be used as a
/// number prefix.
pub fn format_amount(amount: f64, currency: &Currency) -> Result<String, Error> {
    let amount = round_to_cents(amount);

    if amount == 0.0 {
        // Zero is hardcoded as "0", so we must specify the formatted string for zero
        return Ok(format!("{}0.00", currency.symbol));
    }

    let sign = if amount < 0.0 { "-" } else { "" };

    // numfmt switches to scientific notation at twelve integer digits.
    if amount.abs() >= SCIENTIFIC_NOTATION_CUTOFF {
        return Ok(format!(
            "{sign}{}{}",
            currency.symbol,
            group_thousands(&format!("{:.2}", amount.abs()))
        ));
    }

    let formatter = Formatter::currency(&format!("{sign}{}", currency.symbol))
        .map_err(|_| Error::InvalidCurrency(currency.symbol.clone()))?
        .precision(Precision::Decimals(2));

    Ok(pad_cents(formatter.fmt_string(amount.abs())))
}

const SCIENTIFIC_NOTATION_CUTOFF: f64 = 1e12;

fn round_to_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Insert a comma every three digits of the integer part of `digits`, a
/// plain decimal such as "1234567.89".
fn group_thousands(digits: &str) -> String {
    let (integer, fraction) = digits.split_once('.').unwrap_or((digits, ""));
    let mut grouped = String::with_capacity(digits.len() + integer.len() / 3);

    for (index, digit) in integer.chars().enumerate() {
        if index > 0 && (integer.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    if !fraction.is_empty() {
        grouped.push('.');
        grouped.push_str(fraction);
    }

    grouped
}

/// numfmt drops trailing zeros, so "12.30" comes out as "12.3" and "12.00"
/// as "12". Put them back.
fn pad_cents(formatted: String) -> String {
    match formatted.rfind('.') {
        Some(point) => {
            let decimals = formatted.len() - point - 1;
            match decimals {
                0 => format!("{formatted}00"),
                1 => format!("{formatted}0"),
                _ => formatted,
            }
        }
        None => format!("{formatted}.00"),
    }
}

#[cfg(test)]
mod tests {
    use crate::currency::{Currency, format_amount, group_thousands, pad_cents};

    #[test]
    fn known_codes_use_symbols() {
        assert_eq!(Currency::from_code("usd").symbol, "$");
        assert_eq!(Currency::from_code("EUR").symbol, "€");
        assert_eq!(Currency::from_code("GBP").symbol, "£");
    }

    #[test]
    fn unknown_codes_use_the_code() {
        let currency = Currency::from_code("chf");

        assert_eq!(currency.code, "CHF");
        assert_eq!(currency.symbol, "CHF ");
    }

    #[test]
    fn zero_has_two_decimals() {
        assert_eq!(format_amount(0.0, &Currency::default()).unwrap(), "$0.00");
    }

    #[test]
    fn negative_amounts_have_leading_minus() {
        let formatted = format_amount(-5.0, &Currency::default()).unwrap();

        assert!(formatted.starts_with("-$"), "got {formatted}");
        assert!(formatted.ends_with(".00"), "got {formatted}");
    }

    #[test]
    fn float_leftovers_round_to_zero() {
        let currency = Currency::default();

        assert_eq!(format_amount(0.1 + 0.2 - 0.3, &currency).unwrap(), "$0.00");
        assert_eq!(format_amount(0.001, &currency).unwrap(), "$0.00");
        assert_eq!(format_amount(-0.004, &currency).unwrap(), "$0.00");
    }

    #[test]
    fn rounds_to_nearest_cent() {
        let currency = Currency::default();

        assert_eq!(format_amount(999.999, &currency).unwrap(), "$1,000.00");
        assert_eq!(format_amount(-2.345_1, &currency).unwrap(), "-$2.35");
        assert_eq!(format_amount(5.006, &currency).unwrap(), "$5.01");
    }

    #[test]
    fn large_amounts_keep_separators() {
        let currency = Currency::default();

        assert_eq!(
            format_amount(1e12, &currency).unwrap(),
            "$1,000,000,000,000.00"
        );
        assert_eq!(
            format_amount(-12_345_678_901_234.5, &currency).unwrap(),
            "-$12,345,678,901,234.50"
        );
    }

    #[test]
    fn groups_thousands() {
        assert_eq!(group_thousands("1.50"), "1.50");
        assert_eq!(group_thousands("123"), "123");
        assert_eq!(group_thousands("1234"), "1,234");
        assert_eq!(group_thousands("1234567.89"), "1,234,567.89");
    }

    #[test]
    fn pads_missing_cents() {
        assert_eq!(pad_cents("$12".to_owned()), "$12.00");
        assert_eq!(pad_cents("$12.".to_owned()), "$12.00");
        assert_eq!(pad_cents("$12.3".to_owned()), "$12.30");
        assert_eq!(pad_cents("$1,234.56".to_owned()), "$1,234.56");
    }
}
