//! Locale number normalization
//!
//! Cashiers type amounts the way they read them on a receipt: `"1.234,56"`,
//! `"$ 1.234,56"`, `"1234,56"` or plain `"1234.56"`. The backend returns the
//! same mix. Everything here converts that input into exact decimals and never
//! fails: anything unreadable becomes zero.

pub mod amount;
pub mod format;

pub use format::*;

use bigdecimal::BigDecimal;
use std::str::FromStr;

use crate::types::RawAmount;

/// Parse a number written in Latin-American format.
///
/// Missing and non-numeric values give zero, numbers are returned unchanged and
/// text goes through the locale rules:
///
/// - everything except digits, `,`, `.` and `-` is stripped;
/// - when both `.` and `,` appear, `.` groups thousands and `,` is the decimal mark;
/// - when only `,` appears it is the decimal mark;
/// - otherwise the text is already in decimal form.
///
/// ```rust
/// use bigdecimal::BigDecimal;
/// use cash_reconciliation::parse_locale_number;
/// use std::str::FromStr;
///
/// assert_eq!(parse_locale_number("$ 1.234,56"), BigDecimal::from_str("1234.56").unwrap());
/// assert_eq!(parse_locale_number("abc"), BigDecimal::from(0));
/// assert_eq!(parse_locale_number(None::<&str>), BigDecimal::from(0));
/// ```
pub fn parse_locale_number(value: impl Into<RawAmount>) -> BigDecimal {
    value.into().to_decimal()
}

/// Text branch of [`parse_locale_number`]
pub(crate) fn parse_locale_str(input: &str) -> BigDecimal {
    let cleaned: String = input
        .trim()
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, ',' | '.' | '-'))
        .collect();

    if cleaned.is_empty() {
        return BigDecimal::from(0);
    }

    let canonical = if cleaned.contains('.') && cleaned.contains(',') {
        cleaned.replace('.', "").replace(',', ".")
    } else if cleaned.contains(',') {
        cleaned.replace(',', ".")
    } else {
        cleaned
    };

    match leading_decimal(&canonical).and_then(|literal| BigDecimal::from_str(&literal).ok()) {
        Some(value) => value,
        None => {
            tracing::debug!(input, "unreadable amount treated as zero");
            BigDecimal::from(0)
        }
    }
}

/// Longest leading `-?digits(.digits)?` literal, the way a lenient float
/// parser reads `"12.5.3"` as `12.5`.
fn leading_decimal(s: &str) -> Option<String> {
    let (negative, rest) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };

    let integer_len = rest.bytes().take_while(u8::is_ascii_digit).count();
    let (integer, after) = rest.split_at(integer_len);
    let fraction = after
        .strip_prefix('.')
        .map(|f| &f[..f.bytes().take_while(u8::is_ascii_digit).count()])
        .unwrap_or("");

    if integer.is_empty() && fraction.is_empty() {
        return None;
    }

    let sign = if negative { "-" } else { "" };
    let integer = if integer.is_empty() { "0" } else { integer };
    if fraction.is_empty() {
        Some(format!("{}{}", sign, integer))
    } else {
        Some(format!("{}{}.{}", sign, integer, fraction))
    }
}

/// Evaluate a split-amount entry such as `"500+500"`.
///
/// Only digits, `+`, `.`, `,` and whitespace are accepted. Any other character
/// rejects the whole expression, which then evaluates to zero. Each operand is
/// normalized with [`parse_locale_number`].
pub fn parse_sum_expression(expr: &str) -> BigDecimal {
    let rejected = expr
        .chars()
        .find(|c| !(c.is_ascii_digit() || matches!(c, '+' | '.' | ',') || c.is_whitespace()));

    if let Some(character) = rejected {
        tracing::debug!(expr, %character, "sum expression rejected");
        return BigDecimal::from(0);
    }

    expr.split('+')
        .map(|operand| parse_locale_number(operand))
        .sum()
}
