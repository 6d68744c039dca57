//! Currency formatting for display

use bigdecimal::{BigDecimal, RoundingMode};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::parse_locale_number;
use crate::types::RawAmount;

/// Locales the formatter knows how to render.
///
/// Both group thousands with `.` and use `,` as the decimal mark, which is the
/// format [`parse_locale_number`] reads back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum NumberLocale {
    /// Argentina: `$ 1.234,56`
    #[default]
    #[serde(rename = "es-AR")]
    EsAr,
    /// Chile: `$1.234,56`
    #[serde(rename = "es-CL")]
    EsCl,
}

impl NumberLocale {
    /// Thousands separator
    pub fn group_separator(&self) -> char {
        '.'
    }

    /// Decimal mark
    pub fn decimal_separator(&self) -> char {
        ','
    }

    /// Text between the currency symbol and the digits
    fn symbol_gap(&self) -> &'static str {
        match self {
            // non-breaking space, as browsers render es-AR currency
            NumberLocale::EsAr => "\u{a0}",
            NumberLocale::EsCl => "",
        }
    }

    /// BCP 47 tag
    pub fn tag(&self) -> &'static str {
        match self {
            NumberLocale::EsAr => "es-AR",
            NumberLocale::EsCl => "es-CL",
        }
    }
}

impl fmt::Display for NumberLocale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for NumberLocale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "es-ar" => Ok(NumberLocale::EsAr),
            "es-cl" => Ok(NumberLocale::EsCl),
            other => Err(format!("Unsupported locale: {}", other)),
        }
    }
}

/// Largest number of fraction digits [`format_currency`] will render
pub const MAX_FRACTION_DIGITS: u32 = 100;

/// How [`format_currency`] renders an amount
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatOptions {
    /// Separator conventions
    pub locale: NumberLocale,
    /// ISO 4217 currency code
    pub currency: String,
    /// Fraction digits always shown
    pub minimum_fraction_digits: u32,
    /// Fraction digits the amount is rounded to
    pub maximum_fraction_digits: u32,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            locale: NumberLocale::EsAr,
            currency: "ARS".to_string(),
            minimum_fraction_digits: 2,
            maximum_fraction_digits: 2,
        }
    }
}

impl FormatOptions {
    /// Options for a currency with the default locale and precision
    pub fn for_currency(currency: &str) -> Self {
        Self {
            currency: currency.to_string(),
            ..Self::default()
        }
    }

    /// Set the locale
    pub fn with_locale(mut self, locale: NumberLocale) -> Self {
        self.locale = locale;
        self
    }

    /// Set minimum and maximum fraction digits, capped at [`MAX_FRACTION_DIGITS`]
    pub fn with_fraction_digits(mut self, minimum: u32, maximum: u32) -> Self {
        self.minimum_fraction_digits = minimum.min(MAX_FRACTION_DIGITS);
        self.maximum_fraction_digits =
            maximum.clamp(self.minimum_fraction_digits, MAX_FRACTION_DIGITS);
        self
    }

    /// Whether both fraction digit settings are within [`MAX_FRACTION_DIGITS`]
    pub fn has_valid_precision(&self) -> bool {
        self.minimum_fraction_digits <= MAX_FRACTION_DIGITS
            && self.maximum_fraction_digits <= MAX_FRACTION_DIGITS
    }

    /// Symbol printed before the amount
    pub fn currency_symbol(&self) -> &str {
        match self.currency.as_str() {
            "ARS" | "CLP" | "MXN" | "COP" | "UYU" => "$",
            "USD" => "US$",
            "EUR" => "€",
            "BRL" => "R$",
            other => other,
        }
    }
}

/// Format an amount as currency text.
///
/// The value is normalized first, so raw form input is accepted. Amounts are
/// rounded half away from zero to `maximum_fraction_digits`, then trailing
/// zeros are dropped down to `minimum_fraction_digits`.
///
/// ```rust
/// use cash_reconciliation::{format_currency, FormatOptions};
///
/// let options = FormatOptions::default();
/// assert_eq!(format_currency(1234.5, &options), "$\u{a0}1.234,50");
/// assert_eq!(format_currency("-1.000", &options), "-$\u{a0}1,00");
/// ```
pub fn format_currency(value: impl Into<RawAmount>, options: &FormatOptions) -> String {
    let amount = parse_locale_number(value);
    let minimum = options.minimum_fraction_digits.min(MAX_FRACTION_DIGITS);
    let maximum = options
        .maximum_fraction_digits
        .clamp(minimum, MAX_FRACTION_DIGITS);
    let minimum = minimum as usize;

    let rounded = amount.with_scale_round(i64::from(maximum), RoundingMode::HalfUp);
    let (integer, fraction) = split_digits(&rounded, maximum as usize);

    let mut fraction = fraction.trim_end_matches('0').to_string();
    while fraction.len() < minimum {
        fraction.push('0');
    }

    let locale = options.locale;
    let mut body = group_thousands(&integer, locale.group_separator());
    if !fraction.is_empty() {
        body.push(locale.decimal_separator());
        body.push_str(&fraction);
    }

    let sign = if rounded < BigDecimal::from(0) { "-" } else { "" };
    format!(
        "{}{}{}{}",
        sign,
        options.currency_symbol(),
        locale.symbol_gap(),
        body
    )
}

/// Decimal rendered as `-123.45`, never in exponent notation
pub(crate) fn plain_decimal_string(value: &BigDecimal) -> String {
    let (_, scale) = value.as_bigint_and_exponent();
    let scale = scale.max(0);
    let value = value.with_scale(scale);
    let (integer, fraction) = split_digits(&value, scale as usize);

    let sign = if value < BigDecimal::from(0) { "-" } else { "" };
    if fraction.is_empty() {
        format!("{}{}", sign, integer)
    } else {
        format!("{}{}.{}", sign, integer, fraction)
    }
}

/// Unsigned integer and fraction digits of a value whose scale is `scale`
fn split_digits(value: &BigDecimal, scale: usize) -> (String, String) {
    let (digits, _) = value.as_bigint_and_exponent();
    let digits = digits.to_string();
    let mut digits = digits.trim_start_matches('-').to_string();

    while digits.len() <= scale {
        digits.insert(0, '0');
    }

    let fraction = digits.split_off(digits.len() - scale);
    (digits, fraction)
}

fn group_thousands(integer: &str, separator: char) -> String {
    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (index, digit) in integer.chars().enumerate() {
        if index > 0 && (integer.len() - index) % 3 == 0 {
            grouped.push(separator);
        }
        grouped.push(digit);
    }
    grouped
}
