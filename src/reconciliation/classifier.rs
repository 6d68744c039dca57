//! Severity classification of a closing's discrepancy

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Absolute discrepancy above which a closing is a severe difference.
///
/// Expressed in whole currency units. The threshold itself counts as minor.
pub const SEVERE_DIFFERENCE_THRESHOLD: i64 = 10_000;

/// Severity bucket of a closing, ordered from best to worst
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// No discrepancy at all
    Correct,
    /// Non-zero discrepancy within the threshold
    MinorDifference,
    /// Discrepancy beyond the threshold
    SevereDifference,
}

impl Severity {
    /// All buckets, best first
    pub const ALL: [Severity; 3] = [
        Severity::Correct,
        Severity::MinorDifference,
        Severity::SevereDifference,
    ];

    /// Whether the closing has any discrepancy
    pub fn has_difference(&self) -> bool {
        !matches!(self, Severity::Correct)
    }

    /// Human readable label
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Correct => "Correct",
            Severity::MinorDifference => "Minor difference",
            Severity::SevereDifference => "Severe difference",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "correct" | "correcto" => Ok(Severity::Correct),
            "minor" | "minor_difference" | "menor" => Ok(Severity::MinorDifference),
            "severe" | "severe_difference" | "grave" => Ok(Severity::SevereDifference),
            other => Err(format!("Unknown severity: {}", other)),
        }
    }
}

/// Classify a closing by its grand difference total.
///
/// Zero is [`Severity::Correct`]; an absolute value above
/// [`SEVERE_DIFFERENCE_THRESHOLD`] is [`Severity::SevereDifference`]; anything
/// else is [`Severity::MinorDifference`].
pub fn classify(grand_difference_total: &BigDecimal) -> Severity {
    if *grand_difference_total == BigDecimal::from(0) {
        Severity::Correct
    } else if grand_difference_total.abs() > BigDecimal::from(SEVERE_DIFFERENCE_THRESHOLD) {
        Severity::SevereDifference
    } else {
        Severity::MinorDifference
    }
}
