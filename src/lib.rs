//! # Cash Reconciliation
//!
//! Daily cash-register closings for retail stores: locale-aware amount
//! parsing, discrepancy classification and justification tracking.
//!
//! ## Features
//!
//! - **Amount normalization**: Parse `es-AR` style text such as `"$ 1.234,56"` into exact decimals
//! - **Currency formatting**: Render amounts back in the store's locale
//! - **Classification**: Bucket each closing as correct, minor or severe
//! - **Justifications**: Track adjustments until a closing is squared
//! - **Review workflow**: Submit, validate and flag closings for review
//! - **Storage abstraction**: Backend-agnostic design with trait-based storage and fallback
//!
//! ## Quick Start
//!
//! ```rust
//! use cash_reconciliation::{format_currency, parse_locale_number, FormatOptions};
//! use bigdecimal::BigDecimal;
//! use std::str::FromStr;
//!
//! let amount = parse_locale_number("$ 1.234,56");
//! assert_eq!(amount, BigDecimal::from_str("1234.56").unwrap());
//! assert_eq!(format_currency(&amount, &FormatOptions::default()), "$\u{a0}1.234,56");
//! ```

pub mod closing;
pub mod normalize;
pub mod reconciliation;
pub mod settings;
pub mod traits;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use closing::*;
pub use normalize::{
    format_currency, parse_locale_number, parse_sum_expression, FormatOptions, NumberLocale,
};
pub use reconciliation::*;
pub use settings::{BackendConfig, CashSettings, ReconConfig};
pub use traits::*;
pub use types::*;
pub use utils::{EnhancedClosingValidator, FallbackStorage, MemoryStorage};
