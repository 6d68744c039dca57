//! Serde adapter for monetary fields.
//!
//! Deserializes numbers, locale strings and null through the normalizer and
//! serializes as a plain decimal string so no precision is lost on the wire.

use bigdecimal::BigDecimal;
use serde::{Deserialize, Deserializer, Serializer};

use super::format::plain_decimal_string;
use crate::types::RawAmount;

pub fn serialize<S: Serializer>(value: &BigDecimal, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&plain_decimal_string(value))
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BigDecimal, D::Error> {
    Ok(RawAmount::deserialize(deserializer)?.to_decimal())
}
