//! Cash counted at the register: bills, float and deposits

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::normalize::{amount, format::plain_decimal_string, parse_locale_number};
use crate::settings::CashSettings;
use crate::types::*;

/// Number of bills of one denomination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillCount {
    #[serde(with = "amount")]
    pub denomination: BigDecimal,
    pub quantity: u32,
}

impl BillCount {
    /// Value of the bills counted
    pub fn total(&self) -> BigDecimal {
        &self.denomination * BigDecimal::from(self.quantity)
    }
}

/// Cash handed to the armored-transport courier during the shift
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deposit {
    /// Bag or receipt code
    pub code: String,
    #[serde(with = "amount")]
    pub amount: BigDecimal,
}

/// Cash count of a register at closing time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashCount {
    /// Bills per denomination, largest first
    pub bills: Vec<BillCount>,
    /// Change fund left in the drawer for the next shift
    #[serde(with = "amount")]
    pub float_amount: BigDecimal,
    /// Deposits taken out of the drawer during the shift
    #[serde(default)]
    pub deposits: Vec<Deposit>,
}

impl CashCount {
    /// Empty count for the given denominations
    pub fn new(denominations: &[u32], float_amount: BigDecimal) -> Self {
        Self {
            bills: denominations
                .iter()
                .map(|value| BillCount {
                    denomination: BigDecimal::from(*value),
                    quantity: 0,
                })
                .collect(),
            float_amount,
            deposits: Vec::new(),
        }
    }

    /// Empty count using configured denominations and float
    pub fn from_settings(settings: &CashSettings) -> Self {
        Self::new(&settings.denominations, settings.float_amount.clone())
    }

    /// Set how many bills of a denomination were counted
    pub fn set_quantity(&mut self, denomination: u32, quantity: u32) -> ClosingResult<()> {
        let denomination = BigDecimal::from(denomination);
        let bill = self
            .bills
            .iter_mut()
            .find(|b| b.denomination == denomination)
            .ok_or_else(|| {
                ClosingError::Validation(format!("Unknown bill denomination: {}", denomination))
            })?;
        bill.quantity = quantity;
        Ok(())
    }

    /// Set a quantity from the text typed in the count sheet.
    ///
    /// Empty or unreadable text counts as zero bills; negative or fractional
    /// quantities are rejected.
    pub fn set_quantity_input(&mut self, denomination: u32, input: &str) -> ClosingResult<()> {
        let value = parse_locale_number(input);
        if value < BigDecimal::from(0) || value.with_scale(0) != value {
            return Err(ClosingError::Validation(format!(
                "Bill quantity must be a whole, non-negative number: '{}'",
                input
            )));
        }

        let quantity = plain_decimal_string(&value.with_scale(0))
            .parse::<u32>()
            .map_err(|_| {
                ClosingError::Validation(format!("Bill quantity too large: '{}'", input))
            })?;

        self.set_quantity(denomination, quantity)
    }

    /// Record a courier deposit
    pub fn add_deposit(&mut self, code: String, amount: impl Into<RawAmount>) {
        self.deposits.push(Deposit {
            code,
            amount: parse_locale_number(amount),
        });
    }

    /// Value of every bill counted
    pub fn bills_total(&self) -> BigDecimal {
        self.bills.iter().map(BillCount::total).sum()
    }

    /// Bills counted minus the float that stays in the drawer
    pub fn final_balance(&self) -> BigDecimal {
        self.bills_total() - &self.float_amount
    }

    /// Sum of courier deposits
    pub fn deposits_total(&self) -> BigDecimal {
        self.deposits.iter().map(|d| &d.amount).sum()
    }

    /// Cash collected over the shift: the drawer balance plus what was deposited
    pub fn counted_cash(&self) -> BigDecimal {
        self.final_balance() + self.deposits_total()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count() -> CashCount {
        CashCount::from_settings(&CashSettings::default())
    }

    #[test]
    fn test_default_denominations() {
        let count = count();
        assert_eq!(count.bills.len(), 10);
        assert_eq!(count.bills[0].denomination, BigDecimal::from(20000));
        assert_eq!(count.float_amount, BigDecimal::from(10000));
        assert_eq!(count.bills_total(), BigDecimal::from(0));
        assert_eq!(count.final_balance(), BigDecimal::from(-10000));
    }

    #[test]
    fn test_cash_totals() {
        let mut count = count();
        count.set_quantity(20000, 2).unwrap();
        count.set_quantity(1000, 5).unwrap();
        count.set_quantity_input(100, "3").unwrap();
        count.add_deposit("BR-001".to_string(), "15.000,00");

        assert_eq!(count.bills_total(), BigDecimal::from(45300));
        assert_eq!(count.final_balance(), BigDecimal::from(35300));
        assert_eq!(count.deposits_total(), BigDecimal::from(15000));
        assert_eq!(count.counted_cash(), BigDecimal::from(50300));
    }

    #[test]
    fn test_quantity_input_rules() {
        let mut count = count();
        count.set_quantity_input(500, "").unwrap();
        assert_eq!(count.bills_total(), BigDecimal::from(0));

        assert!(matches!(
            count.set_quantity_input(500, "-2"),
            Err(ClosingError::Validation(_))
        ));
        assert!(matches!(
            count.set_quantity_input(500, "1,5"),
            Err(ClosingError::Validation(_))
        ));
        assert!(matches!(
            count.set_quantity(7, 1),
            Err(ClosingError::Validation(_))
        ));
    }
}
