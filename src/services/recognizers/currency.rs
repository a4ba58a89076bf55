use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

const AMOUNT: &str = r"(-?\d[\d,]*(?:\.\d+)?)\s*(k|thousand)?";
const UNIT: &str = r"(\$|€|£|¥|us dollars?|dollars?|bucks|usd|euros?|eur|pounds?(?:\s+sterling)?|gbp|yen|jpy)";

static SYMBOL_FIRST_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?i)(\$|€|£|¥|\busd|\beur|\bgbp|\bjpy)\s*{AMOUNT}")).unwrap()
});

static AMOUNT_FIRST_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"(?i){AMOUNT}\s*{UNIT}(?:\b|$|\s)")).unwrap());

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencyAmount {
    pub value: f64,
    pub unit: String,
}

impl CurrencyAmount {
    pub fn is_positive_integer(&self) -> bool {
        self.value > 0.0 && self.value.fract() == 0.0
    }
}

impl fmt::Display for CurrencyAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.value.fract() == 0.0 {
            write!(f, "{:.0} {}", self.value, self.unit)
        } else {
            write!(f, "{} {}", self.value, self.unit)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetRejection {
    MissingCurrency,
    InvalidAmount,
}

pub fn recognize_currency(text: &str) -> Option<CurrencyAmount> {
    let (amount, multiplier, unit) = if let Some(caps) = AMOUNT_FIRST_PATTERN.captures(text) {
        (caps.get(1)?, caps.get(2), caps.get(3)?)
    } else {
        let caps = SYMBOL_FIRST_PATTERN.captures(text)?;
        (caps.get(2)?, caps.get(3), caps.get(1)?)
    };

    let base: f64 = amount.as_str().replace(',', "").parse().ok()?;
    let value = match multiplier {
        Some(_) => base * 1_000.0,
        None => base,
    };

    Some(CurrencyAmount {
        value,
        unit: unit_name(unit.as_str())?.to_string(),
    })
}

pub fn validate_budget(text: &str) -> Result<CurrencyAmount, BudgetRejection> {
    let amount = recognize_currency(text).ok_or(BudgetRejection::MissingCurrency)?;
    if amount.is_positive_integer() {
        Ok(amount)
    } else {
        Err(BudgetRejection::InvalidAmount)
    }
}

fn unit_name(raw: &str) -> Option<&'static str> {
    let lowered = raw.to_lowercase();
    let name = match lowered.as_str() {
        "$" | "usd" | "bucks" | "dollar" | "dollars" | "us dollar" | "us dollars" => "Dollar",
        "€" | "eur" | "euro" | "euros" => "Euro",
        "¥" | "jpy" | "yen" => "Yen",
        "£" | "gbp" => "Pound",
        s if s.starts_with("pound") => "Pound",
        _ => return None,
    };
    Some(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_then_unit() {
        let amount = recognize_currency("500 dollars").unwrap();
        assert_eq!(amount.value, 500.0);
        assert_eq!(amount.unit, "Dollar");
        assert_eq!(amount.to_string(), "500 Dollar");
    }

    #[test]
    fn test_symbol_then_amount() {
        assert_eq!(recognize_currency("about €1,200").unwrap().to_string(), "1200 Euro");
        assert_eq!(recognize_currency("£300 max").unwrap().unit, "Pound");
        assert_eq!(recognize_currency("USD 800").unwrap().to_string(), "800 Dollar");
    }

    #[test]
    fn test_thousands_suffix() {
        assert_eq!(recognize_currency("2k euros").unwrap().value, 2000.0);
        assert_eq!(recognize_currency("3 thousand yen").unwrap().to_string(), "3000 Yen");
    }

    #[test]
    fn test_bare_number_has_no_currency() {
        assert!(recognize_currency("500").is_none());
        assert!(recognize_currency("cheap please").is_none());
    }

    #[test]
    fn test_validate_budget() {
        assert!(validate_budget("500 dollars").is_ok());
        assert_eq!(validate_budget("500"), Err(BudgetRejection::MissingCurrency));
        assert_eq!(validate_budget("0 euros"), Err(BudgetRejection::InvalidAmount));
        assert_eq!(validate_budget("-20 pounds"), Err(BudgetRejection::InvalidAmount));
        assert_eq!(validate_budget("99.5 dollars"), Err(BudgetRejection::InvalidAmount));
    }

    #[test]
    fn test_fractional_display() {
        let amount = recognize_currency("12.5 euros").unwrap();
        assert_eq!(amount.to_string(), "12.5 Euro");
    }
}
