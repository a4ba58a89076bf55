pub mod currency;
pub mod datetime;

pub use currency::{recognize_currency, validate_budget, BudgetRejection, CurrencyAmount};
pub use datetime::recognize_date;
