use serde::{Deserialize, Serialize};

use super::Timex;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookingRequest {
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default)]
    pub origin: Option<String>,
    #[serde(default)]
    pub start_date: Option<Timex>,
    #[serde(default)]
    pub end_date: Option<Timex>,
    #[serde(default)]
    pub budget: Option<String>,
    #[serde(default)]
    pub candidate_cities: Vec<String>,
    #[serde(default)]
    pub candidate_numbers: Vec<String>,
}

impl BookingRequest {
    pub fn has_explicit_data(&self) -> bool {
        self.destination.is_some()
            || self.origin.is_some()
            || self.start_date.is_some()
            || self.end_date.is_some()
            || self.budget.is_some()
            || !self.candidate_cities.is_empty()
            || !self.candidate_numbers.is_empty()
    }

    pub fn summary(&self) -> String {
        format!(
            "Please confirm, I have you traveling to: {} from: {} on: {}. Returning on: {} with a budget of: {}.",
            display(self.destination.as_deref()),
            display(self.origin.as_deref()),
            display(self.start_date.map(|d| d.to_string()).as_deref()),
            display(self.end_date.map(|d| d.to_string()).as_deref()),
            display(self.budget.as_deref()),
        )
    }
}

fn display(value: Option<&str>) -> &str {
    value.unwrap_or("unknown")
}
