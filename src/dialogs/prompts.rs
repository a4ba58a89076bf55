use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::Timex;
use crate::services::recognizers::{recognize_date, validate_budget, BudgetRejection};

pub const BUDGET_MISSING_CURRENCY: &str = "Please enter a budget with currency";
pub const BUDGET_INVALID_AMOUNT: &str = "Please enter a valid budget including currency";

const YES_WORDS: &[&str] = &["yes", "y", "yeah", "yep", "yup", "sure", "ok", "okay", "correct", "true", "1"];
const NO_WORDS: &[&str] = &["no", "n", "nope", "nah", "false", "2"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PromptKind {
    Text,
    Choice { choices: Vec<String> },
    Confirm,
    Date,
    Budget,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prompt {
    #[serde(flatten)]
    pub kind: PromptKind,
    pub message: String,
    #[serde(default)]
    pub retry: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Answer {
    Typed(String),
    Picked(String),
    Confirmed(bool),
    Date(Timex),
}

impl Prompt {
    pub fn text(message: impl Into<String>) -> Self {
        Self {
            kind: PromptKind::Text,
            message: message.into(),
            retry: None,
        }
    }

    pub fn choice(message: impl Into<String>, choices: Vec<String>) -> Self {
        Self {
            kind: PromptKind::Choice { choices },
            message: message.into(),
            retry: None,
        }
    }

    pub fn confirm(message: impl Into<String>) -> Self {
        Self {
            kind: PromptKind::Confirm,
            message: message.into(),
            retry: None,
        }
    }

    pub fn date(message: impl Into<String>, retry: impl Into<String>) -> Self {
        Self {
            kind: PromptKind::Date,
            message: message.into(),
            retry: Some(retry.into()),
        }
    }

    pub fn budget(message: impl Into<String>) -> Self {
        Self {
            kind: PromptKind::Budget,
            message: message.into(),
            retry: None,
        }
    }

    pub fn choices(&self) -> Vec<String> {
        match &self.kind {
            PromptKind::Choice { choices } => choices.clone(),
            PromptKind::Confirm => vec!["Yes".to_string(), "No".to_string()],
            _ => vec![],
        }
    }

    pub fn render(&self) -> String {
        self.with_options(&self.message)
    }

    pub fn render_retry(&self) -> String {
        self.with_options(self.retry.as_deref().unwrap_or(&self.message))
    }

    fn with_options(&self, message: &str) -> String {
        let choices = self.choices();
        if choices.is_empty() {
            return message.to_string();
        }
        format!("{message} {}", inline_list(&choices))
    }

    /// Match a user reply against this prompt.
    ///
    /// `Err` carries an optional notice to show before the prompt is asked
    /// again.
    pub fn recognize(&self, input: &str, today: NaiveDate) -> Result<Answer, Option<String>> {
        let input = input.trim();

        match &self.kind {
            PromptKind::Budget => match validate_budget(input) {
                Ok(_) => Ok(Answer::Typed(input.to_string())),
                Err(BudgetRejection::MissingCurrency) => Err(Some(BUDGET_MISSING_CURRENCY.to_string())),
                Err(BudgetRejection::InvalidAmount) => Err(Some(BUDGET_INVALID_AMOUNT.to_string())),
            },
            _ if input.is_empty() => Err(None),
            PromptKind::Text => Ok(Answer::Typed(input.to_string())),
            PromptKind::Choice { choices } => match_choice(choices, input)
                .map(Answer::Picked)
                .ok_or(None),
            PromptKind::Confirm => {
                let lowered = input.to_lowercase();
                let word = lowered.trim_end_matches(|c: char| c == '.' || c == '!');
                if YES_WORDS.contains(&word) {
                    Ok(Answer::Confirmed(true))
                } else if NO_WORDS.contains(&word) {
                    Ok(Answer::Confirmed(false))
                } else {
                    Err(None)
                }
            }
            PromptKind::Date => recognize_date(input, today)
                .filter(Timex::is_definite)
                .map(Answer::Date)
                .ok_or(None),
        }
    }
}

fn match_choice(choices: &[String], input: &str) -> Option<String> {
    if let Some(choice) = choices.iter().find(|c| c.eq_ignore_ascii_case(input)) {
        return Some(choice.clone());
    }
    let index: usize = input
        .trim_start_matches('(')
        .trim_end_matches(|c: char| c == '.' || c == ')')
        .parse()
        .ok()?;
    index
        .checked_sub(1)
        .and_then(|i| choices.get(i))
        .cloned()
}

fn inline_list(choices: &[String]) -> String {
    let numbered: Vec<String> = choices
        .iter()
        .enumerate()
        .map(|(i, c)| format!("({}) {c}", i + 1))
        .collect();
    match numbered.as_slice() {
        [] => String::new(),
        [only] => only.clone(),
        [first, second] => format!("{first} or {second}"),
        [init @ .., last] => format!("{}, or {last}", init.join(", ")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 6, 10).unwrap()
    }

    fn cities() -> Prompt {
        Prompt::choice(
            "Pick one",
            vec!["Paris".to_string(), "London".to_string(), "Other".to_string()],
        )
    }

    #[test]
    fn test_render_choice_inline() {
        assert_eq!(cities().render(), "Pick one (1) Paris, (2) London, or (3) Other");
        assert_eq!(Prompt::confirm("Sure?").render(), "Sure? (1) Yes or (2) No");
        assert_eq!(Prompt::text("Where?").render(), "Where?");
    }

    #[test]
    fn test_choice_by_value_or_index() {
        assert_eq!(cities().recognize("london", today()), Ok(Answer::Picked("London".to_string())));
        assert_eq!(cities().recognize("3", today()), Ok(Answer::Picked("Other".to_string())));
        assert_eq!(cities().recognize("4", today()), Err(None));
        assert_eq!(cities().recognize("0", today()), Err(None));
        assert_eq!(cities().recognize("Berlin", today()), Err(None));
    }

    #[test]
    fn test_confirm_words() {
        let p = Prompt::confirm("Proceed?");
        assert_eq!(p.recognize("Yes!", today()), Ok(Answer::Confirmed(true)));
        assert_eq!(p.recognize("nope", today()), Ok(Answer::Confirmed(false)));
        assert_eq!(p.recognize("2", today()), Ok(Answer::Confirmed(false)));
        assert_eq!(p.recognize("maybe", today()), Err(None));
    }

    #[test]
    fn test_date_must_be_definite() {
        let p = Prompt::date("When?", "Full date please");
        assert_eq!(
            p.recognize("January 15, 2023", today()),
            Ok(Answer::Date("2023-01-15".parse().unwrap()))
        );
        assert_eq!(p.recognize("January 2023", today()), Err(None));
        assert_eq!(p.render_retry(), "Full date please");
    }

    #[test]
    fn test_budget_messages() {
        let p = Prompt::budget("Budget?");
        assert_eq!(p.recognize("500 dollars", today()), Ok(Answer::Typed("500 dollars".to_string())));
        assert_eq!(p.recognize("500", today()), Err(Some(BUDGET_MISSING_CURRENCY.to_string())));
        assert_eq!(p.recognize("0 euros", today()), Err(Some(BUDGET_INVALID_AMOUNT.to_string())));
    }

    #[test]
    fn test_empty_text_is_retried() {
        assert_eq!(Prompt::text("Where?").recognize("   ", today()), Err(None));
    }

    #[test]
    fn test_prompt_serde_round_trip() {
        let json = serde_json::to_value(cities()).unwrap();
        assert_eq!(json["kind"], "choice");
        let back: Prompt = serde_json::from_value(json).unwrap();
        assert_eq!(back, cities());
    }
}
