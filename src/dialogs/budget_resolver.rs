use serde::{Deserialize, Serialize};

use super::prompts::BUDGET_INVALID_AMOUNT;
use super::{with_other, Answer, Flow, Frame, Prompt, StepResult, TurnContext, Waterfall, OTHER_CHOICE};
use crate::models::BookingRequest;
use crate::services::recognizers::recognize_currency;

const CANDIDATES_PROMPT: &str = "I have identified potential budget in your request. Please select an option";
const BUDGET_PROMPT: &str = "Please provide me with your budget";
const CURRENCY_PROMPT: &str = "Please select a currency";
const CURRENCIES: [&str; 4] = ["Dollar", "Euro", "Pound", "Yen"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetStep {
    Amount,
    Check,
    Currency,
    Finish,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetResolverDialog {
    step: BudgetStep,
    request: BookingRequest,
}

impl BudgetResolverDialog {
    pub fn new(request: BookingRequest) -> Self {
        Self {
            step: BudgetStep::Amount,
            request,
        }
    }
}

impl Waterfall for BudgetResolverDialog {
    type Step = BudgetStep;

    const FIRST: BudgetStep = BudgetStep::Amount;

    fn into_parts(self) -> (BudgetStep, BookingRequest) {
        (self.step, self.request)
    }

    fn from_parts(step: BudgetStep, request: BookingRequest) -> Self {
        Self { step, request }
    }

    fn successor(step: BudgetStep) -> Option<BudgetStep> {
        match step {
            BudgetStep::Amount => Some(BudgetStep::Check),
            BudgetStep::Check => Some(BudgetStep::Currency),
            BudgetStep::Currency => Some(BudgetStep::Finish),
            BudgetStep::Finish => None,
        }
    }

    fn run_step(
        step: BudgetStep,
        mut request: BookingRequest,
        value: StepResult,
        ctx: &mut TurnContext<'_>,
    ) -> Flow {
        match step {
            BudgetStep::Amount => {
                if let Some(budget) = request.budget.take() {
                    match recognize_currency(&budget) {
                        Some(amount) if !amount.is_positive_integer() => {
                            tracing::debug!(%budget, "dropping non-positive budget");
                            ctx.say(BUDGET_INVALID_AMOUNT);
                        }
                        _ => {
                            request.budget = Some(budget.clone());
                            return Flow::Next(request, StepResult::Value(budget));
                        }
                    }
                }
                if request.candidate_numbers.is_empty() {
                    Flow::Prompt(request, Prompt::budget(BUDGET_PROMPT))
                } else {
                    let choices = with_other(&request.candidate_numbers);
                    Flow::Prompt(request, Prompt::choice(CANDIDATES_PROMPT, choices))
                }
            }
            BudgetStep::Check => match value {
                StepResult::Answer(Answer::Picked(choice)) if choice == OTHER_CHOICE => {
                    Flow::Prompt(request, Prompt::budget(BUDGET_PROMPT))
                }
                StepResult::Value(budget)
                | StepResult::Answer(Answer::Typed(budget))
                | StepResult::Answer(Answer::Picked(budget)) => {
                    request.budget = Some(budget.clone());
                    Flow::Next(request, StepResult::Value(budget))
                }
                _ => Flow::Restart(request),
            },
            BudgetStep::Currency => {
                if let StepResult::Value(budget) | StepResult::Answer(Answer::Typed(budget)) = value {
                    request.budget = Some(budget);
                }
                let Some(budget) = request.budget.clone() else {
                    return Flow::Restart(request);
                };
                match recognize_currency(&budget) {
                    Some(amount) => {
                        let normalized = amount.to_string();
                        request.budget = Some(normalized.clone());
                        Flow::Next(request, StepResult::Value(normalized))
                    }
                    None => {
                        let choices = CURRENCIES.iter().map(|c| c.to_string()).collect();
                        Flow::Prompt(request, Prompt::choice(CURRENCY_PROMPT, choices))
                    }
                }
            }
            BudgetStep::Finish => {
                let amount = request.budget.unwrap_or_default();
                match value {
                    StepResult::Answer(Answer::Picked(currency)) => {
                        Flow::End(StepResult::Budget(format!("{amount} {currency}s")))
                    }
                    StepResult::Value(budget) => Flow::End(StepResult::Budget(budget)),
                    _ => Flow::End(StepResult::Budget(amount)),
                }
            }
        }
    }

    fn into_frame(self) -> Frame {
        Frame::Budget(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialogs::prompts::BUDGET_MISSING_CURRENCY;
    use crate::dialogs::testing::Script;

    fn budget_of(outcome: Option<StepResult>) -> String {
        match outcome {
            Some(StepResult::Budget(b)) => b,
            other => panic!("expected a budget, got {other:?}"),
        }
    }

    fn request(budget: Option<&str>, numbers: &[&str]) -> BookingRequest {
        BookingRequest {
            budget: budget.map(str::to_string),
            candidate_numbers: numbers.iter().map(|n| n.to_string()).collect(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_free_text_budget_is_normalized() {
        let mut script = Script::new(None);
        let replies = script.begin(BudgetResolverDialog::new(request(None, &[])).into_frame()).await;
        assert_eq!(replies, vec![BUDGET_PROMPT]);

        let replies = script.send("500 dollars").await;
        assert!(replies.is_empty());
        assert_eq!(budget_of(script.outcome.take()), "500 Dollar");
    }

    #[tokio::test]
    async fn test_budget_without_currency_is_rejected() {
        let mut script = Script::new(None);
        script.begin(BudgetResolverDialog::new(request(None, &[])).into_frame()).await;

        let replies = script.send("500").await;
        assert_eq!(replies, vec![BUDGET_MISSING_CURRENCY, BUDGET_PROMPT]);
        let replies = script.send("-5 euros").await;
        assert_eq!(replies, vec![BUDGET_INVALID_AMOUNT, BUDGET_PROMPT]);
        assert!(script.outcome.is_none());
    }

    #[tokio::test]
    async fn test_picked_number_falls_back_to_currency_choice() {
        let mut script = Script::new(None);
        let replies = script
            .begin(BudgetResolverDialog::new(request(None, &["500", "2"])).into_frame())
            .await;
        assert_eq!(replies, vec![format!("{CANDIDATES_PROMPT} (1) 500, (2) 2, or (3) Other")]);

        let replies = script.send("500").await;
        assert_eq!(
            replies,
            vec![format!("{CURRENCY_PROMPT} (1) Dollar, (2) Euro, (3) Pound, or (4) Yen")]
        );

        script.send("Dollar").await;
        assert_eq!(budget_of(script.outcome.take()), "500 Dollars");
    }

    #[tokio::test]
    async fn test_other_asks_for_free_text() {
        let mut script = Script::new(None);
        script
            .begin(BudgetResolverDialog::new(request(None, &["300"])).into_frame())
            .await;
        let replies = script.send("Other").await;
        assert_eq!(replies, vec![BUDGET_PROMPT]);

        script.send("€1,200").await;
        assert_eq!(budget_of(script.outcome.take()), "1200 Euro");
    }

    #[tokio::test]
    async fn test_preset_budget_passes_through() {
        let mut script = Script::new(None);
        let replies = script
            .begin(BudgetResolverDialog::new(request(Some("300 euros"), &["300"])).into_frame())
            .await;
        assert!(replies.is_empty());
        assert_eq!(budget_of(script.outcome.take()), "300 Euro");
    }

    #[tokio::test]
    async fn test_preset_bare_number_needs_currency() {
        let mut script = Script::new(None);
        let replies = script
            .begin(BudgetResolverDialog::new(request(Some("700"), &[])).into_frame())
            .await;
        assert_eq!(replies.len(), 1);
        assert!(replies[0].starts_with(CURRENCY_PROMPT));

        script.send("4").await;
        assert_eq!(budget_of(script.outcome.take()), "700 Yens");
    }

    #[tokio::test]
    async fn test_preset_negative_budget_is_dropped() {
        let mut script = Script::new(None);
        let replies = script
            .begin(BudgetResolverDialog::new(request(Some("-100 dollars"), &[])).into_frame())
            .await;
        assert_eq!(replies, vec![BUDGET_INVALID_AMOUNT, BUDGET_PROMPT]);
    }
}
