use serde::{Deserialize, Serialize};

use super::{Answer, Flow, Frame, Prompt, StepResult, TurnContext, Waterfall};
use crate::models::{BookingRequest, Timex};

const START_PROMPT: &str = "On what date would you like to start your travel?";
const END_PROMPT: &str = "On what date would you like to return from your travel?";
pub const DATE_REPROMPT: &str =
    "I'm sorry, for best results, please enter your travel date including the month, day and year.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateStep {
    Start,
    End,
    Verify,
    Finish,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateResolverDialog {
    step: DateStep,
    request: BookingRequest,
}

impl DateResolverDialog {
    pub fn new(request: BookingRequest) -> Self {
        Self {
            step: DateStep::Start,
            request,
        }
    }

    pub fn verify_only(request: BookingRequest) -> Self {
        Self {
            step: DateStep::Verify,
            request,
        }
    }

    pub fn step(&self) -> DateStep {
        self.step
    }
}

impl Waterfall for DateResolverDialog {
    type Step = DateStep;

    const FIRST: DateStep = DateStep::Start;

    fn into_parts(self) -> (DateStep, BookingRequest) {
        (self.step, self.request)
    }

    fn from_parts(step: DateStep, request: BookingRequest) -> Self {
        Self { step, request }
    }

    fn successor(step: DateStep) -> Option<DateStep> {
        match step {
            DateStep::Start => Some(DateStep::End),
            DateStep::End => Some(DateStep::Verify),
            DateStep::Verify => Some(DateStep::Finish),
            DateStep::Finish => None,
        }
    }

    fn run_step(
        step: DateStep,
        mut request: BookingRequest,
        value: StepResult,
        _ctx: &mut TurnContext<'_>,
    ) -> Flow {
        match step {
            DateStep::Start => {
                let prompt = date_prompt(request.start_date, START_PROMPT);
                Flow::Prompt(request, prompt)
            }
            DateStep::End => {
                if let StepResult::Answer(Answer::Date(date)) = value {
                    request.start_date = Some(date);
                }
                let prompt = date_prompt(request.end_date, END_PROMPT);
                Flow::Prompt(request, prompt)
            }
            DateStep::Verify => {
                if let StepResult::Answer(Answer::Date(date)) = value {
                    request.end_date = Some(date);
                }
                match (request.start_date, request.end_date) {
                    (Some(start), Some(end)) if starts_after_return(start, end) => {
                        let message = format!(
                            "You have indicated wanting to start your travel on: {start} which is after \
                             your return date requested on: {end}. Please confirm you want to proceed."
                        );
                        Flow::Prompt(request, Prompt::confirm(message))
                    }
                    _ => Flow::End(StepResult::Dates(request)),
                }
            }
            DateStep::Finish => match value {
                StepResult::Answer(Answer::Confirmed(false)) => {
                    tracing::debug!("date override declined, clearing dates");
                    request.start_date = None;
                    request.end_date = None;
                    Flow::Restart(request)
                }
                _ => Flow::End(StepResult::Dates(request)),
            },
        }
    }

    fn into_frame(self) -> Frame {
        Frame::Dates(self)
    }
}

fn date_prompt(current: Option<Timex>, first_ask: &str) -> Prompt {
    match current {
        None => Prompt::date(first_ask, DATE_REPROMPT),
        Some(_) => Prompt::date(DATE_REPROMPT, DATE_REPROMPT),
    }
}

fn starts_after_return(start: Timex, end: Timex) -> bool {
    match (start.as_date(), end.as_date()) {
        (Some(start), Some(end)) => start > end,
        _ => start > end,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialogs::testing::Script;
    use crate::dialogs::PromptKind;

    fn timex(s: &str) -> Option<Timex> {
        Some(s.parse().unwrap())
    }

    fn dates_of(outcome: Option<StepResult>) -> (Option<String>, Option<String>) {
        match outcome {
            Some(StepResult::Dates(r)) => (
                r.start_date.map(|d| d.to_string()),
                r.end_date.map(|d| d.to_string()),
            ),
            other => panic!("expected dates, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_prompts_for_both_dates() {
        let mut script = Script::new(None);
        let replies = script.begin(DateResolverDialog::new(BookingRequest::default()).into_frame()).await;
        assert_eq!(replies, vec![START_PROMPT]);
        assert_eq!(script.pending_kind(), Some(&PromptKind::Date));

        let replies = script.send("2023-01-05").await;
        assert_eq!(replies, vec![END_PROMPT]);

        let replies = script.send("January 12, 2023").await;
        assert!(replies.is_empty());
        assert_eq!(
            dates_of(script.outcome.take()),
            (Some("2023-01-05".to_string()), Some("2023-01-12".to_string()))
        );
    }

    #[tokio::test]
    async fn test_ambiguous_answer_is_reprompted() {
        let mut script = Script::new(None);
        script.begin(DateResolverDialog::new(BookingRequest::default()).into_frame()).await;

        let replies = script.send("January").await;
        assert_eq!(replies, vec![DATE_REPROMPT]);
        assert!(script.outcome.is_none());
    }

    #[tokio::test]
    async fn test_held_date_is_asked_again() {
        let request = BookingRequest {
            start_date: timex("2023-01"),
            ..Default::default()
        };
        let mut script = Script::new(None);
        let replies = script.begin(DateResolverDialog::new(request).into_frame()).await;
        assert_eq!(replies, vec![DATE_REPROMPT]);
    }

    #[tokio::test]
    async fn test_start_after_end_asks_for_override() {
        let request = BookingRequest {
            start_date: timex("2023-01-01"),
            end_date: timex("2022-12-31"),
            ..Default::default()
        };
        let mut script = Script::new(None);
        let replies = script.begin(DateResolverDialog::verify_only(request).into_frame()).await;
        assert_eq!(
            replies,
            vec![
                "You have indicated wanting to start your travel on: 2023-01-01 which is after your return date \
                 requested on: 2022-12-31. Please confirm you want to proceed. (1) Yes or (2) No"
            ]
        );

        let replies = script.send("yes").await;
        assert!(replies.is_empty());
        assert_eq!(
            dates_of(script.outcome.take()),
            (Some("2023-01-01".to_string()), Some("2022-12-31".to_string()))
        );
    }

    #[tokio::test]
    async fn test_declined_override_clears_and_restarts() {
        let request = BookingRequest {
            start_date: timex("2023-01-01"),
            end_date: timex("2022-12-31"),
            ..Default::default()
        };
        let mut script = Script::new(None);
        script.begin(DateResolverDialog::verify_only(request).into_frame()).await;

        let replies = script.send("no").await;
        assert_eq!(replies, vec![START_PROMPT]);
        assert!(script.outcome.is_none());

        script.send("2023-02-01").await;
        script.send("2023-02-10").await;
        assert_eq!(
            dates_of(script.outcome.take()),
            (Some("2023-02-01".to_string()), Some("2023-02-10".to_string()))
        );
    }

    #[test]
    fn test_ordering_uses_calendar_dates() {
        assert!(starts_after_return(
            "2023-01-01".parse().unwrap(),
            "2022-12-31".parse().unwrap()
        ));
        assert!(!starts_after_return(
            "2023-01-09".parse().unwrap(),
            "2023-01-10".parse().unwrap()
        ));
    }
}
