use serde::{Deserialize, Serialize};

use super::{
    with_other, Answer, BudgetResolverDialog, DateResolverDialog, Flow, Frame, Prompt, StepResult, TurnContext,
    Waterfall, OTHER_CHOICE,
};
use crate::models::{BookingRequest, Timex};

const DESTINATION_PROMPT: &str = "To what city would you like to travel?";
const DESTINATION_CHOICES: &str = "I have identified potential destinations. Please select an option";
const ORIGIN_PROMPT: &str = "From what city will you be travelling?";
const ORIGIN_CHOICES: &str = "I have identified potential origins. Please select an option";
const MISUNDERSTOOD: &str = "Sorry that I misunderstood your request. I will do better next time I promise";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStep {
    Destination,
    DestinationCheck,
    Origin,
    OriginCheck,
    SameCityCheck,
    StartDate,
    EndDate,
    Budget,
    Confirm,
    Finish,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingDialog {
    step: BookingStep,
    request: BookingRequest,
}

impl BookingDialog {
    pub fn new(request: BookingRequest) -> Self {
        Self {
            step: BookingStep::Destination,
            request,
        }
    }

    pub fn request(&self) -> &BookingRequest {
        &self.request
    }
}

impl Waterfall for BookingDialog {
    type Step = BookingStep;

    const FIRST: BookingStep = BookingStep::Destination;

    fn into_parts(self) -> (BookingStep, BookingRequest) {
        (self.step, self.request)
    }

    fn from_parts(step: BookingStep, request: BookingRequest) -> Self {
        Self { step, request }
    }

    fn successor(step: BookingStep) -> Option<BookingStep> {
        use BookingStep::*;
        match step {
            Destination => Some(DestinationCheck),
            DestinationCheck => Some(Origin),
            Origin => Some(OriginCheck),
            OriginCheck => Some(SameCityCheck),
            SameCityCheck => Some(StartDate),
            StartDate => Some(EndDate),
            EndDate => Some(Budget),
            Budget => Some(Confirm),
            Confirm => Some(Finish),
            Finish => None,
        }
    }

    fn run_step(
        step: BookingStep,
        mut request: BookingRequest,
        value: StepResult,
        ctx: &mut TurnContext<'_>,
    ) -> Flow {
        match step {
            BookingStep::Destination => match request.destination.clone() {
                Some(city) => Flow::Next(request, StepResult::Value(city)),
                None => ask_city(request, DESTINATION_CHOICES, DESTINATION_PROMPT),
            },
            BookingStep::DestinationCheck => match city_answer(value) {
                CityAnswer::Other => Flow::Prompt(request, Prompt::text(DESTINATION_PROMPT)),
                CityAnswer::City(city) => {
                    request.destination = Some(city.clone());
                    Flow::Next(request, StepResult::Value(city))
                }
                CityAnswer::Missing => Flow::Restart(request),
            },
            BookingStep::Origin => {
                if let CityAnswer::City(city) = city_answer(value) {
                    request.destination = Some(city);
                }
                match request.origin.clone() {
                    Some(city) => Flow::Next(request, StepResult::Value(city)),
                    None => ask_city(request, ORIGIN_CHOICES, ORIGIN_PROMPT),
                }
            }
            BookingStep::OriginCheck => match city_answer(value) {
                CityAnswer::Other => Flow::Prompt(request, Prompt::text(ORIGIN_PROMPT)),
                CityAnswer::City(city) => {
                    request.origin = Some(city.clone());
                    Flow::Next(request, StepResult::Value(city))
                }
                CityAnswer::Missing => Flow::Restart(request),
            },
            BookingStep::SameCityCheck => {
                if let CityAnswer::City(city) = city_answer(value) {
                    request.origin = Some(city);
                }
                match (&request.destination, &request.origin) {
                    (Some(destination), Some(origin)) if destination.eq_ignore_ascii_case(origin) => {
                        let message = format!(
                            "I have understood you want to travel to: {destination} which is identical to your \
                             origin: {origin}. Please confirm you want to proceed."
                        );
                        Flow::Prompt(request, Prompt::confirm(message))
                    }
                    _ => Flow::Next(request, StepResult::Empty),
                }
            }
            BookingStep::StartDate => {
                if value == StepResult::Answer(Answer::Confirmed(false)) {
                    tracing::debug!("identical cities rejected, asking for both again");
                    request.destination = None;
                    request.origin = None;
                    return Flow::Restart(request);
                }
                if needs_resolution(request.start_date) {
                    let resolver = DateResolverDialog::new(request.clone());
                    return Flow::Begin(request, resolver.into_frame());
                }
                Flow::Next(request, StepResult::Empty)
            }
            BookingStep::EndDate => {
                let resolved = adopt_dates(&mut request, value);
                if needs_resolution(request.end_date) {
                    let resolver = DateResolverDialog::new(request.clone());
                    return Flow::Begin(request, resolver.into_frame());
                }
                if !resolved && starts_after_return(&request) {
                    let resolver = DateResolverDialog::verify_only(request.clone());
                    return Flow::Begin(request, resolver.into_frame());
                }
                Flow::Next(request, StepResult::Empty)
            }
            BookingStep::Budget => {
                adopt_dates(&mut request, value);
                // Budget is always re-resolved, a preset value passes straight through.
                let resolver = BudgetResolverDialog::new(request.clone());
                Flow::Begin(request, resolver.into_frame())
            }
            BookingStep::Confirm => {
                if let StepResult::Budget(budget) = value {
                    request.budget = Some(budget);
                }
                let summary = request.summary();
                Flow::Prompt(request, Prompt::confirm(summary))
            }
            BookingStep::Finish => match value {
                StepResult::Answer(Answer::Confirmed(true)) => {
                    tracing::info!(
                        destination = request.destination.as_deref().unwrap_or_default(),
                        origin = request.origin.as_deref().unwrap_or_default(),
                        "booking confirmed"
                    );
                    Flow::End(StepResult::Booking(Some(request)))
                }
                _ => {
                    tracing::warn!(summary = %request.summary(), "booking proposal rejected");
                    ctx.say(MISUNDERSTOOD);
                    Flow::End(StepResult::Booking(None))
                }
            },
        }
    }

    fn into_frame(self) -> Frame {
        Frame::Booking(self)
    }
}

enum CityAnswer {
    City(String),
    Other,
    Missing,
}

fn city_answer(value: StepResult) -> CityAnswer {
    match value {
        StepResult::Answer(Answer::Picked(choice)) if choice == OTHER_CHOICE => CityAnswer::Other,
        StepResult::Value(city)
        | StepResult::Answer(Answer::Typed(city))
        | StepResult::Answer(Answer::Picked(city)) => CityAnswer::City(city),
        _ => CityAnswer::Missing,
    }
}

fn ask_city(request: BookingRequest, choices_message: &str, text_message: &str) -> Flow {
    if request.candidate_cities.is_empty() {
        return Flow::Prompt(request, Prompt::text(text_message));
    }
    let choices = with_other(&request.candidate_cities);
    Flow::Prompt(request, Prompt::choice(choices_message, choices))
}

fn needs_resolution(date: Option<Timex>) -> bool {
    !date.is_some_and(|d| d.is_definite())
}

fn adopt_dates(request: &mut BookingRequest, value: StepResult) -> bool {
    match value {
        StepResult::Dates(resolved) => {
            request.start_date = resolved.start_date;
            request.end_date = resolved.end_date;
            true
        }
        _ => false,
    }
}

fn starts_after_return(request: &BookingRequest) -> bool {
    match (
        request.start_date.and_then(|d| d.as_date()),
        request.end_date.and_then(|d| d.as_date()),
    ) {
        (Some(start), Some(end)) => start > end,
        _ => false,
    }
}
