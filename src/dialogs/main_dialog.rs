use serde::{Deserialize, Serialize};

use super::{Answer, BookingDialog, Flow, Frame, Prompt, StepResult, TurnContext, Waterfall};
use crate::models::{BookingRequest, Intent};

const INTRO_PROMPT: &str = "What can I help you with today?";
const FOLLOW_UP_PROMPT: &str = "What else can I do for you?";
const NLU_NOT_CONFIGURED: &str =
    "NOTE: language understanding is not configured. I will ask you for each detail of your flight in turn.";
const NOT_UNDERSTOOD: &str = "Sorry, I didn't get that. Please try asking in a different way";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MainStep {
    Intro,
    Act,
    Final,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MainDialog {
    step: MainStep,
    request: BookingRequest,
}

impl MainDialog {
    pub fn new() -> Self {
        Self {
            step: MainStep::Intro,
            request: BookingRequest::default(),
        }
    }

    pub fn with_request(request: BookingRequest) -> Self {
        Self {
            step: MainStep::Act,
            request,
        }
    }

    pub fn from_utterance(text: &str) -> (Frame, StepResult) {
        let dialog = Self {
            step: MainStep::Act,
            request: BookingRequest::default(),
        };
        (dialog.into_frame(), StepResult::Answer(Answer::Typed(text.trim().to_string())))
    }
}

impl Default for MainDialog {
    fn default() -> Self {
        Self::new()
    }
}

impl Waterfall for MainDialog {
    type Step = MainStep;

    const FIRST: MainStep = MainStep::Intro;

    fn into_parts(self) -> (MainStep, BookingRequest) {
        (self.step, self.request)
    }

    fn from_parts(step: MainStep, request: BookingRequest) -> Self {
        Self { step, request }
    }

    fn successor(step: MainStep) -> Option<MainStep> {
        match step {
            MainStep::Intro => Some(MainStep::Act),
            MainStep::Act => Some(MainStep::Final),
            MainStep::Final => Some(MainStep::Act),
        }
    }

    fn run_step(
        step: MainStep,
        request: BookingRequest,
        value: StepResult,
        ctx: &mut TurnContext<'_>,
    ) -> Flow {
        match step {
            MainStep::Intro => {
                if !ctx.can_recognize() {
                    ctx.say(NLU_NOT_CONFIGURED);
                }
                Flow::Prompt(request, Prompt::text(INTRO_PROMPT))
            }
            MainStep::Act => act(request, value, ctx),
            MainStep::Final => {
                if let StepResult::Booking(Some(booking)) = value {
                    ctx.say(booked_message(&booking));
                    ctx.complete(booking);
                }
                Flow::Prompt(request, Prompt::text(FOLLOW_UP_PROMPT))
            }
        }
    }

    fn into_frame(self) -> Frame {
        Frame::Main(self)
    }
}

fn act(request: BookingRequest, value: StepResult, ctx: &mut TurnContext<'_>) -> Flow {
    // Caller-supplied details skip language understanding entirely.
    if request.has_explicit_data() {
        return begin_booking(request);
    }

    match value {
        StepResult::Answer(Answer::Typed(utterance)) if ctx.can_recognize() => Flow::Recognize(request, utterance),
        StepResult::Answer(Answer::Typed(_)) => begin_booking(BookingRequest::default()),
        StepResult::Recognized(Some(Intent::BookFlight), booking) => begin_booking(booking.unwrap_or_default()),
        StepResult::Recognized(intent, _) => {
            tracing::info!(?intent, "utterance not understood as a booking");
            ctx.say(NOT_UNDERSTOOD);
            Flow::Next(request, StepResult::Booking(None))
        }
        _ => Flow::Restart(request),
    }
}

fn begin_booking(booking: BookingRequest) -> Flow {
    Flow::Begin(BookingRequest::default(), BookingDialog::new(booking).into_frame())
}

fn booked_message(booking: &BookingRequest) -> String {
    let or_unknown = |v: Option<String>| v.unwrap_or_else(|| "unknown".to_string());
    format!(
        "I have you booked to {} from {} on {} returning on {} with a budget of {}",
        or_unknown(booking.destination.clone()),
        or_unknown(booking.origin.clone()),
        or_unknown(booking.start_date.map(|d| d.to_string())),
        or_unknown(booking.end_date.map(|d| d.to_string())),
        or_unknown(booking.budget.clone()),
    )
}
