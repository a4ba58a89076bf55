pub mod booking;
pub mod budget_resolver;
pub mod date_resolver;
pub mod main_dialog;
pub mod prompts;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{BookingRequest, Intent};
use crate::services::nlu::extraction::execute_query;
use crate::services::nlu::NluRecognizer;

pub use booking::{BookingDialog, BookingStep};
pub use budget_resolver::{BudgetResolverDialog, BudgetStep};
pub use date_resolver::{DateResolverDialog, DateStep};
pub use main_dialog::{MainDialog, MainStep};
pub use prompts::{Answer, Prompt, PromptKind};

pub const OTHER_CHOICE: &str = "Other";

const HELP_TEXT: &str = "I can book a flight for you. Tell me where you want to go, where you are leaving from, \
     your travel dates and your budget. Say \"cancel\" at any time to start over.";
const CANCEL_TEXT: &str = "Cancelling";

#[derive(Debug, Clone, PartialEq)]
pub enum StepResult {
    Empty,
    Answer(Answer),
    Value(String),
    Recognized(Option<Intent>, Option<BookingRequest>),
    Dates(BookingRequest),
    Budget(String),
    Booking(Option<BookingRequest>),
}

#[derive(Debug)]
pub enum Flow {
    Next(BookingRequest, StepResult),
    Prompt(BookingRequest, Prompt),
    Begin(BookingRequest, Frame),
    Recognize(BookingRequest, String),
    Restart(BookingRequest),
    End(StepResult),
}

#[derive(Debug)]
pub enum Transition {
    Wait(Frame, Prompt),
    Call(Frame, Frame),
    End(StepResult),
}

pub trait Waterfall: Sized + Send {
    type Step: Copy + Send + std::fmt::Debug;

    const FIRST: Self::Step;

    fn into_parts(self) -> (Self::Step, BookingRequest);

    fn from_parts(step: Self::Step, request: BookingRequest) -> Self;

    fn successor(step: Self::Step) -> Option<Self::Step>;

    fn run_step(
        step: Self::Step,
        request: BookingRequest,
        value: StepResult,
        ctx: &mut TurnContext<'_>,
    ) -> Flow;

    fn into_frame(self) -> Frame;
}

pub async fn drive<W: Waterfall>(dialog: W, value: StepResult, ctx: &mut TurnContext<'_>) -> Transition {
    let (mut step, mut request) = dialog.into_parts();
    let mut value = value;

    loop {
        match W::run_step(step, request, value, ctx) {
            Flow::Next(req, result) => match W::successor(step) {
                Some(next) => {
                    step = next;
                    request = req;
                    value = result;
                }
                None => return Transition::End(result),
            },
            Flow::Prompt(req, prompt) => {
                let resume_at = W::successor(step).unwrap_or(step);
                return Transition::Wait(W::from_parts(resume_at, req).into_frame(), prompt);
            }
            Flow::Begin(req, child) => {
                let resume_at = W::successor(step).unwrap_or(step);
                return Transition::Call(W::from_parts(resume_at, req).into_frame(), child);
            }
            Flow::Recognize(req, utterance) => {
                let (intent, booking) = ctx.recognize(&utterance).await;
                request = req;
                value = StepResult::Recognized(intent, booking);
            }
            Flow::Restart(req) => {
                tracing::debug!(from = ?step, "restarting dialog");
                step = W::FIRST;
                request = req;
                value = StepResult::Empty;
            }
            Flow::End(result) => return Transition::End(result),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "dialog", rename_all = "snake_case")]
pub enum Frame {
    Main(MainDialog),
    Booking(BookingDialog),
    Dates(DateResolverDialog),
    Budget(BudgetResolverDialog),
}

impl Frame {
    async fn resume(self, value: StepResult, ctx: &mut TurnContext<'_>) -> Transition {
        match self {
            Frame::Main(d) => drive(d, value, ctx).await,
            Frame::Booking(d) => drive(d, value, ctx).await,
            Frame::Dates(d) => drive(d, value, ctx).await,
            Frame::Budget(d) => drive(d, value, ctx).await,
        }
    }
}

pub struct TurnContext<'a> {
    recognizer: Option<&'a dyn NluRecognizer>,
    today: NaiveDate,
    replies: Vec<String>,
    completed: Option<BookingRequest>,
}

impl<'a> TurnContext<'a> {
    pub fn new(recognizer: Option<&'a dyn NluRecognizer>, today: NaiveDate) -> Self {
        Self {
            recognizer,
            today,
            replies: vec![],
            completed: None,
        }
    }

    pub fn can_recognize(&self) -> bool {
        self.recognizer.is_some()
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn say(&mut self, message: impl Into<String>) {
        self.replies.push(message.into());
    }

    pub fn complete(&mut self, booking: BookingRequest) {
        self.completed = Some(booking);
    }

    pub fn into_parts(self) -> (Vec<String>, Option<BookingRequest>) {
        (self.replies, self.completed)
    }

    async fn recognize(&self, utterance: &str) -> (Option<Intent>, Option<BookingRequest>) {
        match self.recognizer {
            Some(recognizer) => execute_query(recognizer, utterance, self.today).await,
            None => (None, None),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DialogStack {
    frames: Vec<Frame>,
    pending: Option<Prompt>,
}

impl DialogStack {
    pub fn is_active(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending_prompt(&self) -> Option<&Prompt> {
        self.pending.as_ref()
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub async fn start(&mut self, prefill: Option<BookingRequest>, ctx: &mut TurnContext<'_>) {
        self.cancel_all();
        let (frame, value) = match prefill {
            Some(request) => (MainDialog::with_request(request).into_frame(), StepResult::Empty),
            None => (MainDialog::new().into_frame(), StepResult::Empty),
        };
        self.run(frame, value, ctx).await;
    }

    /// Feed one user message into the conversation.
    ///
    /// Returns the result of the outermost dialog if this message ended it.
    pub async fn on_message(&mut self, text: &str, ctx: &mut TurnContext<'_>) -> Option<StepResult> {
        let Some(prompt) = self.pending.take() else {
            let (frame, value) = MainDialog::from_utterance(text);
            return self.run(frame, value, ctx).await;
        };

        // Help and cancel are only honoured once a booking is under way.
        if self.frames.len() > 1 {
            match text.trim().to_lowercase().as_str() {
                "help" | "?" => {
                    ctx.say(HELP_TEXT);
                    ctx.say(prompt.render());
                    self.pending = Some(prompt);
                    return None;
                }
                "cancel" | "quit" => {
                    ctx.say(CANCEL_TEXT);
                    self.cancel_all();
                    return None;
                }
                _ => {}
            }
        }

        match prompt.recognize(text, ctx.today()) {
            Ok(answer) => match self.frames.pop() {
                Some(frame) => self.run(frame, StepResult::Answer(answer), ctx).await,
                None => {
                    tracing::warn!("pending prompt without an active dialog");
                    None
                }
            },
            Err(notice) => {
                if let Some(notice) = notice {
                    ctx.say(notice);
                }
                ctx.say(prompt.render_retry());
                self.pending = Some(prompt);
                None
            }
        }
    }

    pub fn cancel_all(&mut self) {
        self.frames.clear();
        self.pending = None;
    }

    async fn run(&mut self, frame: Frame, value: StepResult, ctx: &mut TurnContext<'_>) -> Option<StepResult> {
        let mut frame = frame;
        let mut value = value;

        loop {
            match frame.resume(value, ctx).await {
                Transition::Wait(parent, prompt) => {
                    ctx.say(prompt.render());
                    self.frames.push(parent);
                    self.pending = Some(prompt);
                    return None;
                }
                Transition::Call(parent, child) => {
                    self.frames.push(parent);
                    frame = child;
                    value = StepResult::Empty;
                }
                Transition::End(result) => match self.frames.pop() {
                    Some(parent) => {
                        frame = parent;
                        value = result;
                    }
                    None => return Some(result),
                },
            }
        }
    }
}

pub(crate) fn with_other(candidates: &[String]) -> Vec<String> {
    candidates
        .iter()
        .cloned()
        .chain(std::iter::once(OTHER_CHOICE.to_string()))
        .collect()
}
