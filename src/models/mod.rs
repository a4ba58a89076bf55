pub mod booking;
pub mod conversation;
pub mod intent;
pub mod timex;

pub use booking::BookingRequest;
pub use conversation::{Conversation, ConversationMessage};
pub use intent::{DatedValue, EntityValue, Intent, RecognizerResult, TimexResolution};
pub use timex::{Timex, TimexParseError};
