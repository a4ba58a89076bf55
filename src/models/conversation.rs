use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::dialogs::DialogStack;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConversationMessage {
    pub role: String,
    pub content: String,
}

impl ConversationMessage {
    pub fn user(content: &str) -> Self {
        Self {
            role: "user".to_string(),
            content: content.to_string(),
        }
    }

    pub fn assistant(content: &str) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    pub dialog: DialogStack,
    pub messages: Vec<ConversationMessage>,
    pub last_activity: NaiveDateTime,
    pub expires_at: NaiveDateTime,
}
