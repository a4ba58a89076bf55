use std::sync::Arc;

use chrono::{Duration, NaiveDateTime, Utc};
use serde::Serialize;
use tracing::Instrument;

use crate::db::queries;
use crate::dialogs::{DialogStack, TurnContext};
use crate::models::{BookingRequest, Conversation, ConversationMessage};
use crate::state::AppState;

#[derive(Debug, Clone, Serialize)]
pub struct TurnOutcome {
    pub conversation_id: String,
    pub replies: Vec<String>,
    pub choices: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booking: Option<BookingRequest>,
}

pub async fn start_conversation(
    state: &Arc<AppState>,
    prefill: Option<BookingRequest>,
) -> anyhow::Result<TurnOutcome> {
    let mut conv = new_conversation(state);
    let span = tracing::info_span!("turn", conversation_id = %conv.id);

    async {
        tracing::info!(prefilled = prefill.is_some(), "starting conversation");
        let mut ctx = TurnContext::new(state.nlu.as_deref(), Utc::now().date_naive());
        conv.dialog.start(prefill, &mut ctx).await;
        finish_turn(state, conv, ctx)
    }
    .instrument(span)
    .await
}

pub async fn process_message(state: &Arc<AppState>, id: &str, text: &str) -> anyhow::Result<TurnOutcome> {
    let span = tracing::info_span!("turn", conversation_id = %id);

    async {
        let existing = {
            let db = lock_db(state)?;
            queries::get_conversation(&db, id)?
        };
        let mut conv = existing.unwrap_or_else(|| {
            tracing::info!("conversation not found, starting a new one");
            let mut conv = new_conversation(state);
            conv.id = id.to_string();
            conv
        });

        conv.messages.push(ConversationMessage::user(text));
        tracing::debug!(depth = conv.dialog.depth(), "processing message");

        let mut ctx = TurnContext::new(state.nlu.as_deref(), Utc::now().date_naive());
        conv.dialog.on_message(text, &mut ctx).await;
        finish_turn(state, conv, ctx)
    }
    .instrument(span)
    .await
}

pub fn end_conversation(state: &Arc<AppState>, id: &str) -> anyhow::Result<bool> {
    let db = lock_db(state)?;
    let deleted = queries::delete_conversation(&db, id)?;
    if deleted {
        tracing::info!(conversation_id = %id, "conversation ended");
    }
    Ok(deleted)
}

pub fn expire_conversations(state: &Arc<AppState>) -> anyhow::Result<usize> {
    let db = lock_db(state)?;
    queries::expire_old_conversations(&db)
}

fn finish_turn(state: &Arc<AppState>, mut conv: Conversation, ctx: TurnContext<'_>) -> anyhow::Result<TurnOutcome> {
    let (replies, booking) = ctx.into_parts();
    for reply in &replies {
        conv.messages.push(ConversationMessage::assistant(reply));
    }

    if let Some(booking) = &booking {
        tracing::info!(
            destination = booking.destination.as_deref().unwrap_or_default(),
            origin = booking.origin.as_deref().unwrap_or_default(),
            budget = booking.budget.as_deref().unwrap_or_default(),
            "booking completed"
        );
    }

    let now = Utc::now().naive_utc();
    conv.last_activity = now;
    conv.expires_at = expiry(state, now);

    {
        let db = lock_db(state)?;
        queries::save_conversation(&db, &conv)?;
    }

    Ok(TurnOutcome {
        choices: pending_choices(&conv.dialog),
        conversation_id: conv.id,
        replies,
        booking,
    })
}

fn pending_choices(dialog: &DialogStack) -> Vec<String> {
    dialog.pending_prompt().map(|p| p.choices()).unwrap_or_default()
}

fn new_conversation(state: &Arc<AppState>) -> Conversation {
    let now = Utc::now().naive_utc();
    Conversation {
        id: uuid::Uuid::new_v4().to_string(),
        dialog: DialogStack::default(),
        messages: vec![],
        last_activity: now,
        expires_at: expiry(state, now),
    }
}

fn expiry(state: &AppState, now: NaiveDateTime) -> NaiveDateTime {
    now + Duration::minutes(state.config.conversation_ttl_minutes)
}

fn lock_db(state: &AppState) -> anyhow::Result<std::sync::MutexGuard<'_, rusqlite::Connection>> {
    state
        .db
        .lock()
        .map_err(|_| anyhow::anyhow!("database mutex poisoned"))
}
