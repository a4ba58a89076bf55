use chrono::{NaiveDateTime, Utc};
use rusqlite::{params, Connection};

use crate::dialogs::DialogStack;
use crate::models::{Conversation, ConversationMessage};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Load a live conversation. Expired rows and rows whose dialog state no
/// longer deserializes are treated as absent.
pub fn get_conversation(conn: &Connection, id: &str) -> anyhow::Result<Option<Conversation>> {
    let now = Utc::now().naive_utc().format(TIMESTAMP_FORMAT).to_string();
    let mut stmt = conn.prepare(
        "SELECT id, dialog_state, transcript, last_activity, expires_at FROM conversations WHERE id = ?1 AND expires_at > ?2",
    )?;

    let result = stmt.query_row(params![id, now], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, String>(4)?,
        ))
    });

    match result {
        Ok((id, dialog_json, transcript_json, last_activity_str, expires_at_str)) => {
            let dialog: DialogStack = match serde_json::from_str(&dialog_json) {
                Ok(dialog) => dialog,
                Err(e) => {
                    tracing::warn!(conversation_id = %id, error = %e, "discarding unreadable dialog state");
                    return Ok(None);
                }
            };
            let messages: Vec<ConversationMessage> =
                serde_json::from_str(&transcript_json).unwrap_or_default();

            let last_activity = NaiveDateTime::parse_from_str(&last_activity_str, TIMESTAMP_FORMAT)
                .unwrap_or_else(|_| Utc::now().naive_utc());
            let expires_at = NaiveDateTime::parse_from_str(&expires_at_str, TIMESTAMP_FORMAT)
                .unwrap_or_else(|_| Utc::now().naive_utc());

            Ok(Some(Conversation {
                id,
                dialog,
                messages,
                last_activity,
                expires_at,
            }))
        }
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn save_conversation(conn: &Connection, conv: &Conversation) -> anyhow::Result<()> {
    let dialog_json = serde_json::to_string(&conv.dialog)?;
    let transcript_json = serde_json::to_string(&conv.messages)?;
    let last_activity = conv.last_activity.format(TIMESTAMP_FORMAT).to_string();
    let expires_at = conv.expires_at.format(TIMESTAMP_FORMAT).to_string();

    conn.execute(
        "INSERT INTO conversations (id, dialog_state, transcript, last_activity, expires_at)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(id) DO UPDATE SET
           dialog_state = excluded.dialog_state,
           transcript = excluded.transcript,
           last_activity = excluded.last_activity,
           expires_at = excluded.expires_at",
        params![conv.id, dialog_json, transcript_json, last_activity, expires_at],
    )?;
    Ok(())
}

pub fn delete_conversation(conn: &Connection, id: &str) -> anyhow::Result<bool> {
    let count = conn.execute("DELETE FROM conversations WHERE id = ?1", params![id])?;
    Ok(count > 0)
}

pub fn expire_old_conversations(conn: &Connection) -> anyhow::Result<usize> {
    let now = Utc::now().naive_utc().format(TIMESTAMP_FORMAT).to_string();
    let count = conn.execute("DELETE FROM conversations WHERE expires_at <= ?1", params![now])?;
    Ok(count)
}
