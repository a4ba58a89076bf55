use async_trait::async_trait;

use super::{result_from_json, NluRecognizer};
use crate::models::RecognizerResult;
use crate::services::ai::{LlmProvider, Message};

const SYSTEM_PROMPT: &str = r#"You are an intent and entity recognizer for a flight booking assistant. Analyze the user's utterance.

Return ONLY valid JSON (no markdown, no explanation) with this exact structure:
{
  "intents": {"BookFlight": 0.0, "None": 0.0},
  "entities": {
    "dst_city": ["destination city as written"],
    "or_city": ["origin city as written"],
    "str_date": ["departure date as written"],
    "end_date": ["return date as written"],
    "budget": ["budget as written, including currency"],
    "geographyV2": [{"value": "any city mentioned", "type": "city"}],
    "number": [500],
    "datetimeV2": [{"type": "date", "values": [{"timex": "2023-01-15"}]}]
  }
}

Rules:
- Intent scores are between 0 and 1. "BookFlight" means the user wants to book a flight; anything else is "None".
- Omit an entity key entirely when nothing in the utterance matches it.
- Copy span text exactly as the user wrote it; do not invent values.
- For datetimeV2 timex, use YYYY-MM-DD, YYYY-MM or YYYY, and XXXX for an unknown year.
"#;

pub struct LlmRecognizer {
    llm: Box<dyn LlmProvider>,
}

impl LlmRecognizer {
    pub fn new(llm: Box<dyn LlmProvider>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl NluRecognizer for LlmRecognizer {
    async fn recognize(&self, utterance: &str) -> anyhow::Result<RecognizerResult> {
        let response = self
            .llm
            .complete_json(SYSTEM_PROMPT, &[Message::user(utterance)])
            .await?;
        parse_recognizer_response(&response)
    }
}

fn parse_recognizer_response(response: &str) -> anyhow::Result<RecognizerResult> {
    let value = parse_json_object(response)
        .ok_or_else(|| anyhow::anyhow!("LLM response is not a JSON object: {response}"))?;
    Ok(result_from_json(&value["intents"], &value["entities"]))
}

fn parse_json_object(response: &str) -> Option<serde_json::Value> {
    let is_object = |v: &serde_json::Value| v.is_object();

    if let Some(v) = serde_json::from_str(response).ok().filter(is_object) {
        return Some(v);
    }

    // Strip markdown code fences
    let trimmed = response.trim();
    let cleaned = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    let cleaned = cleaned.strip_suffix("```").unwrap_or(cleaned).trim();

    if let Some(v) = serde_json::from_str(cleaned).ok().filter(is_object) {
        return Some(v);
    }

    // Fall back to the outermost braces
    let start = cleaned.find('{')?;
    let end = cleaned.rfind('}')?;
    if end <= start {
        return None;
    }
    serde_json::from_str(&cleaned[start..=end]).ok().filter(is_object)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CannedLlm {
        reply: String,
    }

    #[async_trait]
    impl LlmProvider for CannedLlm {
        async fn complete_json(&self, _system_prompt: &str, messages: &[Message]) -> anyhow::Result<String> {
            anyhow::ensure!(messages.len() == 1, "expected only the utterance");
            Ok(self.reply.clone())
        }
    }

    #[test]
    fn test_parse_valid_json() {
        let json = r#"{"intents":{"BookFlight":0.9,"None":0.1},"entities":{"dst_city":["paris"]}}"#;
        let result = parse_recognizer_response(json).unwrap();
        assert_eq!(result.top_intent().map(|(l, _)| l), Some("BookFlight"));
        assert_eq!(result.entity("dst_city")[0].as_text(), Some("paris"));
    }

    #[test]
    fn test_parse_markdown_fenced_json() {
        let json = "```json\n{\"intents\":{\"None\":0.8},\"entities\":{}}\n```";
        let result = parse_recognizer_response(json).unwrap();
        assert_eq!(result.top_intent().map(|(l, _)| l), Some("None"));
    }

    #[test]
    fn test_parse_embedded_json() {
        let json = "Sure! {\"intents\":{\"BookFlight\":1.0}} hope that helps";
        let result = parse_recognizer_response(json).unwrap();
        assert_eq!(result.intents.len(), 1);
    }

    #[test]
    fn test_parse_failure_is_an_error() {
        assert!(parse_recognizer_response("I don't understand the format you want").is_err());
    }

    #[tokio::test]
    async fn test_recognize_sends_utterance() {
        let llm = CannedLlm {
            reply: r#"{"intents":{"BookFlight":0.7},"entities":{"or_city":["london"]}}"#.to_string(),
        };
        let recognizer = LlmRecognizer::new(Box::new(llm));
        let result = recognizer.recognize("from london").await.unwrap();
        assert_eq!(result.entity("or_city")[0].as_text(), Some("london"));
    }
}
