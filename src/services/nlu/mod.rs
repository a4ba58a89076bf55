pub mod extraction;
pub mod llm;
pub mod luis;

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::Value;

use crate::models::{EntityValue, RecognizerResult};

#[async_trait]
pub trait NluRecognizer: Send + Sync {
    async fn recognize(&self, utterance: &str) -> anyhow::Result<RecognizerResult>;
}

pub(crate) fn result_from_json(intents: &Value, entities: &Value) -> RecognizerResult {
    let intents = intents
        .as_object()
        .map(|map| {
            map.iter()
                .filter_map(|(label, score)| {
                    let score = score.as_f64().or_else(|| score["score"].as_f64())?;
                    Some((label.clone(), score))
                })
                .collect()
        })
        .unwrap_or_default();

    let entities = entities
        .as_object()
        .map(|map| {
            map.iter()
                .filter(|(name, _)| !name.starts_with('$'))
                .filter_map(|(name, values)| {
                    let values: Vec<EntityValue> = values
                        .as_array()?
                        .iter()
                        .filter_map(|v| serde_json::from_value(v.clone()).ok())
                        .collect();
                    Some((name.clone(), values))
                })
                .collect::<BTreeMap<_, _>>()
        })
        .unwrap_or_default();

    RecognizerResult { intents, entities }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scores_in_either_shape() {
        let result = result_from_json(
            &json!({"BookFlight": {"score": 0.9}, "None": 0.1}),
            &json!({}),
        );
        assert_eq!(result.intents.get("BookFlight"), Some(&0.9));
        assert_eq!(result.intents.get("None"), Some(&0.1));
    }

    #[test]
    fn test_metadata_and_unknown_shapes_dropped() {
        let result = result_from_json(
            &json!({}),
            &json!({
                "$instance": {"dst_city": [{"startIndex": 17}]},
                "dst_city": ["paris", {"unexpected": true}],
            }),
        );
        assert_eq!(result.entities.len(), 1);
        assert_eq!(result.entity("dst_city"), &[EntityValue::Text("paris".to_string())]);
    }
}
