use anyhow::Context;
use async_trait::async_trait;

use super::{result_from_json, NluRecognizer};
use crate::models::RecognizerResult;

pub struct LuisRecognizer {
    app_id: String,
    api_key: String,
    host_name: String,
    slot: String,
    client: reqwest::Client,
}

impl LuisRecognizer {
    pub fn new(app_id: String, api_key: String, host_name: String, slot: String) -> Self {
        Self {
            app_id,
            api_key,
            host_name,
            slot,
            client: reqwest::Client::new(),
        }
    }

    fn endpoint(&self) -> String {
        let host = self
            .host_name
            .trim_start_matches("https://")
            .trim_end_matches('/');
        format!(
            "https://{host}/luis/prediction/v3.0/apps/{}/slots/{}/predict",
            self.app_id, self.slot
        )
    }
}

#[async_trait]
impl NluRecognizer for LuisRecognizer {
    async fn recognize(&self, utterance: &str) -> anyhow::Result<RecognizerResult> {
        let resp = self
            .client
            .get(self.endpoint())
            .query(&[
                ("subscription-key", self.api_key.as_str()),
                ("query", utterance),
                ("show-all-intents", "true"),
            ])
            .send()
            .await
            .context("failed to call LUIS prediction API")?;

        let status = resp.status();
        let data: serde_json::Value = resp
            .json()
            .await
            .context("failed to parse LUIS response")?;

        if !status.is_success() {
            anyhow::bail!("LUIS API error ({}): {}", status, data);
        }

        parse_prediction(&data)
    }
}

fn parse_prediction(data: &serde_json::Value) -> anyhow::Result<RecognizerResult> {
    let prediction = data
        .get("prediction")
        .ok_or_else(|| anyhow::anyhow!("missing prediction in LUIS response"))?;
    Ok(result_from_json(&prediction["intents"], &prediction["entities"]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EntityValue;
    use serde_json::json;

    #[test]
    fn test_parse_prediction() {
        let data = json!({
            "query": "fly to paris from london on january 5th 2023 for 500 dollars",
            "prediction": {
                "topIntent": "BookFlight",
                "intents": {"BookFlight": {"score": 0.97}, "None": {"score": 0.02}},
                "entities": {
                    "dst_city": ["paris"],
                    "or_city": ["london"],
                    "str_date": ["january 5th 2023"],
                    "budget": ["500 dollars"],
                    "number": [5, 2023, 500],
                    "geographyV2": [{"value": "paris", "type": "city"}, {"value": "london", "type": "city"}],
                    "datetimeV2": [{"type": "date", "values": [{"timex": "2023-01-05", "resolution": [{"value": "2023-01-05"}]}]}],
                    "$instance": {}
                }
            }
        });

        let result = parse_prediction(&data).unwrap();
        assert_eq!(result.top_intent().map(|(l, _)| l), Some("BookFlight"));
        assert_eq!(result.entity("number").len(), 3);
        assert_eq!(result.entity("geographyV2")[1].as_text(), Some("london"));
        match &result.entity("datetimeV2")[0] {
            EntityValue::Dated(d) => assert_eq!(d.values[0].timex, "2023-01-05"),
            other => panic!("unexpected entity {other:?}"),
        }
    }

    #[test]
    fn test_missing_prediction_is_an_error() {
        assert!(parse_prediction(&json!({"error": "bad key"})).is_err());
    }

    #[test]
    fn test_endpoint_normalizes_host() {
        let luis = LuisRecognizer::new(
            "app".to_string(),
            "key".to_string(),
            "https://westus.api.cognitive.microsoft.com/".to_string(),
            "production".to_string(),
        );
        assert_eq!(
            luis.endpoint(),
            "https://westus.api.cognitive.microsoft.com/luis/prediction/v3.0/apps/app/slots/production/predict"
        );
    }
}
