use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum Intent {
    BookFlight,
    None,
    Other(String),
}

impl Intent {
    pub fn from_label(label: &str) -> Self {
        match label {
            "BookFlight" => Intent::BookFlight,
            "None" => Intent::None,
            other => Intent::Other(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DatedValue {
    #[serde(rename = "type", default)]
    pub kind: String,
    pub values: Vec<TimexResolution>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimexResolution {
    pub timex: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum EntityValue {
    Text(String),
    Number(f64),
    Dated(DatedValue),
    Geography {
        value: String,
        #[serde(rename = "type", default)]
        kind: String,
    },
}

impl EntityValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            EntityValue::Text(s) => Some(s),
            EntityValue::Geography { value, .. } => Some(value),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RecognizerResult {
    #[serde(default)]
    pub intents: BTreeMap<String, f64>,
    #[serde(default)]
    pub entities: BTreeMap<String, Vec<EntityValue>>,
}

impl RecognizerResult {
    /// Highest-scoring intent label. Ties go to the alphabetically first label.
    pub fn top_intent(&self) -> Option<(&str, f64)> {
        self.intents
            .iter()
            .fold(None, |best: Option<(&str, f64)>, (label, &score)| match best {
                Some((_, best_score)) if best_score >= score => best,
                _ => Some((label.as_str(), score)),
            })
    }

    pub fn entity(&self, name: &str) -> &[EntityValue] {
        self.entities.get(name).map(Vec::as_slice).unwrap_or(&[])
    }
}
