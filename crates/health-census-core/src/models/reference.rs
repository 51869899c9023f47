//! Condition reference models (read-only dataset).

use serde::{Deserialize, Serialize};

/// Reference text for one condition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConditionReference {
    pub name: String,
    #[serde(default)]
    pub symptoms: Vec<String>,
    #[serde(default)]
    pub prevention: Vec<String>,
    #[serde(default)]
    pub treatment: String,
    /// Image location as given by the dataset
    #[serde(rename = "imagesrc", alias = "imageRef", default)]
    pub image_ref: String,
}

/// The static reference document: `{ "conditions": [...] }`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ReferenceDataset {
    pub conditions: Vec<ConditionReference>,
}

impl ReferenceDataset {
    /// Parse a dataset document.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Condition names in dataset order.
    pub fn names(&self) -> Vec<&str> {
        self.conditions.iter().map(|c| c.name.as_str()).collect()
    }
}
