//! Model listing wire types

use serde::{Deserialize, Serialize};

/// How many model ids a summary shows
pub const SUMMARY_LIMIT: usize = 3;

/// One entry of `GET /v1/models`.
///
/// Only `id` is interpreted; `object`, `owned_by` and whatever else the
/// server sends are kept as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(flatten)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl ModelDescriptor {
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self {
            id: Some(id.into()),
            metadata: serde_json::Map::new(),
        }
    }

    /// Identifier for display, `unknown` when the server sent none
    pub fn display_id(&self) -> &str {
        self.id.as_deref().unwrap_or("unknown")
    }
}

/// Body of `GET /v1/models`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelList {
    pub data: Vec<ModelDescriptor>,
}

/// The first few model ids plus how many were left out
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSummary {
    pub total: usize,
    pub shown: Vec<String>,
    pub remaining: usize,
}

impl ModelSummary {
    pub fn new(models: &[ModelDescriptor], limit: usize) -> Self {
        let shown: Vec<String> = models
            .iter()
            .take(limit)
            .map(|m| m.display_id().to_string())
            .collect();
        Self {
            total: models.len(),
            remaining: models.len() - shown.len(),
            shown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_descriptor_keeps_metadata() {
        let model: ModelDescriptor = serde_json::from_value(json!({
            "id": "qwen2.5-7b-instruct",
            "object": "model",
            "owned_by": "organization_owner"
        }))
        .unwrap();

        assert_eq!(model.display_id(), "qwen2.5-7b-instruct");
        assert_eq!(model.metadata["owned_by"], "organization_owner");
    }

    #[test]
    fn test_descriptor_without_id_is_unknown() {
        let model: ModelDescriptor = serde_json::from_value(json!({"object": "model"})).unwrap();
        assert_eq!(model.display_id(), "unknown");
    }

    #[test]
    fn test_listing_requires_data_array() {
        assert!(serde_json::from_value::<ModelList>(json!({"data": []})).is_ok());
        assert!(serde_json::from_value::<ModelList>(json!({"models": []})).is_err());
        assert!(serde_json::from_value::<ModelList>(json!({"data": "none"})).is_err());
    }

    #[test]
    fn test_summary_limit() {
        let models: Vec<ModelDescriptor> =
            (1..=5).map(|i| ModelDescriptor::new(format!("m{}", i))).collect();

        let summary = ModelSummary::new(&models, SUMMARY_LIMIT);
        assert_eq!(summary.shown, vec!["m1", "m2", "m3"]);
        assert_eq!(summary.remaining, 2);

        let summary = ModelSummary::new(&models[..3], SUMMARY_LIMIT);
        assert_eq!(summary.shown.len(), 3);
        assert_eq!(summary.remaining, 0);

        let summary = ModelSummary::new(&[], SUMMARY_LIMIT);
        assert_eq!(summary.total, 0);
        assert!(summary.shown.is_empty());
    }
}
