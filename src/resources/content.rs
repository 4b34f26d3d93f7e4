use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::{Fields, Resource, Table};
use crate::normalization;

/// A named block of copy or settings used by the pages, e.g. the
/// biography text or the festival line-up.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct SiteContent {
    pub id: Uuid,
    pub key: String,
    pub value: ContentValue,
    pub updated_at: DateTime<Utc>,
}

/// The value of a [`SiteContent`] entry. The tag travels with the value
/// so readers never have to guess whether they were handed text.
///
/// ```
/// use site_backend::resources::ContentValue;
///
/// let value: ContentValue = serde_json::from_str(r#"{"kind":"text","data":"Hello"}"#).unwrap();
/// assert_eq!(value, ContentValue::Text("Hello".to_owned()));
/// ```
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum ContentValue {
    Text(String),
    Structured(Map<String, Value>),
}

impl Resource for SiteContent {
    const TABLE: Table = Table::SiteContent;

    type Fields = SiteContentFields;
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct SiteContentFields {
    #[serde(default, deserialize_with = "normalization::deserialize_option")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<ContentValue>,
}

impl Fields for SiteContentFields {
    fn missing(&self) -> Vec<&'static str> {
        let mut missing = vec![];

        if self.key.is_none() {
            missing.push("key");
        }

        if self.value.is_none() {
            missing.push("value");
        }

        missing
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn structured_values_keep_their_tag() {
        let fields: SiteContentFields = serde_json::from_value(json!({
            "key": "festival_lineup",
            "value": { "kind": "structured", "data": { "headliners": ["A", "B"] } }
        }))
        .unwrap();

        let mut expected = Map::new();
        expected.insert("headliners".to_owned(), json!(["A", "B"]));
        assert_eq!(fields.value, Some(ContentValue::Structured(expected)));
    }

    #[test]
    fn untagged_values_are_refused() {
        let result = serde_json::from_value::<SiteContentFields>(json!({
            "key": "bio",
            "value": "just a string"
        }));

        assert!(result.is_err());
    }
}
