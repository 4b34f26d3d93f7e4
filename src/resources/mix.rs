use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Fields, Resource, Table};
use crate::normalization;

/// A DJ mix hosted on an external player.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Mix {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,

    /// Player URL (SoundCloud, Mixcloud and the like) embedded on the page.
    pub embed_url: String,

    pub cover_url: Option<String>,
    pub released_on: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl Resource for Mix {
    const TABLE: Table = Table::Mixes;

    type Fields = MixFields;
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct MixFields {
    #[serde(default, deserialize_with = "normalization::deserialize_option")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, deserialize_with = "normalization::deserialize_option")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, deserialize_with = "normalization::deserialize_option")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embed_url: Option<String>,

    #[serde(default, deserialize_with = "normalization::deserialize_option")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub released_on: Option<NaiveDate>,
}

impl Fields for MixFields {
    fn missing(&self) -> Vec<&'static str> {
        let mut missing = vec![];

        if self.title.is_none() {
            missing.push("title");
        }

        if self.embed_url.is_none() {
            missing.push("embed_url");
        }

        missing
    }
}
