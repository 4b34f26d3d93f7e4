use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Fields, Resource, Table};
use crate::normalization;

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Video {
    pub id: Uuid,
    pub title: String,
    pub video_url: String,
    pub thumbnail_url: Option<String>,
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
}

impl Resource for Video {
    const TABLE: Table = Table::Videos;

    type Fields = VideoFields;
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct VideoFields {
    #[serde(default, deserialize_with = "normalization::deserialize_option")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, deserialize_with = "normalization::deserialize_option")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,

    #[serde(default, deserialize_with = "normalization::deserialize_option")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_order: Option<i32>,
}

impl Fields for VideoFields {
    fn missing(&self) -> Vec<&'static str> {
        let mut missing = vec![];

        if self.title.is_none() {
            missing.push("title");
        }

        if self.video_url.is_none() {
            missing.push("video_url");
        }

        missing
    }
}
