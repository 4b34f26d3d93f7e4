use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Fields, Resource, Table};
use crate::normalization;

/// An artwork in the gallery.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct GalleryImage {
    pub id: Uuid,
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_url: String,
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
}

impl Resource for GalleryImage {
    const TABLE: Table = Table::GalleryImages;

    type Fields = GalleryImageFields;
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct GalleryImageFields {
    #[serde(default, deserialize_with = "normalization::deserialize_option")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, deserialize_with = "normalization::deserialize_option")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, deserialize_with = "normalization::deserialize_option")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_order: Option<i32>,
}

impl Fields for GalleryImageFields {
    fn missing(&self) -> Vec<&'static str> {
        if self.image_url.is_none() {
            vec!["image_url"]
        } else {
            vec![]
        }
    }
}
