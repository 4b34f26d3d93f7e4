use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Fields, Resource, Table};
use crate::normalization;

/// A full-width slide in the home page carousel.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct HeroSlide {
    pub id: Uuid,
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub image_url: String,

    /// Where the slide's call to action points.
    pub link_url: Option<String>,

    pub display_order: i32,

    /// Inactive slides are kept but not shown.
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
}

impl Resource for HeroSlide {
    const TABLE: Table = Table::HeroSlides;

    type Fields = HeroSlideFields;
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct HeroSlideFields {
    #[serde(default, deserialize_with = "normalization::deserialize_option")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, deserialize_with = "normalization::deserialize_option")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,

    #[serde(default, deserialize_with = "normalization::deserialize_option")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    #[serde(default, deserialize_with = "normalization::deserialize_option")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_order: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl Fields for HeroSlideFields {
    fn missing(&self) -> Vec<&'static str> {
        if self.image_url.is_none() {
            vec!["image_url"]
        } else {
            vec![]
        }
    }
}
