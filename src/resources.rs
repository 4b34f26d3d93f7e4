use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::errors::BackendError;

mod content;
mod event;
mod gallery;
mod hero;
mod mix;
mod video;

pub use content::{ContentValue, SiteContent, SiteContentFields};
pub use event::{Event, EventFields};
pub use gallery::{GalleryImage, GalleryImageFields};
pub use hero::{HeroSlide, HeroSlideFields};
pub use mix::{Mix, MixFields};
pub use video::{Video, VideoFields};

/// The tables behind the content API.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Table {
    Events,
    GalleryImages,
    HeroSlides,
    Mixes,
    SiteContent,
    Videos,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Direction {
    Ascending,
    Descending,
}

impl Direction {
    pub fn as_sql(self) -> &'static str {
        match self {
            Direction::Ascending => "ASC",
            Direction::Descending => "DESC",
        }
    }
}

impl Table {
    /// The SQL table name.
    pub fn name(self) -> &'static str {
        match self {
            Table::Events => "events",
            Table::GalleryImages => "gallery_images",
            Table::HeroSlides => "hero_slides",
            Table::Mixes => "mixes",
            Table::SiteContent => "site_content",
            Table::Videos => "videos",
        }
    }

    /// The path segment under `/api`.
    pub fn segment(self) -> &'static str {
        match self {
            Table::Events => "events",
            Table::GalleryImages => "gallery",
            Table::HeroSlides => "hero-slides",
            Table::Mixes => "mixes",
            Table::SiteContent => "site-content",
            Table::Videos => "videos",
        }
    }

    /// Columns a client may write. `id` and the timestamps are assigned
    /// by the database.
    pub fn columns(self) -> &'static [&'static str] {
        match self {
            Table::Events => &[
                "title",
                "description",
                "location",
                "event_date",
                "date",
                "image_url",
                "ticket_url",
            ],
            Table::GalleryImages => &["title", "description", "image_url", "display_order"],
            Table::HeroSlides => &[
                "title",
                "subtitle",
                "image_url",
                "link_url",
                "display_order",
                "is_active",
            ],
            Table::Mixes => &["title", "description", "embed_url", "cover_url", "released_on"],
            Table::SiteContent => &["key", "value"],
            Table::Videos => &["title", "video_url", "thumbnail_url", "display_order"],
        }
    }

    /// The column and direction lists are sorted by. Ties are broken by id.
    pub fn ordering(self) -> (&'static str, Direction) {
        match self {
            Table::Events | Table::Mixes => ("created_at", Direction::Descending),
            Table::GalleryImages | Table::HeroSlides | Table::Videos => {
                ("display_order", Direction::Ascending)
            }
            Table::SiteContent => ("key", Direction::Ascending),
        }
    }
}

/// A record type stored in one of the [`Table`]s.
pub trait Resource: DeserializeOwned + Serialize + Send + Sync + 'static {
    const TABLE: Table;

    /// The payload accepted when creating or updating a record.
    type Fields: Fields;
}

/// A partial record as submitted by the admin panel. Every field is
/// optional; absent fields are left to column defaults on insert and
/// untouched on update.
pub trait Fields: DeserializeOwned + Serialize + Send + Sync + 'static {
    /// Names of the fields a new record cannot do without.
    fn missing(&self) -> Vec<&'static str>;

    /// Checks and canonicalizes values before they are written.
    fn prepare(&mut self) -> Result<(), BackendError> {
        Ok(())
    }
}

/// Serializes `fields` into the column map handed to the database.
pub fn to_row<F: Fields>(fields: &F) -> Result<Map<String, Value>, BackendError> {
    match serde_json::to_value(fields).map_err(BackendError::MalformedBody)? {
        Value::Object(map) => Ok(map),
        _ => Err(BackendError::NothingToWrite),
    }
}

/// Decodes a row returned by the database.
pub fn from_row<R: Resource>(row: Value) -> Result<R, BackendError> {
    serde_json::from_value(row).map_err(BackendError::MalformedRow)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn written_columns_never_include_generated_ones() {
        for table in &[
            Table::Events,
            Table::GalleryImages,
            Table::HeroSlides,
            Table::Mixes,
            Table::SiteContent,
            Table::Videos,
        ] {
            for generated in &["id", "created_at", "updated_at"] {
                assert!(!table.columns().contains(generated), "{:?}", table);
            }
        }
    }

    #[test]
    fn absent_fields_are_not_serialized() {
        let fields = GalleryImageFields {
            image_url: Some("https://cdn.example.com/a.jpg".to_owned()),
            ..Default::default()
        };

        let row = to_row(&fields).unwrap();

        assert_eq!(
            Value::Object(row),
            json!({ "image_url": "https://cdn.example.com/a.jpg" })
        );
    }
}
