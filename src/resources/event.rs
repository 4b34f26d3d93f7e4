use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Fields, Resource, Table};
use crate::errors::BackendError;
use crate::normalization;
use crate::schedule::{parse_event_date, Dated};

/// A gig, festival appearance or release party.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Event {
    pub id: Uuid,

    pub title: String,

    pub description: Option<String>,

    /// Venue and city, as displayed.
    pub location: Option<String>,

    /// When the event starts, as an ISO-8601 timestamp.
    pub event_date: Option<String>,

    /// A display date such as "Sat 3rd January 2026", kept for rows
    /// created before `event_date` existed.
    pub date: Option<String>,

    pub image_url: Option<String>,

    pub ticket_url: Option<String>,

    pub created_at: DateTime<Utc>,
}

impl Resource for Event {
    const TABLE: Table = Table::Events;

    type Fields = EventFields;
}

impl Dated for Event {
    fn event_date(&self) -> Option<&str> {
        self.event_date.as_deref()
    }

    fn date(&self) -> Option<&str> {
        self.date.as_deref()
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EventFields {
    #[serde(default, deserialize_with = "normalization::deserialize_option")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, deserialize_with = "normalization::deserialize_option")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, deserialize_with = "normalization::deserialize_option")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    #[serde(default, deserialize_with = "normalization::deserialize_option")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_date: Option<String>,

    #[serde(default, deserialize_with = "normalization::deserialize_option")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,

    #[serde(default, deserialize_with = "normalization::deserialize_option")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    #[serde(default, deserialize_with = "normalization::deserialize_option")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticket_url: Option<String>,
}

impl Fields for EventFields {
    fn missing(&self) -> Vec<&'static str> {
        let mut missing = vec![];

        if self.title.is_none() {
            missing.push("title");
        }

        if self.event_date.is_none() && self.date.is_none() {
            missing.push("event_date");
        }

        missing
    }

    /// Rewrites `event_date` as RFC 3339 so the column always holds a
    /// timestamp the database accepts.
    fn prepare(&mut self) -> Result<(), BackendError> {
        if let Some(raw) = self.event_date.take() {
            let parsed = parse_event_date(Some(&raw)).ok_or(BackendError::InvalidDate(raw))?;

            self.event_date = Some(parsed.to_rfc3339_opts(SecondsFormat::Secs, false));
        }

        Ok(())
    }
}
