//! The event aggregate and the participant records it owns.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(String);

impl EventId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for EventId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for EventId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for UserId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque handle returned by the reminder scheduler.
pub type TaskHandle = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    SpecificDates,
    Dow,
    Group,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::SpecificDates => "specific_dates",
            EventType::Dow => "dow",
            EventType::Group => "group",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "specific_dates" => Some(EventType::SpecificDates),
            "dow" => Some(EventType::Dow),
            "group" => Some(EventType::Group),
            _ => None,
        }
    }

    /// Polls (specific dates or days of the week) track remindees,
    /// groups track attendees.
    pub fn has_remindees(&self) -> bool {
        matches!(self, EventType::SpecificDates | EventType::Dow)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    #[serde(default)]
    pub participant_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    // Display name submitted by a guest
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub availability: Vec<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_calendar_availability: Option<bool>,
    // Passed through untouched from the client's calendar integration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled_calendars: Option<Vec<serde_json::Value>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Remindee {
    pub email: String,
    #[serde(default)]
    pub task_ids: Vec<TaskHandle>,
    #[serde(default)]
    pub responded: bool,
}

impl Remindee {
    pub fn new(email: &str) -> Self {
        Self {
            email: email.to_string(),
            task_ids: Vec::new(),
            responded: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attendee {
    pub email: String,
    #[serde(default)]
    pub declined: bool,
}

impl Attendee {
    pub fn new(email: &str) -> Self {
        Self {
            email: email.to_string(),
            declined: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: EventId,
    // `None` for events created without signing in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<UserId>,
    pub name: String,
    pub duration_minutes: u32,
    #[serde(rename = "type")]
    pub event_type: EventType,
    #[serde(default)]
    pub dates: Vec<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notifications_enabled: Option<bool>,
    #[serde(default)]
    pub responses: BTreeMap<String, Response>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remindees: Option<Vec<Remindee>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attendees: Option<Vec<Attendee>>,
}

impl Event {
    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        self.owner_id.as_ref() == Some(user_id)
    }

    pub fn notifications_enabled(&self) -> bool {
        self.notifications_enabled.unwrap_or(false)
    }

    /// Missing lists are treated as empty regardless of event type.
    pub fn remindees(&self) -> &[Remindee] {
        self.remindees.as_deref().unwrap_or_default()
    }

    pub fn attendees(&self) -> &[Attendee] {
        self.attendees.as_deref().unwrap_or_default()
    }
}

/// Configuration submitted when creating or editing an event.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventInput {
    pub name: String,
    pub duration_minutes: u32,
    pub dates: Vec<DateTime<Utc>>,
    #[serde(rename = "type")]
    pub event_type: EventType,
    #[serde(default)]
    pub notifications_enabled: Option<bool>,
    #[serde(default)]
    pub remindees: Vec<String>,
    #[serde(default)]
    pub attendees: Vec<String>,
}
