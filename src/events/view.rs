use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::models::{Attendee, Event, EventId, EventType, Remindee, Response, UserId};
use crate::users::User;

/// Public profile attached to each response when an event is read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<UserId>,
    pub first_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

impl Profile {
    pub fn guest(name: &str) -> Self {
        Self {
            id: None,
            first_name: name.to_string(),
            last_name: None,
        }
    }
}

impl From<User> for Profile {
    fn from(user: User) -> Self {
        Self {
            id: Some(user.id),
            first_name: user.first_name,
            last_name: Some(user.last_name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseView {
    #[serde(flatten)]
    pub response: Response,
    pub user: Profile,
}

/// An event as returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventView {
    pub id: EventId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<UserId>,
    pub name: String,
    pub duration_minutes: u32,
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub dates: Vec<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notifications_enabled: Option<bool>,
    pub responses: BTreeMap<String, ResponseView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remindees: Option<Vec<Remindee>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attendees: Option<Vec<Attendee>>,
}

impl EventView {
    /// `profiles` holds whatever the directory resolved. Keys without
    /// a profile are guests and are shown under the name they gave.
    pub fn new(event: Event, mut profiles: BTreeMap<String, Profile>) -> Self {
        let responses = event
            .responses
            .into_iter()
            .map(|(key, response)| {
                let user = profiles.remove(&key).unwrap_or_else(|| {
                    Profile::guest(response.name.as_deref().unwrap_or(key.as_str()))
                });
                (key, ResponseView { response, user })
            })
            .collect();

        Self {
            id: event.id,
            owner_id: event.owner_id,
            name: event.name,
            duration_minutes: event.duration_minutes,
            event_type: event.event_type,
            dates: event.dates,
            notifications_enabled: event.notifications_enabled,
            responses,
            remindees: event.remindees,
            attendees: event.attendees,
        }
    }
}
