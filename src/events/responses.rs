//! Availability responses keyed by participant.
//!
//! Each participant owns exactly one key in the response map. A
//! submission replaces that entry wholesale and never touches any
//! other key, which is what lets submissions from different people
//! land in any order. Guests are keyed by the name they typed and
//! signed-in users by their id. Both share one namespace, so two
//! guests typing the same name overwrite each other, as do two tabs
//! submitting for the same key (last write wins).

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::error::EventError;
use super::models::{Event, Response, UserId};

/// Who a response belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Respondent {
    Guest { name: String },
    User { id: UserId },
}

impl Respondent {
    pub fn participant_key(&self) -> String {
        match self {
            Respondent::Guest { name } => name.clone(),
            Respondent::User { id } => id.to_string(),
        }
    }
}

/// Availability as submitted by a client.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseSubmission {
    pub availability: Vec<DateTime<Utc>>,
    pub guest: bool,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub use_calendar_availability: Option<bool>,
    #[serde(default)]
    pub enabled_calendars: Option<Vec<serde_json::Value>>,
}

impl ResponseSubmission {
    /// Resolve who is responding. Guests are identified by the name
    /// they submit, everyone else must be signed in.
    pub fn respondent(&self, actor: Option<&UserId>) -> Result<Respondent, EventError> {
        if self.guest {
            return Ok(Respondent::Guest {
                name: self.name.clone(),
            });
        }
        match actor {
            Some(id) => Ok(Respondent::User { id: id.clone() }),
            None => Err(EventError::Unauthenticated),
        }
    }

    /// Build the stored response for `respondent`. Calendar settings
    /// only apply to signed-in users.
    pub fn into_response(self, respondent: &Respondent) -> Response {
        let participant_key = respondent.participant_key();
        match respondent {
            Respondent::Guest { name } => Response {
                participant_key,
                user_id: None,
                name: Some(name.clone()),
                availability: self.availability,
                use_calendar_availability: None,
                enabled_calendars: None,
            },
            Respondent::User { id } => Response {
                participant_key,
                user_id: Some(id.clone()),
                name: None,
                availability: self.availability,
                use_calendar_availability: self.use_calendar_availability,
                enabled_calendars: self.enabled_calendars,
            },
        }
    }
}

/// Whether a write created a participant's entry or replaced one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutOutcome {
    Inserted,
    Replaced,
}

impl PutOutcome {
    pub fn had_prior(&self) -> bool {
        matches!(self, PutOutcome::Replaced)
    }
}

/// Set `key`'s entry to `response`, overwriting any previous entry.
pub fn merge_response(event: &mut Event, key: &str, mut response: Response) -> PutOutcome {
    response.participant_key = key.to_string();
    match event.responses.insert(key.to_string(), response) {
        Some(_) => PutOutcome::Replaced,
        None => PutOutcome::Inserted,
    }
}

/// Remove `key`'s entry. Returns whether there was one; a missing key
/// is not an error.
pub fn delete_response(event: &mut Event, key: &str) -> bool {
    event.responses.remove(key).is_some()
}
