//! Public types for the events API

use serde::{Deserialize, Serialize};

pub use crate::events::{
    DeleteResponseRequest, DuplicateRequest, EventInput, EventView, Profile, ResponseSubmission,
};
use crate::events::EventId;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventCreatedResponse {
    pub event_id: EventId,
}

#[derive(Debug, Deserialize)]
pub struct MarkRespondedRequest {
    pub email: String,
}
