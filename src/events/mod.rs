pub mod access;
pub mod diff;
pub mod error;
pub mod models;
pub mod reconcile;
pub mod responses;
pub mod service;
pub mod store;
pub mod triggers;
pub mod view;

pub use error::{EventError, EventResult, StoreError};
pub use models::{Attendee, Event, EventId, EventInput, EventType, Remindee, Response, TaskHandle, UserId};
pub use responses::{PutOutcome, Respondent, ResponseSubmission};
pub use service::{DeleteResponseRequest, DuplicateRequest, EventService};
pub use store::{EventStore, FieldUpdate, SqliteEventStore};
pub use view::{EventView, Profile};
