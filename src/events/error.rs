//! Typed errors for event operations.

use thiserror::Error;

use super::models::EventId;

/// Errors raised by the event store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Another writer holds the database lock. Safe to retry.
    #[error("database is busy")]
    Busy,

    #[error("database error: {0}")]
    Database(#[source] tokio_rusqlite::Error),

    #[error("malformed event document: {0}")]
    Malformed(#[from] serde_json::Error),
}

impl From<tokio_rusqlite::Error> for StoreError {
    fn from(err: tokio_rusqlite::Error) -> Self {
        match &err {
            tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(failure, _))
                if matches!(
                    failure.code,
                    rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked
                ) =>
            {
                StoreError::Busy
            }
            _ => StoreError::Database(err),
        }
    }
}

impl StoreError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Busy)
    }
}

/// Errors surfaced to callers of the event service.
#[derive(Debug, Error)]
pub enum EventError {
    #[error("event not found: {0}")]
    EventNotFound(EventId),

    #[error("remindee email not found: {0}")]
    RemindeeNotFound(String),

    #[error("attendee email not found: {0}")]
    AttendeeNotFound(String),

    #[error("user is not the event owner")]
    NotOwner,

    #[error("not signed in")]
    Unauthenticated,

    #[error("event is not a group")]
    NotGroup,

    /// Writes kept colliding with other writers until retries ran out
    #[error("could not update event {0}, try again")]
    Conflict(EventId),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result type alias for event operations.
pub type EventResult<T> = std::result::Result<T, EventError>;
