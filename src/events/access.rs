//! Who may do what to an event.

use super::error::EventError;
use super::models::{Event, UserId};

/// Owned events can only be edited by their owner. Events created
/// without signing in are editable by anyone holding the link.
pub fn ensure_can_edit(event: &Event, actor: Option<&UserId>) -> Result<(), EventError> {
    match &event.owner_id {
        None => Ok(()),
        Some(owner) if actor == Some(owner) => Ok(()),
        Some(_) => Err(EventError::NotOwner),
    }
}

/// Deleting, duplicating, and other owner-only actions. Ownerless
/// events have nobody who qualifies.
pub fn ensure_owner(event: &Event, actor: &UserId) -> Result<(), EventError> {
    if event.is_owned_by(actor) {
        Ok(())
    } else {
        Err(EventError::NotOwner)
    }
}

/// Signed-in users may delete their own response; the owner may
/// delete anyone's.
pub fn ensure_can_delete_response(
    event: &Event,
    actor: Option<&UserId>,
    target: &UserId,
) -> Result<(), EventError> {
    let actor = actor.ok_or(EventError::Unauthenticated)?;
    if actor == target || event.is_owned_by(actor) {
        Ok(())
    } else {
        Err(EventError::NotOwner)
    }
}
