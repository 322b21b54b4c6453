//! One method per event operation. Each loads what it needs, checks
//! access, runs the pure reconcile/merge/trigger logic, persists through
//! a targeted store call, then carries out side effects. Notifications
//! are only queued after the write they depend on has committed.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use serde::Deserialize;

use super::access::{ensure_can_delete_response, ensure_can_edit, ensure_owner};
use super::error::{EventError, EventResult, StoreError};
use super::models::{Event, EventId, EventInput, Remindee, TaskHandle, UserId};
use super::reconcile::{self, ReconcileContext, SideEffect};
use super::responses::ResponseSubmission;
use super::store::{EventStore, FieldUpdate};
use super::triggers::{self, Decline, MarkResponded, Trigger};
use super::view::{EventView, Profile};
use crate::notify::{Notification, Outbox};
use crate::reminders::ReminderScheduler;
use crate::users::{User, UserDirectory};

const DEFAULT_OWNER_NAME: &str = "Somebody";

// Base delay between write attempts, multiplied by the attempt number
const RETRY_BACKOFF: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResponseRequest {
    pub guest: bool,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub user_id: Option<UserId>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateRequest {
    pub event_name: String,
    pub copy_availability: bool,
}

/// Side effects that can only run once the event has been written.
#[derive(Default)]
struct AfterCommit {
    // Handles created for this write, cancelled again if it fails
    scheduled: Vec<TaskHandle>,
    cancel: Vec<TaskHandle>,
    notifications: Vec<Notification>,
}

pub struct EventService {
    store: Arc<dyn EventStore>,
    users: Arc<dyn UserDirectory>,
    reminders: Arc<dyn ReminderScheduler>,
    outbox: Outbox,
    write_attempts: usize,
}

impl EventService {
    pub fn new(
        store: Arc<dyn EventStore>,
        users: Arc<dyn UserDirectory>,
        reminders: Arc<dyn ReminderScheduler>,
        outbox: Outbox,
        write_attempts: usize,
    ) -> Self {
        Self {
            store,
            users,
            reminders,
            outbox,
            write_attempts: write_attempts.max(1),
        }
    }

    /// Retry `op` while the database reports it is busy. Each attempt
    /// calls `op` again so conditional writes re-read current state.
    async fn with_retry<T, F, Fut>(&self, id: &EventId, mut op: F) -> EventResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, StoreError>>,
    {
        let mut attempt = 1;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && attempt < self.write_attempts => {
                    tracing::warn!(
                        "Write to event {} collided (attempt {}/{}), retrying",
                        id,
                        attempt,
                        self.write_attempts
                    );
                    tokio::time::sleep(RETRY_BACKOFF * attempt as u32).await;
                    attempt += 1;
                }
                Err(e) if e.is_retryable() => {
                    tracing::error!("Giving up on write to event {} after {} attempts", id, attempt);
                    return Err(EventError::Conflict(id.clone()));
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    async fn load(&self, id: &EventId) -> EventResult<Event> {
        self.store
            .load_event(id)
            .await?
            .ok_or_else(|| EventError::EventNotFound(id.clone()))
    }

    async fn owner_name(&self, owner: Option<&UserId>) -> String {
        let Some(owner) = owner else {
            return DEFAULT_OWNER_NAME.to_string();
        };
        match self.users.lookup_user(owner).await {
            Ok(Some(user)) => user.first_name,
            Ok(None) => DEFAULT_OWNER_NAME.to_string(),
            Err(e) => {
                tracing::error!("Failed to look up owner {}: {}", owner, e);
                DEFAULT_OWNER_NAME.to_string()
            }
        }
    }

    /// Schedule reminders for added remindees and write the handles
    /// onto them. Everything else is deferred until after the write.
    async fn prepare_effects(
        &self,
        remindees: &mut [Remindee],
        effects: Vec<SideEffect>,
    ) -> AfterCommit {
        let mut after = AfterCommit::default();
        for effect in effects {
            match effect {
                SideEffect::ScheduleReminder {
                    email,
                    owner_name,
                    event_name,
                    event_id,
                } => {
                    let handles = match self
                        .reminders
                        .schedule_reminder(&email, &owner_name, &event_name, &event_id)
                        .await
                    {
                        Ok(handles) => handles,
                        Err(e) => {
                            tracing::error!("Failed to schedule reminders for {}: {}", email, e);
                            Vec::new()
                        }
                    };
                    after.scheduled.extend(handles.iter().cloned());
                    if let Some(remindee) = remindees.iter_mut().find(|r| r.email == email) {
                        remindee.task_ids = handles;
                    }
                }
                SideEffect::CancelReminder { handles, .. } => after.cancel.extend(handles),
                SideEffect::SendInvite {
                    email,
                    owner_name,
                    group_name,
                    event_id,
                } => after.notifications.push(Notification::GroupInvite {
                    email,
                    owner_name,
                    group_name,
                    event_id,
                }),
            }
        }
        after
    }

    async fn cancel_reminders(&self, handles: &[TaskHandle]) {
        for handle in handles {
            if let Err(e) = self.reminders.cancel_reminder(handle).await {
                tracing::error!("Failed to cancel reminder {}: {}", handle, e);
            }
        }
    }

    async fn commit_effects(&self, after: AfterCommit) {
        self.cancel_reminders(&after.cancel).await;
        for notification in after.notifications {
            self.outbox.send(notification);
        }
    }

    async fn abandon_effects(&self, after: AfterCommit) {
        self.cancel_reminders(&after.scheduled).await;
    }

    pub async fn create_event(
        &self,
        actor: Option<&UserId>,
        input: EventInput,
    ) -> EventResult<EventId> {
        let id = EventId::generate();
        let ctx = ReconcileContext {
            owner_name: self.owner_name(actor).await,
            event_name: input.name.clone(),
            event_id: id.clone(),
        };

        let mut event = Event {
            id: id.clone(),
            owner_id: actor.cloned(),
            name: input.name,
            duration_minutes: input.duration_minutes,
            event_type: input.event_type,
            dates: input.dates,
            notifications_enabled: input.notifications_enabled,
            responses: BTreeMap::new(),
            remindees: None,
            attendees: None,
        };

        let after = if input.event_type.has_remindees() {
            let mut reconciled = reconcile::reconcile_remindees(&[], &input.remindees, &ctx);
            let after = self
                .prepare_effects(&mut reconciled.list, reconciled.effects)
                .await;
            event.remindees = Some(reconciled.list);
            after
        } else {
            let reconciled = reconcile::reconcile_attendees(&[], &input.attendees, &ctx);
            event.attendees = Some(reconciled.list);
            self.prepare_effects(&mut [], reconciled.effects).await
        };

        if let Err(e) = self.with_retry(&id, || self.store.insert_event(&event)).await {
            self.abandon_effects(after).await;
            return Err(e);
        }
        tracing::info!("Created event {}", id);

        self.commit_effects(after).await;
        self.outbox.send(Notification::EventCreated {
            event_id: id.clone(),
            event_type: event.event_type,
            num_dates: event.dates.len(),
            creator: event.owner_id.clone(),
        });

        Ok(id)
    }

    /// Overwrite the event's configuration and reconcile its
    /// participant list. Responses are never touched.
    pub async fn edit_event(
        &self,
        actor: Option<&UserId>,
        id: &EventId,
        input: EventInput,
    ) -> EventResult<()> {
        let event = self.load(id).await?;
        ensure_can_edit(&event, actor)?;

        let ctx = ReconcileContext {
            owner_name: self.owner_name(event.owner_id.as_ref()).await,
            event_name: input.name.clone(),
            event_id: id.clone(),
        };

        let mut fields = vec![
            FieldUpdate::Name(input.name),
            FieldUpdate::DurationMinutes(input.duration_minutes),
            FieldUpdate::Dates(input.dates),
            FieldUpdate::NotificationsEnabled(input.notifications_enabled),
            FieldUpdate::EventType(input.event_type),
        ];

        // Only the list matching the new type is reconciled. The other
        // one is left as stored.
        let mut after = if input.event_type.has_remindees() {
            let mut reconciled =
                reconcile::reconcile_remindees(event.remindees(), &input.remindees, &ctx);
            let after = self
                .prepare_effects(&mut reconciled.list, reconciled.effects)
                .await;
            fields.push(FieldUpdate::Remindees(Some(reconciled.list)));
            after
        } else {
            let reconciled =
                reconcile::reconcile_attendees(event.attendees(), &input.attendees, &ctx);
            fields.push(FieldUpdate::Attendees(Some(reconciled.list)));
            self.prepare_effects(&mut [], reconciled.effects).await
        };

        let rebased = match self
            .with_retry(id, || self.store.update_event_fields(id, fields.clone()))
            .await
        {
            Ok(Some(rebased)) => rebased,
            Ok(None) => {
                // Deleted between the load and the write
                self.abandon_effects(after).await;
                return Err(EventError::EventNotFound(id.clone()));
            }
            Err(e) => {
                self.abandon_effects(after).await;
                return Err(e);
            }
        };

        // The list changed under us. Whoever listed these emails first
        // already invited them, and their handles are the live ones.
        after.cancel.extend(rebased.orphaned_tasks);
        after.cancel.sort();
        after.cancel.dedup();
        after.notifications.retain(|notification| match notification {
            Notification::GroupInvite { email, .. } => !rebased.already_listed.contains(email),
            _ => true,
        });

        self.commit_effects(after).await;
        Ok(())
    }

    pub async fn get_event(&self, id: &EventId) -> EventResult<EventView> {
        let event = self.load(id).await?;

        // Look up every signed-in respondent at once
        let lookups = event.responses.iter().filter_map(|(key, response)| {
            let user_id = response.user_id.clone()?;
            let users = Arc::clone(&self.users);
            Some(async move { (key.clone(), user_id.clone(), users.lookup_user(&user_id).await) })
        });

        let mut profiles = BTreeMap::new();
        for (key, user_id, result) in join_all(lookups).await {
            match result {
                Ok(Some(user)) => {
                    profiles.insert(key, Profile::from(user));
                }
                Ok(None) => {}
                Err(e) => tracing::error!("Failed to look up respondent {}: {}", user_id, e),
            }
        }

        Ok(EventView::new(event, profiles))
    }

    pub async fn submit_response(
        &self,
        actor: Option<&UserId>,
        id: &EventId,
        submission: ResponseSubmission,
    ) -> EventResult<()> {
        let event = self.load(id).await?;
        let respondent = submission.respondent(actor)?;
        let key = respondent.participant_key();
        let response = submission.into_response(&respondent);

        let outcome = self
            .with_retry(id, || self.store.put_response(id, &key, &response))
            .await?
            .ok_or_else(|| EventError::EventNotFound(id.clone()))?;

        if let Some(Trigger::FirstResponse {
            owner_id,
            respondent,
        }) = triggers::first_response(&event, &respondent, outcome)
        {
            self.outbox.send(Notification::FirstResponse {
                event_id: id.clone(),
                event_name: event.name.clone(),
                owner_id,
                respondent,
            });
        }
        Ok(())
    }

    pub async fn delete_response(
        &self,
        actor: Option<&UserId>,
        id: &EventId,
        request: DeleteResponseRequest,
    ) -> EventResult<()> {
        let event = self.load(id).await?;

        let key = if request.guest {
            request.name
        } else {
            let target = request
                .user_id
                .or_else(|| actor.cloned())
                .ok_or(EventError::Unauthenticated)?;
            ensure_can_delete_response(&event, actor, &target)?;
            target.to_string()
        };

        self.with_retry(id, || self.store.remove_response(id, &key))
            .await?
            .ok_or_else(|| EventError::EventNotFound(id.clone()))?;
        Ok(())
    }

    /// Record that the remindee with `email` has responded. Reached
    /// from links in reminder emails, so no sign in is needed.
    pub async fn mark_responded(&self, id: &EventId, email: &str) -> EventResult<()> {
        let event = self.load(id).await?;

        let outcome = self
            .with_retry(id, || self.store.mark_remindee_responded(id, email))
            .await?
            .ok_or_else(|| EventError::EventNotFound(id.clone()))?;

        match &outcome {
            MarkResponded::NotFound => {
                return Err(EventError::RemindeeNotFound(email.to_string()));
            }
            MarkResponded::AlreadyResponded => return Ok(()),
            MarkResponded::Marked { cancel, .. } => self.cancel_reminders(cancel).await,
        }

        if let Some(Trigger::EveryoneResponded { owner_id }) =
            triggers::all_responded(&event, &outcome)
        {
            tracing::info!("Everyone responded to event {}", id);
            self.outbox.send(Notification::EveryoneResponded {
                event_id: id.clone(),
                event_name: event.name.clone(),
                owner_id,
            });
        }
        Ok(())
    }

    pub async fn decline_invite(&self, user: &User, id: &EventId) -> EventResult<()> {
        let event = self.load(id).await?;
        if event.event_type.has_remindees() {
            return Err(EventError::NotGroup);
        }

        let outcome = self
            .with_retry(id, || self.store.decline_attendee(id, &user.email))
            .await?
            .ok_or_else(|| EventError::EventNotFound(id.clone()))?;

        match outcome {
            Decline::NotFound => Err(EventError::AttendeeNotFound(user.email.clone())),
            Decline::AlreadyDeclined | Decline::Declined => Ok(()),
        }
    }

    pub async fn delete_event(&self, actor: &UserId, id: &EventId) -> EventResult<()> {
        let event = self.load(id).await?;
        ensure_owner(&event, actor)?;

        let deleted = self
            .with_retry(id, || self.store.delete_event(id, actor))
            .await?;
        if !deleted {
            return Err(EventError::EventNotFound(id.clone()));
        }

        // Nobody left to remind
        let pending: Vec<TaskHandle> = event
            .remindees()
            .iter()
            .filter(|r| !r.responded)
            .flat_map(|r| r.task_ids.iter().cloned())
            .collect();
        self.cancel_reminders(&pending).await;

        tracing::info!("Deleted event {}", id);
        Ok(())
    }

    /// Copy an event under a new id and name. Remindees keep the task
    /// handles of the original, which still point at its reminders.
    pub async fn duplicate_event(
        &self,
        actor: &UserId,
        id: &EventId,
        request: DuplicateRequest,
    ) -> EventResult<EventId> {
        let event = self.load(id).await?;
        ensure_owner(&event, actor)?;

        let new_id = EventId::generate();
        let mut copy = event;
        copy.id = new_id.clone();
        copy.name = request.event_name;
        if !request.copy_availability {
            copy.responses.clear();
        }

        self.with_retry(&new_id, || self.store.insert_event(&copy))
            .await?;
        tracing::info!("Duplicated event {} as {}", id, new_id);
        Ok(new_id)
    }
}
