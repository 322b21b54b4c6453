//! Persistence for events.
//!
//! The store never writes a whole event back. Every mutation is a
//! targeted update of one column or one response row, or a short
//! immediate transaction around a single conditional transition, so
//! concurrent requests touching different parts of an event can't
//! overwrite each other with stale data.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::types::Value as SqlValue;
use rusqlite::{OptionalExtension, TransactionBehavior};
use tokio_rusqlite::{Connection, params};

use super::error::StoreError;
use super::models::{Attendee, Event, EventId, EventType, Remindee, Response, UserId};
use super::reconcile::{self, Rebased};
use super::responses::PutOutcome;
use super::triggers::{self, Decline, MarkResponded};

/// A single field of the event document to overwrite.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldUpdate {
    Name(String),
    DurationMinutes(u32),
    Dates(Vec<DateTime<Utc>>),
    NotificationsEnabled(Option<bool>),
    EventType(EventType),
    Remindees(Option<Vec<Remindee>>),
    Attendees(Option<Vec<Attendee>>),
}

impl FieldUpdate {
    fn column(&self) -> &'static str {
        match self {
            FieldUpdate::Name(_) => "name",
            FieldUpdate::DurationMinutes(_) => "duration_minutes",
            FieldUpdate::Dates(_) => "dates",
            FieldUpdate::NotificationsEnabled(_) => "notifications_enabled",
            FieldUpdate::EventType(_) => "event_type",
            FieldUpdate::Remindees(_) => "remindees",
            FieldUpdate::Attendees(_) => "attendees",
        }
    }

    fn sql_value(&self) -> Result<SqlValue, serde_json::Error> {
        let value = match self {
            FieldUpdate::Name(name) => SqlValue::Text(name.clone()),
            FieldUpdate::DurationMinutes(minutes) => SqlValue::Integer(i64::from(*minutes)),
            FieldUpdate::Dates(dates) => SqlValue::Text(serde_json::to_string(dates)?),
            FieldUpdate::NotificationsEnabled(enabled) => match enabled {
                Some(enabled) => SqlValue::Integer(i64::from(*enabled)),
                None => SqlValue::Null,
            },
            FieldUpdate::EventType(event_type) => SqlValue::Text(event_type.as_str().to_string()),
            FieldUpdate::Remindees(remindees) => optional_json(remindees)?,
            FieldUpdate::Attendees(attendees) => optional_json(attendees)?,
        };
        Ok(value)
    }
}

fn optional_json<T: serde::Serialize>(value: &Option<T>) -> Result<SqlValue, serde_json::Error> {
    match value {
        Some(v) => Ok(SqlValue::Text(serde_json::to_string(v)?)),
        None => Ok(SqlValue::Null),
    }
}

#[async_trait]
pub trait EventStore: Send + Sync {
    async fn load_event(&self, id: &EventId) -> Result<Option<Event>, StoreError>;

    async fn insert_event(&self, event: &Event) -> Result<EventId, StoreError>;

    /// Overwrite the given fields in one transaction. Participant lists
    /// are rebased onto the stored list first, so a `responded` or
    /// `declined` flag set after the caller's read is kept. `None` when
    /// the event doesn't exist.
    async fn update_event_fields(
        &self,
        id: &EventId,
        fields: Vec<FieldUpdate>,
    ) -> Result<Option<Rebased>, StoreError>;

    /// Set one participant's response. `None` when the event doesn't
    /// exist.
    async fn put_response(
        &self,
        id: &EventId,
        key: &str,
        response: &Response,
    ) -> Result<Option<PutOutcome>, StoreError>;

    /// Remove one participant's response. `None` when the event
    /// doesn't exist, otherwise whether there was a response to remove.
    async fn remove_response(&self, id: &EventId, key: &str) -> Result<Option<bool>, StoreError>;

    async fn mark_remindee_responded(
        &self,
        id: &EventId,
        email: &str,
    ) -> Result<Option<MarkResponded>, StoreError>;

    async fn decline_attendee(
        &self,
        id: &EventId,
        email: &str,
    ) -> Result<Option<Decline>, StoreError>;

    /// Delete the event only if `owner` owns it.
    async fn delete_event(&self, id: &EventId, owner: &UserId) -> Result<bool, StoreError>;
}

struct EventRow {
    id: String,
    owner_id: Option<String>,
    name: String,
    duration_minutes: u32,
    event_type: String,
    dates: String,
    notifications_enabled: Option<bool>,
    remindees: Option<String>,
    attendees: Option<String>,
}

impl EventRow {
    fn into_event(self, responses: Vec<(String, String)>) -> Result<Event, serde_json::Error> {
        let event_type = EventType::parse(&self.event_type).ok_or_else(|| {
            <serde_json::Error as serde::de::Error>::custom(format!(
                "unknown event type {}",
                self.event_type
            ))
        })?;
        let remindees = self
            .remindees
            .map(|json| serde_json::from_str(&json))
            .transpose()?;
        let attendees = self
            .attendees
            .map(|json| serde_json::from_str(&json))
            .transpose()?;

        let mut response_map = BTreeMap::new();
        for (key, data) in responses {
            let mut response: Response = serde_json::from_str(&data)?;
            response.participant_key = key.clone();
            response_map.insert(key, response);
        }

        Ok(Event {
            id: EventId::from(self.id),
            owner_id: self.owner_id.map(UserId::from),
            name: self.name,
            duration_minutes: self.duration_minutes,
            event_type,
            dates: serde_json::from_str(&self.dates)?,
            notifications_enabled: self.notifications_enabled,
            responses: response_map,
            remindees,
            attendees,
        })
    }
}

fn other(err: serde_json::Error) -> tokio_rusqlite::Error {
    tokio_rusqlite::Error::Other(Box::new(err))
}

/// Decode a participant list column. `None` when the event doesn't
/// exist, an empty list when the column is unset.
fn stored_list<T: serde::de::DeserializeOwned>(
    conn: &rusqlite::Connection,
    column: &'static str,
    id: &str,
) -> Result<Option<Vec<T>>, tokio_rusqlite::Error> {
    let json: Option<Option<String>> = conn
        .query_row(
            &format!("SELECT {} FROM event WHERE id = ?1", column),
            [id],
            |row| row.get(0),
        )
        .optional()?;
    match json {
        None => Ok(None),
        Some(None) => Ok(Some(Vec::new())),
        Some(Some(json)) => Ok(Some(serde_json::from_str(&json).map_err(other)?)),
    }
}

fn event_exists(conn: &rusqlite::Connection, id: &str) -> Result<bool, rusqlite::Error> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM event WHERE id = ?1)",
        [id],
        |row| row.get(0),
    )
}

/// Event store backed by SQLite. Responses live in their own table
/// with one row per participant.
#[derive(Clone)]
pub struct SqliteEventStore {
    db: Connection,
}

impl SqliteEventStore {
    pub fn new(db: Connection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl EventStore for SqliteEventStore {
    async fn load_event(&self, id: &EventId) -> Result<Option<Event>, StoreError> {
        let event_id = id.to_string();
        let loaded = self
            .db
            .call(move |conn| {
                let row = conn
                    .query_row(
                        r"
                        SELECT id, owner_id, name, duration_minutes, event_type,
                               dates, notifications_enabled, remindees, attendees
                        FROM event
                        WHERE id = ?1
                        ",
                        [&event_id],
                        |row| {
                            Ok(EventRow {
                                id: row.get(0)?,
                                owner_id: row.get(1)?,
                                name: row.get(2)?,
                                duration_minutes: row.get(3)?,
                                event_type: row.get(4)?,
                                dates: row.get(5)?,
                                notifications_enabled: row.get(6)?,
                                remindees: row.get(7)?,
                                attendees: row.get(8)?,
                            })
                        },
                    )
                    .optional()?;

                let Some(row) = row else {
                    return Ok(None);
                };

                let mut stmt = conn.prepare(
                    "SELECT participant_key, data FROM event_response WHERE event_id = ?1",
                )?;
                let responses = stmt
                    .query_map([&event_id], |row| Ok((row.get(0)?, row.get(1)?)))?
                    .collect::<Result<Vec<(String, String)>, _>>()?;

                Ok(Some((row, responses)))
            })
            .await?;

        match loaded {
            Some((row, responses)) => Ok(Some(row.into_event(responses)?)),
            None => Ok(None),
        }
    }

    async fn insert_event(&self, event: &Event) -> Result<EventId, StoreError> {
        let id = event.id.clone();
        let event_id = event.id.to_string();
        let owner_id = event.owner_id.as_ref().map(|o| o.to_string());
        let name = event.name.clone();
        let duration_minutes = event.duration_minutes;
        let event_type = event.event_type.as_str();
        let dates = serde_json::to_string(&event.dates)?;
        let notifications_enabled = event.notifications_enabled;
        let remindees = optional_json(&event.remindees)?;
        let attendees = optional_json(&event.attendees)?;
        let responses = event
            .responses
            .iter()
            .map(|(key, response)| Ok((key.clone(), serde_json::to_string(response)?)))
            .collect::<Result<Vec<(String, String)>, serde_json::Error>>()?;

        self.db
            .call(move |conn| {
                let tx = conn.transaction()?;
                tx.execute(
                    r"
                    INSERT INTO event (id, owner_id, name, duration_minutes, event_type,
                                       dates, notifications_enabled, remindees, attendees)
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                    ",
                    params![
                        event_id,
                        owner_id,
                        name,
                        duration_minutes,
                        event_type,
                        dates,
                        notifications_enabled,
                        remindees,
                        attendees,
                    ],
                )?;
                {
                    let mut stmt = tx.prepare(
                        "INSERT INTO event_response (event_id, participant_key, data) VALUES (?1, ?2, ?3)",
                    )?;
                    for (key, data) in &responses {
                        stmt.execute(params![event_id, key, data])?;
                    }
                }
                tx.commit()?;
                Ok(())
            })
            .await?;

        Ok(id)
    }

    async fn update_event_fields(
        &self,
        id: &EventId,
        fields: Vec<FieldUpdate>,
    ) -> Result<Option<Rebased>, StoreError> {
        let event_id = id.to_string();

        let rebased = self
            .db
            .call(move |conn| {
                let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
                if !event_exists(&tx, &event_id)? {
                    return Ok(None);
                }

                let mut rebased = Rebased::default();
                for field in fields {
                    let field = match field {
                        FieldUpdate::Remindees(Some(mut list)) => {
                            let stored: Vec<Remindee> =
                                stored_list(&tx, "remindees", &event_id)?.unwrap_or_default();
                            let r = reconcile::rebase_remindees(&stored, &mut list);
                            rebased.orphaned_tasks.extend(r.orphaned_tasks);
                            rebased.already_listed.extend(r.already_listed);
                            FieldUpdate::Remindees(Some(list))
                        }
                        FieldUpdate::Attendees(Some(mut list)) => {
                            let stored: Vec<Attendee> =
                                stored_list(&tx, "attendees", &event_id)?.unwrap_or_default();
                            let r = reconcile::rebase_attendees(&stored, &mut list);
                            rebased.already_listed.extend(r.already_listed);
                            FieldUpdate::Attendees(Some(list))
                        }
                        field => field,
                    };
                    let value = field.sql_value().map_err(other)?;
                    tx.execute(
                        &format!("UPDATE event SET {} = ?1 WHERE id = ?2", field.column()),
                        params![value, event_id],
                    )?;
                }
                tx.commit()?;
                Ok(Some(rebased))
            })
            .await?;

        Ok(rebased)
    }

    async fn put_response(
        &self,
        id: &EventId,
        key: &str,
        response: &Response,
    ) -> Result<Option<PutOutcome>, StoreError> {
        let event_id = id.to_string();
        let key = key.to_string();
        let data = serde_json::to_string(response)?;

        let outcome = self
            .db
            .call(move |conn| {
                let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
                if !event_exists(&tx, &event_id)? {
                    return Ok(None);
                }
                let existed: bool = tx.query_row(
                    "SELECT EXISTS(SELECT 1 FROM event_response WHERE event_id = ?1 AND participant_key = ?2)",
                    params![event_id, key],
                    |row| row.get(0),
                )?;
                tx.execute(
                    r"
                    INSERT INTO event_response (event_id, participant_key, data, updated_at)
                    VALUES (?1, ?2, ?3, CURRENT_TIMESTAMP)
                    ON CONFLICT(event_id, participant_key)
                    DO UPDATE SET data = excluded.data, updated_at = excluded.updated_at
                    ",
                    params![event_id, key, data],
                )?;
                tx.commit()?;

                Ok(Some(if existed {
                    PutOutcome::Replaced
                } else {
                    PutOutcome::Inserted
                }))
            })
            .await?;

        Ok(outcome)
    }

    async fn remove_response(&self, id: &EventId, key: &str) -> Result<Option<bool>, StoreError> {
        let event_id = id.to_string();
        let key = key.to_string();

        let removed = self
            .db
            .call(move |conn| {
                if !event_exists(conn, &event_id)? {
                    return Ok(None);
                }
                let changed = conn.execute(
                    "DELETE FROM event_response WHERE event_id = ?1 AND participant_key = ?2",
                    params![event_id, key],
                )?;
                Ok(Some(changed > 0))
            })
            .await?;

        Ok(removed)
    }

    async fn mark_remindee_responded(
        &self,
        id: &EventId,
        email: &str,
    ) -> Result<Option<MarkResponded>, StoreError> {
        let event_id = id.to_string();
        let email = email.to_string();

        let outcome = self
            .db
            .call(move |conn| {
                let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
                let Some(mut remindees) = stored_list::<Remindee>(&tx, "remindees", &event_id)?
                else {
                    return Ok(None);
                };
                let outcome = triggers::mark_remindee_responded(&mut remindees, &email);
                if let MarkResponded::Marked { .. } = outcome {
                    let json = serde_json::to_string(&remindees).map_err(other)?;
                    tx.execute(
                        "UPDATE event SET remindees = ?1 WHERE id = ?2",
                        params![json, event_id],
                    )?;
                    tx.commit()?;
                }
                Ok(Some(outcome))
            })
            .await?;

        Ok(outcome)
    }

    async fn decline_attendee(
        &self,
        id: &EventId,
        email: &str,
    ) -> Result<Option<Decline>, StoreError> {
        let event_id = id.to_string();
        let email = email.to_string();

        let outcome = self
            .db
            .call(move |conn| {
                let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
                let Some(mut attendees) = stored_list::<Attendee>(&tx, "attendees", &event_id)?
                else {
                    return Ok(None);
                };
                let outcome = triggers::decline_attendee(&mut attendees, &email);
                if outcome == Decline::Declined {
                    let json = serde_json::to_string(&attendees).map_err(other)?;
                    tx.execute(
                        "UPDATE event SET attendees = ?1 WHERE id = ?2",
                        params![json, event_id],
                    )?;
                    tx.commit()?;
                }
                Ok(Some(outcome))
            })
            .await?;

        Ok(outcome)
    }

    async fn delete_event(&self, id: &EventId, owner: &UserId) -> Result<bool, StoreError> {
        let event_id = id.to_string();
        let owner_id = owner.to_string();

        let deleted = self
            .db
            .call(move |conn| {
                let tx = conn.transaction()?;
                let changed = tx.execute(
                    "DELETE FROM event WHERE id = ?1 AND owner_id = ?2",
                    params![event_id, owner_id],
                )?;
                if changed > 0 {
                    tx.execute(
                        "DELETE FROM event_response WHERE event_id = ?1",
                        [&event_id],
                    )?;
                }
                tx.commit()?;
                Ok(changed > 0)
            })
            .await?;

        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::core::db::memory_db;

    fn event(id: &str) -> Event {
        Event {
            id: EventId::from(id),
            owner_id: Some(UserId::from("owner")),
            name: String::from("Board meeting"),
            duration_minutes: 60,
            event_type: EventType::SpecificDates,
            dates: vec![Utc.with_ymd_and_hms(2026, 5, 1, 15, 0, 0).unwrap()],
            notifications_enabled: Some(true),
            responses: BTreeMap::new(),
            remindees: Some(vec![
                Remindee {
                    email: String::from("a@x.com"),
                    task_ids: vec![String::from("t1")],
                    responded: false,
                },
                Remindee {
                    email: String::from("b@x.com"),
                    task_ids: vec![],
                    responded: true,
                },
            ]),
            attendees: None,
        }
    }

    fn response(key: &str, hour: u32) -> Response {
        Response {
            participant_key: key.to_string(),
            user_id: None,
            name: Some(key.to_string()),
            availability: vec![Utc.with_ymd_and_hms(2026, 5, 1, hour, 0, 0).unwrap()],
            use_calendar_availability: None,
            enabled_calendars: None,
        }
    }

    async fn store() -> SqliteEventStore {
        SqliteEventStore::new(memory_db().await.unwrap())
    }

    // Rows changed on this connection since it was opened
    async fn total_changes(store: &SqliteEventStore) -> u64 {
        store
            .db
            .call(|conn| Ok(conn.total_changes()))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn it_inserts_and_loads_events() {
        let store = store().await;
        let mut original = event("e1");
        original
            .responses
            .insert(String::from("Sam"), response("Sam", 9));
        store.insert_event(&original).await.unwrap();

        let loaded = store.load_event(&EventId::from("e1")).await.unwrap();
        assert_eq!(loaded, Some(original));
        assert_eq!(store.load_event(&EventId::from("nope")).await.unwrap(), None);
    }

    #[tokio::test]
    async fn it_rejects_unknown_event_types() {
        let store = store().await;
        store
            .db
            .call(|conn| {
                conn.execute(
                    "INSERT INTO event (id, name, duration_minutes, event_type) VALUES ('e1', 'Old', 30, 'weekly')",
                    [],
                )?;
                Ok(())
            })
            .await
            .unwrap();

        let result = store.load_event(&EventId::from("e1")).await;
        assert!(matches!(result, Err(StoreError::Malformed(_))));
    }

    #[tokio::test]
    async fn it_reports_whether_a_response_existed() {
        let store = store().await;
        let id = EventId::from("e1");
        store.insert_event(&event("e1")).await.unwrap();

        let first = store.put_response(&id, "Sam", &response("Sam", 9)).await;
        let second = store.put_response(&id, "Sam", &response("Sam", 11)).await;
        assert_eq!(first.unwrap(), Some(PutOutcome::Inserted));
        assert_eq!(second.unwrap(), Some(PutOutcome::Replaced));

        let loaded = store.load_event(&id).await.unwrap().unwrap();
        assert_eq!(loaded.responses.len(), 1);
        assert_eq!(loaded.responses["Sam"], response("Sam", 11));

        let missing = store
            .put_response(&EventId::from("nope"), "Sam", &response("Sam", 9))
            .await
            .unwrap();
        assert_eq!(missing, None);
    }

    #[tokio::test]
    async fn it_keeps_concurrent_responses_from_different_participants() {
        let store = store().await;
        let id = EventId::from("e1");
        store.insert_event(&event("e1")).await.unwrap();

        let resp_a = response("A", 9);
        let resp_b = response("B", 10);
        let (a, b) = tokio::join!(
            store.put_response(&id, "A", &resp_a),
            store.put_response(&id, "B", &resp_b),
        );
        a.unwrap();
        b.unwrap();

        let loaded = store.load_event(&id).await.unwrap().unwrap();
        assert_eq!(loaded.responses.len(), 2);
    }

    #[tokio::test]
    async fn it_updates_fields_without_touching_responses() {
        let store = store().await;
        let id = EventId::from("e1");
        store.insert_event(&event("e1")).await.unwrap();
        store
            .put_response(&id, "Sam", &response("Sam", 9))
            .await
            .unwrap();

        let updated = store
            .update_event_fields(
                &id,
                vec![
                    FieldUpdate::Name(String::from("Renamed")),
                    FieldUpdate::NotificationsEnabled(None),
                    FieldUpdate::Remindees(None),
                ],
            )
            .await
            .unwrap();
        assert_eq!(updated, Some(Rebased::default()));

        let loaded = store.load_event(&id).await.unwrap().unwrap();
        assert_eq!(loaded.name, "Renamed");
        assert_eq!(loaded.notifications_enabled, None);
        assert_eq!(loaded.remindees, None);
        assert_eq!(loaded.responses.len(), 1);

        let missing = store
            .update_event_fields(&EventId::from("nope"), vec![])
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn it_keeps_flags_set_after_the_list_was_read() {
        let store = store().await;
        let id = EventId::from("e1");
        store.insert_event(&event("e1")).await.unwrap();
        let stale = store.load_event(&id).await.unwrap().unwrap();

        store.mark_remindee_responded(&id, "a@x.com").await.unwrap();

        let mut list = stale.remindees().to_vec();
        list.push(Remindee {
            email: String::from("c@x.com"),
            task_ids: vec![String::from("t7")],
            responded: false,
        });
        let updated = store
            .update_event_fields(&id, vec![FieldUpdate::Remindees(Some(list))])
            .await
            .unwrap()
            .unwrap();
        assert!(updated.orphaned_tasks.is_empty());
        assert_eq!(updated.already_listed, vec!["a@x.com", "b@x.com"]);

        let loaded = store.load_event(&id).await.unwrap().unwrap();
        let emails: Vec<&str> = loaded.remindees().iter().map(|r| r.email.as_str()).collect();
        assert_eq!(emails, vec!["a@x.com", "b@x.com", "c@x.com"]);
        assert!(loaded.remindees()[0].responded);
        assert_eq!(loaded.remindees()[0].task_ids, vec!["t1"]);
        assert_eq!(loaded.remindees()[2].task_ids, vec!["t7"]);
    }

    #[tokio::test]
    async fn it_removes_single_responses() {
        let store = store().await;
        let id = EventId::from("e1");
        store.insert_event(&event("e1")).await.unwrap();
        store.put_response(&id, "A", &response("A", 9)).await.unwrap();
        store.put_response(&id, "B", &response("B", 9)).await.unwrap();

        assert_eq!(store.remove_response(&id, "A").await.unwrap(), Some(true));
        assert_eq!(store.remove_response(&id, "A").await.unwrap(), Some(false));
        assert_eq!(
            store
                .remove_response(&EventId::from("nope"), "A")
                .await
                .unwrap(),
            None
        );

        let loaded = store.load_event(&id).await.unwrap().unwrap();
        assert!(loaded.responses.contains_key("B"));
        assert!(!loaded.responses.contains_key("A"));
    }

    #[tokio::test]
    async fn it_marks_remindees_responded_once() {
        let store = store().await;
        let id = EventId::from("e1");
        store.insert_event(&event("e1")).await.unwrap();

        let first = store.mark_remindee_responded(&id, "a@x.com").await.unwrap();
        assert_eq!(
            first,
            Some(MarkResponded::Marked {
                cancel: vec![String::from("t1")],
                everyone_responded: true,
            })
        );
        let writes = total_changes(&store).await;
        let second = store.mark_remindee_responded(&id, "a@x.com").await.unwrap();
        assert_eq!(second, Some(MarkResponded::AlreadyResponded));
        assert_eq!(total_changes(&store).await, writes);

        let unknown = store.mark_remindee_responded(&id, "z@x.com").await.unwrap();
        assert_eq!(unknown, Some(MarkResponded::NotFound));
        assert_eq!(total_changes(&store).await, writes);

        let loaded = store.load_event(&id).await.unwrap().unwrap();
        assert!(loaded.remindees().iter().all(|r| r.responded));
    }

    #[tokio::test]
    async fn it_declines_attendees() {
        let store = store().await;
        let id = EventId::from("g1");
        let mut group = event("g1");
        group.event_type = EventType::Group;
        group.remindees = None;
        group.attendees = Some(vec![Attendee::new("a@x.com")]);
        store.insert_event(&group).await.unwrap();

        assert_eq!(
            store.decline_attendee(&id, "a@x.com").await.unwrap(),
            Some(Decline::Declined)
        );
        let writes = total_changes(&store).await;
        assert_eq!(
            store.decline_attendee(&id, "a@x.com").await.unwrap(),
            Some(Decline::AlreadyDeclined)
        );
        assert_eq!(total_changes(&store).await, writes);
        let loaded = store.load_event(&id).await.unwrap().unwrap();
        assert!(loaded.attendees()[0].declined);
    }

    #[tokio::test]
    async fn it_only_deletes_for_the_owner() {
        let store = store().await;
        let id = EventId::from("e1");
        store.insert_event(&event("e1")).await.unwrap();
        store.put_response(&id, "A", &response("A", 9)).await.unwrap();

        assert!(!store.delete_event(&id, &UserId::from("intruder")).await.unwrap());
        assert!(store.load_event(&id).await.unwrap().is_some());

        assert!(store.delete_event(&id, &UserId::from("owner")).await.unwrap());
        assert!(store.load_event(&id).await.unwrap().is_none());
    }
}
