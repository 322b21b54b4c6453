//! Reminder emails for poll remindees.
//!
//! Scheduling a reminder creates one task per configured offset from
//! now. The handles returned are stored on the remindee so the tasks
//! can be cancelled once they respond or are removed from the poll.
//! The `SendDueReminders` job drains tasks as they come due.

use async_trait::async_trait;
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde::Serialize;
use tokio_rusqlite::{Connection, params};
use uuid::Uuid;

use crate::events::{EventId, StoreError, TaskHandle};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderTask {
    pub id: TaskHandle,
    pub event_id: EventId,
    pub email: String,
    pub owner_name: String,
    pub event_name: String,
    pub due_at: DateTime<Utc>,
}

#[async_trait]
pub trait ReminderScheduler: Send + Sync {
    async fn schedule_reminder(
        &self,
        email: &str,
        owner_name: &str,
        event_name: &str,
        event_id: &EventId,
    ) -> Result<Vec<TaskHandle>, StoreError>;

    /// Cancelling a task that already ran or never existed is not an
    /// error.
    async fn cancel_reminder(&self, handle: &TaskHandle) -> Result<(), StoreError>;

    /// Remove and return every task due at or before `now`.
    async fn take_due(&self, now: DateTime<Utc>) -> Result<Vec<ReminderTask>, StoreError>;
}

// Fixed width so that due dates compare correctly as text
fn format_due(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[derive(Clone)]
pub struct SqliteReminderScheduler {
    db: Connection,
    offsets_hours: Vec<i64>,
}

impl SqliteReminderScheduler {
    pub fn new(db: Connection, offsets_hours: Vec<i64>) -> Self {
        Self { db, offsets_hours }
    }
}

#[async_trait]
impl ReminderScheduler for SqliteReminderScheduler {
    async fn schedule_reminder(
        &self,
        email: &str,
        owner_name: &str,
        event_name: &str,
        event_id: &EventId,
    ) -> Result<Vec<TaskHandle>, StoreError> {
        let now = Utc::now();
        let tasks: Vec<(TaskHandle, String)> = self
            .offsets_hours
            .iter()
            .map(|hours| {
                (
                    Uuid::new_v4().to_string(),
                    format_due(now + Duration::hours(*hours)),
                )
            })
            .collect();
        let handles = tasks.iter().map(|(id, _)| id.clone()).collect();

        let email = email.to_string();
        let owner_name = owner_name.to_string();
        let event_name = event_name.to_string();
        let event_id = event_id.to_string();
        self.db
            .call(move |conn| {
                let tx = conn.transaction()?;
                {
                    let mut stmt = tx.prepare(
                        r"
                        INSERT INTO reminder_task (id, event_id, email, owner_name, event_name, due_at)
                        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                        ",
                    )?;
                    for (id, due_at) in &tasks {
                        stmt.execute(params![id, event_id, email, owner_name, event_name, due_at])?;
                    }
                }
                tx.commit()?;
                Ok(())
            })
            .await?;

        tracing::debug!("Scheduled {} reminder task(s)", self.offsets_hours.len());
        Ok(handles)
    }

    async fn cancel_reminder(&self, handle: &TaskHandle) -> Result<(), StoreError> {
        let id = handle.clone();
        self.db
            .call(move |conn| {
                conn.execute("DELETE FROM reminder_task WHERE id = ?1", [&id])?;
                Ok(())
            })
            .await?;
        Ok(())
    }

    async fn take_due(&self, now: DateTime<Utc>) -> Result<Vec<ReminderTask>, StoreError> {
        let cutoff = format_due(now);
        let rows = self
            .db
            .call(move |conn| {
                let tx = conn.transaction()?;
                let rows = {
                    let mut stmt = tx.prepare(
                        r"
                        SELECT id, event_id, email, owner_name, event_name, due_at
                        FROM reminder_task
                        WHERE due_at <= ?1
                        ORDER BY due_at
                        ",
                    )?;
                    stmt.query_map([&cutoff], |row| {
                        Ok((
                            row.get::<_, String>(0)?,
                            row.get::<_, String>(1)?,
                            row.get::<_, String>(2)?,
                            row.get::<_, String>(3)?,
                            row.get::<_, String>(4)?,
                            row.get::<_, String>(5)?,
                        ))
                    })?
                    .collect::<Result<Vec<_>, _>>()?
                };
                tx.execute("DELETE FROM reminder_task WHERE due_at <= ?1", [&cutoff])?;
                tx.commit()?;
                Ok(rows)
            })
            .await?;

        let mut tasks = Vec::with_capacity(rows.len());
        for (id, event_id, email, owner_name, event_name, due_at) in rows {
            let due_at = match DateTime::parse_from_rfc3339(&due_at) {
                Ok(at) => at.with_timezone(&Utc),
                Err(e) => {
                    tracing::error!("Skipping reminder task {} with bad due date: {}", id, e);
                    continue;
                }
            };
            tasks.push(ReminderTask {
                id,
                event_id: EventId::from(event_id),
                email,
                owner_name,
                event_name,
                due_at,
            });
        }
        Ok(tasks)
    }
}
