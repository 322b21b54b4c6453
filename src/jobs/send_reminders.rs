use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use tokio_rusqlite::Connection;

use super::PeriodicJob;
use crate::core::AppConfig;
use crate::notify::Mailer;
use crate::reminders::{ReminderScheduler, SqliteReminderScheduler};

/// Email every remindee whose reminder task has come due.
pub struct SendDueReminders {
    mailer: Arc<dyn Mailer>,
}

impl SendDueReminders {
    pub fn new(mailer: Arc<dyn Mailer>) -> Self {
        Self { mailer }
    }
}

#[async_trait]
impl PeriodicJob for SendDueReminders {
    fn interval(&self) -> Duration {
        Duration::from_secs(60)
    }

    async fn run_job(&self, config: &AppConfig, db: &Connection) {
        let scheduler =
            SqliteReminderScheduler::new(db.clone(), config.reminder_offsets_hours.clone());
        let due = match scheduler.take_due(Utc::now()).await {
            Ok(due) => due,
            Err(e) => {
                tracing::error!("Failed to fetch due reminders: {}", e);
                return;
            }
        };
        if due.is_empty() {
            return;
        }

        tracing::info!("Sending {} reminder(s)", due.len());
        for task in due {
            let vars = json!({
                "ownerName": task.owner_name,
                "eventName": task.event_name,
                "eventUrl": config.event_url(task.event_id.as_str(), false),
                "email": task.email,
            });
            if let Err(e) = self
                .mailer
                .send_templated_email(&task.email, config.reminder_template_id, vars)
                .await
            {
                tracing::error!("Failed to send reminder {}: {}", task.id, e);
            }
        }
    }
}
