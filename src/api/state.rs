use std::sync::Arc;

use tokio_rusqlite::Connection;

use crate::core::AppConfig;
use crate::events::{EventService, SqliteEventStore};
use crate::notify::Outbox;
use crate::reminders::SqliteReminderScheduler;
use crate::users::{SqliteUserDirectory, UserDirectory};

pub struct AppState {
    pub users: Arc<dyn UserDirectory>,
    pub events: Arc<EventService>,
}

impl AppState {
    /// Wire the SQLite backed collaborators into the event service.
    /// Notifications go to `outbox`; whoever holds the receiving end
    /// is responsible for delivering them.
    pub fn new(db: Connection, config: &AppConfig, outbox: Outbox) -> Self {
        let users: Arc<dyn UserDirectory> = Arc::new(SqliteUserDirectory::new(db.clone()));
        let reminders = Arc::new(SqliteReminderScheduler::new(
            db.clone(),
            config.reminder_offsets_hours.clone(),
        ));
        let events = Arc::new(EventService::new(
            Arc::new(SqliteEventStore::new(db)),
            Arc::clone(&users),
            reminders,
            outbox,
            config.write_attempts,
        ));

        Self { users, events }
    }
}
