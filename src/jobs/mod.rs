use std::time::Duration;

use async_trait::async_trait;
use tokio_rusqlite::Connection;

use crate::core::AppConfig;

mod send_reminders;

pub use send_reminders::SendDueReminders;

#[async_trait]
pub trait PeriodicJob: Send + Sync + 'static {
    fn interval(&self) -> Duration;

    async fn run_job(&self, config: &AppConfig, db: &Connection);
}

/// Run `job` forever on its own task, once per interval. The first
/// run happens immediately.
pub fn spawn_periodic_job<J: PeriodicJob>(config: AppConfig, db: Connection, job: J) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(job.interval());
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            job.run_job(&config, &db).await;
        }
    });
}
