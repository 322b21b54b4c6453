use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::core::AppConfig;
use crate::core::db::async_db;
use crate::jobs::{PeriodicJob, SendDueReminders};
use crate::notify::mailer_from_config;

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
pub enum JobId {
    SendDueReminders,
}

pub async fn run(id: JobId, config: AppConfig) -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{}=debug", env!("CARGO_CRATE_NAME")).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let db = async_db(&config.db_path).await?;

    let job: Box<dyn PeriodicJob> = match id {
        JobId::SendDueReminders => Box::new(SendDueReminders::new(mailer_from_config(&config))),
    };

    println!("Running job: {:?}", id);
    job.run_job(&config, &db).await;
    println!("Job completed");

    Ok(())
}
