use std::sync::{Arc, RwLock};

use anyhow::Result;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use super::routes;
use crate::api::state::AppState;
use crate::core::{AppConfig, db::async_db};
use crate::jobs::{SendDueReminders, spawn_periodic_job};
use crate::notify::{
    Notifier, Outbox, chat_from_config, mailer_from_config, spawn_notification_worker,
};
use crate::users::UserDirectory;

pub fn app(shared_state: Arc<RwLock<AppState>>) -> Router {
    let cors = CorsLayer::permissive();

    Router::new()
        // API routes
        .nest("/api", routes::router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(Arc::clone(&shared_state))
}

// Run the server
pub async fn serve(host: String, port: String, config: AppConfig) -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                // axum logs rejections from built-in extractors with the `axum::rejection`
                // target, at `TRACE` level. `axum::rejection=trace` enables showing those events
                format! {
                    "{}=debug,tower_http=debug,axum::rejection=trace",
                    env!("CARGO_CRATE_NAME")
                }
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    std::fs::create_dir_all(&config.db_path)?;
    let db = async_db(&config.db_path).await?;

    let (outbox, rx) = Outbox::channel();
    let app_state = AppState::new(db.clone(), &config, outbox);
    let users: Arc<dyn UserDirectory> = Arc::clone(&app_state.users);
    let mailer = mailer_from_config(&config);

    // Deliver notifications in the background. The worker runs until
    // the last outbox handle (held by the app state) is dropped.
    let notifier = Notifier::new(
        config.clone(),
        users,
        Arc::clone(&mailer),
        chat_from_config(&config),
    );
    spawn_notification_worker(Arc::new(notifier), rx);

    let shared_state = Arc::new(RwLock::new(app_state));
    let app = app(Arc::clone(&shared_state));

    let listener = tokio::net::TcpListener::bind(format!("{}:{}", host, port)).await?;
    tracing::debug!("Server started. Listening on {}", listener.local_addr()?);

    // Run background jobs. Each job is spawned in its own tokio task
    // in a loop.
    spawn_periodic_job(config, db, SendDueReminders::new(mailer));

    axum::serve(listener, app).await?;
    Ok(())
}
