//! Notification intents and their delivery.
//!
//! Request handlers never send mail themselves. They push a
//! `Notification` onto the `Outbox` once the state change that
//! triggered it has been written, and return. A background worker
//! drains the outbox and delivers each notification on its own task,
//! so a slow or failing provider never holds up a request. Failures
//! are logged and dropped.

pub mod chat;
pub mod mailer;
pub mod templates;

pub use chat::{ChatWebhook, SlackWebhook};
pub use mailer::{ListmonkMailer, LogMailer, Mailer};

use std::sync::Arc;

use anyhow::{Error, Result};
use handlebars::Handlebars;
use serde_json::json;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::core::AppConfig;
use crate::events::{EventId, EventType, Respondent, UserId};
use crate::users::UserDirectory;
use templates::Template;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    FirstResponse {
        event_id: EventId,
        event_name: String,
        owner_id: UserId,
        respondent: Respondent,
    },
    EveryoneResponded {
        event_id: EventId,
        event_name: String,
        owner_id: UserId,
    },
    GroupInvite {
        email: String,
        owner_name: String,
        group_name: String,
        event_id: EventId,
    },
    EventCreated {
        event_id: EventId,
        event_type: EventType,
        num_dates: usize,
        creator: Option<UserId>,
    },
}

/// Sending half of the notification queue.
#[derive(Debug, Clone)]
pub struct Outbox {
    tx: mpsc::UnboundedSender<Notification>,
}

impl Outbox {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn send(&self, notification: Notification) {
        if let Err(e) = self.tx.send(notification) {
            tracing::error!("Outbox closed, dropping notification: {:?}", e.0);
        }
    }
}

pub fn mailer_from_config(config: &AppConfig) -> Arc<dyn Mailer> {
    match &config.mail_api_url {
        Some(url) => Arc::new(ListmonkMailer::new(
            url,
            &config.mail_api_user,
            &config.mail_api_token,
            config.plain_email_template_id,
        )),
        None => {
            tracing::warn!("HUDDLE_MAIL_API_URL not set, emails will only be logged");
            Arc::new(LogMailer)
        }
    }
}

pub fn chat_from_config(config: &AppConfig) -> Option<Arc<dyn ChatWebhook>> {
    config
        .chat_webhook_url
        .as_ref()
        .map(|url| Arc::new(SlackWebhook::new(url)) as Arc<dyn ChatWebhook>)
}

/// Turns notification intents into emails and chat messages.
pub struct Notifier {
    config: AppConfig,
    users: Arc<dyn UserDirectory>,
    mailer: Arc<dyn Mailer>,
    chat: Option<Arc<dyn ChatWebhook>>,
    templates: Handlebars<'static>,
}

impl Notifier {
    pub fn new(
        config: AppConfig,
        users: Arc<dyn UserDirectory>,
        mailer: Arc<dyn Mailer>,
        chat: Option<Arc<dyn ChatWebhook>>,
    ) -> Self {
        Self {
            config,
            users,
            mailer,
            chat,
            templates: templates::templates(),
        }
    }

    pub async fn deliver(&self, notification: Notification) -> Result<(), Error> {
        match notification {
            Notification::FirstResponse {
                event_id,
                event_name,
                owner_id,
                respondent,
            } => {
                let Some(owner) = self.users.lookup_user(&owner_id).await? else {
                    tracing::warn!("Owner {} of event {} not found", owner_id, event_id);
                    return Ok(());
                };
                let respondent_name = match respondent {
                    Respondent::Guest { name } => name,
                    Respondent::User { id } => match self.users.lookup_user(&id).await? {
                        Some(user) => user.full_name(),
                        None => id.to_string(),
                    },
                };
                let vars = json!({
                    "ownerFirstName": owner.first_name,
                    "respondentName": respondent_name,
                    "eventName": event_name,
                    "eventUrl": self.config.event_url(event_id.as_str(), false),
                });
                let subject = self
                    .templates
                    .render(&Template::FirstResponseSubject.to_string(), &vars)?;
                let body = self
                    .templates
                    .render(&Template::FirstResponseBody.to_string(), &vars)?;
                self.mailer
                    .send_plain_email(&owner.email, &subject, &body, "text/html")
                    .await
            }
            Notification::EveryoneResponded {
                event_id,
                event_name,
                owner_id,
            } => {
                let Some(owner) = self.users.lookup_user(&owner_id).await? else {
                    tracing::warn!("Owner {} of event {} not found", owner_id, event_id);
                    return Ok(());
                };
                self.mailer
                    .send_templated_email(
                        &owner.email,
                        self.config.everyone_responded_template_id,
                        json!({
                            "eventName": event_name,
                            "eventUrl": self.config.event_url(event_id.as_str(), false),
                        }),
                    )
                    .await
            }
            Notification::GroupInvite {
                email,
                owner_name,
                group_name,
                event_id,
            } => {
                self.mailer
                    .send_templated_email(
                        &email,
                        self.config.group_invite_template_id,
                        json!({
                            "ownerName": owner_name,
                            "groupName": group_name,
                            "groupUrl": self.config.event_url(event_id.as_str(), true),
                        }),
                    )
                    .await
            }
            Notification::EventCreated {
                event_id,
                event_type,
                num_dates,
                creator,
            } => {
                let Some(chat) = &self.chat else {
                    return Ok(());
                };
                let creator = match creator {
                    Some(id) => match self.users.lookup_user(&id).await? {
                        Some(user) => format!("{} ({})", user.full_name(), user.email),
                        None => id.to_string(),
                    },
                    None => String::from("Guest"),
                };
                let text = self.templates.render(
                    &Template::EventCreated.to_string(),
                    &json!({
                        "eventUrl": self.config.event_url(
                            event_id.as_str(),
                            event_type == EventType::Group,
                        ),
                        "creator": creator,
                        "numDates": num_dates,
                        "eventType": event_type.as_str(),
                    }),
                )?;
                chat.post_message(&text).await
            }
        }
    }
}

/// Drain the outbox until every `Outbox` handle is dropped. Each
/// notification is delivered on a detached task.
pub fn spawn_notification_worker(
    notifier: Arc<Notifier>,
    mut rx: mpsc::UnboundedReceiver<Notification>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(notification) = rx.recv().await {
            let notifier = Arc::clone(&notifier);
            tokio::spawn(async move {
                let label = format!("{:?}", notification);
                if let Err(e) = notifier.deliver(notification).await {
                    tracing::error!("Failed to deliver notification {}: {}", label, e);
                }
            });
        }
        tracing::debug!("Outbox closed, notification worker exiting");
    })
}
