use anyhow::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

#[async_trait]
pub trait Mailer: Send + Sync {
    /// Send an email rendered by the mail provider from a stored
    /// template.
    async fn send_templated_email(&self, to: &str, template_id: u32, variables: Value)
    -> Result<(), Error>;

    async fn send_plain_email(
        &self,
        to: &str,
        subject: &str,
        body: &str,
        content_type: &str,
    ) -> Result<(), Error>;
}

#[derive(Serialize)]
struct TransactionalMessage<'a> {
    subscriber_email: &'a str,
    template_id: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    subject: Option<&'a str>,
    data: Value,
    content_type: &'a str,
}

/// Sends mail through listmonk's transactional API.
#[derive(Clone)]
pub struct ListmonkMailer {
    client: Client,
    base_url: String,
    user: String,
    token: String,
    plain_template_id: u32,
}

impl ListmonkMailer {
    pub fn new(base_url: &str, user: &str, token: &str, plain_template_id: u32) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            user: user.to_string(),
            token: token.to_string(),
            plain_template_id,
        }
    }

    async fn post(&self, message: &TransactionalMessage<'_>) -> Result<(), Error> {
        let url = format!("{}/api/tx", self.base_url);
        let res = self
            .client
            .post(&url)
            .basic_auth(&self.user, Some(&self.token))
            .json(message)
            .send()
            .await?;
        let status = res.status();
        if !status.is_success() {
            let text = res.text().await.unwrap_or_default();
            anyhow::bail!("Sending email failed: {} ({})", status, text);
        }
        Ok(())
    }
}

// listmonk only distinguishes html, markdown, and plain bodies
fn listmonk_content_type(content_type: &str) -> &'static str {
    match content_type {
        "text/html" | "html" => "html",
        "text/markdown" | "markdown" => "markdown",
        _ => "plain",
    }
}

#[async_trait]
impl Mailer for ListmonkMailer {
    async fn send_templated_email(
        &self,
        to: &str,
        template_id: u32,
        variables: Value,
    ) -> Result<(), Error> {
        self.post(&TransactionalMessage {
            subscriber_email: to,
            template_id,
            subject: None,
            data: variables,
            content_type: "html",
        })
        .await
    }

    async fn send_plain_email(
        &self,
        to: &str,
        subject: &str,
        body: &str,
        content_type: &str,
    ) -> Result<(), Error> {
        self.post(&TransactionalMessage {
            subscriber_email: to,
            template_id: self.plain_template_id,
            subject: Some(subject),
            data: serde_json::json!({ "subject": subject, "body": body }),
            content_type: listmonk_content_type(content_type),
        })
        .await
    }
}

/// Logs emails instead of sending them. Used when no mail API is
/// configured.
#[derive(Debug, Default, Clone)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send_templated_email(
        &self,
        to: &str,
        template_id: u32,
        variables: Value,
    ) -> Result<(), Error> {
        tracing::info!(
            "Email to {} with template {}: {}",
            to,
            template_id,
            variables
        );
        Ok(())
    }

    async fn send_plain_email(
        &self,
        to: &str,
        subject: &str,
        body: &str,
        content_type: &str,
    ) -> Result<(), Error> {
        tracing::info!("Email to {} ({}): {}\n{}", to, content_type, subject, body);
        Ok(())
    }
}
