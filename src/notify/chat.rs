use anyhow::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;

#[async_trait]
pub trait ChatWebhook: Send + Sync {
    async fn post_message(&self, text: &str) -> Result<(), Error>;
}

/// Posts to a Slack compatible incoming webhook.
#[derive(Clone)]
pub struct SlackWebhook {
    client: Client,
    url: String,
}

impl SlackWebhook {
    pub fn new(url: &str) -> Self {
        Self {
            client: Client::new(),
            url: url.to_string(),
        }
    }
}

#[async_trait]
impl ChatWebhook for SlackWebhook {
    async fn post_message(&self, text: &str) -> Result<(), Error> {
        let res = self
            .client
            .post(&self.url)
            .json(&serde_json::json!({ "text": text }))
            .send()
            .await?;
        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            anyhow::bail!("Chat webhook failed: {} ({})", status, body);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    #[tokio::test]
    async fn it_posts_the_message_text() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/hook")
            .match_body(Matcher::Json(serde_json::json!({"text": "hello"})))
            .with_status(200)
            .with_body("ok")
            .create_async()
            .await;

        let webhook = SlackWebhook::new(&format!("{}/hook", server.url()));
        webhook.post_message("hello").await.unwrap();
        mock.assert_async().await;
    }
}
