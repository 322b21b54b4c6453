use std::env;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub storage_path: String,
    pub db_path: String,
    // Public URL of the web app, used to build links in emails
    pub base_url: String,
    // When unset, emails are logged instead of sent
    pub mail_api_url: Option<String>,
    pub mail_api_user: String,
    pub mail_api_token: String,
    pub plain_email_template_id: u32,
    pub everyone_responded_template_id: u32,
    pub group_invite_template_id: u32,
    pub reminder_template_id: u32,
    pub reminder_offsets_hours: Vec<i64>,
    pub chat_webhook_url: Option<String>,
    pub write_attempts: usize,
}

fn env_u32(key: &str, default: u32) -> u32 {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Parse a comma separated list of hour offsets such as "0,24,72".
/// Entries that aren't integers are skipped.
pub fn parse_offsets(raw: &str) -> Vec<i64> {
    raw.split(',')
        .filter_map(|s| s.trim().parse::<i64>().ok())
        .collect()
}

impl Default for AppConfig {
    fn default() -> Self {
        let storage_path = env::var("HUDDLE_STORAGE_PATH").unwrap_or("./".to_string());
        let db_path = format!("{}/db", storage_path);
        let base_url =
            env::var("HUDDLE_BASE_URL").unwrap_or_else(|_| "http://localhost:8080".to_string());
        let mail_api_url = env::var("HUDDLE_MAIL_API_URL").ok();
        let mail_api_user = env::var("HUDDLE_MAIL_API_USER").unwrap_or_default();
        let mail_api_token = env::var("HUDDLE_MAIL_API_TOKEN").unwrap_or_default();
        let reminder_offsets_hours = env::var("HUDDLE_REMINDER_OFFSETS_HOURS")
            .map(|v| parse_offsets(&v))
            .unwrap_or_else(|_| vec![0, 24, 72]);
        let chat_webhook_url = env::var("HUDDLE_CHAT_WEBHOOK_URL").ok();
        let write_attempts = env_u32("HUDDLE_WRITE_ATTEMPTS", 3).max(1) as usize;

        Self {
            storage_path,
            db_path,
            base_url,
            mail_api_url,
            mail_api_user,
            mail_api_token,
            plain_email_template_id: env_u32("HUDDLE_PLAIN_EMAIL_TEMPLATE_ID", 1),
            everyone_responded_template_id: env_u32("HUDDLE_EVERYONE_RESPONDED_TEMPLATE_ID", 8),
            group_invite_template_id: env_u32("HUDDLE_GROUP_INVITE_TEMPLATE_ID", 9),
            reminder_template_id: env_u32("HUDDLE_REMINDER_TEMPLATE_ID", 10),
            reminder_offsets_hours,
            chat_webhook_url,
            write_attempts,
        }
    }
}

impl AppConfig {
    /// Link to an event page in the web app. Group events live under
    /// a different path than polls.
    pub fn event_url(&self, event_id: &str, group: bool) -> String {
        let prefix = if group { "g" } else { "e" };
        format!("{}/{}/{}", self.base_url.trim_end_matches('/'), prefix, event_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_parses_reminder_offsets() {
        assert_eq!(parse_offsets("0,24,72"), vec![0, 24, 72]);
        assert_eq!(parse_offsets(" 1 , x, 5"), vec![1, 5]);
        assert!(parse_offsets("").is_empty());
    }

    #[test]
    fn it_builds_event_urls() {
        let config = AppConfig {
            base_url: String::from("https://example.com/"),
            ..AppConfig::default()
        };
        assert_eq!(config.event_url("abc", false), "https://example.com/e/abc");
        assert_eq!(config.event_url("abc", true), "https://example.com/g/abc");
    }
}
