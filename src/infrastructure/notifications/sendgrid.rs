use anyhow::{Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tracing::{debug, info};
use url::Url;

use crate::application::interfaces::notifier::{SuggestionNotification, SuggestionNotifier};

const SENDGRID_SEND_URL: &str = "https://api.sendgrid.com/v3/mail/send";

pub struct SendGridNotifier {
    endpoint: Url,
    api_key: String,
    from_email: String,
    client: Client,
}

impl SendGridNotifier {
    pub fn new(api_key: String, from_email: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(5))
            .build()?;

        Ok(Self {
            endpoint: Url::parse(SENDGRID_SEND_URL)?,
            api_key,
            from_email,
            client,
        })
    }

    fn format_body(notification: &SuggestionNotification) -> String {
        let mut lines = vec![
            format!(
                "A new suggestion was posted on the {} board.",
                notification.organization_name
            ),
            String::new(),
            format!("Title: {}", notification.suggestion_title),
        ];

        let description = notification.suggestion_description.trim();
        if !description.is_empty() {
            lines.push(String::new());
            lines.push(description.to_string());
        }

        lines.push(String::new());
        lines.push(format!("Review it at {}", notification.board_url));
        lines.join("\n")
    }

    fn build_payload(&self, recipients: &[String], notification: &SuggestionNotification) -> serde_json::Value {
        let personalizations: Vec<_> = recipients
            .iter()
            .map(|email| json!({ "to": [{ "email": email }] }))
            .collect();

        json!({
            "personalizations": personalizations,
            "from": { "email": self.from_email },
            "subject": format!("New suggestion: {}", notification.suggestion_title),
            "content": [{ "type": "text/plain", "value": Self::format_body(notification) }],
        })
    }
}

#[async_trait]
impl SuggestionNotifier for SendGridNotifier {
    async fn notify_new_suggestion(
        &self,
        recipients: Vec<String>,
        notification: SuggestionNotification,
    ) -> Result<()> {
        if recipients.is_empty() {
            return Ok(());
        }

        let payload = self.build_payload(&recipients, &notification);
        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("sendgrid send failed: status={status} body={body}"));
        }

        info!(recipients = recipients.len(), "notifications: suggestion email sent");
        Ok(())
    }
}

/// Used when no mail provider is configured.
#[derive(Debug, Default)]
pub struct LoggingNotifier;

#[async_trait]
impl SuggestionNotifier for LoggingNotifier {
    async fn notify_new_suggestion(
        &self,
        recipients: Vec<String>,
        notification: SuggestionNotification,
    ) -> Result<()> {
        debug!(
            recipients = recipients.len(),
            title = %notification.suggestion_title,
            board_url = %notification.board_url,
            "notifications: mailer disabled, suggestion email skipped"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notification(description: &str) -> SuggestionNotification {
        SuggestionNotification {
            organization_name: "Acme".to_string(),
            suggestion_title: "Dark mode".to_string(),
            suggestion_description: description.to_string(),
            board_url: "https://roadmap.example/b/acme".to_string(),
        }
    }

    #[test]
    fn payload_is_plain_text_with_one_personalization_per_admin() {
        let notifier =
            SendGridNotifier::new("SG.key".to_string(), "noreply@roadmap.example".to_string())
                .unwrap();
        let recipients = vec!["a@acme.test".to_string(), "b@acme.test".to_string()];

        let payload = notifier.build_payload(&recipients, &notification("Easier on the eyes"));

        assert_eq!(payload["personalizations"].as_array().unwrap().len(), 2);
        assert_eq!(payload["personalizations"][1]["to"][0]["email"], "b@acme.test");
        assert_eq!(payload["from"]["email"], "noreply@roadmap.example");
        assert_eq!(payload["subject"], "New suggestion: Dark mode");
        assert_eq!(payload["content"][0]["type"], "text/plain");
        let body = payload["content"][0]["value"].as_str().unwrap();
        assert!(body.contains("Easier on the eyes"));
        assert!(body.ends_with("Review it at https://roadmap.example/b/acme"));
    }

    #[test]
    fn empty_description_is_left_out() {
        let body = SendGridNotifier::format_body(&notification("   "));

        assert_eq!(
            body,
            "A new suggestion was posted on the Acme board.\n\nTitle: Dark mode\n\nReview it at https://roadmap.example/b/acme"
        );
    }

    #[tokio::test]
    async fn logging_notifier_always_succeeds() {
        LoggingNotifier
            .notify_new_suggestion(vec!["a@acme.test".to_string()], notification(""))
            .await
            .unwrap();
    }
}
