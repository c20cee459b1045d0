pub mod sendgrid;

use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

use crate::{
    application::interfaces::notifier::{SuggestionNotification, SuggestionNotifier},
    config::config_model::Mailer as MailerConfig,
};
use sendgrid::{LoggingNotifier, SendGridNotifier};

/// Notifier picked at startup from the mailer settings.
pub enum Mailer {
    SendGrid(SendGridNotifier),
    Disabled(LoggingNotifier),
}

impl Mailer {
    pub fn from_config(config: &MailerConfig) -> Result<Self> {
        match config.sendgrid_api_key.as_ref() {
            Some(api_key) => {
                info!("notifications: sendgrid mailer enabled");
                Ok(Mailer::SendGrid(SendGridNotifier::new(
                    api_key.clone(),
                    config.from_email.clone(),
                )?))
            }
            None => {
                info!("notifications: no SENDGRID_API_KEY, suggestion emails disabled");
                Ok(Mailer::Disabled(LoggingNotifier))
            }
        }
    }
}

#[async_trait]
impl SuggestionNotifier for Mailer {
    async fn notify_new_suggestion(
        &self,
        recipients: Vec<String>,
        notification: SuggestionNotification,
    ) -> Result<()> {
        match self {
            Mailer::SendGrid(notifier) => {
                notifier
                    .notify_new_suggestion(recipients, notification)
                    .await
            }
            Mailer::Disabled(notifier) => {
                notifier
                    .notify_new_suggestion(recipients, notification)
                    .await
            }
        }
    }
}
