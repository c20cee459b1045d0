use anyhow::Result;
use async_trait::async_trait;

#[derive(Debug, Clone, PartialEq)]
pub struct SuggestionNotification {
    pub organization_name: String,
    pub suggestion_title: String,
    pub suggestion_description: String,
    pub board_url: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SuggestionNotifier: Send + Sync {
    async fn notify_new_suggestion(
        &self,
        recipients: Vec<String>,
        notification: SuggestionNotification,
    ) -> Result<()>;
}
