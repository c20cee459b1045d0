use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::{
    application::interfaces::notifier::{SuggestionNotification, SuggestionNotifier},
    domain::{
        entities::{organizations::OrganizationEntity, suggestions::InsertSuggestionEntity},
        repositories::{
            organizations::OrganizationRepository, suggestions::SuggestionRepository,
            users::UserRepository,
        },
        value_objects::votes::{PublicBoardDto, SubmitSuggestionRequest, SubmittedSuggestionDto},
    },
};

pub const MAX_TITLE_LEN: usize = 200;
pub const PENDING_STATUS: &str = "pending";

#[derive(Debug, Error)]
pub enum BoardError {
    #[error("board not found")]
    BoardNotFound,
    #[error("{0}")]
    InvalidInput(&'static str),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl BoardError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            BoardError::BoardNotFound => StatusCode::NOT_FOUND,
            BoardError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            BoardError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type BoardResult<T> = std::result::Result<T, BoardError>;

pub struct PublicBoardUseCase<O, S, U, N>
where
    O: OrganizationRepository + Send + Sync + 'static,
    S: SuggestionRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
    N: SuggestionNotifier + 'static,
{
    organization_repo: Arc<O>,
    suggestion_repo: Arc<S>,
    user_repo: Arc<U>,
    notifier: Arc<N>,
    app_base_url: String,
}

impl<O, S, U, N> PublicBoardUseCase<O, S, U, N>
where
    O: OrganizationRepository + Send + Sync + 'static,
    S: SuggestionRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
    N: SuggestionNotifier + 'static,
{
    pub fn new(
        organization_repo: Arc<O>,
        suggestion_repo: Arc<S>,
        user_repo: Arc<U>,
        notifier: Arc<N>,
        app_base_url: String,
    ) -> Self {
        Self {
            organization_repo,
            suggestion_repo,
            user_repo,
            notifier,
            app_base_url,
        }
    }

    /// Active organization behind a public board slug.
    pub async fn resolve_board(&self, slug: &str) -> BoardResult<OrganizationEntity> {
        let organization = self
            .organization_repo
            .find_by_slug(slug)
            .await
            .map_err(|err| {
                error!(slug, db_error = ?err, "public_board: failed to resolve board");
                BoardError::Internal(err)
            })?;

        match organization {
            Some(organization) if organization.is_active => Ok(organization),
            _ => {
                debug!(slug, "public_board: no active board for slug");
                Err(BoardError::BoardNotFound)
            }
        }
    }

    pub async fn get_board(&self, slug: &str) -> BoardResult<PublicBoardDto> {
        let organization = self.resolve_board(slug).await?;

        let suggestions = self
            .suggestion_repo
            .list_public_with_votes(organization.id)
            .await
            .map_err(|err| {
                error!(
                    organization_id = %organization.id,
                    db_error = ?err,
                    "public_board: failed to list suggestions"
                );
                BoardError::Internal(err)
            })?;

        Ok(PublicBoardDto {
            organization_name: organization.name,
            slug: organization.slug,
            suggestions,
        })
    }

    /// Stores the suggestion as pending and emails the organization's admins
    /// in the background. Notification failures never reach the caller.
    pub async fn submit_suggestion(
        &self,
        slug: &str,
        request: SubmitSuggestionRequest,
    ) -> BoardResult<SubmittedSuggestionDto> {
        let title = request.title.trim().to_string();
        if title.is_empty() || title.chars().count() > MAX_TITLE_LEN {
            return Err(BoardError::InvalidInput(
                "title must be between 1 and 200 characters",
            ));
        }
        let author_email = request
            .author_email
            .map(|email| email.trim().to_string())
            .filter(|email| !email.is_empty());
        if author_email.as_deref().is_some_and(|email| !email.contains('@')) {
            return Err(BoardError::InvalidInput("author email is invalid"));
        }

        let organization = self.resolve_board(slug).await?;

        let suggestion = self
            .suggestion_repo
            .create_suggestion(InsertSuggestionEntity {
                organization_id: organization.id,
                category_id: request.category_id,
                title,
                description: request.description.trim().to_string(),
                status: PENDING_STATUS.to_string(),
                is_public: true,
                author_email,
            })
            .await
            .map_err(|err| {
                error!(
                    organization_id = %organization.id,
                    db_error = ?err,
                    "public_board: failed to create suggestion"
                );
                BoardError::Internal(err)
            })?;

        info!(
            organization_id = %organization.id,
            suggestion_id = %suggestion.id,
            "public_board: suggestion submitted"
        );

        let notification = SuggestionNotification {
            organization_name: organization.name.clone(),
            suggestion_title: suggestion.title.clone(),
            suggestion_description: suggestion.description.clone(),
            board_url: format!(
                "{}/b/{}",
                self.app_base_url.trim_end_matches('/'),
                organization.slug
            ),
        };
        let user_repo = Arc::clone(&self.user_repo);
        let notifier = Arc::clone(&self.notifier);
        let organization_id = organization.id;

        tokio::spawn(async move {
            notify_admins(user_repo, notifier, organization_id, notification).await;
        });

        Ok(SubmittedSuggestionDto {
            id: suggestion.id,
            status: suggestion.status,
        })
    }
}

async fn notify_admins<U, N>(
    user_repo: Arc<U>,
    notifier: Arc<N>,
    organization_id: uuid::Uuid,
    notification: SuggestionNotification,
) where
    U: UserRepository + Send + Sync + 'static,
    N: SuggestionNotifier + 'static,
{
    let recipients = match user_repo.list_admin_emails(organization_id).await {
        Ok(recipients) if recipients.is_empty() => {
            debug!(%organization_id, "public_board: no admins to notify");
            return;
        }
        Ok(recipients) => recipients,
        Err(err) => {
            warn!(%organization_id, db_error = ?err, "public_board: failed to load admin emails");
            return;
        }
    };

    if let Err(err) = notifier
        .notify_new_suggestion(recipients, notification)
        .await
    {
        warn!(%organization_id, error = ?err, "public_board: suggestion notification failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        application::interfaces::notifier::MockSuggestionNotifier,
        domain::{
            entities::suggestions::SuggestionEntity,
            repositories::{
                organizations::MockOrganizationRepository, suggestions::MockSuggestionRepository,
                users::MockUserRepository,
            },
            value_objects::votes::PublicSuggestion,
        },
    };
    use anyhow::anyhow;
    use chrono::Utc;
    use mockall::predicate::eq;
    use std::time::Duration;
    use uuid::Uuid;

    type TestUseCase = PublicBoardUseCase<
        MockOrganizationRepository,
        MockSuggestionRepository,
        MockUserRepository,
        MockSuggestionNotifier,
    >;

    fn build(
        organization_repo: MockOrganizationRepository,
        suggestion_repo: MockSuggestionRepository,
        user_repo: MockUserRepository,
        notifier: MockSuggestionNotifier,
    ) -> TestUseCase {
        PublicBoardUseCase::new(
            Arc::new(organization_repo),
            Arc::new(suggestion_repo),
            Arc::new(user_repo),
            Arc::new(notifier),
            "https://roadmap.example/".to_string(),
        )
    }

    fn organization(id: Uuid, is_active: bool) -> OrganizationEntity {
        let now = Utc::now();
        OrganizationEntity {
            id,
            name: "Acme".to_string(),
            slug: "acme".to_string(),
            is_active,
            plan: "pro".to_string(),
            trial_ends_at: None,
            stripe_customer_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn boards_with(organization: OrganizationEntity) -> MockOrganizationRepository {
        let mut organization_repo = MockOrganizationRepository::new();
        organization_repo
            .expect_find_by_slug()
            .with(eq("acme"))
            .returning(move |_| Ok(Some(organization.clone())));
        organization_repo
            .expect_find_by_slug()
            .withf(|slug| slug != "acme")
            .returning(|_| Ok(None));
        organization_repo
    }

    fn request(title: &str) -> SubmitSuggestionRequest {
        SubmitSuggestionRequest {
            title: title.to_string(),
            description: "Dark theme for the widget".to_string(),
            category_id: None,
            author_email: Some("fan@example.com".to_string()),
        }
    }

    #[tokio::test]
    async fn inactive_or_unknown_boards_are_not_found() {
        let usecase = build(
            boards_with(organization(Uuid::new_v4(), false)),
            MockSuggestionRepository::new(),
            MockUserRepository::new(),
            MockSuggestionNotifier::new(),
        );

        assert!(matches!(
            usecase.get_board("acme").await,
            Err(BoardError::BoardNotFound)
        ));
        assert!(matches!(
            usecase.get_board("nobody").await,
            Err(BoardError::BoardNotFound)
        ));
    }

    #[tokio::test]
    async fn board_lists_public_suggestions_with_votes() {
        let organization_id = Uuid::new_v4();
        let mut suggestion_repo = MockSuggestionRepository::new();
        suggestion_repo
            .expect_list_public_with_votes()
            .with(eq(organization_id))
            .returning(|_| {
                Ok(vec![PublicSuggestion {
                    id: Uuid::new_v4(),
                    category_id: None,
                    title: "Dark mode".to_string(),
                    description: String::new(),
                    status: "planned".to_string(),
                    vote_count: 3,
                    created_at: Utc::now(),
                }])
            });

        let usecase = build(
            boards_with(organization(organization_id, true)),
            suggestion_repo,
            MockUserRepository::new(),
            MockSuggestionNotifier::new(),
        );

        let board = usecase.get_board("acme").await.unwrap();

        assert_eq!(board.organization_name, "Acme");
        assert_eq!(board.suggestions.len(), 1);
        assert_eq!(board.suggestions[0].vote_count, 3);
    }

    #[tokio::test]
    async fn submitted_suggestion_is_pending_and_admins_are_notified() {
        let organization_id = Uuid::new_v4();
        let mut suggestion_repo = MockSuggestionRepository::new();
        suggestion_repo
            .expect_create_suggestion()
            .withf(move |suggestion| {
                suggestion.organization_id == organization_id
                    && suggestion.status == PENDING_STATUS
                    && suggestion.title == "Dark mode"
            })
            .times(1)
            .returning(|suggestion| {
                let now = Utc::now();
                Ok(SuggestionEntity {
                    id: Uuid::new_v4(),
                    organization_id: suggestion.organization_id,
                    category_id: suggestion.category_id,
                    title: suggestion.title,
                    description: suggestion.description,
                    status: suggestion.status,
                    is_public: suggestion.is_public,
                    author_email: suggestion.author_email,
                    created_at: now,
                    updated_at: now,
                })
            });

        let mut user_repo = MockUserRepository::new();
        user_repo
            .expect_list_admin_emails()
            .with(eq(organization_id))
            .returning(|_| Ok(vec!["owner@acme.test".to_string()]));

        let (sent_tx, mut sent_rx) = tokio::sync::mpsc::unbounded_channel();
        let mut notifier = MockSuggestionNotifier::new();
        notifier
            .expect_notify_new_suggestion()
            .times(1)
            .returning(move |recipients, notification| {
                let _ = sent_tx.send((recipients, notification));
                Ok(())
            });

        let usecase = build(
            boards_with(organization(organization_id, true)),
            suggestion_repo,
            user_repo,
            notifier,
        );

        let submitted = usecase
            .submit_suggestion("acme", request("  Dark mode  "))
            .await
            .unwrap();
        assert_eq!(submitted.status, "pending");

        let (recipients, notification) = tokio::time::timeout(Duration::from_secs(1), sent_rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(recipients, vec!["owner@acme.test".to_string()]);
        assert_eq!(notification.board_url, "https://roadmap.example/b/acme");
        assert_eq!(notification.suggestion_title, "Dark mode");
    }

    #[tokio::test]
    async fn notification_failure_is_swallowed() {
        let mut user_repo = MockUserRepository::new();
        user_repo
            .expect_list_admin_emails()
            .returning(|_| Ok(vec!["owner@acme.test".to_string()]));
        let mut notifier = MockSuggestionNotifier::new();
        notifier
            .expect_notify_new_suggestion()
            .times(1)
            .returning(|_, _| Err(anyhow!("mail provider down")));

        notify_admins(
            Arc::new(user_repo),
            Arc::new(notifier),
            Uuid::new_v4(),
            SuggestionNotification {
                organization_name: "Acme".to_string(),
                suggestion_title: "Dark mode".to_string(),
                suggestion_description: String::new(),
                board_url: "https://roadmap.example/b/acme".to_string(),
            },
        )
        .await;
    }

    #[tokio::test]
    async fn blank_title_is_rejected_before_lookup() {
        let mut organization_repo = MockOrganizationRepository::new();
        organization_repo.expect_find_by_slug().never();

        let usecase = build(
            organization_repo,
            MockSuggestionRepository::new(),
            MockUserRepository::new(),
            MockSuggestionNotifier::new(),
        );

        let result = usecase.submit_suggestion("acme", request("   ")).await;

        assert!(matches!(result, Err(BoardError::InvalidInput(_))));
    }
}
