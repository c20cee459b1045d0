use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::domain::{
    entities::anonymous_votes::InsertAnonymousVoteEntity,
    repositories::{anonymous_votes::AnonymousVoteRepository, suggestions::SuggestionRepository},
    value_objects::{
        fingerprint::{MAX_FINGERPRINT_LEN, is_valid_fingerprint},
        votes::VoteResponse,
    },
};

#[derive(Debug, Error)]
pub enum VoteError {
    #[error("fingerprint must be between 1 and {MAX_FINGERPRINT_LEN} characters")]
    InvalidFingerprint,
    #[error("suggestion not found")]
    SuggestionNotFound,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl VoteError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            VoteError::InvalidFingerprint => StatusCode::BAD_REQUEST,
            VoteError::SuggestionNotFound => StatusCode::NOT_FOUND,
            VoteError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type VoteResult<T> = std::result::Result<T, VoteError>;

/// Cookie-less votes keyed by (suggestion, browser fingerprint).
pub struct AnonymousVoteUseCase<S, V>
where
    S: SuggestionRepository + Send + Sync + 'static,
    V: AnonymousVoteRepository + Send + Sync + 'static,
{
    suggestion_repo: Arc<S>,
    vote_repo: Arc<V>,
}

impl<S, V> AnonymousVoteUseCase<S, V>
where
    S: SuggestionRepository + Send + Sync + 'static,
    V: AnonymousVoteRepository + Send + Sync + 'static,
{
    pub fn new(suggestion_repo: Arc<S>, vote_repo: Arc<V>) -> Self {
        Self {
            suggestion_repo,
            vote_repo,
        }
    }

    /// Adds the vote if this fingerprint has none on the suggestion, removes it otherwise.
    ///
    /// Read-then-write: two concurrent submissions from one fingerprint can both
    /// read "absent", and the unique index on (suggestion_id, fingerprint) then
    /// rejects the losing insert.
    pub async fn toggle_vote(
        &self,
        suggestion_id: Uuid,
        organization_id: Uuid,
        fingerprint: &str,
        ip_address: Option<String>,
    ) -> VoteResult<VoteResponse> {
        if !is_valid_fingerprint(fingerprint) {
            let err = VoteError::InvalidFingerprint;
            warn!(
                %suggestion_id,
                %organization_id,
                fingerprint_len = fingerprint.chars().count(),
                status = err.status_code().as_u16(),
                "anonymous_votes: rejected fingerprint"
            );
            return Err(err);
        }

        let suggestion = self
            .suggestion_repo
            .find_public_in_organization(suggestion_id, organization_id)
            .await
            .map_err(|err| {
                error!(
                    %suggestion_id,
                    %organization_id,
                    db_error = ?err,
                    "anonymous_votes: failed to load suggestion"
                );
                VoteError::Internal(err)
            })?;

        if !suggestion.is_some_and(|suggestion| suggestion.is_public) {
            let err = VoteError::SuggestionNotFound;
            warn!(
                %suggestion_id,
                %organization_id,
                status = err.status_code().as_u16(),
                "anonymous_votes: suggestion not public in organization"
            );
            return Err(err);
        }

        let existing = self
            .vote_repo
            .find_vote_id(suggestion_id, fingerprint)
            .await
            .map_err(|err| {
                error!(
                    %suggestion_id,
                    db_error = ?err,
                    "anonymous_votes: failed to look up existing vote"
                );
                VoteError::Internal(err)
            })?;

        if let Some(vote_id) = existing {
            self.vote_repo.delete_vote(vote_id).await.map_err(|err| {
                error!(
                    %suggestion_id,
                    %vote_id,
                    db_error = ?err,
                    "anonymous_votes: failed to remove vote"
                );
                VoteError::Internal(err)
            })?;

            info!(%suggestion_id, %organization_id, "anonymous_votes: vote removed");
            return Ok(VoteResponse { voted: false });
        }

        let vote = InsertAnonymousVoteEntity {
            suggestion_id,
            organization_id,
            fingerprint: fingerprint.to_string(),
            ip_address,
            created_at: Utc::now(),
        };

        self.vote_repo.insert_vote(vote).await.map_err(|err| {
            error!(
                %suggestion_id,
                db_error = ?err,
                "anonymous_votes: failed to record vote"
            );
            VoteError::Internal(err)
        })?;

        info!(%suggestion_id, %organization_id, "anonymous_votes: vote recorded");
        Ok(VoteResponse { voted: true })
    }

    pub async fn count_votes(&self, suggestion_id: Uuid) -> VoteResult<i64> {
        self.vote_repo
            .count_for_suggestion(suggestion_id)
            .await
            .map_err(|err| {
                error!(
                    %suggestion_id,
                    db_error = ?err,
                    "anonymous_votes: failed to count votes"
                );
                VoteError::Internal(err)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        entities::suggestions::SuggestionEntity,
        repositories::{
            anonymous_votes::MockAnonymousVoteRepository, suggestions::MockSuggestionRepository,
        },
    };
    use anyhow::Result;
    use async_trait::async_trait;
    use mockall::predicate::eq;
    use std::sync::Mutex;

    fn sample_suggestion(id: Uuid, organization_id: Uuid) -> SuggestionEntity {
        let now = Utc::now();
        SuggestionEntity {
            id,
            organization_id,
            category_id: None,
            title: "Dark mode".to_string(),
            description: "Please".to_string(),
            status: "pending".to_string(),
            is_public: true,
            author_email: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn suggestions_owned_by(organization_id: Uuid) -> MockSuggestionRepository {
        let mut suggestion_repo = MockSuggestionRepository::new();
        suggestion_repo
            .expect_find_public_in_organization()
            .returning(move |suggestion_id, org_id| {
                Ok((org_id == organization_id)
                    .then(|| sample_suggestion(suggestion_id, organization_id)))
            });
        suggestion_repo
    }

    /// Vote table kept in memory so toggles observe earlier writes.
    #[derive(Default)]
    struct InMemoryVotes {
        rows: Mutex<Vec<(Uuid, InsertAnonymousVoteEntity)>>,
    }

    #[async_trait]
    impl AnonymousVoteRepository for InMemoryVotes {
        async fn find_vote_id(
            &self,
            suggestion_id: Uuid,
            fingerprint: &str,
        ) -> Result<Option<Uuid>> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .find(|(_, vote)| {
                    vote.suggestion_id == suggestion_id && vote.fingerprint == fingerprint
                })
                .map(|(id, _)| *id))
        }

        async fn insert_vote(&self, vote: InsertAnonymousVoteEntity) -> Result<Uuid> {
            let id = Uuid::new_v4();
            self.rows.lock().unwrap().push((id, vote));
            Ok(id)
        }

        async fn delete_vote(&self, vote_id: Uuid) -> Result<()> {
            self.rows.lock().unwrap().retain(|(id, _)| *id != vote_id);
            Ok(())
        }

        async fn count_for_suggestion(&self, suggestion_id: Uuid) -> Result<i64> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .filter(|(_, vote)| vote.suggestion_id == suggestion_id)
                .count() as i64)
        }
    }

    #[tokio::test]
    async fn double_toggle_adds_then_removes_the_vote() {
        let organization_id = Uuid::new_v4();
        let suggestion_id = Uuid::new_v4();
        let votes = Arc::new(InMemoryVotes::default());
        let usecase = AnonymousVoteUseCase::new(
            Arc::new(suggestions_owned_by(organization_id)),
            Arc::clone(&votes),
        );

        let first = usecase
            .toggle_vote(suggestion_id, organization_id, "fp-1", Some("10.0.0.1".into()))
            .await
            .unwrap();
        let second = usecase
            .toggle_vote(suggestion_id, organization_id, "fp-1", Some("10.0.0.1".into()))
            .await
            .unwrap();

        assert_eq!(first, VoteResponse { voted: true });
        assert_eq!(second, VoteResponse { voted: false });
        assert!(votes.rows.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn distinct_fingerprints_are_counted_separately() {
        let organization_id = Uuid::new_v4();
        let suggestion_id = Uuid::new_v4();
        let usecase = AnonymousVoteUseCase::new(
            Arc::new(suggestions_owned_by(organization_id)),
            Arc::new(InMemoryVotes::default()),
        );

        usecase
            .toggle_vote(suggestion_id, organization_id, "fp-a", None)
            .await
            .unwrap();
        usecase
            .toggle_vote(suggestion_id, organization_id, "fp-b", None)
            .await
            .unwrap();
        assert_eq!(usecase.count_votes(suggestion_id).await.unwrap(), 2);

        let toggled = usecase
            .toggle_vote(suggestion_id, organization_id, "fp-a", None)
            .await
            .unwrap();
        assert!(!toggled.voted);
        assert_eq!(usecase.count_votes(suggestion_id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn suggestion_of_another_organization_is_not_found() {
        let owner = Uuid::new_v4();
        let other = Uuid::new_v4();
        let mut vote_repo = MockAnonymousVoteRepository::new();
        vote_repo.expect_find_vote_id().never();
        vote_repo.expect_insert_vote().never();

        let usecase =
            AnonymousVoteUseCase::new(Arc::new(suggestions_owned_by(owner)), Arc::new(vote_repo));

        let result = usecase
            .toggle_vote(Uuid::new_v4(), other, "fp-1", None)
            .await;

        assert!(matches!(result, Err(VoteError::SuggestionNotFound)));
    }

    #[tokio::test]
    async fn hidden_suggestion_cannot_be_voted_on() {
        let organization_id = Uuid::new_v4();
        let suggestion_id = Uuid::new_v4();
        let mut suggestion_repo = MockSuggestionRepository::new();
        suggestion_repo
            .expect_find_public_in_organization()
            .with(eq(suggestion_id), eq(organization_id))
            .returning(move |id, org_id| {
                let mut hidden = sample_suggestion(id, org_id);
                hidden.is_public = false;
                Ok(Some(hidden))
            });
        let mut vote_repo = MockAnonymousVoteRepository::new();
        vote_repo.expect_find_vote_id().never();
        vote_repo.expect_insert_vote().never();

        let usecase = AnonymousVoteUseCase::new(Arc::new(suggestion_repo), Arc::new(vote_repo));

        let result = usecase
            .toggle_vote(suggestion_id, organization_id, "fp-1", None)
            .await;

        assert!(matches!(result, Err(VoteError::SuggestionNotFound)));
    }

    #[tokio::test]
    async fn invalid_fingerprints_are_rejected_before_any_lookup() {
        let mut suggestion_repo = MockSuggestionRepository::new();
        suggestion_repo.expect_find_public_in_organization().never();
        let usecase = AnonymousVoteUseCase::new(
            Arc::new(suggestion_repo),
            Arc::new(MockAnonymousVoteRepository::new()),
        );

        let too_long = "x".repeat(MAX_FINGERPRINT_LEN + 1);
        for fingerprint in ["", too_long.as_str()] {
            let result = usecase
                .toggle_vote(Uuid::new_v4(), Uuid::new_v4(), fingerprint, None)
                .await;
            assert!(matches!(result, Err(VoteError::InvalidFingerprint)));
        }
    }

    #[tokio::test]
    async fn new_vote_stores_ip_and_organization() {
        let organization_id = Uuid::new_v4();
        let suggestion_id = Uuid::new_v4();
        let mut vote_repo = MockAnonymousVoteRepository::new();
        vote_repo
            .expect_find_vote_id()
            .with(eq(suggestion_id), eq("fp-9"))
            .returning(|_, _| Ok(None));
        vote_repo
            .expect_insert_vote()
            .withf(move |vote| {
                vote.suggestion_id == suggestion_id
                    && vote.organization_id == organization_id
                    && vote.fingerprint == "fp-9"
                    && vote.ip_address.as_deref() == Some("203.0.113.7")
            })
            .times(1)
            .returning(|_| Ok(Uuid::new_v4()));

        let usecase = AnonymousVoteUseCase::new(
            Arc::new(suggestions_owned_by(organization_id)),
            Arc::new(vote_repo),
        );

        let response = usecase
            .toggle_vote(
                suggestion_id,
                organization_id,
                "fp-9",
                Some("203.0.113.7".to_string()),
            )
            .await
            .unwrap();

        assert!(response.voted);
    }
}
