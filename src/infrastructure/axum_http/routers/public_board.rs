use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
};

use crate::{
    application::usecases::{
        anonymous_votes::AnonymousVoteUseCase, public_board::PublicBoardUseCase,
    },
    domain::value_objects::{
        fingerprint::{BrowserSignals, fingerprint},
        votes::{FingerprintResponse, SubmitSuggestionRequest, VoteRequest},
    },
    infrastructure::{
        axum_http::error_responses::AppError,
        notifications::Mailer,
        postgres::{
            postgres_connection::PgPoolSquad,
            repositories::{
                anonymous_votes::AnonymousVotePostgres, organizations::OrganizationPostgres,
                suggestions::SuggestionPostgres, users::UserPostgres,
            },
        },
    },
};

/// Shared by the board and vote handlers; both resolve the board by slug first.
pub struct PublicBoardState {
    board: PublicBoardUseCase<OrganizationPostgres, SuggestionPostgres, UserPostgres, Mailer>,
    votes: AnonymousVoteUseCase<SuggestionPostgres, AnonymousVotePostgres>,
}

pub fn routes(db_pool: Arc<PgPoolSquad>, mailer: Arc<Mailer>, app_base_url: String) -> Router {
    let organization_repository = Arc::new(OrganizationPostgres::new(Arc::clone(&db_pool)));
    let suggestion_repository = Arc::new(SuggestionPostgres::new(Arc::clone(&db_pool)));
    let user_repository = Arc::new(UserPostgres::new(Arc::clone(&db_pool)));
    let vote_repository = Arc::new(AnonymousVotePostgres::new(Arc::clone(&db_pool)));

    let state = PublicBoardState {
        board: PublicBoardUseCase::new(
            organization_repository,
            Arc::clone(&suggestion_repository),
            user_repository,
            mailer,
            app_base_url,
        ),
        votes: AnonymousVoteUseCase::new(suggestion_repository, vote_repository),
    };

    Router::new()
        .route("/boards/:slug", get(get_board))
        .route("/boards/:slug/suggestions", post(submit_suggestion))
        .route("/boards/:slug/vote", post(toggle_vote))
        .route("/fingerprint", post(compute_fingerprint))
        .with_state(Arc::new(state))
}

pub async fn get_board(
    State(state): State<Arc<PublicBoardState>>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let board = state.board.get_board(&slug).await?;
    Ok(Json(board))
}

pub async fn submit_suggestion(
    State(state): State<Arc<PublicBoardState>>,
    Path(slug): Path<String>,
    Json(request): Json<SubmitSuggestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    let submitted = state.board.submit_suggestion(&slug, request).await?;
    Ok((StatusCode::CREATED, Json(submitted)))
}

pub async fn toggle_vote(
    State(state): State<Arc<PublicBoardState>>,
    Path(slug): Path<String>,
    headers: HeaderMap,
    Json(request): Json<VoteRequest>,
) -> Result<impl IntoResponse, AppError> {
    let organization = state.board.resolve_board(&slug).await?;

    let response = state
        .votes
        .toggle_vote(
            request.suggestion_id,
            organization.id,
            &request.fingerprint,
            client_ip(&headers),
        )
        .await?;
    Ok(Json(response))
}

pub async fn compute_fingerprint(Json(signals): Json<BrowserSignals>) -> impl IntoResponse {
    Json(FingerprintResponse {
        fingerprint: fingerprint(&signals),
    })
}

/// First hop of `X-Forwarded-For`, else `X-Real-IP`. Stored for audit only.
fn client_ip(headers: &HeaderMap) -> Option<String> {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty());

    forwarded
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|value| value.to_str().ok())
                .map(str::trim)
                .filter(|value| !value.is_empty())
        })
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn client_ip_prefers_first_forwarded_hop() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.7, 10.0.0.2"));
        headers.insert("x-real-ip", HeaderValue::from_static("10.0.0.2"));

        assert_eq!(client_ip(&headers).as_deref(), Some("203.0.113.7"));
    }

    #[test]
    fn client_ip_falls_back_to_real_ip_then_none() {
        let mut headers = HeaderMap::new();
        assert_eq!(client_ip(&headers), None);

        headers.insert("x-real-ip", HeaderValue::from_static("198.51.100.4"));
        assert_eq!(client_ip(&headers).as_deref(), Some("198.51.100.4"));
    }
}
