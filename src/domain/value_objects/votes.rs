use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct VoteRequest {
    pub suggestion_id: Uuid,
    pub fingerprint: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct VoteResponse {
    pub voted: bool,
}

#[derive(Debug, Serialize)]
pub struct FingerprintResponse {
    pub fingerprint: String,
}

/// Suggestion as shown on a public board, with authenticated and anonymous votes summed.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PublicSuggestion {
    pub id: Uuid,
    pub category_id: Option<Uuid>,
    pub title: String,
    pub description: String,
    pub status: String,
    pub vote_count: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct PublicBoardDto {
    pub organization_name: String,
    pub slug: String,
    pub suggestions: Vec<PublicSuggestion>,
}

#[derive(Debug, Deserialize)]
pub struct SubmitSuggestionRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category_id: Option<Uuid>,
    #[serde(default)]
    pub author_email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SubmittedSuggestionDto {
    pub id: Uuid,
    pub status: String,
}
