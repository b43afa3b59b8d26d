//! services/api/src/web/rest.rs
//!
//! Shared request/response payloads for the REST API and the master
//! definition for the OpenAPI specification.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, OpenApi, ToSchema};
use uuid::Uuid;

use askaway_core::domain::{Page, PageRequest, Question, TagSummary, User, Vote};
use askaway_core::submission::FieldError;

use crate::config::Config;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::web::questions::list_questions,
        crate::web::questions::list_latest_questions,
        crate::web::questions::list_popular_questions,
        crate::web::questions::question_detail,
        crate::web::questions::ask_question,
        crate::web::questions::update_question,
        crate::web::questions::vote_question,
        crate::web::users::user_profile,
        crate::web::users::user_questions,
        crate::web::users::list_users,
        crate::web::users::create_user,
        crate::web::tags::list_tags,
        crate::web::tags::tag_questions,
    ),
    components(schemas(
        QuestionResponse,
        QuestionPageResponse,
        UserResponse,
        UserPageResponse,
        TagResponse,
        AskQuestionRequest,
        UpdateQuestionRequest,
        VoteRequest,
        VoteValue,
        VoteResponse,
        CreateUserRequest,
        ValidationErrorBody,
        FieldErrorBody,
    )),
    tags(
        (name = "askaway API", description = "Questions, users, tags and votes for the Q&A board.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

/// A question as returned by every question endpoint.
#[derive(Serialize, ToSchema)]
pub struct QuestionResponse {
    pub id: Uuid,
    pub title: String,
    pub details: String,
    pub slug: String,
    pub published_at: DateTime<Utc>,
    pub view_count: u64,
    pub answered: bool,
    pub rating: i64,
    pub section: String,
    pub author: String,
    pub tags: Vec<String>,
}

impl From<Question> for QuestionResponse {
    fn from(q: Question) -> Self {
        Self {
            id: q.id,
            title: q.title,
            details: q.details,
            slug: q.slug,
            published_at: q.published_at,
            view_count: q.view_count,
            answered: q.answered,
            rating: q.rating,
            section: q.section,
            author: q.author,
            tags: q.tags,
        }
    }
}

/// One page of questions with the total match count.
#[derive(Serialize, ToSchema)]
pub struct QuestionPageResponse {
    pub count: u64,
    pub page: u32,
    pub page_size: u32,
    pub results: Vec<QuestionResponse>,
}

impl QuestionPageResponse {
    pub fn from_page(page: Page<Question>) -> Self {
        Self {
            count: page.total,
            page: page.page,
            page_size: page.size,
            results: page.items.into_iter().map(Into::into).collect(),
        }
    }
}

/// A user profile as returned by the user endpoints.
#[derive(Serialize, ToSchema)]
pub struct UserResponse {
    pub username: String,
    pub email: Option<String>,
    pub registered_at: DateTime<Utc>,
    pub rating: i64,
    pub about: String,
    pub avatar: String,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            username: u.username,
            email: u.email,
            registered_at: u.registered_at,
            rating: u.rating,
            about: u.about,
            avatar: u.avatar,
        }
    }
}

/// One page of users with the total count.
#[derive(Serialize, ToSchema)]
pub struct UserPageResponse {
    pub count: u64,
    pub page: u32,
    pub page_size: u32,
    pub results: Vec<UserResponse>,
}

impl UserPageResponse {
    pub fn from_page(page: Page<User>) -> Self {
        Self {
            count: page.total,
            page: page.page,
            page_size: page.size,
            results: page.items.into_iter().map(Into::into).collect(),
        }
    }
}

/// A tag with the number of questions carrying it.
#[derive(Serialize, ToSchema)]
pub struct TagResponse {
    pub name: String,
    pub question_count: u64,
}

impl From<TagSummary> for TagResponse {
    fn from(t: TagSummary) -> Self {
        Self {
            name: t.name,
            question_count: t.question_count,
        }
    }
}

/// The ask form: a candidate question with its author referenced by username.
#[derive(Deserialize, ToSchema)]
pub struct AskQuestionRequest {
    pub title: String,
    pub details: String,
    #[serde(default)]
    pub section: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub author: String,
}

/// A content edit of an existing question.
#[derive(Deserialize, ToSchema)]
pub struct UpdateQuestionRequest {
    pub title: String,
    pub details: String,
    #[serde(default)]
    pub section: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// A vote event from the voting collaborator.
#[derive(Deserialize, ToSchema)]
pub struct VoteRequest {
    pub voter: String,
    pub value: VoteValue,
}

#[derive(Deserialize, Clone, Copy, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum VoteValue {
    Up,
    Down,
}

impl From<VoteValue> for Vote {
    fn from(value: VoteValue) -> Self {
        match value {
            VoteValue::Up => Vote::Up,
            VoteValue::Down => Vote::Down,
        }
    }
}

/// The question's rating after a vote was applied.
#[derive(Serialize, ToSchema)]
pub struct VoteResponse {
    pub question_id: Uuid,
    pub rating: i64,
}

/// Registration payload, used by the external auth collaborator and admin
/// tooling.
#[derive(Deserialize, ToSchema)]
pub struct CreateUserRequest {
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub about: String,
}

/// Body of a 422 response to an invalid submission.
#[derive(Serialize, ToSchema)]
pub struct ValidationErrorBody {
    pub errors: Vec<FieldErrorBody>,
}

#[derive(Serialize, ToSchema)]
pub struct FieldErrorBody {
    pub field: String,
    pub message: String,
}

impl ValidationErrorBody {
    pub fn from_errors(errors: Vec<FieldError>) -> Self {
        Self {
            errors: errors
                .into_iter()
                .map(|e| FieldErrorBody {
                    field: e.field.to_string(),
                    message: e.message,
                })
                .collect(),
        }
    }
}

//=========================================================================================
// Query Parameters
//=========================================================================================

/// Listing filters; all are optional and combine.
#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// Exact match against any of a question's tags.
    pub tag: Option<String>,
    /// Case-insensitive substring match against the title.
    pub q: Option<String>,
    /// Exact username match.
    pub author: Option<String>,
    /// 1-based page number.
    pub page: Option<u32>,
}

/// Plain pagination for the user directory.
#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// 1-based page number.
    pub page: Option<u32>,
}

/// Builds a page request from the optional `page` query parameter and the
/// configured page size.
pub(crate) fn page_request(config: &Config, page: Option<u32>) -> PageRequest {
    PageRequest::new(page.unwrap_or(1), config.page_size)
}
