//! services/api/src/web/questions.rs
//!
//! Axum handlers for the question endpoints: listings, detail views with
//! their view-count side effect, submission, revision and vote application.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use uuid::Uuid;

use askaway_core::domain::{Ordering, QuestionFilter, QuestionUpdate};
use askaway_core::ports::PortError;
use askaway_core::submission::{revise_question, submit_question, QuestionDraft, SubmitError};

use crate::error::ApiError;
use crate::web::rest::{
    page_request, AskQuestionRequest, ListQuery, QuestionPageResponse, QuestionResponse,
    UpdateQuestionRequest, ValidationErrorBody, VoteRequest, VoteResponse, VoteValue,
};
use crate::web::state::AppState;

async fn list_with_order(
    state: &AppState,
    query: ListQuery,
    order: Ordering,
) -> Result<Json<QuestionPageResponse>, ApiError> {
    let filter = QuestionFilter {
        tag: query.tag,
        query: query.q,
        author: query.author,
    };
    let page = state
        .questions
        .list(&filter, order, page_request(&state.config, query.page))
        .await?;
    Ok(Json(QuestionPageResponse::from_page(page)))
}

/// List questions, newest first.
#[utoipa::path(
    get,
    path = "/questions",
    params(ListQuery),
    responses(
        (status = 200, description = "One page of questions", body = QuestionPageResponse)
    )
)]
pub async fn list_questions(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<QuestionPageResponse>, ApiError> {
    list_with_order(&state, query, Ordering::Recency).await
}

/// List questions, newest first (alias of the plain listing).
#[utoipa::path(
    get,
    path = "/questions/latest",
    params(ListQuery),
    responses(
        (status = 200, description = "One page of questions", body = QuestionPageResponse)
    )
)]
pub async fn list_latest_questions(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<QuestionPageResponse>, ApiError> {
    list_with_order(&state, query, Ordering::Recency).await
}

/// List questions, highest rated first.
#[utoipa::path(
    get,
    path = "/questions/popular",
    params(ListQuery),
    responses(
        (status = 200, description = "One page of questions", body = QuestionPageResponse)
    )
)]
pub async fn list_popular_questions(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<QuestionPageResponse>, ApiError> {
    list_with_order(&state, query, Ordering::Popularity).await
}

/// Question detail. Every read counts as a view; the slug path segment only
/// decorates the URL and is not used for the lookup.
#[utoipa::path(
    get,
    path = "/question/{id}/{slug}",
    params(
        ("id" = Uuid, Path, description = "The question's id."),
        ("slug" = String, Path, description = "Decorative slug; ignored for the lookup.")
    ),
    responses(
        (status = 200, description = "The question, with its view count already incremented", body = QuestionResponse),
        (status = 404, description = "No question with this id")
    )
)]
pub async fn question_detail(
    State(state): State<Arc<AppState>>,
    Path((id, _slug)): Path<(Uuid, String)>,
) -> Result<Json<QuestionResponse>, ApiError> {
    let question = state.questions.record_view(id).await?;
    Ok(Json(question.into()))
}

/// Submit a new question.
#[utoipa::path(
    post,
    path = "/question/ask",
    request_body = AskQuestionRequest,
    responses(
        (status = 201, description = "Question created", body = QuestionResponse),
        (status = 422, description = "Validation failed or the author does not exist", body = ValidationErrorBody)
    )
)]
pub async fn ask_question(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AskQuestionRequest>,
) -> Response {
    let draft = QuestionDraft {
        title: req.title,
        details: req.details,
        section: req.section,
        tags: req.tags,
        author: req.author,
    };
    let result = submit_question(
        state.questions.as_ref(),
        state.users.as_ref(),
        state.activity.as_ref(),
        draft,
    )
    .await;
    match result {
        Ok(question) => {
            (StatusCode::CREATED, Json(QuestionResponse::from(question))).into_response()
        }
        Err(e) => submit_error_response(e),
    }
}

/// Edit a question's content. The slug is recomputed from the new title.
#[utoipa::path(
    put,
    path = "/question/{id}",
    params(("id" = Uuid, Path, description = "The question's id.")),
    request_body = UpdateQuestionRequest,
    responses(
        (status = 200, description = "Question updated", body = QuestionResponse),
        (status = 404, description = "No question with this id"),
        (status = 422, description = "Validation failed", body = ValidationErrorBody)
    )
)]
pub async fn update_question(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateQuestionRequest>,
) -> Response {
    let update = QuestionUpdate {
        title: req.title,
        details: req.details,
        section: req.section,
        tags: req.tags,
    };
    match revise_question(state.questions.as_ref(), id, update).await {
        Ok(question) => Json(QuestionResponse::from(question)).into_response(),
        Err(e) => submit_error_response(e),
    }
}

/// Apply a vote event from the voting collaborator. One ballot per voter and
/// question; re-voting replaces the previous ballot.
#[utoipa::path(
    post,
    path = "/question/{id}/vote",
    params(("id" = Uuid, Path, description = "The question's id.")),
    request_body = VoteRequest,
    responses(
        (status = 200, description = "Vote applied", body = VoteResponse),
        (status = 404, description = "Unknown question or voter")
    )
)]
pub async fn vote_question(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<VoteRequest>,
) -> Result<Json<VoteResponse>, ApiError> {
    let voter = state.users.user_by_username(&req.voter).await?;
    let rating = state
        .votes
        .apply_vote(id, voter.id, req.value.into())
        .await?;
    Ok(Json(VoteResponse {
        question_id: id,
        rating,
    }))
}

/// Maps submission failures onto HTTP: field errors become a 422 with
/// per-field messages, everything else defers to `ApiError`.
fn submit_error_response(error: SubmitError) -> Response {
    match error {
        SubmitError::Invalid(errors) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ValidationErrorBody::from_errors(errors)),
        )
            .into_response(),
        SubmitError::UnknownAuthor(author) => ApiError::Port(PortError::Integrity(format!(
            "Author '{}' does not exist",
            author
        )))
        .into_response(),
        SubmitError::Port(e) => ApiError::Port(e).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::web::testutil::{body_json, seed_question, seed_user, test_state};
    use askaway_core::ports::{QuestionStore, VoteStore};

    fn list_query() -> ListQuery {
        ListQuery {
            tag: None,
            q: None,
            author: None,
            page: None,
        }
    }

    #[tokio::test]
    async fn detail_view_increments_the_view_count() {
        let (state, store) = test_state();
        let alice = seed_user(&store, "alice").await;
        let q = seed_question(&store, &alice, "Why is the sky blue?", &["science"]).await;

        let response = question_detail(
            State(state.clone()),
            Path((q.id, q.slug.clone())),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["view_count"], 1);

        // A second read counts again.
        let response = question_detail(State(state), Path((q.id, q.slug))).await.into_response();
        let body = body_json(response).await;
        assert_eq!(body["view_count"], 2);
    }

    #[tokio::test]
    async fn detail_view_of_unknown_id_is_404() {
        let (state, _store) = test_state();
        let response = question_detail(
            State(state),
            Path((Uuid::new_v4(), "anything".to_string())),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn asking_a_valid_question_returns_201_with_the_slug() {
        let (state, store) = test_state();
        seed_user(&store, "alice").await;

        let response = ask_question(
            State(state),
            Json(AskQuestionRequest {
                title: "Why is the sky blue?".to_string(),
                details: "It looks blue most days.".to_string(),
                section: String::new(),
                tags: vec!["science".to_string()],
                author: "alice".to_string(),
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        assert_eq!(body["slug"], "why-is-the-sky-blue");
        assert_eq!(body["view_count"], 0);
        assert_eq!(body["author"], "alice");
    }

    #[tokio::test]
    async fn asking_with_an_empty_title_returns_422_field_errors() {
        let (state, store) = test_state();
        seed_user(&store, "alice").await;

        let response = ask_question(
            State(state),
            Json(AskQuestionRequest {
                title: String::new(),
                details: "d".to_string(),
                section: String::new(),
                tags: vec![],
                author: "alice".to_string(),
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_json(response).await;
        assert_eq!(body["errors"][0]["field"], "title");
    }

    #[tokio::test]
    async fn asking_as_an_unknown_author_returns_422() {
        let (state, _store) = test_state();
        let response = ask_question(
            State(state),
            Json(AskQuestionRequest {
                title: "t".to_string(),
                details: "d".to_string(),
                section: String::new(),
                tags: vec![],
                author: "nobody".to_string(),
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn updating_recomputes_the_slug() {
        let (state, store) = test_state();
        let alice = seed_user(&store, "alice").await;
        let q = seed_question(&store, &alice, "Old title", &[]).await;

        let response = update_question(
            State(state),
            Path(q.id),
            Json(UpdateQuestionRequest {
                title: "Brand New Title".to_string(),
                details: "d".to_string(),
                section: String::new(),
                tags: vec![],
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["slug"], "brand-new-title");
    }

    #[tokio::test]
    async fn voting_applies_and_reports_the_new_rating() {
        let (state, store) = test_state();
        let alice = seed_user(&store, "alice").await;
        seed_user(&store, "bob").await;
        let q = seed_question(&store, &alice, "Votable", &[]).await;

        let response = vote_question(
            State(state.clone()),
            Path(q.id),
            Json(VoteRequest {
                voter: "bob".to_string(),
                value: VoteValue::Up,
            }),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["rating"], 1);

        // Re-voting down replaces the ballot instead of stacking.
        let response = vote_question(
            State(state),
            Path(q.id),
            Json(VoteRequest {
                voter: "bob".to_string(),
                value: VoteValue::Down,
            }),
        )
        .await
        .into_response();
        let body = body_json(response).await;
        assert_eq!(body["rating"], -1);
    }

    #[tokio::test]
    async fn voting_by_an_unknown_voter_is_404() {
        let (state, store) = test_state();
        let alice = seed_user(&store, "alice").await;
        let q = seed_question(&store, &alice, "Votable", &[]).await;

        let response = vote_question(
            State(state),
            Path(q.id),
            Json(VoteRequest {
                voter: "nobody".to_string(),
                value: VoteValue::Up,
            }),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn listing_filters_by_tag_through_the_handler() {
        let (state, store) = test_state();
        let alice = seed_user(&store, "alice").await;
        seed_question(&store, &alice, "Tagged", &["science"]).await;
        seed_question(&store, &alice, "Other", &["cooking"]).await;

        let mut query = list_query();
        query.tag = Some("science".to_string());
        let response = list_questions(State(state), Query(query)).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["count"], 1);
        assert_eq!(body["results"][0]["title"], "Tagged");
    }

    #[tokio::test]
    async fn popular_listing_orders_by_rating() {
        let (state, store) = test_state();
        let alice = seed_user(&store, "alice").await;
        let bob = seed_user(&store, "bob").await;
        seed_question(&store, &alice, "Quiet", &[]).await;
        let loud = seed_question(&store, &alice, "Loud", &[]).await;
        store
            .apply_vote(loud.id, bob.id, askaway_core::domain::Vote::Up)
            .await
            .unwrap();

        let response = list_popular_questions(State(state), Query(list_query()))
            .await
            .into_response();
        let body = body_json(response).await;
        assert_eq!(body["results"][0]["title"], "Loud");
    }

    /// The worked end-to-end scenario: ask, view once, list by tag.
    #[tokio::test]
    async fn ask_view_and_tag_listing_work_together() {
        let (state, store) = test_state();
        seed_user(&store, "alice").await;

        let response = ask_question(
            State(state.clone()),
            Json(AskQuestionRequest {
                title: "Why is the sky blue?".to_string(),
                details: "It looks blue most days.".to_string(),
                section: String::new(),
                tags: vec!["science".to_string()],
                author: "alice".to_string(),
            }),
        )
        .await;
        let created = body_json(response).await;
        assert_eq!(created["slug"], "why-is-the-sky-blue");
        assert_eq!(created["view_count"], 0);

        let id: Uuid = serde_json::from_value(created["id"].clone()).unwrap();
        let detail = question_detail(
            State(state.clone()),
            Path((id, "why-is-the-sky-blue".to_string())),
        )
        .await
        .into_response();
        assert_eq!(body_json(detail).await["view_count"], 1);

        let mut query = list_query();
        query.tag = Some("science".to_string());
        let listing = list_questions(State(state), Query(query)).await.into_response();
        let body = body_json(listing).await;
        assert_eq!(body["count"], 1);
        assert_eq!(body["results"][0]["id"], created["id"]);

        // The record stayed untouched apart from the view counter.
        let stored = store.question_by_id(id).await.unwrap();
        assert_eq!(stored.view_count, 1);
    }
}
