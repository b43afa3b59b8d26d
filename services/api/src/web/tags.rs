//! services/api/src/web/tags.rs
//!
//! Axum handlers for the tag directory and tag-scoped question listings.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    response::Json,
};

use askaway_core::domain::{Ordering, QuestionFilter};

use crate::error::ApiError;
use crate::web::rest::{page_request, PageQuery, QuestionPageResponse, TagResponse};
use crate::web::state::AppState;

/// Every tag in use, with its question count, most-used first.
#[utoipa::path(
    get,
    path = "/tags",
    responses(
        (status = 200, description = "All tags in use", body = [TagResponse])
    )
)]
pub async fn list_tags(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<TagResponse>>, ApiError> {
    let tags = state.tags.list_tags().await?;
    Ok(Json(tags.into_iter().map(Into::into).collect()))
}

/// Questions carrying one tag, newest first. An unused tag yields an empty
/// page rather than an error.
#[utoipa::path(
    get,
    path = "/tag/{tag}",
    params(
        ("tag" = String, Path, description = "The tag to filter by."),
        PageQuery
    ),
    responses(
        (status = 200, description = "One page of questions carrying the tag", body = QuestionPageResponse)
    )
)]
pub async fn tag_questions(
    State(state): State<Arc<AppState>>,
    Path(tag): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Json<QuestionPageResponse>, ApiError> {
    let filter = QuestionFilter {
        tag: Some(tag),
        ..Default::default()
    };
    let page = state
        .questions
        .list(
            &filter,
            Ordering::Recency,
            page_request(&state.config, query.page),
        )
        .await?;
    Ok(Json(QuestionPageResponse::from_page(page)))
}
