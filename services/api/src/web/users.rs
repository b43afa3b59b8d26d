//! services/api/src/web/users.rs
//!
//! Axum handlers for user profiles, the member directory, registration and
//! the author-scoped question listing.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};

use askaway_core::domain::{NewUser, Ordering, QuestionFilter};

use crate::error::ApiError;
use crate::web::rest::{
    page_request, CreateUserRequest, ListQuery, PageQuery, QuestionPageResponse, UserPageResponse,
    UserResponse,
};
use crate::web::state::AppState;

/// A user's public profile.
#[utoipa::path(
    get,
    path = "/user/{username}",
    params(("username" = String, Path, description = "The user's unique name.")),
    responses(
        (status = 200, description = "The profile", body = UserResponse),
        (status = 404, description = "No user with this name")
    )
)]
pub async fn user_profile(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state.users.user_by_username(&username).await?;
    Ok(Json(user.into()))
}

/// Questions asked by one user. The per-author URL presupposes the author
/// exists, so an unknown username is a 404 while an author without questions
/// gets an empty page.
#[utoipa::path(
    get,
    path = "/user/{username}/questions",
    params(
        ("username" = String, Path, description = "The author's unique name."),
        ListQuery
    ),
    responses(
        (status = 200, description = "One page of the author's questions", body = QuestionPageResponse),
        (status = 404, description = "No user with this name")
    )
)]
pub async fn user_questions(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
    Query(query): Query<ListQuery>,
) -> Result<Json<QuestionPageResponse>, ApiError> {
    let author = state.users.user_by_username(&username).await?;

    let filter = QuestionFilter {
        tag: query.tag,
        query: query.q,
        author: Some(author.username),
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

/// The member directory, alphabetical.
#[utoipa::path(
    get,
    path = "/users",
    params(PageQuery),
    responses(
        (status = 200, description = "One page of users", body = UserPageResponse)
    )
)]
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageQuery>,
) -> Result<Json<UserPageResponse>, ApiError> {
    let page = state
        .users
        .list_users(page_request(&state.config, query.page))
        .await?;
    Ok(Json(UserPageResponse::from_page(page)))
}

/// Register a user. This is the seam the external auth collaborator and
/// admin tooling create accounts through.
#[utoipa::path(
    post,
    path = "/users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 409, description = "Username already taken")
    )
)]
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let user = state
        .users
        .create_user(NewUser {
            username: req.username,
            email: req.email,
            about: req.about,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}
