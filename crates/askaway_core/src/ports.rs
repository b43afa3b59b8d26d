//! crates/askaway_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like databases or
//! activity-stream backends. Components receive these as explicit references
//! instead of relying on any process-wide registration.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{
    Activity, NewQuestion, NewUser, Ordering, Page, PageRequest, ProfileUpdate, Question,
    QuestionFilter, QuestionUpdate, TagSummary, User, Vote,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Already exists: {0}")]
    Conflict(String),
    #[error("Integrity violation: {0}")]
    Integrity(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// Persistence of questions and the queries the listing pages run.
#[async_trait]
pub trait QuestionStore: Send + Sync {
    /// Persists a new question. The slug is derived from the title before
    /// the write; `published_at` is set by the store, `view_count` starts
    /// at zero.
    async fn create(&self, question: NewQuestion) -> PortResult<Question>;

    /// Plain lookup by id, without touching the view count.
    async fn question_by_id(&self, id: Uuid) -> PortResult<Question>;

    /// Atomically increments the view count and returns the updated
    /// question. Concurrent calls must never lose an increment.
    async fn record_view(&self, id: Uuid) -> PortResult<Question>;

    /// Applies a content edit. The slug is rederived from the new title.
    async fn update(&self, id: Uuid, update: QuestionUpdate) -> PortResult<Question>;

    /// Filtered, ordered, paginated listing. An empty filter yields the
    /// full set; an unknown author yields an empty page.
    async fn list(
        &self,
        filter: &QuestionFilter,
        order: Ordering,
        page: PageRequest,
    ) -> PortResult<Page<Question>>;
}

/// Persistence of user profiles.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Creates a user. A taken username is a `Conflict`.
    async fn create_user(&self, user: NewUser) -> PortResult<User>;

    async fn user_by_username(&self, username: &str) -> PortResult<User>;

    async fn list_users(&self, page: PageRequest) -> PortResult<Page<User>>;

    /// Updates the mutable profile fields (about, avatar).
    async fn update_profile(&self, username: &str, update: ProfileUpdate) -> PortResult<User>;
}

/// Lookup of the tag vocabulary in use.
#[async_trait]
pub trait TagStore: Send + Sync {
    /// All distinct tags, with the number of questions carrying each,
    /// most-used first.
    async fn list_tags(&self) -> PortResult<Vec<TagSummary>>;
}

/// Application of vote events from the voting collaborator.
#[async_trait]
pub trait VoteStore: Send + Sync {
    /// Records the voter's ballot (replacing any previous one) and returns
    /// the question's new rating.
    async fn apply_vote(&self, question_id: Uuid, voter_id: Uuid, vote: Vote) -> PortResult<i64>;
}

/// Seam for the activity-stream collaborator. Publishing is fire-and-forget;
/// a lost event never fails the operation that produced it.
#[async_trait]
pub trait ActivityPublisher: Send + Sync {
    async fn publish(&self, activity: Activity);
}
