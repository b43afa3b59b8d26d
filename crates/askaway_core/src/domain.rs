//! crates/askaway_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or serialization format.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Avatar assigned to users who never uploaded one.
pub const DEFAULT_AVATAR: &str = "avatar/default.png";

/// A question asked on the board.
#[derive(Debug, Clone)]
pub struct Question {
    pub id: Uuid,
    pub title: String,
    pub details: String,
    /// URL-safe identifier derived from `title`, recomputed on every save.
    pub slug: String,
    pub published_at: DateTime<Utc>,
    pub view_count: u64,
    pub answered: bool,
    /// Aggregate vote score, maintained through vote application.
    pub rating: i64,
    pub section: String,
    pub author_id: Uuid,
    pub author: String,
    pub tags: Vec<String>,
}

/// A registered member of the board.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: Option<String>,
    pub registered_at: DateTime<Utc>,
    pub rating: i64,
    pub about: String,
    pub avatar: String,
}

/// Input for creating a user through the registration seam.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: Option<String>,
    pub about: String,
}

/// A validated question ready for persistence. The store derives the slug
/// from `title` before writing.
#[derive(Debug, Clone)]
pub struct NewQuestion {
    pub title: String,
    pub details: String,
    pub section: String,
    pub tags: Vec<String>,
    pub author_id: Uuid,
}

/// A content edit of an existing question. Identity, author, timestamps and
/// counters are untouched; the slug is rederived from the new title.
#[derive(Debug, Clone)]
pub struct QuestionUpdate {
    pub title: String,
    pub details: String,
    pub section: String,
    pub tags: Vec<String>,
}

/// Listing filters. All fields are optional and combine with AND semantics.
#[derive(Debug, Clone, Default)]
pub struct QuestionFilter {
    /// Exact match against any of a question's tags.
    pub tag: Option<String>,
    /// Case-insensitive substring match against the title.
    pub query: Option<String>,
    /// Exact username match.
    pub author: Option<String>,
}

/// Listing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Ordering {
    /// Newest first.
    #[default]
    Recency,
    /// Highest rating first, ties broken by recency.
    Popularity,
}

/// A 1-based page request.
#[derive(Debug, Clone, Copy)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
}

impl PageRequest {
    pub fn new(page: u32, size: u32) -> Self {
        Self {
            page: page.max(1),
            size,
        }
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.size)
    }
}

/// One page of results together with the total match count.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub size: u32,
    pub total: u64,
}

/// A tag together with the number of questions carrying it.
#[derive(Debug, Clone)]
pub struct TagSummary {
    pub name: String,
    pub question_count: u64,
}

/// A single ballot cast by a user on a question. One ballot per
/// (question, voter); re-voting replaces the previous ballot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vote {
    Up,
    Down,
}

impl Vote {
    pub fn value(self) -> i16 {
        match self {
            Vote::Up => 1,
            Vote::Down => -1,
        }
    }
}

/// What happened, for the activity-stream collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityVerb {
    Asked,
}

impl ActivityVerb {
    pub fn as_str(self) -> &'static str {
        match self {
            ActivityVerb::Asked => "asked",
        }
    }
}

/// An event handed to the activity-stream collaborator.
#[derive(Debug, Clone)]
pub struct Activity {
    pub actor_id: Uuid,
    pub actor: String,
    pub verb: ActivityVerb,
    pub question_id: Uuid,
    pub title: String,
}

/// The social backend a profile was extracted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocialProvider {
    Facebook,
    GoogleOauth2,
    Twitter,
}

impl SocialProvider {
    pub fn as_str(self) -> &'static str {
        match self {
            SocialProvider::Facebook => "facebook",
            SocialProvider::GoogleOauth2 => "google-oauth2",
            SocialProvider::Twitter => "twitter",
        }
    }
}

/// Provider-independent profile data, produced by the provider adapters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocialProfile {
    pub provider: SocialProvider,
    pub display_name: String,
    pub avatar_url: Option<String>,
}

/// Profile fields a user (or a social adapter) may change.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub about: Option<String>,
    pub avatar: Option<String>,
}
