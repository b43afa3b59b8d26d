//! services/api/src/adapters/memory.rs
//!
//! An in-memory implementation of the store ports, behaviorally equivalent
//! to the PostgreSQL adapter. It backs the test suites and is handy for
//! running the service without a database.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use askaway_core::domain::{
    NewQuestion, NewUser, Ordering, Page, PageRequest, ProfileUpdate, Question, QuestionFilter,
    QuestionUpdate, TagSummary, User, Vote, DEFAULT_AVATAR,
};
use askaway_core::ports::{
    PortError, PortResult, QuestionStore, TagStore, UserStore, VoteStore,
};
use askaway_core::slug::slugify;

#[derive(Default)]
struct Inner {
    users: Vec<User>,
    questions: Vec<Question>,
    // (question_id, voter_id) -> ballot value
    votes: HashMap<(Uuid, Uuid), i16>,
}

/// RwLock-guarded store. No method holds the lock across an await point.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn matches_filter(question: &Question, filter: &QuestionFilter) -> bool {
    if let Some(tag) = &filter.tag {
        if !question.tags.iter().any(|t| t == tag) {
            return false;
        }
    }
    if let Some(query) = &filter.query {
        if !question
            .title
            .to_lowercase()
            .contains(&query.to_lowercase())
        {
            return false;
        }
    }
    if let Some(author) = &filter.author {
        if question.author != *author {
            return false;
        }
    }
    true
}

fn paginate<T: Clone>(items: Vec<T>, page: PageRequest) -> Page<T> {
    let total = items.len() as u64;
    let start = (page.offset() as usize).min(items.len());
    let end = (start + page.size as usize).min(items.len());
    Page {
        items: items[start..end].to_vec(),
        page: page.page,
        size: page.size,
        total,
    }
}

#[async_trait]
impl QuestionStore for MemoryStore {
    async fn create(&self, question: NewQuestion) -> PortResult<Question> {
        let mut inner = self.inner.write().unwrap();
        let author = inner
            .users
            .iter()
            .find(|u| u.id == question.author_id)
            .ok_or_else(|| {
                PortError::Integrity(format!("Author {} does not exist", question.author_id))
            })?;

        let stored = Question {
            id: Uuid::new_v4(),
            slug: slugify(&question.title),
            title: question.title,
            details: question.details,
            published_at: Utc::now(),
            view_count: 0,
            answered: false,
            rating: 0,
            section: question.section,
            author_id: author.id,
            author: author.username.clone(),
            tags: question.tags,
        };
        inner.questions.push(stored.clone());
        Ok(stored)
    }

    async fn question_by_id(&self, id: Uuid) -> PortResult<Question> {
        let inner = self.inner.read().unwrap();
        inner
            .questions
            .iter()
            .find(|q| q.id == id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("Question {} not found", id)))
    }

    async fn record_view(&self, id: Uuid) -> PortResult<Question> {
        let mut inner = self.inner.write().unwrap();
        let question = inner
            .questions
            .iter_mut()
            .find(|q| q.id == id)
            .ok_or_else(|| PortError::NotFound(format!("Question {} not found", id)))?;
        question.view_count += 1;
        Ok(question.clone())
    }

    async fn update(&self, id: Uuid, update: QuestionUpdate) -> PortResult<Question> {
        let mut inner = self.inner.write().unwrap();
        let question = inner
            .questions
            .iter_mut()
            .find(|q| q.id == id)
            .ok_or_else(|| PortError::NotFound(format!("Question {} not found", id)))?;
        question.slug = slugify(&update.title);
        question.title = update.title;
        question.details = update.details;
        question.section = update.section;
        question.tags = update.tags;
        Ok(question.clone())
    }

    async fn list(
        &self,
        filter: &QuestionFilter,
        order: Ordering,
        page: PageRequest,
    ) -> PortResult<Page<Question>> {
        let inner = self.inner.read().unwrap();
        let mut matches: Vec<Question> = inner
            .questions
            .iter()
            .filter(|q| matches_filter(q, filter))
            .cloned()
            .collect();
        match order {
            Ordering::Recency => matches.sort_by(|a, b| b.published_at.cmp(&a.published_at)),
            Ordering::Popularity => matches.sort_by(|a, b| {
                b.rating
                    .cmp(&a.rating)
                    .then(b.published_at.cmp(&a.published_at))
            }),
        }
        Ok(paginate(matches, page))
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, user: NewUser) -> PortResult<User> {
        let mut inner = self.inner.write().unwrap();
        if inner.users.iter().any(|u| u.username == user.username) {
            return Err(PortError::Conflict(format!(
                "Username '{}' is taken",
                user.username
            )));
        }
        let stored = User {
            id: Uuid::new_v4(),
            username: user.username,
            email: user.email,
            registered_at: Utc::now(),
            rating: 0,
            about: user.about,
            avatar: DEFAULT_AVATAR.to_string(),
        };
        inner.users.push(stored.clone());
        Ok(stored)
    }

    async fn user_by_username(&self, username: &str) -> PortResult<User> {
        let inner = self.inner.read().unwrap();
        inner
            .users
            .iter()
            .find(|u| u.username == username)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("User '{}' not found", username)))
    }

    async fn list_users(&self, page: PageRequest) -> PortResult<Page<User>> {
        let inner = self.inner.read().unwrap();
        let mut users = inner.users.clone();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(paginate(users, page))
    }

    async fn update_profile(&self, username: &str, update: ProfileUpdate) -> PortResult<User> {
        let mut inner = self.inner.write().unwrap();
        let user = inner
            .users
            .iter_mut()
            .find(|u| u.username == username)
            .ok_or_else(|| PortError::NotFound(format!("User '{}' not found", username)))?;
        if let Some(about) = update.about {
            user.about = about;
        }
        if let Some(avatar) = update.avatar {
            user.avatar = avatar;
        }
        Ok(user.clone())
    }
}

#[async_trait]
impl TagStore for MemoryStore {
    async fn list_tags(&self) -> PortResult<Vec<TagSummary>> {
        let inner = self.inner.read().unwrap();
        let mut counts: HashMap<&str, u64> = HashMap::new();
        for question in &inner.questions {
            for tag in &question.tags {
                *counts.entry(tag.as_str()).or_default() += 1;
            }
        }
        let mut tags: Vec<TagSummary> = counts
            .into_iter()
            .map(|(name, question_count)| TagSummary {
                name: name.to_string(),
                question_count,
            })
            .collect();
        tags.sort_by(|a, b| {
            b.question_count
                .cmp(&a.question_count)
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(tags)
    }
}

#[async_trait]
impl VoteStore for MemoryStore {
    async fn apply_vote(&self, question_id: Uuid, voter_id: Uuid, vote: Vote) -> PortResult<i64> {
        let mut inner = self.inner.write().unwrap();
        if !inner.questions.iter().any(|q| q.id == question_id) {
            return Err(PortError::NotFound(format!(
                "Question {} not found",
                question_id
            )));
        }
        if !inner.users.iter().any(|u| u.id == voter_id) {
            return Err(PortError::NotFound(format!("User {} not found", voter_id)));
        }

        inner.votes.insert((question_id, voter_id), vote.value());
        let rating: i64 = inner
            .votes
            .iter()
            .filter(|((qid, _), _)| *qid == question_id)
            .map(|(_, value)| i64::from(*value))
            .sum();

        let question = inner
            .questions
            .iter_mut()
            .find(|q| q.id == question_id)
            .expect("checked above");
        question.rating = rating;
        Ok(rating)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    async fn seed_user(store: &MemoryStore, username: &str) -> User {
        store
            .create_user(NewUser {
                username: username.to_string(),
                email: None,
                about: String::new(),
            })
            .await
            .unwrap()
    }

    async fn seed_question(
        store: &MemoryStore,
        author: &User,
        title: &str,
        tags: &[&str],
    ) -> Question {
        store
            .create(NewQuestion {
                title: title.to_string(),
                details: "details".to_string(),
                section: String::new(),
                tags: tags.iter().map(|t| t.to_string()).collect(),
                author_id: author.id,
            })
            .await
            .unwrap()
    }

    fn all(size: u32) -> PageRequest {
        PageRequest::new(1, size)
    }

    #[tokio::test]
    async fn stored_slug_is_derived_from_title() {
        let store = MemoryStore::new();
        let alice = seed_user(&store, "alice").await;
        let q = seed_question(&store, &alice, "Why is the sky blue?", &["science"]).await;
        assert_eq!(q.slug, "why-is-the-sky-blue");
        assert_eq!(q.view_count, 0);
    }

    #[tokio::test]
    async fn editing_the_title_recomputes_the_slug() {
        let store = MemoryStore::new();
        let alice = seed_user(&store, "alice").await;
        let q = seed_question(&store, &alice, "Old title", &[]).await;
        let updated = store
            .update(
                q.id,
                QuestionUpdate {
                    title: "Completely New Title".to_string(),
                    details: q.details.clone(),
                    section: q.section.clone(),
                    tags: q.tags.clone(),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.slug, "completely-new-title");
        assert_eq!(updated.published_at, q.published_at);
    }

    #[tokio::test]
    async fn create_with_unknown_author_is_an_integrity_error() {
        let store = MemoryStore::new();
        let err = store
            .create(NewQuestion {
                title: "t".to_string(),
                details: "d".to_string(),
                section: String::new(),
                tags: vec![],
                author_id: Uuid::new_v4(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, PortError::Integrity(_)));
    }

    #[tokio::test]
    async fn record_view_increments_and_returns_the_question() {
        let store = MemoryStore::new();
        let alice = seed_user(&store, "alice").await;
        let q = seed_question(&store, &alice, "Counting", &[]).await;
        assert_eq!(store.record_view(q.id).await.unwrap().view_count, 1);
        assert_eq!(store.record_view(q.id).await.unwrap().view_count, 2);
    }

    #[tokio::test]
    async fn record_view_on_unknown_id_is_not_found() {
        let store = MemoryStore::new();
        let err = store.record_view(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, PortError::NotFound(_)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_views_never_lose_an_increment() {
        let store = Arc::new(MemoryStore::new());
        let alice = seed_user(&store, "alice").await;
        let q = seed_question(&store, &alice, "Busy question", &[]).await;

        let mut handles = Vec::new();
        for _ in 0..50 {
            let store = store.clone();
            let id = q.id;
            handles.push(tokio::spawn(async move {
                store.record_view(id).await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(store.question_by_id(q.id).await.unwrap().view_count, 50);
    }

    #[tokio::test]
    async fn recency_listing_is_non_increasing_in_published_at() {
        let store = MemoryStore::new();
        let alice = seed_user(&store, "alice").await;
        for i in 0..5 {
            seed_question(&store, &alice, &format!("Question {i}"), &[]).await;
        }
        let page = store
            .list(&QuestionFilter::default(), Ordering::Recency, all(50))
            .await
            .unwrap();
        assert_eq!(page.total, 5);
        for pair in page.items.windows(2) {
            assert!(pair[0].published_at >= pair[1].published_at);
        }
    }

    #[tokio::test]
    async fn popularity_listing_is_non_increasing_in_rating() {
        let store = MemoryStore::new();
        let alice = seed_user(&store, "alice").await;
        let voters: Vec<User> = {
            let mut v = Vec::new();
            for name in ["bob", "carol", "dave"] {
                v.push(seed_user(&store, name).await);
            }
            v
        };

        let low = seed_question(&store, &alice, "Low", &[]).await;
        let high = seed_question(&store, &alice, "High", &[]).await;
        let mid = seed_question(&store, &alice, "Mid", &[]).await;

        for voter in &voters {
            store.apply_vote(high.id, voter.id, Vote::Up).await.unwrap();
        }
        store
            .apply_vote(mid.id, voters[0].id, Vote::Up)
            .await
            .unwrap();
        store
            .apply_vote(low.id, voters[0].id, Vote::Down)
            .await
            .unwrap();

        let page = store
            .list(&QuestionFilter::default(), Ordering::Popularity, all(50))
            .await
            .unwrap();
        let titles: Vec<&str> = page.items.iter().map(|q| q.title.as_str()).collect();
        assert_eq!(titles, vec!["High", "Mid", "Low"]);
        for pair in page.items.windows(2) {
            assert!(pair[0].rating >= pair[1].rating);
        }
    }

    #[tokio::test]
    async fn tag_filter_returns_exactly_the_tagged_subset() {
        let store = MemoryStore::new();
        let alice = seed_user(&store, "alice").await;
        let tagged = seed_question(&store, &alice, "Tagged", &["science", "sky"]).await;
        seed_question(&store, &alice, "Other", &["cooking"]).await;
        seed_question(&store, &alice, "Untagged", &[]).await;

        let page = store
            .list(
                &QuestionFilter {
                    tag: Some("science".to_string()),
                    ..Default::default()
                },
                Ordering::Recency,
                all(50),
            )
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].id, tagged.id);
    }

    #[tokio::test]
    async fn query_filter_is_a_case_insensitive_substring_match() {
        let store = MemoryStore::new();
        let alice = seed_user(&store, "alice").await;
        seed_question(&store, &alice, "Why is the SKY blue?", &[]).await;
        seed_question(&store, &alice, "Unrelated", &[]).await;

        let page = store
            .list(
                &QuestionFilter {
                    query: Some("sky".to_string()),
                    ..Default::default()
                },
                Ordering::Recency,
                all(50),
            )
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].title, "Why is the SKY blue?");
    }

    #[tokio::test]
    async fn filters_combine_with_and_semantics() {
        let store = MemoryStore::new();
        let alice = seed_user(&store, "alice").await;
        let bob = seed_user(&store, "bob").await;
        let wanted = seed_question(&store, &alice, "Rust lifetimes", &["rust"]).await;
        seed_question(&store, &bob, "Rust macros", &["rust"]).await;
        seed_question(&store, &alice, "Sourdough starters", &["cooking"]).await;

        let page = store
            .list(
                &QuestionFilter {
                    tag: Some("rust".to_string()),
                    query: Some("lifetimes".to_string()),
                    author: Some("alice".to_string()),
                },
                Ordering::Recency,
                all(50),
            )
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].id, wanted.id);
    }

    #[tokio::test]
    async fn unknown_author_filter_yields_an_empty_page() {
        let store = MemoryStore::new();
        let alice = seed_user(&store, "alice").await;
        seed_question(&store, &alice, "Anything", &[]).await;

        let page = store
            .list(
                &QuestionFilter {
                    author: Some("nobody".to_string()),
                    ..Default::default()
                },
                Ordering::Recency,
                all(50),
            )
            .await
            .unwrap();
        assert_eq!(page.total, 0);
        assert!(page.items.is_empty());
    }

    #[tokio::test]
    async fn pagination_slices_and_reports_the_total() {
        let store = MemoryStore::new();
        let alice = seed_user(&store, "alice").await;
        for i in 0..25 {
            seed_question(&store, &alice, &format!("Question {i}"), &[]).await;
        }

        let first = store
            .list(
                &QuestionFilter::default(),
                Ordering::Recency,
                PageRequest::new(1, 10),
            )
            .await
            .unwrap();
        assert_eq!(first.items.len(), 10);
        assert_eq!(first.total, 25);

        let last = store
            .list(
                &QuestionFilter::default(),
                Ordering::Recency,
                PageRequest::new(3, 10),
            )
            .await
            .unwrap();
        assert_eq!(last.items.len(), 5);

        let beyond = store
            .list(
                &QuestionFilter::default(),
                Ordering::Recency,
                PageRequest::new(4, 10),
            )
            .await
            .unwrap();
        assert!(beyond.items.is_empty());
        assert_eq!(beyond.total, 25);
    }

    #[tokio::test]
    async fn duplicate_username_is_a_conflict() {
        let store = MemoryStore::new();
        seed_user(&store, "alice").await;
        let err = store
            .create_user(NewUser {
                username: "alice".to_string(),
                email: None,
                about: String::new(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, PortError::Conflict(_)));
    }

    #[tokio::test]
    async fn new_users_get_the_default_avatar() {
        let store = MemoryStore::new();
        let alice = seed_user(&store, "alice").await;
        assert_eq!(alice.avatar, DEFAULT_AVATAR);
    }

    #[tokio::test]
    async fn tag_directory_counts_questions_per_tag() {
        let store = MemoryStore::new();
        let alice = seed_user(&store, "alice").await;
        seed_question(&store, &alice, "One", &["rust", "async"]).await;
        seed_question(&store, &alice, "Two", &["rust"]).await;

        let tags = store.list_tags().await.unwrap();
        assert_eq!(tags[0].name, "rust");
        assert_eq!(tags[0].question_count, 2);
        assert_eq!(tags[1].name, "async");
        assert_eq!(tags[1].question_count, 1);
    }

    #[tokio::test]
    async fn revoting_replaces_the_previous_ballot() {
        let store = MemoryStore::new();
        let alice = seed_user(&store, "alice").await;
        let bob = seed_user(&store, "bob").await;
        let q = seed_question(&store, &alice, "Votable", &[]).await;

        assert_eq!(store.apply_vote(q.id, bob.id, Vote::Up).await.unwrap(), 1);
        assert_eq!(store.apply_vote(q.id, bob.id, Vote::Down).await.unwrap(), -1);
    }

    #[tokio::test]
    async fn distinct_voters_accumulate() {
        let store = MemoryStore::new();
        let alice = seed_user(&store, "alice").await;
        let bob = seed_user(&store, "bob").await;
        let carol = seed_user(&store, "carol").await;
        let q = seed_question(&store, &alice, "Votable", &[]).await;

        store.apply_vote(q.id, bob.id, Vote::Up).await.unwrap();
        let rating = store.apply_vote(q.id, carol.id, Vote::Up).await.unwrap();
        assert_eq!(rating, 2);
        assert_eq!(store.question_by_id(q.id).await.unwrap().rating, 2);
    }
}
