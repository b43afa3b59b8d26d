//! crates/askaway_core/src/submission.rs
//!
//! Validation and persistence of question submissions and edits.

use crate::domain::{
    Activity, ActivityVerb, NewQuestion, Question, QuestionUpdate,
};
use crate::ports::{ActivityPublisher, PortError, QuestionStore, UserStore};
use uuid::Uuid;

/// Upper bound on title length, in characters.
pub const TITLE_MAX: usize = 200;
/// Upper bound on details length, in characters.
pub const DETAILS_MAX: usize = 500;
/// Upper bound on the section label, in characters.
pub const SECTION_MAX: usize = 200;
/// Upper bound on a single tag, in characters.
pub const TAG_MAX: usize = 100;

/// A candidate question as it arrives from the ask form: unvalidated, with
/// the author referenced by username.
#[derive(Debug, Clone)]
pub struct QuestionDraft {
    pub title: String,
    pub details: String,
    pub section: String,
    pub tags: Vec<String>,
    pub author: String,
}

/// One field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Why a submission or edit was rejected.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    /// One or more fields violated their bounds; nothing was persisted.
    #[error("submission failed validation")]
    Invalid(Vec<FieldError>),
    /// The author reference does not resolve to an existing user.
    #[error("author '{0}' does not exist")]
    UnknownAuthor(String),
    #[error(transparent)]
    Port(#[from] PortError),
}

/// Checks the shared content bounds of drafts and edits. All violations are
/// reported together so the form can show every message at once.
fn validate_content(
    title: &str,
    details: &str,
    section: &str,
    tags: &[String],
) -> Vec<FieldError> {
    let mut errors = Vec::new();

    if title.trim().is_empty() {
        errors.push(FieldError::new("title", "title must not be empty"));
    } else if title.chars().count() > TITLE_MAX {
        errors.push(FieldError::new(
            "title",
            format!("title must be at most {TITLE_MAX} characters"),
        ));
    }

    if details.trim().is_empty() {
        errors.push(FieldError::new("details", "details must not be empty"));
    } else if details.chars().count() > DETAILS_MAX {
        errors.push(FieldError::new(
            "details",
            format!("details must be at most {DETAILS_MAX} characters"),
        ));
    }

    if section.chars().count() > SECTION_MAX {
        errors.push(FieldError::new(
            "section",
            format!("section must be at most {SECTION_MAX} characters"),
        ));
    }

    for tag in tags {
        if tag.trim().is_empty() {
            errors.push(FieldError::new("tags", "tags must not be empty"));
        } else if tag.chars().count() > TAG_MAX {
            errors.push(FieldError::new(
                "tags",
                format!("tag '{tag}' exceeds {TAG_MAX} characters"),
            ));
        }
    }

    errors
}

/// Validates a draft without touching any store.
pub fn validate_draft(draft: &QuestionDraft) -> Result<(), Vec<FieldError>> {
    let mut errors = validate_content(&draft.title, &draft.details, &draft.section, &draft.tags);
    if draft.author.trim().is_empty() {
        errors.push(FieldError::new("author", "author must not be empty"));
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Trims tags and drops duplicates while keeping first-seen order.
fn normalize_tags(tags: &[String]) -> Vec<String> {
    let mut seen = Vec::new();
    for tag in tags {
        let tag = tag.trim();
        if !tag.is_empty() && !seen.iter().any(|s| s == tag) {
            seen.push(tag.to_string());
        }
    }
    seen
}

/// Validates a draft, resolves its author and persists it, then hands an
/// `asked` event to the activity collaborator. On validation failure nothing
/// is persisted and every violated field is reported.
pub async fn submit_question(
    questions: &dyn QuestionStore,
    users: &dyn UserStore,
    activity: &dyn ActivityPublisher,
    draft: QuestionDraft,
) -> Result<Question, SubmitError> {
    validate_draft(&draft).map_err(SubmitError::Invalid)?;

    let author = match users.user_by_username(&draft.author).await {
        Ok(user) => user,
        Err(PortError::NotFound(_)) => return Err(SubmitError::UnknownAuthor(draft.author)),
        Err(e) => return Err(e.into()),
    };

    let question = questions
        .create(NewQuestion {
            title: draft.title,
            details: draft.details,
            section: draft.section,
            tags: normalize_tags(&draft.tags),
            author_id: author.id,
        })
        .await?;

    activity
        .publish(Activity {
            actor_id: author.id,
            actor: author.username,
            verb: ActivityVerb::Asked,
            question_id: question.id,
            title: question.title.clone(),
        })
        .await;

    Ok(question)
}

/// Validates and applies a content edit. The store rederives the slug from
/// the new title; identity, author, timestamps and counters are untouched.
pub async fn revise_question(
    questions: &dyn QuestionStore,
    id: Uuid,
    update: QuestionUpdate,
) -> Result<Question, SubmitError> {
    let errors = validate_content(&update.title, &update.details, &update.section, &update.tags);
    if !errors.is_empty() {
        return Err(SubmitError::Invalid(errors));
    }

    let update = QuestionUpdate {
        tags: normalize_tags(&update.tags),
        ..update
    };
    Ok(questions.update(id, update).await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> QuestionDraft {
        QuestionDraft {
            title: "Why is the sky blue?".to_string(),
            details: "It looks blue most days.".to_string(),
            section: "science".to_string(),
            tags: vec!["science".to_string()],
            author: "alice".to_string(),
        }
    }

    #[test]
    fn valid_draft_passes() {
        assert!(validate_draft(&draft()).is_ok());
    }

    #[test]
    fn empty_title_is_rejected() {
        let mut d = draft();
        d.title = "  ".to_string();
        let errors = validate_draft(&d).unwrap_err();
        assert!(errors.iter().any(|e| e.field == "title"));
    }

    #[test]
    fn overlong_title_is_rejected() {
        let mut d = draft();
        d.title = "x".repeat(TITLE_MAX + 1);
        let errors = validate_draft(&d).unwrap_err();
        assert!(errors.iter().any(|e| e.field == "title"));
    }

    #[test]
    fn title_at_bound_is_accepted() {
        let mut d = draft();
        d.title = "x".repeat(TITLE_MAX);
        assert!(validate_draft(&d).is_ok());
    }

    #[test]
    fn overlong_details_is_rejected() {
        let mut d = draft();
        d.details = "x".repeat(DETAILS_MAX + 1);
        let errors = validate_draft(&d).unwrap_err();
        assert!(errors.iter().any(|e| e.field == "details"));
    }

    #[test]
    fn all_violations_are_reported_together() {
        let mut d = draft();
        d.title = String::new();
        d.details = String::new();
        d.author = String::new();
        let errors = validate_draft(&d).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert!(fields.contains(&"title"));
        assert!(fields.contains(&"details"));
        assert!(fields.contains(&"author"));
    }

    #[test]
    fn blank_tag_is_rejected() {
        let mut d = draft();
        d.tags = vec![" ".to_string()];
        let errors = validate_draft(&d).unwrap_err();
        assert!(errors.iter().any(|e| e.field == "tags"));
    }

    #[test]
    fn tags_are_trimmed_and_deduplicated() {
        let tags = vec![
            " rust ".to_string(),
            "rust".to_string(),
            "async".to_string(),
        ];
        assert_eq!(normalize_tags(&tags), vec!["rust", "async"]);
    }
}
