//! services/api/src/adapters/activity.rs
//!
//! The activity-stream seam. Storage and fan-out of activity feeds belong to
//! an external collaborator; this adapter hands events to the log so the
//! stream can be consumed from there.

use async_trait::async_trait;
use tracing::info;

use askaway_core::domain::Activity;
use askaway_core::ports::ActivityPublisher;

/// Publishes activity events as structured log lines.
#[derive(Default)]
pub struct TracingActivityPublisher;

impl TracingActivityPublisher {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ActivityPublisher for TracingActivityPublisher {
    async fn publish(&self, activity: Activity) {
        info!(
            actor = %activity.actor,
            actor_id = %activity.actor_id,
            verb = activity.verb.as_str(),
            question_id = %activity.question_id,
            title = %activity.title,
            "activity"
        );
    }
}
