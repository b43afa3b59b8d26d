//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use std::sync::Arc;

use askaway_core::ports::{
    ActivityPublisher, QuestionStore, TagStore, UserStore, VoteStore,
};

use crate::config::Config;

/// The shared application state, created once at startup and passed to all
/// handlers. Every collaborator enters through a port trait, so tests swap
/// in the in-memory adapter without touching the handlers.
#[derive(Clone)]
pub struct AppState {
    pub questions: Arc<dyn QuestionStore>,
    pub users: Arc<dyn UserStore>,
    pub tags: Arc<dyn TagStore>,
    pub votes: Arc<dyn VoteStore>,
    pub activity: Arc<dyn ActivityPublisher>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Builds the state from one store implementing every store port plus
    /// the activity publisher.
    pub fn with_store<S>(
        store: Arc<S>,
        activity: Arc<dyn ActivityPublisher>,
        config: Arc<Config>,
    ) -> Self
    where
        S: QuestionStore + UserStore + TagStore + VoteStore + 'static,
    {
        Self {
            questions: store.clone(),
            users: store.clone(),
            tags: store.clone(),
            votes: store,
            activity,
            config,
        }
    }
}
