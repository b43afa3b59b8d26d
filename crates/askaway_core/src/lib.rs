pub mod domain;
pub mod ports;
pub mod slug;
pub mod submission;

pub use domain::{
    Activity, ActivityVerb, NewQuestion, NewUser, Ordering, Page, PageRequest, ProfileUpdate,
    Question, QuestionFilter, QuestionUpdate, SocialProfile, SocialProvider, TagSummary, User,
    Vote,
};
pub use ports::{
    ActivityPublisher, PortError, PortResult, QuestionStore, TagStore, UserStore, VoteStore,
};
pub use slug::slugify;
pub use submission::{FieldError, QuestionDraft, SubmitError};
