pub mod questions;
pub mod rest;
pub mod state;
pub mod tags;
pub mod users;

pub use rest::ApiDoc;
pub use state::AppState;
