pub mod activity;
pub mod db;
pub mod memory;
pub mod social;

pub use activity::TracingActivityPublisher;
pub use db::PgStore;
pub use memory::MemoryStore;
