pub mod actions;
pub mod error;
pub mod events;
pub mod machines;
pub mod models;

pub use error::WorkflowError;
pub use events::TransitionEvent;
pub use models::article::{Article, ArticleStatus};
