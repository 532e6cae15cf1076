// HTTP routes
pub mod articles;
pub mod health;
pub mod notifications;
pub mod stream;

pub use articles::*;
pub use health::*;
pub use notifications::*;
pub use stream::*;
