pub mod transition;

pub use transition::{apply_transition, ActorRef};
