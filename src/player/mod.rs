//! Audio playback: rodio backend thread plus the session coordinator.

pub mod backend;
pub mod coordinator;

pub use backend::{Player, PlayerEvent};
pub use coordinator::{Coordinator, Directive};
