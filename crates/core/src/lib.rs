//! Core data types for the listing watcher.

pub mod date;
pub mod event;
pub mod watch;

pub use date::*;
pub use event::*;
pub use watch::*;
