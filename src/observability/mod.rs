//! Structured logging for the catalog service.
//!
//! Synchronous JSON lines with deterministic key ordering; event names are
//! fixed constants in `events`.

pub mod events;
mod logger;

pub use logger::{Logger, Severity};
