//! Observability subsystem for stratadb
//!
//! Structured JSON logging for the query dispatch path. Observability is
//! read-only: it has no side effects on dispatch decisions, runs no
//! background threads, and produces deterministic output.

mod logger;

pub use logger::{Logger, Severity};
