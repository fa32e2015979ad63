//! Shared plumbing for the coach orchestration crates.
//!
//! Currently this is the bounded retry-with-timeout combinator used by both
//! the engine session (readiness waits) and the remote judge client (verdict
//! polling).

pub mod poll;

pub use poll::{poll_until, PollError};
