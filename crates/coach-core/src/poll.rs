//! Bounded retry-with-timeout polling.
//!
//! Both external workers are driven by the same loop shape: attempt an
//! operation, and if it is not ready yet, sleep for a fixed interval and try
//! again until an overall deadline runs out. [`poll_until`] captures that
//! shape once, parameterized by interval and deadline.

use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;

/// Why a [`poll_until`] loop ended without producing a value.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum PollError<E> {
    /// The deadline elapsed before any attempt reported completion.
    #[error("polling deadline exceeded")]
    DeadlineExceeded,
    /// An attempt itself failed. Attempt failures are surfaced immediately
    /// and never retried.
    #[error("poll attempt failed: {0}")]
    Attempt(E),
}

/// Repeatedly invokes `attempt` until it produces a value or `deadline` runs out.
///
/// The attempt closure reports one of three things:
/// - `Ok(Some(value))` — done, the value is returned.
/// - `Ok(None)` — not ready yet; sleep `interval` and retry.
/// - `Err(e)` — the attempt failed; returned at once as [`PollError::Attempt`].
///
/// The first attempt runs immediately, with no leading sleep. The final sleep
/// is clamped so the loop never overshoots the deadline by more than one
/// interval.
pub fn poll_until<T, E, F>(
    interval: Duration,
    deadline: Duration,
    mut attempt: F,
) -> Result<T, PollError<E>>
where
    F: FnMut() -> Result<Option<T>, E>,
{
    let started = Instant::now();
    loop {
        match attempt() {
            Ok(Some(value)) => return Ok(value),
            Ok(None) => {}
            Err(e) => return Err(PollError::Attempt(e)),
        }

        let elapsed = started.elapsed();
        if elapsed >= deadline {
            return Err(PollError::DeadlineExceeded);
        }
        thread::sleep(interval.min(deadline - elapsed));
    }
}
