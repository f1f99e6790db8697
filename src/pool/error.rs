// Layer 1: Standard library
// (none)

// Layer 2: Third-party
use thiserror::Error;

/// Outcome of [`super::Pool::wait`].
///
/// Mirrors `SPEC_FULL.md` §4.3's first-error-wins contract: once any task
/// returns an error, that error (and only that one) is what every call to
/// `wait` ultimately reports, even if later tasks also fail or the pool is
/// separately cancelled.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError<E: std::fmt::Display + std::fmt::Debug> {
    /// The first task error observed by the pool.
    #[error("{0}")]
    Task(E),

    /// The pool (or an ancestor of it) was cancelled before every submitted
    /// task finished, and no task had already failed.
    #[error("pool was cancelled")]
    Cancelled,
}

impl<E: std::fmt::Display + std::fmt::Debug> PoolError<E> {
    /// `true` for [`PoolError::Task`].
    pub fn is_task_error(&self) -> bool {
        matches!(self, PoolError::Task(_))
    }

    /// `true` for [`PoolError::Cancelled`].
    pub fn is_cancelled(&self) -> bool {
        matches!(self, PoolError::Cancelled)
    }
}
