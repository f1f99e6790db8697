// Layer 1: Standard library
use std::fmt;

// Layer 2: Third-party
use tokio::sync::oneshot;

/// A zero-argument job executed by a balancer worker, producing a `T`.
///
/// Jobs are assumed total (infallible) — see [`crate::balancer`] module docs
/// and `SPEC_FULL.md` §4.1 "Failure semantics". A job that panics takes its
/// worker task down with it; the balancer has no supervision of its own.
pub type BoxJob<T> = Box<dyn FnOnce() -> T + Send + 'static>;

/// A unit of work submitted to the [`crate::balancer::Balancer`].
///
/// Consumed exactly once by exactly one worker. The worker sends exactly one
/// value on [`Request::result`] before signalling completion back to the
/// balancer.
pub struct Request<T> {
    pub(crate) job: BoxJob<T>,
    pub(crate) result: oneshot::Sender<T>,
}

impl<T> fmt::Debug for Request<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request").finish_non_exhaustive()
    }
}

impl<T: Send + 'static> Request<T> {
    /// Build a request from a job closure, returning it paired with the
    /// receiving half of its one-shot result channel.
    ///
    /// # Example
    ///
    /// ```
    /// use loadpool::balancer::Request;
    ///
    /// let (request, _result) = Request::new(|| 41 + 1);
    /// assert_eq!(request.into_job()(), 42);
    /// ```
    pub fn new(job: impl FnOnce() -> T + Send + 'static) -> (Self, oneshot::Receiver<T>) {
        let (tx, rx) = oneshot::channel();
        (
            Self {
                job: Box::new(job),
                result: tx,
            },
            rx,
        )
    }

    /// Consume the request, returning its job and result sink separately.
    ///
    /// Used by [`crate::balancer::worker`] to run the job and then deliver
    /// the result; exposed publicly so callers can build their own worker
    /// loops around [`Request`] without depending on this crate's balancer.
    pub fn into_parts(self) -> (BoxJob<T>, oneshot::Sender<T>) {
        (self.job, self.result)
    }

    /// Consume the request, discarding its result sink and returning only
    /// the job. Useful in tests and doc examples that only care about the
    /// job's return value.
    pub fn into_job(self) -> BoxJob<T> {
        self.job
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Tests are allowed to use unwrap for simplicity
mod tests {
    use super::*;

    #[tokio::test]
    async fn job_runs_and_result_is_delivered() {
        let (request, result) = Request::new(|| 7);
        let (job, sink) = request.into_parts();
        let _ = sink.send(job());
        assert_eq!(result.await.unwrap(), 7);
    }
}
