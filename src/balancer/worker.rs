//! The balancer's per-worker receive loop.

// Layer 1: Standard library
use std::fmt;

// Layer 2: Third-party
use tokio::sync::mpsc;

// Layer 3: Internal
use super::request::Request;

/// Stable identity of a balancer worker, independent of its current
/// position in the [`super::heap::WorkerHeap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WorkerId(pub(crate) usize);

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "worker-{}", self.0)
    }
}

/// Drive one worker's private request channel until it closes.
///
/// For each [`Request`]: run its job, deliver the result, then signal `id`
/// on `done`. The three steps are sequenced by plain `.await` ordering — a
/// worker only ever has one request in flight because it owns the only
/// receiving end of `requests`.
///
/// Exits when `requests` closes (the [`super::Balancer`] was dropped) or
/// when `done` is closed (same). Neither happens during normal operation —
/// balancer workers are process-lived, matching `SPEC_FULL.md` §4.1's "no
/// terminal state" worker state machine.
pub(crate) async fn run<T: Send + 'static>(
    id: WorkerId,
    mut requests: mpsc::Receiver<Request<T>>,
    done: mpsc::Sender<WorkerId>,
) {
    while let Some(request) = requests.recv().await {
        let (job, result) = request.into_parts();
        let value = job();
        if result.send(value).is_err() {
            tracing::debug!(%id, "requester dropped its result receiver");
        }
        if done.send(id).await.is_err() {
            tracing::debug!(%id, "balancer gone, worker exiting");
            return;
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Tests are allowed to use unwrap for simplicity
mod tests {
    use super::*;

    #[tokio::test]
    async fn processes_requests_in_fifo_order_and_signals_completion() {
        let (requests_tx, requests_rx) = mpsc::channel(4);
        let (done_tx, mut done_rx) = mpsc::channel(4);
        let id = WorkerId(0);
        tokio::spawn(run(id, requests_rx, done_tx));

        let mut results = Vec::new();
        for i in 0..3 {
            let (request, result) = Request::new(move || i as i64);
            requests_tx.send(request).await.unwrap();
            results.push(result);
            assert_eq!(done_rx.recv().await, Some(id));
        }

        for (i, result) in results.into_iter().enumerate() {
            assert_eq!(result.await.unwrap(), i as i64);
        }
    }
}
